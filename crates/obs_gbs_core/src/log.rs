// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! Logging setup code

use clap::Args;
use tracing_subscriber::EnvFilter;

// ----------------------------------------------------------------------
// - Constants:
// ----------------------------------------------------------------------

/// The environment variable holding the log filter directives
pub const LOG_FILTER_ENV: &str = "OBS_GBS_LOG";

// ----------------------------------------------------------------------
// - Helper:
// ----------------------------------------------------------------------

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

const fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn runtime_error(e: &dyn std::fmt::Display) -> crate::Error {
    crate::Error::Runtime {
        message: e.to_string(),
    }
}

// ----------------------------------------------------------------------
// - LogFormat:
// ----------------------------------------------------------------------

/// The output format to be used for log messages
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Pretty, human-readable output of log messages.
    Pretty,
    /// Full output of log messages
    Full,
    /// Compact output of log messages.
    Compact,
    /// JSON output of log messages.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        match s.as_str() {
            "pretty" => Ok(Self::Pretty),
            "full" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(crate::Error::Runtime {
                message: format!("\"{}\" is not a supported output kind for log messages", s),
            }),
        }
    }
}

// ----------------------------------------------------------------------
// - LogArgs:
// ----------------------------------------------------------------------

/// Logging related arguments for command line parsing
#[derive(Debug, Args)]
pub struct LogArgs {
    /// Set the output format for log messages
    #[clap(
        long,
        default_value = "full",
        display_order = 5000,
        env = "OBS_GBS_LOG_FORMAT",
        value_name = "pretty|full|compact|json"
    )]
    log_format: LogFormat,
}

impl LogArgs {
    /// Install a default tracing subscriber
    ///
    /// `verbose` lowers the default level to `debug`. Filter directives
    /// found in `OBS_GBS_LOG` always win.
    ///
    /// # Errors
    /// a `crate::Error::Runtime` is returned if the setup fails
    pub fn setup_logging(&self, verbose: bool) -> crate::Result<()> {
        let builder = tracing_subscriber::fmt().with_env_filter(env_filter(verbose));
        match self.log_format {
            LogFormat::Pretty => builder.pretty().try_init(),
            LogFormat::Full => builder.try_init(),
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Json => builder.json().try_init(),
        }
        .map_err(|e| runtime_error(&e))?;
        tracing::trace!("Tracing initialized.");
        Ok(())
    }
}

// ----------------------------------------------------------------------
// - Tests:
// ----------------------------------------------------------------------
