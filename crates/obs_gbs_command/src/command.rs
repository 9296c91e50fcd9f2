// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

use crate::{Captured, Credentials, Outcome, Result};

use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};

/// A `Command` that is supposed to get run
#[derive(Clone, Debug)]
pub struct Command {
    /// The command to run
    pub(crate) command: PathBuf,
    /// The arguments passed to the `command`
    pub(crate) arguments: Vec<OsString>,
    /// Additional environment variables for the `command`
    pub(crate) environment: Vec<(OsString, OsString)>,
    /// The working directory of the `command`
    pub(crate) current_dir: Option<PathBuf>,
    /// User and group to run the `command` as
    pub(crate) credentials: Credentials,
}

impl Command {
    fn to_process(&self) -> std::process::Command {
        let mut process = std::process::Command::new(&self.command);
        process.args(&self.arguments);
        process.envs(self.environment.iter().map(|(k, v)| (k, v)));

        if let Some(dir) = &self.current_dir {
            process.current_dir(dir);
        }
        if let Some(uid) = self.credentials.uid {
            process.uid(uid.as_raw());
        }
        if let Some(gid) = self.credentials.gid {
            process.gid(gid.as_raw());
        }

        process
    }

    /// The full command line, for log messages
    #[must_use]
    pub fn command_line(&self) -> String {
        format!(
            "\"{}\"{}",
            self.command.to_string_lossy(),
            self.arguments
                .iter()
                .map(|a| format!(" \"{}\"", a.to_string_lossy()))
                .collect::<String>()
        )
    }

    /// Run the `Command` with stdin, stdout and stderr inherited from this process
    ///
    /// # Errors
    /// `Error::Io` if the command could not get started
    pub fn status(&self) -> Result<Outcome> {
        tracing::debug!("Running: {} ({})", self.command_line(), self.credentials);

        let status = self.to_process().status()?;
        let outcome = Outcome::from(status);

        tracing::trace!("Command finished: {}.", outcome);
        Ok(outcome)
    }

    /// Run the `Command` and capture its stdout and stderr
    ///
    /// # Errors
    /// `Error::Io` if the command could not get started
    pub fn output(&self) -> Result<Captured> {
        tracing::debug!("Running: {} ({})", self.command_line(), self.credentials);

        let output = self
            .to_process()
            .stdin(std::process::Stdio::null())
            .output()?;
        let outcome = Outcome::from(output.status);

        tracing::trace!("Command finished: {}.", outcome);
        Ok(Captured {
            outcome,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A builder for `Command`
#[derive(Clone)]
pub struct CommandBuilder {
    /// The `Command` that is getting build
    command: Command,
}

impl CommandBuilder {
    /// Create a `new` `CommandBuilder` that sets up `to_execute` as the command that will be run.
    #[must_use]
    pub fn new(to_execute: &Path) -> Self {
        let command = Command {
            command: to_execute.into(),
            arguments: Vec::new(),
            environment: Vec::new(),
            current_dir: None,
            credentials: Credentials::default(),
        };

        Self { command }
    }

    /// Set arguments
    #[must_use]
    pub fn set_arguments(mut self, args: &[OsString]) -> Self {
        self.command.arguments = args.to_vec();
        self
    }

    /// Add one argument
    #[must_use]
    pub fn add_argument<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.command.arguments.push(arg.into());
        self
    }

    /// Add one environment variable
    #[must_use]
    pub fn add_environment<K: Into<OsString>, V: Into<OsString>>(mut self, key: K, value: V) -> Self {
        self.command.environment.push((key.into(), value.into()));
        self
    }

    /// Set the working directory
    #[must_use]
    pub fn current_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.command.current_dir = Some(dir.into());
        self
    }

    /// Set the `Credentials` to run as
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.command.credentials = credentials;
        self
    }

    /// Build the actual `Command`
    #[must_use]
    pub fn build(self) -> Command {
        self.command
    }
}

// ----------------------------------------------------------------------
// - Tests:
// ----------------------------------------------------------------------
