// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! Service configuration
//!
//! Settings are read from INI files (section `[general]`) and can be
//! overridden by `OBS_GBS_*` environment variables.

use crate::ServiceError;

use std::path::PathBuf;

// ----------------------------------------------------------------------
// - Constants:
// ----------------------------------------------------------------------

const SYSTEM_CONFIG_FILE: &str = "/etc/obs/services/gbs";
const USER_CONFIG_FILE: &str = ".obs/gbs";
const ENV_PREFIX: &str = "OBS_GBS_";

const DEFAULT_REPO_CACHE_DIR: &str = "/var/cache/obs/gbs-repos";
const DEFAULT_GBS_COMMAND: &str = "gbs";

// ----------------------------------------------------------------------
// - Helper:
// ----------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
struct IniFile {
    #[serde(default)]
    general: GeneralSection,
}

#[derive(Debug, Default, serde::Deserialize)]
struct GeneralSection {
    #[serde(rename = "repo-cache-dir")]
    repo_cache_dir: Option<String>,
    #[serde(rename = "gbs-user")]
    gbs_user: Option<String>,
    #[serde(rename = "gbs-group")]
    gbs_group: Option<String>,
    #[serde(rename = "gbs-command")]
    gbs_command: Option<String>,
}

/// The environment variable overriding the config file `key`
fn env_name(key: &str) -> String {
    format!("{}{}", ENV_PREFIX, key.to_uppercase().replace('-', "_"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn read_files(files: &[PathBuf]) -> Result<GeneralSection, ServiceError> {
    let builder = files.iter().fold(config::Config::builder(), |builder, f| {
        tracing::debug!("Reading config file \"{}\".", f.to_string_lossy());
        builder.add_source(
            config::File::new(&f.to_string_lossy(), config::FileFormat::Ini).required(false),
        )
    });

    let ini = builder
        .build()
        .and_then(|c| c.try_deserialize::<IniFile>())
        .map_err(|e| ServiceError::Config(e.to_string()))?;
    Ok(ini.general)
}

// ----------------------------------------------------------------------
// - Config:
// ----------------------------------------------------------------------

/// The service configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the cached repositories
    pub repo_cache_dir: PathBuf,
    /// User to run `gbs` as
    pub gbs_user: Option<String>,
    /// Group to run `gbs` as
    pub gbs_group: Option<String>,
    /// The `gbs` executable
    pub gbs_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_cache_dir: PathBuf::from(DEFAULT_REPO_CACHE_DIR),
            gbs_user: None,
            gbs_group: None,
            gbs_command: DEFAULT_GBS_COMMAND.to_string(),
        }
    }
}

impl Config {
    /// The config files read when none are given explicitly
    #[must_use]
    pub fn default_files() -> Vec<PathBuf> {
        let mut files = vec![PathBuf::from(SYSTEM_CONFIG_FILE)];
        if let Some(home) = dirs::home_dir() {
            files.push(home.join(USER_CONFIG_FILE));
        }
        files
    }

    /// Load the configuration from `files`, later files win
    ///
    /// `env` looks up environment variables, which override all files.
    ///
    /// # Errors
    /// `ServiceError::Config` if a config file can not be parsed
    pub fn load(
        files: &[PathBuf],
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ServiceError> {
        let general = read_files(files)?;
        let defaults = Self::default();
        let setting = |key: &str, from_file: Option<String>| {
            non_empty(env(&env_name(key))).or_else(|| non_empty(from_file))
        };

        let config = Self {
            repo_cache_dir: setting("repo-cache-dir", general.repo_cache_dir)
                .map_or(defaults.repo_cache_dir, PathBuf::from),
            gbs_user: setting("gbs-user", general.gbs_user),
            gbs_group: setting("gbs-group", general.gbs_group),
            gbs_command: setting("gbs-command", general.gbs_command)
                .unwrap_or(defaults.gbs_command),
        };

        tracing::debug!("Configuration: {:?}", config);
        Ok(config)
    }
}

// ----------------------------------------------------------------------
// - Tests:
// ----------------------------------------------------------------------
