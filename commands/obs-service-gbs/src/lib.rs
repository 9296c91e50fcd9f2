// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! `obs-service-gbs` functionality
//!
//! The GBS source service for OBS: update a cached clone of a git
//! repository, export its packaging files with `gbs export` and stage them
//! in the output directory OBS asked for.

// Setup warnings/errors:
#![forbid(unsafe_code)]
#![deny(
    bare_trait_objects,
    unused_doc_comments,
    unused_import_braces,
    missing_docs
)]
// Clippy:
#![warn(clippy::all, clippy::nursery, clippy::pedantic)]
#![allow(
    clippy::non_ascii_literal,
    clippy::module_name_repetitions,
    clippy::let_unit_value
)]

use std::path::PathBuf;

use obs_gbs_command::Outcome;

// ----------------------------------------------------------------------
// - Error Handling:
// ----------------------------------------------------------------------

/// Errors ending a service run, each maps to a process exit code
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    /// The configuration could not be read
    #[error("Configuration error: {0}")]
    Config(String),

    /// The repository cache failed
    #[error("RepoCache: {source}")]
    RepoCache {
        /// The error reported by the repository cache
        #[from]
        source: obs_gbs_repocache::Error,
    },

    /// Creating the output directory failed
    #[error("Failed to create outdir: {source}")]
    Outdir {
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Creating the temporary export directory failed
    #[error("Failed to create tmpdir: {source}")]
    Tmpdir {
        /// The underlying IO error
        source: std::io::Error,
    },

    /// `gbs` could not get started
    #[error("Failed to run GBS: {message}")]
    GbsSetup {
        /// What went wrong
        message: String,
    },

    /// `gbs` ran but reported a failure
    #[error("GBS failed, unable to export packaging files ({outcome})")]
    GbsFailed {
        /// How `gbs` ended
        outcome: Outcome,
    },

    /// `gbs` crashed
    #[error("GBS crashed while exporting packaging files ({outcome})")]
    GbsCrashed {
        /// How `gbs` ended
        outcome: Outcome,
    },

    /// `gbs` succeeded without producing an export directory
    #[error("GBS did not export any packaging files")]
    NoExport,

    /// Moving the exported files into place failed
    #[error("Failed to move exported files: {source}")]
    Move {
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Writing the git meta information failed
    #[error("Failed to write git meta information: {message}")]
    GitMeta {
        /// What went wrong
        message: String,
    },
}

impl ServiceError {
    /// The process exit code reported to OBS
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::GbsFailed { .. } | Self::NoExport => 2,
            Self::GbsCrashed { .. } => 3,
            _ => 1,
        }
    }
}

// ----------------------------------------------------------------------
// - Options:
// ----------------------------------------------------------------------

/// Everything a service run needs to know from the command line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// The remote repository URL
    pub url: String,
    /// The (absolute) output directory
    pub outdir: PathBuf,
    /// The revision to export
    pub revision: String,
    /// Verbose output, also passed on to `gbs`
    pub verbose: bool,
    /// Config files to read
    pub config_files: Vec<PathBuf>,
    /// Write git meta information into this file in the output directory
    pub git_meta: Option<PathBuf>,
    /// Exit codes that get turned into an error package
    pub error_pkg: Vec<i32>,
}

// ----------------------------------------------------------------------
// - Entry Point:
// ----------------------------------------------------------------------

fn execute(options: &Options, env: &dyn Fn(&str) -> Option<String>) -> Result<(), ServiceError> {
    let config = Config::load(&options.config_files, env)?;

    let repo = obs_gbs_repocache::CachedRepo::open(&config.repo_cache_dir, &options.url)?;
    let commit = repo.update_working_copy(&options.revision, false)?;

    std::fs::create_dir_all(&options.outdir).map_err(|source| ServiceError::Outdir { source })?;

    export::gbs_export(&repo, &commit, options, &config)?;

    if let Some(meta_file) = &options.git_meta {
        git_meta::write_treeish_meta(&repo, &options.revision, &options.outdir, meta_file)?;
    }

    Ok(())
}

/// Run the service, returning the process exit code
///
/// `env` looks up environment variables.
#[tracing::instrument(level = "debug", skip(env))]
pub fn run(options: &Options, env: &dyn Fn(&str) -> Option<String>) -> i32 {
    tracing::info!("Starting GBS source service");

    match execute(options, env) {
        Ok(()) => {
            tracing::info!("Packaging files successfully exported");
            0
        }
        Err(e) => {
            tracing::error!("{}", e);
            let exit_code = e.exit_code();
            if !options.error_pkg.contains(&exit_code) {
                return exit_code;
            }

            match error_pkg::write_error_pkg(&options.outdir, &e.to_string()) {
                Ok(()) => {
                    tracing::info!("Created error package for exit code {}.", exit_code);
                    0
                }
                Err(pkg_error) => {
                    tracing::error!("Failed to create error package: {}", pkg_error);
                    1
                }
            }
        }
    }
}

// ----------------------------------------------------------------------
// - Sub-Modules:
// ----------------------------------------------------------------------

pub mod cli;
mod config;
mod error_pkg;
mod export;
mod git_meta;

#[cfg(test)]
mod test_support;

// ----------------------------------------------------------------------
// - Exports:
// ----------------------------------------------------------------------

pub use config::Config;
pub use export::construct_gbs_args;

// ----------------------------------------------------------------------
// - Tests:
// ----------------------------------------------------------------------
