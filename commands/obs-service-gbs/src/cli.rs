// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! Command line handling

use crate::{Config, Options};

use std::path::{Path, PathBuf};

use clap::{builder::PossibleValuesParser, Parser};

/// Command line arguments as passed by OBS
#[derive(Debug, Parser)]
#[clap(
    name = "obs-service-gbs",
    about = "OBS source service exporting packaging files with GBS."
)]
pub struct Args {
    /// remote repository URL
    #[clap(long, value_name = "URL")]
    pub url: String,

    /// output directory [default: current directory]
    #[clap(long, value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// the revision to export
    #[clap(long, default_value = "HEAD", value_name = "REV")]
    pub revision: String,

    /// verbose output
    #[clap(long, short = 'v', value_parser = PossibleValuesParser::new(["yes", "no"]))]
    pub verbose: Option<String>,

    /// configuration file to read, may be given several times
    #[clap(long, value_name = "FILE")]
    pub config: Vec<PathBuf>,

    /// write git meta information (JSON) into this file in the output directory
    #[clap(long, value_name = "FILE")]
    pub git_meta: Option<PathBuf>,

    /// comma separated exit codes to turn into an error package
    #[clap(long, value_delimiter = ',', value_name = "CODES")]
    pub error_pkg: Vec<i32>,

    /// logging options
    #[clap(flatten)]
    pub logging: obs_gbs_core::log::LogArgs,
}

impl Args {
    /// `true` if `--verbose=yes` was given
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose.as_deref() == Some("yes")
    }

    /// Turn the arguments into `Options`, resolving paths against `cwd`
    #[must_use]
    pub fn to_options(&self, cwd: &Path) -> Options {
        let outdir = self
            .outdir
            .as_ref()
            .map_or_else(|| cwd.to_owned(), |o| cwd.join(o));
        let config_files = if self.config.is_empty() {
            Config::default_files()
        } else {
            self.config.iter().map(|c| cwd.join(c)).collect()
        };

        Options {
            url: self.url.clone(),
            outdir,
            revision: self.revision.clone(),
            verbose: self.is_verbose(),
            config_files,
            git_meta: self.git_meta.clone(),
            error_pkg: self.error_pkg.clone(),
        }
    }
}

// ----------------------------------------------------------------------
// - Tests:
// ----------------------------------------------------------------------
