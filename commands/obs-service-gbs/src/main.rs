// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! The `obs-service-gbs` binary.

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
#![allow(clippy::module_name_repetitions, clippy::let_unit_value)]

use clap::Parser;
use eyre::{Result, WrapErr};

// ----------------------------------------------------------------------
// - Entry Point:
// ----------------------------------------------------------------------

/// Entry point of the `obs-service-gbs` binary.
fn main() -> Result<()> {
    let args = obs_service_gbs::cli::Args::parse();

    args.logging
        .setup_logging(args.is_verbose())
        .wrap_err("Failed to set up logging.")?;

    tracing::debug!("Command line arguments: {:#?}", args);

    let cwd = std::env::current_dir().wrap_err("Failed to get current work directory.")?;
    let options = args.to_options(&cwd);

    let exit_code = obs_service_gbs::run(&options, &|key: &str| std::env::var(key).ok());
    std::process::exit(exit_code)
}
