// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! A local cache of remote git repositories.
//!
//! Every remote URL gets one clone in the cache directory. A `CachedRepo`
//! holds an exclusive lock on its clone for as long as it is alive, so
//! concurrent service runs for the same URL serialize on that lock.

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

// ----------------------------------------------------------------------
// - Error Handling:
// ----------------------------------------------------------------------

/// `Error` type for the `obs_gbs_repocache` library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A git command failed
    #[error("git {command} failed: {message}")]
    Git {
        /// The git sub-command that failed
        command: String,
        /// What git had to say about that
        message: String,
    },

    /// A revision could not be found in the repository
    #[error("Invalid revision \"{0}\".")]
    InvalidRevision(String),

    /// Locking the cache entry failed
    #[error("Failed to lock \"{}\": {source}", .path.to_string_lossy())]
    Lock {
        /// The lock file
        path: PathBuf,
        /// The error reported by `flock`
        source: nix::Error,
    },

    /// IO Error
    #[error("IO Error: {source}")]
    Io {
        /// The `std::io::Error` triggering this
        #[from]
        source: std::io::Error,
    },

    /// Failed to run an external command
    #[error(transparent)]
    Command {
        /// The error reported while running the command
        #[from]
        source: obs_gbs_core::Error,
    },
}

/// `Result` type for the `obs_gbs_repocache` library
pub type Result<T> = std::result::Result<T, Error>;

// ----------------------------------------------------------------------
// - Modules:
// ----------------------------------------------------------------------

mod cached_repo;
mod git;
mod meta;

#[cfg(test)]
mod test_support;

// ----------------------------------------------------------------------
// - Exports:
// ----------------------------------------------------------------------

pub use cached_repo::CachedRepo;
pub use meta::{CommitMeta, Person, TagMeta, TreeishMeta};
