// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! Basic functionality for the `obs-service-gbs` crates.

// cSpell:ignore faccess

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
#![allow(clippy::non_ascii_literal, clippy::module_name_repetitions)]

use std::path::{Path, PathBuf};

use faccess::PathExt;

// ----------------------------------------------------------------------
// - Error Handling:
// ----------------------------------------------------------------------

/// `Error` type for the `obs_gbs_core` library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration Error
    #[error("Configuration Error: {}", .0)]
    Config(String),

    /// Conversion error.
    #[error("Conversion error: Can not convert \"{expression}\" to {typename}: {message}.")]
    Conversion {
        /// The `expression` that could not get converted.
        expression: String,
        /// The `typename` that the `expression` failed to convert into.
        typename: String,
        /// A `message` describing why the conversion failed.
        message: String,
    },

    /// IO Error
    #[error("IO Error: {source}")]
    Io {
        /// The `std::io::Error` triggering this
        #[from]
        source: std::io::Error,
    },

    /// Runtime Error
    #[error("Runtime Error: {message}")]
    Runtime {
        /// Error message.
        message: String,
    },

    /// Not sure what actually went wrong...
    #[error("unknown error")]
    Unknown,
}

/// `Result` type for the `obs_gbs_core` library
pub type Result<T> = std::result::Result<T, Error>;

// ----------------------------------------------------------------------
// - Helper:
// ----------------------------------------------------------------------

fn to_hex(input: &[u8]) -> String {
    use std::fmt::Write;

    input.iter().fold(
        String::with_capacity(input.len() * 2),
        |mut result, c| {
            let _ = write!(result, "{:02x}", c);
            result
        },
    )
}

// ----------------------------------------------------------------------
// - Functions:
// ----------------------------------------------------------------------

/// Find the canonical path to an executable or report an error
///
/// # Errors
/// Errors out when the executable con not be found or is not executable.
pub fn validate_executable(path: &Path) -> Result<PathBuf> {
    let path = path.canonicalize().map_err(|_| Error::Runtime {
        message: format!(
            "Failed to canonicalize executable path \"{}\".",
            path.to_string_lossy()
        ),
    })?;

    if !path.is_file() {
        Err(Error::Runtime {
            message: format!("Executable \"{}\" is not a file.", path.to_string_lossy()),
        })
    } else if path.executable() {
        Ok(path)
    } else {
        Err(Error::Runtime {
            message: format!(
                "Executable \"{}\" is not marked executable.",
                path.to_string_lossy()
            ),
        })
    }
}

/// Find an executable by `name`
///
/// A `name` containing a `/` is used as a path, everything else is looked up
/// in the directories listed in `PATH`.
///
/// # Errors
/// Errors out when no executable of that `name` was found.
#[tracing::instrument(level = "trace")]
pub fn find_executable(name: &str) -> Result<PathBuf> {
    if name.contains('/') {
        return validate_executable(Path::new(name));
    }

    let search_path = std::env::var_os("PATH").unwrap_or_default();
    std::env::split_paths(&search_path)
        .map(|d| d.join(name))
        .find_map(|p| validate_executable(&p).ok())
        .ok_or_else(|| Error::Runtime {
            message: format!("Executable \"{}\" not found in PATH.", name),
        })
}

/// Return `true` if the program is run by the `root` user.
#[must_use]
pub fn is_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}

/// A stable key identifying a repository `url` in the cache
#[must_use]
pub fn url_cache_key(url: &str) -> String {
    use sha3::{Digest, Sha3_256};

    let mut hasher = Sha3_256::new();
    hasher.update(url.as_bytes());
    to_hex(&hasher.finalize())
}

// ----------------------------------------------------------------------
// - Sub-Modules:
// ----------------------------------------------------------------------

pub mod log;

// ----------------------------------------------------------------------
// - Tests:
// ----------------------------------------------------------------------
