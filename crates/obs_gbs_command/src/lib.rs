// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! Functionality related to running external tools like `git` and `gbs`

// Setup warnings/errors:
#![forbid(unsafe_code)]
#![deny(
    bare_trait_objects,
    unused_doc_comments,
    unused_import_braces,
    missing_docs
)]
// Clippy:
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::let_unit_value)]

// ----------------------------------------------------------------------
// - Error Handling:
// ----------------------------------------------------------------------

pub use obs_gbs_core::{Error, Result};

// ----------------------------------------------------------------------
// - Outcome:
// ----------------------------------------------------------------------

/// How a `Command` ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The command exited with status 0
    Success,
    /// The command exited with the given non-zero status
    Failed(i32),
    /// The command was terminated by the given signal
    Signaled(i32),
}

impl Outcome {
    /// `true` if the command exited with status 0
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<std::process::ExitStatus> for Outcome {
    fn from(status: std::process::ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;

        match status.code() {
            Some(0) => Self::Success,
            Some(code) => Self::Failed(code),
            None => status.signal().map_or(Self::Failed(-1), Self::Signaled),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed(code) => write!(f, "exit status {}", code),
            Self::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

/// The result of a `Command` run with captured output
#[derive(Clone, Debug)]
pub struct Captured {
    /// How the command ended
    pub outcome: Outcome,
    /// Everything the command wrote to stdout
    pub stdout: String,
    /// Everything the command wrote to stderr
    pub stderr: String,
}

// ----------------------------------------------------------------------
// - Modules:
// ----------------------------------------------------------------------

mod command;
pub use command::{Command, CommandBuilder};

mod credentials;
pub use credentials::Credentials;
