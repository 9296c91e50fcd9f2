// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! Thin wrapper around the `git` executable

use crate::{Error, Result};

use obs_gbs_command::{Captured, CommandBuilder};

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

// ----------------------------------------------------------------------
// - Git:
// ----------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct Git {
    binary: PathBuf,
}

impl Git {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            binary: obs_gbs_core::find_executable("git")?,
        })
    }

    fn capture<S: AsRef<OsStr>>(&self, work_dir: Option<&Path>, args: &[S]) -> Result<Captured> {
        let mut builder = CommandBuilder::new(&self.binary)
            .add_environment("GIT_TERMINAL_PROMPT", "0")
            .add_environment("LC_ALL", "C");
        if let Some(dir) = work_dir {
            builder = builder.current_dir(dir);
        }
        for a in args {
            builder = builder.add_argument(a.as_ref());
        }

        Ok(builder.build().output()?)
    }

    /// Run git and return its stdout, a non-zero exit is an `Error::Git`
    pub(crate) fn run<S: AsRef<OsStr>>(&self, work_dir: Option<&Path>, args: &[S]) -> Result<String> {
        let captured = self.capture(work_dir, args)?;
        if captured.outcome.success() {
            Ok(captured.stdout)
        } else {
            Err(Error::Git {
                command: args
                    .first()
                    .map_or_else(String::new, |a| a.as_ref().to_string_lossy().into_owned()),
                message: captured.stderr.trim().to_string(),
            })
        }
    }

    /// Run git and return its stdout, `None` if git exited non-zero
    pub(crate) fn query<S: AsRef<OsStr>>(
        &self,
        work_dir: Option<&Path>,
        args: &[S],
    ) -> Result<Option<String>> {
        let captured = self.capture(work_dir, args)?;
        if captured.outcome.success() {
            Ok(Some(captured.stdout))
        } else {
            tracing::trace!("git query failed: {}", captured.stderr.trim());
            Ok(None)
        }
    }
}
