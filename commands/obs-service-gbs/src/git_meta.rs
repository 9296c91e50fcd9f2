// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! Git meta information of the exported revision

use crate::ServiceError;

use obs_gbs_repocache::CachedRepo;

use std::path::{Path, PathBuf};

fn meta_error(message: String) -> ServiceError {
    ServiceError::GitMeta { message }
}

/// Write meta information on `treeish` as JSON into `outdir/filename`
///
/// An existing file is never overwritten.
pub(crate) fn write_treeish_meta(
    repo: &CachedRepo,
    treeish: &str,
    outdir: &Path,
    filename: &Path,
) -> Result<PathBuf, ServiceError> {
    let path = outdir.join(filename);
    if path.exists() {
        return Err(meta_error(format!(
            "Refusing to overwrite existing file \"{}\".",
            path.to_string_lossy()
        )));
    }

    let meta = repo
        .treeish_meta(treeish)
        .map_err(|e| meta_error(format!("Unable to get commit meta info from git: {}", e)))?;
    let json = serde_json::to_string_pretty(&meta).map_err(|e| meta_error(e.to_string()))?;

    std::fs::write(&path, json + "\n").map_err(|e| {
        meta_error(format!(
            "Failed to write \"{}\": {}",
            path.to_string_lossy(),
            e
        ))
    })?;

    tracing::info!("Wrote git meta information to \"{}\".", path.to_string_lossy());
    Ok(path)
}
