// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! Exporting packaging files with `gbs`

use crate::{Config, Options, ServiceError};

use obs_gbs_command::{CommandBuilder, Credentials, Outcome};
use obs_gbs_repocache::CachedRepo;

use std::ffi::OsString;
use std::path::Path;

// ----------------------------------------------------------------------
// - Helper:
// ----------------------------------------------------------------------

fn setup_error(e: &dyn std::fmt::Display) -> ServiceError {
    ServiceError::GbsSetup {
        message: e.to_string(),
    }
}

// gbs runs unprivileged but has to write into the export directory.
fn hand_over(dir: &Path, credentials: &Credentials) -> Result<(), ServiceError> {
    if credentials.is_inherited() || !obs_gbs_core::is_root() {
        return Ok(());
    }
    nix::unistd::chown(dir, credentials.uid, credentials.gid).map_err(|e| setup_error(&e))
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<std::fs::DirEntry>> {
    let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(std::fs::DirEntry::file_name);
    Ok(entries)
}

/// Move the contents of the directory `gbs` exported into `tmpdir` to `outdir`
fn move_exported(tmpdir: &Path, outdir: &Path) -> Result<(), ServiceError> {
    let export_dir = sorted_entries(tmpdir)
        .map_err(|source| ServiceError::Move { source })?
        .into_iter()
        .map(|e| e.path())
        .find(|p| p.is_dir())
        .ok_or(ServiceError::NoExport)?;

    for entry in sorted_entries(&export_dir).map_err(|source| ServiceError::Move { source })? {
        let mut target = outdir.join(entry.file_name());
        // An existing directory receives the entry instead of being replaced.
        if target.is_dir() {
            target = target.join(entry.file_name());
        }
        tracing::debug!(
            "Moving \"{}\" to \"{}\".",
            entry.path().to_string_lossy(),
            target.to_string_lossy()
        );
        std::fs::rename(entry.path(), &target).map_err(|source| ServiceError::Move { source })?;
    }
    Ok(())
}

// ----------------------------------------------------------------------
// - Functions:
// ----------------------------------------------------------------------

/// The arguments passed to `gbs`
#[must_use]
pub fn construct_gbs_args(
    verbose: bool,
    revision: &str,
    outdir: &Path,
    gitdir: &Path,
) -> Vec<OsString> {
    let mut args = Vec::with_capacity(5);
    if verbose {
        args.push(OsString::from("--verbose"));
    }
    args.push(OsString::from("export"));

    let mut outdir_arg = OsString::from("--outdir=");
    outdir_arg.push(outdir.as_os_str());
    args.push(outdir_arg);
    args.push(OsString::from(format!("--commit={}", revision)));
    args.push(gitdir.as_os_str().to_os_string());

    args
}

/// Export packaging files of `commit` from `repo` into the output directory
///
/// `gbs` exports into a temporary directory inside the output directory,
/// which is removed again in all cases.
#[tracing::instrument(level = "debug", skip(repo, options, config))]
pub(crate) fn gbs_export(
    repo: &CachedRepo,
    commit: &str,
    options: &Options,
    config: &Config,
) -> Result<(), ServiceError> {
    let tmpdir = tempfile::Builder::new()
        .prefix(".gbs-export-")
        .rand_bytes(8)
        .tempdir_in(&options.outdir)
        .map_err(|source| ServiceError::Tmpdir { source })?;
    let tmpdir_path = tmpdir.path().to_owned();

    let result = export_into(&tmpdir_path, repo, commit, options, config);

    if let Err(e) = tmpdir.close() {
        tracing::warn!(
            "Failed to remove temporary directory \"{}\": {}",
            tmpdir_path.to_string_lossy(),
            e
        );
    }
    result
}

fn export_into(
    tmpdir: &Path,
    repo: &CachedRepo,
    commit: &str,
    options: &Options,
    config: &Config,
) -> Result<(), ServiceError> {
    let credentials =
        Credentials::resolve(config.gbs_user.as_deref(), config.gbs_group.as_deref())
            .map_err(|e| setup_error(&e))?;
    let gbs = obs_gbs_core::find_executable(&config.gbs_command).map_err(|e| setup_error(&e))?;
    hand_over(tmpdir, &credentials)?;

    tracing::info!("Exporting packaging files with GBS");
    let outcome = CommandBuilder::new(&gbs)
        .set_arguments(&construct_gbs_args(
            options.verbose,
            commit,
            tmpdir,
            repo.repodir(),
        ))
        .current_dir(repo.repodir())
        .credentials(credentials)
        .build()
        .status()
        .map_err(|e| setup_error(&e))?;

    match outcome {
        Outcome::Success => move_exported(tmpdir, &options.outdir),
        Outcome::Failed(_) => Err(ServiceError::GbsFailed { outcome }),
        Outcome::Signaled(_) => Err(ServiceError::GbsCrashed { outcome }),
    }
}

// ----------------------------------------------------------------------
// - Tests:
// ----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    #[test]
    fn gbs_arguments() {
        let args = construct_gbs_args(
            false,
            "0123abcd",
            Path::new("/out/tmp"),
            Path::new("/cache/repo"),
        );
        assert_eq!(
            args,
            vec![
                OsString::from("export"),
                OsString::from("--outdir=/out/tmp"),
                OsString::from("--commit=0123abcd"),
                OsString::from("/cache/repo"),
            ]
        );

        let verbose = construct_gbs_args(true, "HEAD", Path::new("o"), Path::new("r"));
        assert_eq!(verbose[0], OsString::from("--verbose"));
        assert_eq!(verbose[1], OsString::from("export"));
    }

    #[test]
    fn exported_files_are_moved() {
        let tmp = tempfile::Builder::new()
            .prefix("export-move-")
            .rand_bytes(8)
            .tempdir()
            .expect("Failed to create temporary directory.");
        let outdir = tmp.path().join("out");
        let export_dir: PathBuf = outdir.join(".tmp/test-package-0.1");
        std::fs::create_dir_all(export_dir.join("subdir")).unwrap();
        std::fs::write(export_dir.join("test-package.spec"), "spec").unwrap();
        std::fs::write(export_dir.join("fix.patch"), "patch").unwrap();

        move_exported(&outdir.join(".tmp"), &outdir).unwrap();

        assert_eq!(
            std::fs::read_to_string(outdir.join("test-package.spec")).unwrap(),
            "spec"
        );
        assert!(outdir.join("fix.patch").is_file());
        assert!(outdir.join("subdir").is_dir());
        assert_eq!(std::fs::read_dir(&export_dir).unwrap().count(), 0);
    }

    #[test]
    fn existing_directories_receive_exported_ones() {
        let tmp = tempfile::Builder::new()
            .prefix("export-existing-")
            .rand_bytes(8)
            .tempdir()
            .expect("Failed to create temporary directory.");
        let outdir = tmp.path().join("out");
        std::fs::create_dir_all(outdir.join("patches")).unwrap();
        std::fs::write(outdir.join("patches/old.patch"), "old").unwrap();
        std::fs::write(outdir.join("test-package.spec"), "old spec").unwrap();

        let export_dir = outdir.join(".tmp/test-package-0.1");
        std::fs::create_dir_all(export_dir.join("patches")).unwrap();
        std::fs::write(export_dir.join("patches/new.patch"), "new").unwrap();
        std::fs::write(export_dir.join("test-package.spec"), "spec").unwrap();

        move_exported(&outdir.join(".tmp"), &outdir).unwrap();

        assert_eq!(
            std::fs::read_to_string(outdir.join("test-package.spec")).unwrap(),
            "spec"
        );
        assert!(outdir.join("patches/old.patch").is_file());
        assert_eq!(
            std::fs::read_to_string(outdir.join("patches/patches/new.patch")).unwrap(),
            "new"
        );
    }

    #[test]
    fn missing_export_dir() {
        let tmp = tempfile::Builder::new()
            .prefix("export-none-")
            .rand_bytes(8)
            .tempdir()
            .expect("Failed to create temporary directory.");
        std::fs::write(tmp.path().join("stray-file"), "").unwrap();

        let err = move_exported(tmp.path(), tmp.path()).unwrap_err();
        assert!(matches!(err, ServiceError::NoExport));
        assert_eq!(err.exit_code(), 2);
    }
}
