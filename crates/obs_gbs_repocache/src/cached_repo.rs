// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! A cached clone of a remote repository

use crate::git::Git;
use crate::meta::{self, TreeishMeta};
use crate::{Error, Result};

use std::ffi::OsStr;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::fcntl::{flock, FlockArg};

// ----------------------------------------------------------------------
// - Helper:
// ----------------------------------------------------------------------

fn repo_name(url: &str) -> String {
    let name = url
        .trim_end_matches('/')
        .rsplit(|c: char| c == '/' || c == ':')
        .next()
        .unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        String::from("repo")
    } else {
        name.to_string()
    }
}

// Local paths are made absolute: git runs in different directories.
fn effective_url(url: &str) -> String {
    if url.contains("://") {
        return url.to_string();
    }
    Path::new(url)
        .canonicalize()
        .map_or_else(|_| url.to_string(), |p| p.to_string_lossy().into_owned())
}

fn lock_file(path: &Path) -> Result<std::fs::File> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    let lock_error = |source| Error::Lock {
        path: path.to_owned(),
        source,
    };

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(()) => {}
        Err(Errno::EAGAIN) => {
            tracing::info!(
                "Repository cache is busy, waiting for lock \"{}\".",
                path.to_string_lossy()
            );
            flock(file.as_raw_fd(), FlockArg::LockExclusive).map_err(lock_error)?;
        }
        Err(e) => return Err(lock_error(e)),
    }

    tracing::trace!("Locked \"{}\".", path.to_string_lossy());
    Ok(file)
}

// ----------------------------------------------------------------------
// - CachedRepo:
// ----------------------------------------------------------------------

/// A clone of a remote repository in the cache directory
///
/// The cache entry stays locked until the `CachedRepo` is dropped.
#[derive(Debug)]
pub struct CachedRepo {
    url: String,
    basedir: PathBuf,
    repodir: PathBuf,
    git: Git,
    _lock: std::fs::File,
}

impl CachedRepo {
    /// Open the cache entry for `url` in `cache_dir`, cloning or fetching as needed
    ///
    /// # Errors
    /// `Error::Git` if the remote can not be cloned or fetched, `Error::Lock` or
    /// `Error::Io` if the cache directory is not usable.
    #[tracing::instrument(level = "debug")]
    pub fn open(cache_dir: &Path, url: &str) -> Result<Self> {
        let url = effective_url(url);
        let key = obs_gbs_core::url_cache_key(&url);

        std::fs::create_dir_all(cache_dir)?;
        // gbs runs inside the clone and gets handed its path.
        let cache_dir = cache_dir.canonicalize()?;
        let lock = lock_file(&cache_dir.join(format!("{}.lock", key)))?;

        let basedir = cache_dir.join(&key);
        let repodir = basedir.join(repo_name(&url));

        let repo = Self {
            url,
            basedir,
            repodir,
            git: Git::new()?,
            _lock: lock,
        };

        if repo.is_valid() {
            repo.fetch()?;
        } else {
            repo.clone_fresh()?;
        }

        Ok(repo)
    }

    /// The URL of the remote repository
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The directory containing the clone (and its working copy)
    #[must_use]
    pub fn repodir(&self) -> &Path {
        &self.repodir
    }

    fn is_valid(&self) -> bool {
        if !self.repodir.join(".git").is_dir() {
            return false;
        }
        matches!(
            self.git.query(Some(&self.repodir), &["rev-parse", "--git-dir"]),
            Ok(Some(dir)) if dir.trim() == ".git"
        )
    }

    fn clone_fresh(&self) -> Result<()> {
        tracing::info!("Cloning \"{}\".", self.url);

        if self.basedir.exists() {
            tracing::warn!(
                "Removing stale cache entry \"{}\".",
                self.basedir.to_string_lossy()
            );
            std::fs::remove_dir_all(&self.basedir)?;
        }
        std::fs::create_dir_all(&self.basedir)?;

        self.git.run(
            None,
            &[
                OsStr::new("clone"),
                OsStr::new("--quiet"),
                OsStr::new("--no-checkout"),
                OsStr::new("--"),
                OsStr::new(&self.url),
                self.repodir.as_os_str(),
            ],
        )?;
        Ok(())
    }

    fn fetch(&self) -> Result<()> {
        tracing::info!("Fetching \"{}\".", self.url);
        let dir = Some(self.repodir.as_path());

        self.git
            .run(dir, &["remote", "set-url", "origin", self.url.as_str()])?;
        self.git.run(
            dir,
            &[
                "fetch",
                "--quiet",
                "--force",
                "--prune",
                "--tags",
                "origin",
                "+refs/heads/*:refs/remotes/origin/*",
            ],
        )?;
        if self
            .git
            .query(dir, &["remote", "set-head", "origin", "--auto"])?
            .is_none()
        {
            tracing::warn!("Failed to update the default branch of \"{}\".", self.url);
        }
        Ok(())
    }

    /// Resolve `revision` to a commit SHA-1
    ///
    /// Remote branches take precedence over local refs of the same name.
    ///
    /// # Errors
    /// `Error::InvalidRevision` if the `revision` does not name a commit
    pub fn resolve_revision(&self, revision: &str) -> Result<String> {
        if revision.is_empty() || revision.starts_with('-') {
            return Err(Error::InvalidRevision(revision.to_string()));
        }

        for candidate in [
            format!("refs/remotes/origin/{}^{{commit}}", revision),
            format!("{}^{{commit}}", revision),
        ] {
            if let Some(sha) = self.git.query(
                Some(&self.repodir),
                &["rev-parse", "--verify", "--quiet", candidate.as_str()],
            )? {
                return Ok(sha.trim().to_string());
            }
        }

        Err(Error::InvalidRevision(revision.to_string()))
    }

    /// Check out `revision` into the working copy of the clone
    ///
    /// Returns the SHA-1 of the commit that got checked out.
    ///
    /// # Errors
    /// `Error::InvalidRevision` for unknown revisions, `Error::Git` if the
    /// checkout fails.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn update_working_copy(&self, revision: &str, submodules: bool) -> Result<String> {
        let commit = self.resolve_revision(revision)?;
        let dir = Some(self.repodir.as_path());

        tracing::info!("Checking out \"{}\" ({}).", revision, commit);
        self.git.run(
            dir,
            &["checkout", "--quiet", "--force", "--detach", commit.as_str()],
        )?;
        self.git.run(dir, &["clean", "--quiet", "-f", "-f", "-d", "-x"])?;
        if submodules {
            self.git
                .run(dir, &["submodule", "--quiet", "update", "--init", "--recursive"])?;
        }

        Ok(commit)
    }

    /// Collect meta information on `treeish`
    ///
    /// # Errors
    /// `Error::InvalidRevision` for unknown tree-ishs, `Error::Git` if git
    /// output can not be understood.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn treeish_meta(&self, treeish: &str) -> Result<TreeishMeta> {
        let commit_id = self.resolve_revision(treeish)?;
        let dir = Some(self.repodir.as_path());

        let log_format = format!("--format={}", meta::COMMIT_FORMAT);
        let raw_commit = self.git.run(
            dir,
            &["log", "-1", "--date=raw", log_format.as_str(), commit_id.as_str()],
        )?;
        let commit = meta::parse_commit(&raw_commit).ok_or_else(|| Error::Git {
            command: "log".to_string(),
            message: format!("Unexpected output for commit {}.", commit_id),
        })?;

        let tag_format = format!("--format={}", meta::TAG_FORMAT);
        let tag_ref = format!("refs/tags/{}", treeish);
        let tag = self
            .git
            .query(dir, &["for-each-ref", tag_format.as_str(), tag_ref.as_str()])?
            .and_then(|raw| meta::parse_tag(&raw));

        Ok(TreeishMeta {
            treeish: treeish.to_string(),
            commit,
            tag,
        })
    }
}

// ----------------------------------------------------------------------
// - Tests:
// ----------------------------------------------------------------------
