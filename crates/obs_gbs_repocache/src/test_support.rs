// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! Helpers to set up git repositories for tests

use std::path::{Path, PathBuf};

pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args([
            "-c",
            "user.name=Test User",
            "-c",
            "user.email=test@example.org",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .env("GIT_CEILING_DIRECTORIES", dir.parent().unwrap_or(dir))
        .output()
        .expect("Failed to run git.");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

pub fn commit_file(repo: &Path, file: &str, data: &str, message: &str) {
    let path = repo.join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut contents = std::fs::read_to_string(&path).unwrap_or_default();
    contents.push_str(data);
    std::fs::write(&path, contents).unwrap();

    git(repo, &["add", file]);
    git(repo, &["commit", "-q", "-m", message]);
}

/// Create a repository with a source file, a packaging commit tagged `v0.1`
/// and one more commit on top of that
pub fn create_origin(parent: &Path) -> PathBuf {
    let origin = parent.join("orig");
    std::fs::create_dir(&origin).unwrap();

    git(&origin, &["init", "-q"]);
    git(&origin, &["symbolic-ref", "HEAD", "refs/heads/master"]);

    commit_file(&origin, "foo.txt", "initial data\n", "Initial version");
    commit_file(
        &origin,
        "packaging/test-package.spec",
        "Name: test-package\nVersion: 0.1\n",
        "Add packaging files",
    );
    git(&origin, &["tag", "-a", "v0.1", "-m", "Version 0.1"]);
    commit_file(&origin, "foo.txt", "new data\n", "Update foo.txt");

    origin
}

pub fn rev_parse(repo: &Path, revision: &str) -> String {
    git(repo, &["rev-parse", revision]).trim().to_string()
}
