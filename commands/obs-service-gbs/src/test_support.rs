// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! A test environment with an origin repository and a fake `gbs`

use crate::Options;

use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

// Exports `packaging/test-package.spec` plus a tarball, like `gbs export` does.
const FAKE_GBS: &str = r#"#!/bin/sh
outdir=""
commit=""
gitdir=""
for arg in "$@"; do
    case "$arg" in
        --outdir=*) outdir="${arg#--outdir=}" ;;
        --commit=*) commit="${arg#--commit=}" ;;
        --verbose|export) ;;
        *) gitdir="$arg" ;;
    esac
done
if ! git -C "$gitdir" cat-file -e "$commit:packaging/test-package.spec" 2>/dev/null; then
    echo "error: no spec file found in $commit" >&2
    exit 1
fi
exportdir="$outdir/test-package-0.1"
mkdir -p "$exportdir" || exit 1
git -C "$gitdir" show "$commit:packaging/test-package.spec" > "$exportdir/test-package.spec" || exit 1
git -C "$gitdir" archive --format=tar --prefix=test-package-0.1/ \
    -o "$exportdir/test-package-0.1.tar.bz2" "$commit" || exit 1
"#;

pub const CRASHING_GBS: &str = "#!/bin/sh\nkill -9 $$\n";

fn git(dir: &Path, args: &[&str]) -> String {
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

fn commit_file(repo: &Path, file: &str, data: &str, message: &str) {
    let path = repo.join(file);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut contents = std::fs::read_to_string(&path).unwrap_or_default();
    contents.push_str(data);
    std::fs::write(&path, contents).unwrap();

    git(repo, &["add", file]);
    git(repo, &["commit", "-q", "-m", message]);
}

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Sorted names of all entries in `dir`, empty if `dir` does not exist
pub fn files(dir: &Path) -> Vec<String> {
    let mut result = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    result.sort();
    result
}

/// `path` relative to the current work directory
pub fn relative_to_cwd(path: &Path) -> PathBuf {
    let cwd = std::env::current_dir().unwrap();
    let mut result = PathBuf::new();
    for _ in cwd.components().skip(1) {
        result.push("..");
    }
    result.join(path.strip_prefix("/").unwrap())
}

pub struct Fixture {
    pub tmp: tempfile::TempDir,
    pub origin: PathBuf,
    pub cache: PathBuf,
    pub env: HashMap<String, String>,
}

impl Fixture {
    /// `None` if there is no `git` to test with
    pub fn new(prefix: &str) -> Option<Self> {
        if !git_available() {
            eprintln!("git is not available, skipping test.");
            return None;
        }

        let tmp = tempfile::Builder::new()
            .prefix(prefix)
            .rand_bytes(8)
            .tempdir()
            .expect("Failed to create temporary directory.");

        let origin = tmp.path().join("orig");
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

        let cache = tmp.path().join("cache");
        let mut fixture = Self {
            tmp,
            origin,
            cache,
            env: HashMap::new(),
        };
        let cache = fixture.cache.to_string_lossy().into_owned();
        fixture.set_env("OBS_GBS_REPO_CACHE_DIR", &cache);
        fixture.set_gbs("gbs", FAKE_GBS);

        Some(fixture)
    }

    pub fn set_env(&mut self, key: &str, value: &str) {
        self.env.insert(key.to_string(), value.to_string());
    }

    pub fn unset_env(&mut self, key: &str) {
        self.env.remove(key);
    }

    /// Install a `gbs` script with `contents` and use it
    pub fn set_gbs(&mut self, name: &str, contents: &str) {
        let path = self.tmp.path().join(name);
        std::fs::write(&path, contents).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        self.set_env("OBS_GBS_GBS_COMMAND", &path.to_string_lossy());
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    pub fn rev_parse(&self, revision: &str) -> String {
        git(&self.origin, &["rev-parse", revision]).trim().to_string()
    }

    pub fn options(&self, outdir: &str) -> Options {
        Options {
            url: self.origin.to_string_lossy().into_owned(),
            outdir: self.path(outdir),
            revision: String::from("HEAD"),
            verbose: false,
            config_files: vec![self.path("gbs.noconfig")],
            git_meta: None,
            error_pkg: Vec::new(),
        }
    }

    pub fn run(&self, options: &Options) -> i32 {
        let env = |key: &str| self.env.get(key).cloned();
        crate::run(options, &env)
    }
}
