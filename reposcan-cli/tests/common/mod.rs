#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether a usable `git` binary is on `PATH`
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// The `scan` binary isolated from the user's config and environment
pub fn scan_cmd(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("scan").expect("scan binary should build");
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("REPOSCAN_CONFIG")
        .env_remove("REPOSCAN_REMOTE_TEMPLATE")
        .env_remove("REPOSCAN_DEFAULT_BRANCH")
        .env_remove("REPOSCAN_GIT")
        .env_remove("RUST_LOG");
    cmd
}

/// Run git in `dir` with a fixed identity, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args([
            "-c",
            "user.name=Reposcan Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "init.defaultBranch=main",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to spawn git");

    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn init_repo(parent: &Path, name: &str) -> PathBuf {
    let dir = parent.join(name);
    fs::create_dir_all(&dir).unwrap();
    git(&dir, &["init", "--quiet"]);
    dir
}

pub fn commit_file(dir: &Path, file: &str, contents: &str) {
    fs::write(dir.join(file), contents).unwrap();
    git(dir, &["add", file]);
    git(dir, &["commit", "--quiet", "-m", &format!("update {}", file)]);
}

pub fn bare_remote(parent: &Path, name: &str) -> PathBuf {
    let dir = parent.join(format!("{}.git", name));
    fs::create_dir_all(&dir).unwrap();
    git(&dir, &["init", "--quiet", "--bare"]);
    dir
}
