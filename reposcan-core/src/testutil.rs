//! Git fixtures shared by the unit tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Whether a usable `git` binary is on `PATH`
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir` with a fixed identity, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
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
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Create `parent/name` as a fresh repository on branch `main`
pub fn init_repo(parent: &Path, name: &str) -> PathBuf {
    let dir = parent.join(name);
    fs::create_dir_all(&dir).unwrap();
    git(&dir, &["init", "--quiet"]);
    dir
}

/// Write `file` and commit it
pub fn commit_file(dir: &Path, file: &str, contents: &str) {
    fs::write(dir.join(file), contents).unwrap();
    git(dir, &["add", file]);
    git(dir, &["commit", "--quiet", "-m", &format!("update {}", file)]);
}

/// Create a bare repository usable as a push target
pub fn bare_remote(parent: &Path, name: &str) -> PathBuf {
    let dir = parent.join(format!("{}.git", name));
    fs::create_dir_all(&dir).unwrap();
    git(&dir, &["init", "--quiet", "--bare"]);
    dir
}

/// A repository with one commit pushed to a bare origin and tracking it
pub fn tracked_repo(parent: &Path, remotes: &Path, name: &str) -> PathBuf {
    let remote = bare_remote(remotes, name);
    let dir = init_repo(parent, name);
    commit_file(&dir, "README.md", "hello\n");
    git(&dir, &["remote", "add", "origin", remote.to_str().unwrap()]);
    git(&dir, &["push", "--quiet", "--set-upstream", "origin", "main"]);
    dir
}
