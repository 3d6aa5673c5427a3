//! Repository inspection
//!
//! Gathers the git facts a status classification needs from one
//! directory. Inspection is read-only and never touches the network:
//! ahead/behind counts come from locally cached remote-tracking refs.

use std::path::Path;

use serde::Serialize;

use crate::git::{Git, DEFAULT_GIT};
use crate::Result;

/// Branch assumed for an unborn HEAD when nothing better is known
pub const FALLBACK_BRANCH: &str = "main";

/// Where HEAD points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "name", rename_all = "lowercase")]
pub enum HeadState {
    /// On a named branch with at least one commit
    Branch(String),
    /// A commit checked out without a branch
    Detached,
    /// On a branch that has no commits yet
    Unborn(String),
}

impl HeadState {
    /// Whether HEAD is detached
    pub fn is_detached(&self) -> bool {
        matches!(self, HeadState::Detached)
    }

    /// Text shown in the report's branch column
    pub fn label(&self) -> &str {
        match self {
            HeadState::Branch(name) => name,
            HeadState::Detached => "(detached)",
            HeadState::Unborn(_) => "(unborn)",
        }
    }
}

/// Git facts about one scanned directory
///
/// Recomputed on every scan; nothing is cached between directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoFacts {
    /// Directory basename
    pub name: String,
    /// Whether the directory is the top of its own git working tree
    pub is_repo: bool,
    /// Whether a remote named "origin" exists
    pub has_origin: bool,
    /// HEAD state; `None` when not a repository
    pub head: Option<HeadState>,
    /// Whether the current branch tracks a remote branch
    pub has_upstream: bool,
    /// Commits on HEAD not on upstream (0 without upstream)
    pub ahead: u32,
    /// Commits on upstream not on HEAD (0 without upstream)
    pub behind: u32,
    /// Uncommitted changes, staged changes or untracked files present
    pub dirty: bool,
    /// Local branches with no configured upstream, in ref order
    pub orphan_branches: Vec<String>,
}

impl RepoFacts {
    /// Facts for a directory that is not a git repository
    pub fn uninitialized(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether HEAD is detached
    pub fn is_detached(&self) -> bool {
        self.head.as_ref().is_some_and(HeadState::is_detached)
    }
}

/// Collects [`RepoFacts`] for directories
#[derive(Debug, Clone)]
pub struct Inspector {
    git_program: String,
    default_branch: Option<String>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    /// Inspector using `git` from `PATH`
    pub fn new() -> Self {
        Self {
            git_program: DEFAULT_GIT.to_string(),
            default_branch: None,
        }
    }

    /// Use a specific git executable
    pub fn with_git_program(mut self, program: impl Into<String>) -> Self {
        self.git_program = program.into();
        self
    }

    /// Branch name to assume for repositories without commits
    pub fn with_default_branch(mut self, branch: Option<String>) -> Self {
        self.default_branch = branch;
        self
    }

    /// A git runner bound to `dir`
    pub fn git(&self, dir: &Path) -> Git {
        Git::with_program(&self.git_program, dir)
    }

    /// Inspect `dir`
    ///
    /// Non-repositories short-circuit after the first query. Errors are
    /// only returned when git itself cannot be run or a required query
    /// fails; the ahead/behind count degrades to `0 0` instead.
    pub fn inspect(&self, dir: &Path) -> Result<RepoFacts> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let git = self.git(dir);

        if !is_work_tree(&git)? {
            tracing::debug!(repo = %name, "Not a git repository");
            return Ok(RepoFacts::uninitialized(name));
        }

        let head = head_state(&git, self.default_branch.as_deref())?;
        let has_origin = has_origin(&git)?;
        let has_upstream = has_upstream(&git);
        let (ahead, behind) = if has_upstream {
            ahead_behind(&git)
        } else {
            (0, 0)
        };
        let dirty = is_dirty(&git);
        let orphan_branches = orphan_branches(&git)?;

        let facts = RepoFacts {
            name,
            is_repo: true,
            has_origin,
            head: Some(head),
            has_upstream,
            ahead,
            behind,
            dirty,
            orphan_branches,
        };

        tracing::debug!(
            repo = %facts.name,
            head = ?facts.head,
            origin = facts.has_origin,
            upstream = facts.has_upstream,
            ahead = facts.ahead,
            behind = facts.behind,
            dirty = facts.dirty,
            "Inspected repository"
        );

        Ok(facts)
    }
}

/// Whether the runner's directory is the top of its own working tree
///
/// A plain directory nested inside another repository's working tree is
/// not a repository of its own.
pub(crate) fn is_work_tree(git: &Git) -> Result<bool> {
    let inside = git.run(&["rev-parse", "--is-inside-work-tree"])?;
    if !inside.success || inside.stdout.trim() != "true" {
        return Ok(false);
    }

    let prefix = git.run(&["rev-parse", "--show-prefix"])?;
    Ok(prefix.success && prefix.stdout.trim().is_empty())
}

/// Whether a remote named "origin" is configured
pub(crate) fn has_origin(git: &Git) -> Result<bool> {
    let remotes = git.run_checked(&["remote"])?;
    Ok(remotes.lines().any(|r| r.trim() == "origin"))
}

/// Resolve HEAD
///
/// An unborn branch is named by `default_branch` when given, otherwise by
/// HEAD's symbolic ref, otherwise [`FALLBACK_BRANCH`].
pub(crate) fn head_state(git: &Git, default_branch: Option<&str>) -> Result<HeadState> {
    let symbolic = git.run(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;
    if !symbolic.success {
        return Ok(HeadState::Detached);
    }

    let name = symbolic.stdout.trim();
    if git.succeeds(&["rev-parse", "--verify", "--quiet", "HEAD"]) {
        return Ok(HeadState::Branch(name.to_string()));
    }

    let assumed = default_branch
        .filter(|b| !b.is_empty())
        .or(Some(name).filter(|n| !n.is_empty()))
        .unwrap_or(FALLBACK_BRANCH);
    Ok(HeadState::Unborn(assumed.to_string()))
}

/// Whether the current branch has an upstream configured
pub(crate) fn has_upstream(git: &Git) -> bool {
    git.succeeds(&[
        "rev-parse",
        "--abbrev-ref",
        "--symbolic-full-name",
        "@{upstream}",
    ])
}

/// Symmetric-difference commit counts between HEAD and its upstream
///
/// Any failure yields `(0, 0)`.
pub(crate) fn ahead_behind(git: &Git) -> (u32, u32) {
    let counts = git
        .run_checked(&["rev-list", "--left-right", "--count", "HEAD...@{upstream}"])
        .and_then(|out| {
            parse_counts(&out).ok_or_else(|| {
                crate::Error::Other(format!("Unexpected rev-list output: {:?}", out))
            })
        });

    match counts {
        Ok(counts) => counts,
        Err(e) => {
            tracing::warn!(
                workdir = %git.workdir().display(),
                "Failed to count ahead/behind, assuming 0 0: {}",
                e
            );
            (0, 0)
        }
    }
}

fn parse_counts(output: &str) -> Option<(u32, u32)> {
    let mut parts = output.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((ahead, behind))
}

/// Whether `git status --porcelain` lists anything
///
/// If git status fails, assume dirty.
pub(crate) fn is_dirty(git: &Git) -> bool {
    match git.run(&["status", "--porcelain"]) {
        Ok(output) if output.success => !output.stdout.trim().is_empty(),
        Ok(output) => {
            tracing::warn!(
                workdir = %git.workdir().display(),
                "git status failed, treating as dirty: {}",
                output.stderr.trim()
            );
            true
        }
        Err(e) => {
            tracing::warn!(
                workdir = %git.workdir().display(),
                "git status failed, treating as dirty: {}",
                e
            );
            true
        }
    }
}

/// Local branches whose upstream shortname is empty
pub(crate) fn orphan_branches(git: &Git) -> Result<Vec<String>> {
    let listing = git.run_checked(&[
        "for-each-ref",
        "--format=%(refname:short)%09%(upstream:short)",
        "refs/heads",
    ])?;
    Ok(parse_orphans(&listing))
}

fn parse_orphans(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| {
            let (branch, upstream) = line.split_once('\t').unwrap_or((line, ""));
            let branch = branch.trim();
            (!branch.is_empty() && upstream.trim().is_empty()).then(|| branch.to_string())
        })
        .collect()
}
