//! Remediation of repository hygiene problems
//!
//! Runs at most two actions per repository, in order:
//!
//! 1. ensure an `origin` remote exists, built only from a remote template
//! 2. ensure the current branch is published: push with `--set-upstream`
//!    when untracked, or a plain push when ahead of its upstream
//!
//! A dirty working tree blocks both. Nothing here ever commits, pulls,
//! merges, rebases, fetches or retries.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::config::RemoteTemplate;
use crate::git::Git;
use crate::inspect::{self, HeadState, Inspector, RepoFacts};

/// Fix-mode settings
#[derive(Debug, Clone, Default)]
pub struct FixPolicy {
    /// Template for a missing origin URL; origin is never added without one
    pub remote_template: Option<RemoteTemplate>,
}

/// A remediation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixAction {
    /// Add an `origin` remote
    EnsureOrigin,
    /// Set upstream and/or push the current branch
    EnsureUpstream,
}

impl fmt::Display for FixAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixAction::EnsureOrigin => f.write_str("ensure-origin"),
            FixAction::EnsureUpstream => f.write_str("ensure-upstream"),
        }
    }
}

/// Result of one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "lowercase")]
pub enum FixResult {
    /// A git command changed the repository
    Applied(String),
    /// Nothing needed doing
    Unchanged(String),
    /// Deliberately not attempted
    Skipped(String),
    /// Attempted and failed; not retried
    Failed(String),
}

impl FixResult {
    /// Whether a mutating git command was run
    pub fn attempted(&self) -> bool {
        matches!(self, FixResult::Applied(_) | FixResult::Failed(_))
    }

    /// Short label for log lines
    pub fn label(&self) -> &'static str {
        match self {
            FixResult::Applied(_) => "applied",
            FixResult::Unchanged(_) => "unchanged",
            FixResult::Skipped(_) => "skipped",
            FixResult::Failed(_) => "failed",
        }
    }

    /// The human-readable detail
    pub fn detail(&self) -> &str {
        match self {
            FixResult::Applied(d)
            | FixResult::Unchanged(d)
            | FixResult::Skipped(d)
            | FixResult::Failed(d) => d,
        }
    }
}

/// One action and how it went
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixStep {
    pub action: FixAction,
    #[serde(flatten)]
    pub result: FixResult,
}

/// Everything fix mode did for one repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FixOutcome {
    pub steps: Vec<FixStep>,
}

impl FixOutcome {
    /// Number of steps that ran a mutating git command
    pub fn attempted(&self) -> usize {
        self.steps.iter().filter(|s| s.result.attempted()).count()
    }

    /// Number of steps that changed the repository
    pub fn applied(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.result, FixResult::Applied(_)))
            .count()
    }

    /// Number of failed steps
    pub fn failed(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.result, FixResult::Failed(_)))
            .count()
    }

    fn push(&mut self, action: FixAction, result: FixResult) {
        self.steps.push(FixStep { action, result });
    }
}

/// Applies [`FixPolicy`] to inspected repositories
#[derive(Debug, Clone)]
pub struct Remediator {
    inspector: Inspector,
    policy: FixPolicy,
}

impl Remediator {
    /// Create a remediator sharing the inspector's git settings
    pub fn new(inspector: Inspector, policy: FixPolicy) -> Self {
        Self { inspector, policy }
    }

    /// Remediate the repository at `dir` described by `facts`
    ///
    /// Non-repositories produce an empty outcome.
    pub fn remediate(&self, dir: &Path, facts: &RepoFacts) -> FixOutcome {
        let mut outcome = FixOutcome::default();
        if !facts.is_repo {
            return outcome;
        }

        if facts.dirty {
            let reason = "working tree has uncommitted changes".to_string();
            outcome.push(FixAction::EnsureOrigin, FixResult::Skipped(reason.clone()));
            outcome.push(FixAction::EnsureUpstream, FixResult::Skipped(reason));
            tracing::info!(repo = %facts.name, "Skipping fixes for dirty repository");
            return outcome;
        }

        let git = self.inspector.git(dir);

        let origin = self.ensure_origin(&git, facts);
        log_step(&facts.name, FixAction::EnsureOrigin, &origin);
        outcome.push(FixAction::EnsureOrigin, origin);

        let upstream = self.ensure_upstream(&git, facts);
        log_step(&facts.name, FixAction::EnsureUpstream, &upstream);
        outcome.push(FixAction::EnsureUpstream, upstream);

        outcome
    }

    fn ensure_origin(&self, git: &Git, facts: &RepoFacts) -> FixResult {
        if facts.has_origin {
            return FixResult::Unchanged("origin already configured".to_string());
        }

        let Some(template) = &self.policy.remote_template else {
            return FixResult::Skipped("no remote template given".to_string());
        };

        let url = template.render(&facts.name);
        match git.run_checked(&["remote", "add", "--", "origin", &url]) {
            Ok(_) => FixResult::Applied(format!("added origin {}", url)),
            Err(e) => FixResult::Failed(one_line(&e.to_string())),
        }
    }

    fn ensure_upstream(&self, git: &Git, facts: &RepoFacts) -> FixResult {
        // Origin may have just been added, or failed to be
        match inspect::has_origin(git) {
            Ok(true) => {}
            Ok(false) => return FixResult::Skipped("no origin remote".to_string()),
            Err(e) => return FixResult::Failed(one_line(&e.to_string())),
        }

        let branch = match &facts.head {
            Some(HeadState::Branch(name)) => name,
            Some(HeadState::Unborn(name)) => {
                return FixResult::Skipped(format!("branch '{}' has no commits yet", name));
            }
            Some(HeadState::Detached) | None => {
                return FixResult::Skipped("detached HEAD is never pushed".to_string());
            }
        };

        if !facts.has_upstream {
            return match git.run_checked(&["push", "--quiet", "--set-upstream", "origin", branch])
            {
                Ok(_) => FixResult::Applied(format!(
                    "pushed '{}' and set upstream origin/{}",
                    branch, branch
                )),
                Err(e) => FixResult::Failed(one_line(&e.to_string())),
            };
        }

        let (ahead, behind) = inspect::ahead_behind(git);
        if behind > 0 {
            return FixResult::Skipped(format!(
                "behind upstream by {} commit{}; resolve manually",
                behind,
                plural(behind)
            ));
        }

        if ahead == 0 {
            return FixResult::Unchanged("up to date with upstream".to_string());
        }

        match git.run_checked(&["push", "--quiet"]) {
            Ok(_) => FixResult::Applied(format!("pushed {} commit{}", ahead, plural(ahead))),
            Err(e) => FixResult::Failed(one_line(&e.to_string())),
        }
    }
}

fn log_step(repo: &str, action: FixAction, result: &FixResult) {
    match result {
        FixResult::Failed(reason) => {
            tracing::warn!(repo = %repo, action = %action, "Fix failed: {}", reason)
        }
        other => tracing::info!(
            repo = %repo,
            action = %action,
            result = other.label(),
            "{}",
            other.detail()
        ),
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Collapse multi-line git stderr into one log-friendly line
fn one_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}
