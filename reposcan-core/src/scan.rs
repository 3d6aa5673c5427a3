//! Scan driver
//!
//! Walks the immediate subdirectories of a base directory, one at a
//! time, and produces a [`ScanEntry`] per directory in name order.
//! A directory that cannot be read or inspected is skipped; only an
//! invalid base directory aborts the scan.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::fix::{FixOutcome, FixPolicy, Remediator};
use crate::inspect::{Inspector, RepoFacts};
use crate::status::{classify, StatusSet};
use crate::{Error, Result};

/// Branch column value for directories that are not repositories
pub const NO_BRANCH: &str = "—";

/// Scan behaviour
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Run the remediation engine on every repository
    pub fix: bool,
    /// Remediation settings, used only when `fix` is set
    pub policy: FixPolicy,
}

/// One line of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub tags: StatusSet,
    pub branch: String,
    pub ahead: u32,
    pub behind: u32,
    pub dirty: bool,
}

impl ReportRow {
    /// Classify `facts` into a row
    pub fn from_facts(facts: &RepoFacts) -> Self {
        Self {
            name: facts.name.clone(),
            tags: classify(facts),
            branch: facts
                .head
                .as_ref()
                .map(|h| h.label().to_string())
                .unwrap_or_else(|| NO_BRANCH.to_string()),
            ahead: facts.ahead,
            behind: facts.behind,
            dirty: facts.dirty,
        }
    }
}

/// Everything produced for one scanned directory
#[derive(Debug, Clone)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub facts: RepoFacts,
    pub row: ReportRow,
    /// Present only in fix mode
    pub fix: Option<FixOutcome>,
}

/// Totals for a completed scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Directories reported
    pub scanned: usize,
    /// Directories that could not be read or inspected
    pub skipped: usize,
    /// Reported directories that are git repositories
    pub repositories: usize,
    /// Directories tagged exactly OK
    pub clean: usize,
    /// Fix steps that changed a repository
    pub fixes_applied: usize,
    /// Fix steps that failed
    pub fixes_failed: usize,
}

/// Sequential scanner over a directory of repositories
#[derive(Debug, Clone)]
pub struct Scanner {
    inspector: Inspector,
    remediator: Option<Remediator>,
}

impl Scanner {
    /// Create a scanner; remediation is enabled by `options.fix`
    pub fn new(inspector: Inspector, options: ScanOptions) -> Self {
        let remediator = options
            .fix
            .then(|| Remediator::new(inspector.clone(), options.policy));
        Self {
            inspector,
            remediator,
        }
    }

    /// Immediate, non-hidden subdirectories of `base`, sorted by name
    pub fn candidates(base: &Path) -> Result<Vec<PathBuf>> {
        if !base.is_dir() {
            return Err(Error::Config(format!(
                "{} is not a directory",
                base.display()
            )));
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(base)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(
                        "Failed to read directory entry in {}: {}",
                        base.display(),
                        e
                    );
                    continue;
                }
            };

            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }

        dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(dirs)
    }

    /// Inspect, classify and (in fix mode) remediate one directory
    pub fn scan_one(&self, dir: &Path) -> Result<ScanEntry> {
        // Unreadable directories are skipped before any git query
        fs::read_dir(dir)?;

        let facts = self.inspector.inspect(dir)?;
        let row = ReportRow::from_facts(&facts);
        let fix = self
            .remediator
            .as_ref()
            .map(|r| r.remediate(dir, &facts));

        Ok(ScanEntry {
            path: dir.to_path_buf(),
            facts,
            row,
            fix,
        })
    }

    /// Scan every candidate under `base`, handing entries to `on_entry`
    /// in order
    ///
    /// Per-directory failures are logged and counted as skipped. Errors
    /// returned by `on_entry` stop the scan.
    pub fn scan<F>(&self, base: &Path, mut on_entry: F) -> Result<ScanSummary>
    where
        F: FnMut(&ScanEntry) -> Result<()>,
    {
        let mut summary = ScanSummary::default();

        for dir in Self::candidates(base)? {
            let entry = match self.scan_one(&dir) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", dir.display(), e);
                    summary.skipped += 1;
                    continue;
                }
            };

            tracing::debug!(path = %entry.path.display(), tags = %entry.row.tags, "Scanned");

            summary.scanned += 1;
            if entry.facts.is_repo {
                summary.repositories += 1;
            }
            if entry.row.tags.is_ok() {
                summary.clean += 1;
            }
            if let Some(fix) = &entry.fix {
                summary.fixes_applied += fix.applied();
                summary.fixes_failed += fix.failed();
            }

            on_entry(&entry)?;
        }

        tracing::info!(
            scanned = summary.scanned,
            skipped = summary.skipped,
            repositories = summary.repositories,
            clean = summary.clean,
            fixes_applied = summary.fixes_applied,
            fixes_failed = summary.fixes_failed,
            "Scan complete"
        );

        Ok(summary)
    }
}
