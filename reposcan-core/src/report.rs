//! Report rendering
//!
//! Presentation only: tags arrive as plain values and are coloured here.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::fix::{FixOutcome, FixResult};
use crate::scan::{ReportRow, ScanEntry};
use crate::status::StatusTag;

/// Column titles of the table report
pub const HEADER: &str = "Project | Status | Branch | Ahead | Behind | Dirty";

/// Sink for scan results
pub trait Reporter {
    /// Called once before the first entry
    fn begin(&mut self) -> io::Result<()>;

    /// Called once per scanned directory, in scan order
    fn entry(&mut self, entry: &ScanEntry) -> io::Result<()>;

    /// Called once after the last entry
    fn finish(&mut self) -> io::Result<()>;
}

/// Pipe-delimited table, one row per directory plus fix log lines
pub struct TableReporter<W: Write> {
    out: W,
    quiet: bool,
    color: bool,
}

impl<W: Write> TableReporter<W> {
    pub fn new(out: W, quiet: bool, color: bool) -> Self {
        Self { out, quiet, color }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, tag: &StatusTag) -> String {
        let text = tag.to_string();
        if !self.color {
            return text;
        }
        let text = text.as_str();

        let painted: ColoredString = match tag {
            StatusTag::Ok => text.green(),
            StatusTag::Uninitialized => text.dimmed(),
            StatusTag::Dirty | StatusTag::BehindRemote => text.red(),
            StatusTag::NoRemote
            | StatusTag::NoUpstream
            | StatusTag::NotPushedOrAhead
            | StatusTag::UntrackedBranches(_) => text.yellow(),
        };
        painted.to_string()
    }

    fn row(&mut self, row: &ReportRow) -> io::Result<()> {
        let tags = row
            .tags
            .iter()
            .map(|t| self.paint(t))
            .collect::<Vec<_>>()
            .join(" ");

        writeln!(
            self.out,
            "{} | {} | {} | {} | {} | {}",
            row.name,
            tags,
            row.branch,
            row.ahead,
            row.behind,
            if row.dirty { "yes" } else { "no" }
        )
    }

    fn fix_lines(&mut self, name: &str, outcome: &FixOutcome) -> io::Result<()> {
        for step in &outcome.steps {
            // Failures are the only essential fix output
            if self.quiet && !matches!(step.result, FixResult::Failed(_)) {
                continue;
            }

            let label = step.result.label();
            let label = if self.color {
                match step.result {
                    FixResult::Applied(_) => label.green().to_string(),
                    FixResult::Failed(_) => label.red().to_string(),
                    FixResult::Skipped(_) => label.yellow().to_string(),
                    FixResult::Unchanged(_) => label.dimmed().to_string(),
                }
            } else {
                label.to_string()
            };

            writeln!(
                self.out,
                "  fix {}: {} {}: {}",
                name,
                step.action,
                label,
                step.result.detail()
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Reporter for TableReporter<W> {
    fn begin(&mut self) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(self.out, "{}", HEADER)
    }

    fn entry(&mut self, entry: &ScanEntry) -> io::Result<()> {
        self.row(&entry.row)?;
        if let Some(fix) = &entry.fix {
            self.fix_lines(&entry.row.name, fix)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    path: String,
    #[serde(flatten)]
    row: &'a ReportRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<&'a FixOutcome>,
}

/// One JSON object per directory (JSON Lines)
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn begin(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn entry(&mut self, entry: &ScanEntry) -> io::Result<()> {
        let line = JsonLine {
            path: entry.path.to_string_lossy().into_owned(),
            row: &entry.row,
            fix: entry.fix.as_ref(),
        };
        serde_json::to_writer(&mut self.out, &line)?;
        writeln!(self.out)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::{FixAction, FixStep};
    use crate::inspect::{HeadState, RepoFacts};
    use std::path::PathBuf;

    fn entry(facts: RepoFacts, fix: Option<FixOutcome>) -> ScanEntry {
        ScanEntry {
            path: PathBuf::from(&facts.name),
            row: ReportRow::from_facts(&facts),
            facts,
            fix,
        }
    }

    fn outcome() -> FixOutcome {
        FixOutcome {
            steps: vec![
                FixStep {
                    action: FixAction::EnsureOrigin,
                    result: FixResult::Unchanged("origin already configured".into()),
                },
                FixStep {
                    action: FixAction::EnsureUpstream,
                    result: FixResult::Failed("git push failed: denied".into()),
                },
            ],
        }
    }

    fn render(quiet: bool, entries: &[ScanEntry]) -> String {
        let mut reporter = TableReporter::new(Vec::new(), quiet, false);
        reporter.begin().unwrap();
        for e in entries {
            reporter.entry(e).unwrap();
        }
        reporter.finish().unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_table_rows() {
        let dirty = RepoFacts {
            name: "api".into(),
            is_repo: true,
            has_origin: true,
            head: Some(HeadState::Branch("main".into())),
            has_upstream: true,
            ahead: 1,
            dirty: true,
            ..RepoFacts::default()
        };
        let output = render(
            false,
            &[entry(RepoFacts::uninitialized("empty"), None), entry(dirty, None)],
        );

        assert_eq!(
            output,
            "Project | Status | Branch | Ahead | Behind | Dirty\n\
             empty | UNINITIALIZED | — | 0 | 0 | no\n\
             api | NOT_PUSHED_OR_AHEAD DIRTY | main | 1 | 0 | yes\n"
        );
    }

    #[test]
    fn test_fix_lines_and_quiet() {
        let facts = RepoFacts {
            name: "svc".into(),
            is_repo: true,
            has_origin: true,
            head: Some(HeadState::Branch("main".into())),
            ..RepoFacts::default()
        };
        let entries = [entry(facts, Some(outcome()))];

        let loud = render(false, &entries);
        assert!(loud.contains("  fix svc: ensure-origin unchanged: origin already configured\n"));
        assert!(loud.contains("  fix svc: ensure-upstream failed: git push failed: denied\n"));

        let quiet = render(true, &entries);
        assert!(!quiet.contains("Project |"));
        assert!(!quiet.contains("ensure-origin"));
        assert!(quiet.contains("ensure-upstream failed"));
    }

    #[test]
    fn test_json_lines() {
        let mut reporter = JsonReporter::new(Vec::new());
        reporter
            .entry(&entry(RepoFacts::uninitialized("empty"), None))
            .unwrap();
        let facts = RepoFacts {
            name: "svc".into(),
            is_repo: true,
            head: Some(HeadState::Detached),
            ..RepoFacts::default()
        };
        reporter.entry(&entry(facts, Some(outcome()))).unwrap();

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines[0]["name"], "empty");
        assert_eq!(lines[0]["path"], "empty");
        assert_eq!(lines[0]["tags"], serde_json::json!(["UNINITIALIZED"]));
        assert!(lines[0].get("fix").is_none());

        assert_eq!(lines[1]["branch"], "(detached)");
        assert_eq!(lines[1]["fix"][1]["action"], "ensure-upstream");
        assert_eq!(lines[1]["fix"][1]["result"], "failed");
        assert_eq!(lines[1]["fix"][1]["detail"], "git push failed: denied");
    }
}
