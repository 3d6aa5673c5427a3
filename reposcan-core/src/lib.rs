//! Reposcan Core - git hygiene auditing for a directory of repositories
//!
//! This crate inspects every immediate subdirectory of a base directory,
//! classifies its git state into status tags, and optionally applies a
//! small set of safe remediation steps (add origin, set upstream, push).

pub mod config;
pub mod error;
pub mod fix;
pub mod git;
pub mod inspect;
pub mod report;
pub mod scan;
pub mod status;

pub use config::{Config, OutputConfig, RemoteTemplate, ScanConfig};
pub use error::{Error, Result};
pub use fix::{FixAction, FixOutcome, FixPolicy, FixResult, FixStep, Remediator};
pub use git::{Git, GitOutput};
pub use inspect::{HeadState, Inspector, RepoFacts};
pub use report::{JsonReporter, Reporter, TableReporter};
pub use scan::{ReportRow, ScanEntry, ScanOptions, ScanSummary, Scanner};
pub use status::{classify, StatusSet, StatusTag};

#[cfg(test)]
mod testutil;
