//! Status classification
//!
//! Maps [`RepoFacts`] to an ordered set of hygiene tags. The mapping is a
//! pure function; tag order is fixed and only matters for display.

use std::fmt;
use std::mem::discriminant;

use serde::{Serialize, Serializer};

use crate::inspect::RepoFacts;

/// One hygiene facet of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTag {
    /// Not a git working tree; excludes every other tag
    Uninitialized,
    /// No remote named "origin"
    NoRemote,
    /// Current branch has no upstream
    NoUpstream,
    /// Commits exist that are not (known to be) on the remote
    NotPushedOrAhead,
    /// Upstream has commits HEAD lacks
    BehindRemote,
    /// Uncommitted or untracked changes
    Dirty,
    /// Local branches without upstream, by name
    UntrackedBranches(Vec<String>),
    /// Nothing to report; excludes every other tag
    Ok,
}

impl StatusTag {
    /// Stable upper-case identifier
    pub fn code(&self) -> &'static str {
        match self {
            StatusTag::Uninitialized => "UNINITIALIZED",
            StatusTag::NoRemote => "NO_REMOTE",
            StatusTag::NoUpstream => "NO_UPSTREAM",
            StatusTag::NotPushedOrAhead => "NOT_PUSHED_OR_AHEAD",
            StatusTag::BehindRemote => "BEHIND_REMOTE",
            StatusTag::Dirty => "DIRTY",
            StatusTag::UntrackedBranches(_) => "UNTRACKED_BRANCHES",
            StatusTag::Ok => "OK",
        }
    }
}

impl fmt::Display for StatusTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusTag::UntrackedBranches(branches) => {
                write!(f, "{}({})", self.code(), branches.join(","))
            }
            _ => f.write_str(self.code()),
        }
    }
}

impl Serialize for StatusTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ordered, non-empty set of tags for one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusSet(Vec<StatusTag>);

impl StatusSet {
    /// The tags in display order
    pub fn tags(&self) -> &[StatusTag] {
        &self.0
    }

    /// Whether a tag of the same kind is present, ignoring payload
    pub fn contains(&self, tag: &StatusTag) -> bool {
        self.0.iter().any(|t| discriminant(t) == discriminant(tag))
    }

    /// Whether the set is exactly `{OK}`
    pub fn is_ok(&self) -> bool {
        self.0 == [StatusTag::Ok]
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate tags in display order
    pub fn iter(&self) -> std::slice::Iter<'_, StatusTag> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a StatusSet {
    type Item = &'a StatusTag;
    type IntoIter = std::slice::Iter<'a, StatusTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", tag)?;
        }
        Ok(())
    }
}

/// Classify a repository's facts
pub fn classify(facts: &RepoFacts) -> StatusSet {
    if !facts.is_repo {
        return StatusSet(vec![StatusTag::Uninitialized]);
    }

    let mut tags = Vec::new();

    if !facts.has_origin {
        tags.push(StatusTag::NoRemote);
    }

    if facts.has_upstream {
        if facts.behind > 0 {
            tags.push(StatusTag::BehindRemote);
        }
    } else {
        tags.push(StatusTag::NoUpstream);
    }

    if !facts.is_detached() {
        let unpublished = !facts.has_origin || !facts.has_upstream;
        if unpublished || facts.ahead > 0 {
            tags.push(StatusTag::NotPushedOrAhead);
        }
    }

    if facts.dirty {
        tags.push(StatusTag::Dirty);
    }

    if !facts.orphan_branches.is_empty() {
        tags.push(StatusTag::UntrackedBranches(facts.orphan_branches.clone()));
    }

    if tags.is_empty() {
        tags.push(StatusTag::Ok);
    }

    StatusSet(tags)
}
