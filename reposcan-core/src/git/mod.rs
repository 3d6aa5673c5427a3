//! Git command-line plumbing for Reposcan
//!
//! All repository access goes through the `git` binary, invoked as a
//! blocking subprocess bound to an explicit working directory.

mod runner;

pub use runner::{Git, GitOutput, DEFAULT_GIT};
