//! Configuration management for Reposcan
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REPOSCAN_*)
//! 3. Config file (~/.config/reposcan/config.toml)
//! 4. Default values

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::git::DEFAULT_GIT;
use crate::{Error, Result};

/// Template for building an origin URL from a repository name
///
/// Always contains the `{name}` placeholder, e.g.
/// `git@github.com:me/{name}.git`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteTemplate(String);

impl RemoteTemplate {
    /// Placeholder replaced by the repository directory name
    pub const PLACEHOLDER: &'static str = "{name}";

    /// Validate a template string
    pub fn parse(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(Self::PLACEHOLDER) {
            return Err(Error::Template(template));
        }
        Ok(Self(template))
    }

    /// Substitute `name` for every placeholder
    pub fn render(&self, name: &str) -> String {
        self.0.replace(Self::PLACEHOLDER, name)
    }

    /// The raw template
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RemoteTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RemoteTemplate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<RemoteTemplate> for String {
    fn from(template: RemoteTemplate) -> Self {
        template.0
    }
}

impl fmt::Display for RemoteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scan and fix settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Template used to add a missing origin in fix mode
    pub remote_template: Option<RemoteTemplate>,

    /// Branch name assumed for repositories without commits
    pub default_branch: Option<String>,

    /// Path to the git executable
    pub git_path: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            remote_template: None,
            default_branch: None,
            git_path: DEFAULT_GIT.to_string(),
        }
    }
}

/// Report output settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Colour status tags when writing to a terminal
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Scan configuration
    pub scan: ScanConfig,

    /// Output configuration
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/reposcan/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reposcan").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REPOSCAN_REMOTE_TEMPLATE: Origin URL template
    /// - REPOSCAN_DEFAULT_BRANCH: Branch assumed for unborn repositories
    /// - REPOSCAN_GIT: Path to git executable
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(template) = lookup("REPOSCAN_REMOTE_TEMPLATE") {
            self.scan.remote_template = Some(RemoteTemplate::parse(template)?);
        }

        if let Some(branch) = lookup("REPOSCAN_DEFAULT_BRANCH") {
            self.scan.default_branch = Some(branch);
        }

        if let Some(git) = lookup("REPOSCAN_GIT") {
            self.scan.git_path = git;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        remote_template: Option<RemoteTemplate>,
        default_branch: Option<String>,
        no_color: bool,
    ) -> Self {
        if let Some(template) = remote_template {
            self.scan.remote_template = Some(template);
        }

        if let Some(branch) = default_branch {
            self.scan.default_branch = Some(branch);
        }

        if no_color {
            self.output.color = false;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults. An explicit
    /// `config_path` must exist.
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        remote_template: Option<RemoteTemplate>,
        default_branch: Option<String>,
        no_color: bool,
    ) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        Ok(base
            .with_env_overrides()?
            .with_cli_overrides(remote_template, default_branch, no_color))
    }
}
