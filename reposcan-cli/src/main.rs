//! Reposcan CLI - audit git hygiene across a directory of repositories
//!
//! Reports the state of every immediate subdirectory of a base directory
//! and, with `--fix`, adds missing origins, sets upstreams and pushes.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use reposcan_core::{
    Config, FixPolicy, Inspector, JsonReporter, RemoteTemplate, Reporter, ScanOptions, Scanner,
    TableReporter,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Audit the git state of every repository under a directory
#[derive(Parser, Debug)]
#[command(name = "scan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory whose immediate subdirectories are scanned
    #[arg(value_name = "BASE_DIR", default_value = ".")]
    base_dir: PathBuf,

    /// Add missing origins, set upstreams and push pending commits
    #[arg(long)]
    fix: bool,

    /// Origin URL template for --fix; "{name}" becomes the directory name
    #[arg(long, value_name = "TPL")]
    remote_template: Option<RemoteTemplate>,

    /// Branch name to assume for repositories without commits
    #[arg(long, value_name = "NAME")]
    default_branch: Option<String>,

    /// Suppress the header and all fix lines except failures
    #[arg(short, long)]
    quiet: bool,

    /// Emit one JSON object per repository instead of a table
    #[arg(long)]
    json: bool,

    /// Never colour status tags
    #[arg(long)]
    no_color: bool,

    /// Config file (defaults to ~/.config/reposcan/config.toml)
    #[arg(long, value_name = "PATH", env = "REPOSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the report
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if !cli.base_dir.is_dir() {
        anyhow::bail!("{} is not a directory", cli.base_dir.display());
    }

    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        cli.remote_template.clone(),
        cli.default_branch.clone(),
        cli.no_color,
    )?;

    tracing::debug!(
        base_dir = %cli.base_dir.display(),
        fix = cli.fix,
        remote_template = ?config.scan.remote_template.as_ref().map(RemoteTemplate::as_str),
        default_branch = ?config.scan.default_branch,
        git = %config.scan.git_path,
        "Configuration loaded"
    );

    if cli.fix && config.scan.remote_template.is_none() {
        tracing::info!("No remote template configured; missing origins will be skipped");
    }

    let inspector = Inspector::new()
        .with_git_program(config.scan.git_path.clone())
        .with_default_branch(config.scan.default_branch.clone());
    let scanner = Scanner::new(
        inspector,
        ScanOptions {
            fix: cli.fix,
            policy: FixPolicy {
                remote_template: config.scan.remote_template.clone(),
            },
        },
    );

    let stdout = io::stdout();
    let color = config.output.color && stdout.is_terminal();
    let mut reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter::new(stdout.lock()))
    } else {
        Box::new(TableReporter::new(stdout.lock(), cli.quiet, color))
    };

    reporter.begin()?;
    scanner.scan(&cli.base_dir, |entry| Ok(reporter.entry(entry)?))?;
    reporter.finish()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["scan"]).unwrap();
        assert_eq!(cli.base_dir, PathBuf::from("."));
        assert!(!cli.fix);
        assert!(cli.remote_template.is_none());
    }

    #[test]
    fn test_equals_syntax() {
        let cli = Cli::try_parse_from([
            "scan",
            "--fix",
            "--remote-template=git@host:me/{name}.git",
            "--default-branch=trunk",
            "projects",
        ])
        .unwrap();
        assert!(cli.fix);
        assert_eq!(
            cli.remote_template.unwrap().render("x"),
            "git@host:me/x.git"
        );
        assert_eq!(cli.default_branch.as_deref(), Some("trunk"));
        assert_eq!(cli.base_dir, PathBuf::from("projects"));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["scan", "--bogus"]).is_err());
        assert!(Cli::try_parse_from(["scan", "a", "b"]).is_err());
        assert!(Cli::try_parse_from(["scan", "--remote-template=static.git"]).is_err());
    }
}
