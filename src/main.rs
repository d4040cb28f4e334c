//! gh-authorized-keys
//!
//! Appends the public SSH keys of a GitHub organization's members to an
//! authorized_keys file.
//!
//! # Usage
//! ```bash
//! # Sync the default organization into ~/.ssh/authorized_keys
//! gh-authorized-keys
//!
//! # Another organization and file
//! gh-authorized-keys --org acme --authorized-keys /home/deploy/.ssh/authorized_keys
//!
//! # See what would be appended, as JSON
//! gh-authorized-keys --org acme --dry-run --output json
//! ```
//!
//! Errors are logged and the process still exits 0; run the JSON output
//! through a checker if the result matters.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gh_authorized_keys::config::{default_authorized_keys_path, DEFAULT_ORGANIZATION};
use gh_authorized_keys::github::GITHUB_API;
use gh_authorized_keys::{sync_organization_keys, SyncConfig, SyncReport};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// ============================================================
// CLI Definition
// ============================================================

/// Sync an authorized_keys file with a GitHub organization's public keys
#[derive(Parser, Debug)]
#[command(name = "gh-authorized-keys", version, about)]
struct Cli {
    /// GitHub organization whose members' keys are appended
    #[arg(long, env = "GITHUB_ORG", default_value = DEFAULT_ORGANIZATION)]
    org: String,

    /// Target file (default: ~/.ssh/authorized_keys)
    #[arg(long, env = "AUTHORIZED_KEYS_FILE")]
    authorized_keys: Option<PathBuf>,

    /// GitHub REST API root
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API)]
    api_url: String,

    /// Fetch keys and report, but don't touch the file
    #[arg(long)]
    dry_run: bool,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Log format
    #[arg(long, value_enum, default_value = "text")]
    log_format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON
    Json,
}

// ============================================================
// Main Entry Point
// ============================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_format);

    let authorized_keys = match cli.authorized_keys {
        Some(path) => path,
        None => match default_authorized_keys_path() {
            Ok(path) => path,
            Err(e) => {
                error!(error = %e, "Error resolving authorized_keys path");
                return Ok(());
            }
        },
    };

    let config = SyncConfig::new(cli.org, authorized_keys)
        .api_url(cli.api_url)
        .dry_run(cli.dry_run);

    let report = match sync_organization_keys(&config).await {
        Ok(report) => report,
        Err(e) => {
            error!(org = %config.organization, error = %e, "Sync aborted");
            return Ok(());
        }
    };

    match cli.output {
        OutputFormat::Text => {
            println!("{}", summary_line(&report));
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
        }
    }

    info!("Done");
    Ok(())
}

fn init_logging(verbose: bool, format: OutputFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        OutputFormat::Text => builder.init(),
        OutputFormat::Json => builder.json().init(),
    }
}

fn summary_line(report: &SyncReport) -> String {
    format!(
        "{}: {}/{} account(s) synced, {} key(s) {} {}",
        report.organization,
        report.succeeded(),
        report.accounts.len(),
        report.keys_written(),
        if report.dry_run {
            "would be appended to"
        } else {
            "appended to"
        },
        report.path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_authorized_keys::AccountOutcome;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["gh-authorized-keys"]).unwrap();
        assert!(!cli.dry_run);
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "gh-authorized-keys",
            "--org",
            "acme",
            "--authorized-keys",
            "/tmp/keys",
            "--dry-run",
            "--output",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.org, "acme");
        assert_eq!(cli.authorized_keys, Some(PathBuf::from("/tmp/keys")));
        assert!(cli.dry_run);
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_summary_line() {
        let report = SyncReport {
            organization: "acme".to_string(),
            path: PathBuf::from("/tmp/keys"),
            dry_run: false,
            accounts: vec![
                AccountOutcome::success("alice", 2),
                AccountOutcome::failure("bob", "boom"),
            ],
        };

        assert_eq!(
            summary_line(&report),
            "acme: 1/2 account(s) synced, 2 key(s) appended to /tmp/keys"
        );
    }
}
