//! Organization Key Sync
//!
//! The whole run: make sure the file exists, list the organization's
//! members, then fetch and append each member's keys in turn.
//!
//! Failures come in two tiers:
//! - file initialization and the member list are fatal and end the run
//! - a single account's key fetch or append is logged and skipped

use crate::authorized_keys::AuthorizedKeysFile;
use crate::config::SyncConfig;
use crate::github::GitHubClient;
use crate::types::SyncError;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What happened to one account
#[derive(Debug, Clone, Serialize)]
pub struct AccountOutcome {
    pub account: String,
    /// Keys appended (or that would be, in a dry run)
    pub keys_written: usize,
    /// Error message if the account was skipped
    pub error: Option<String>,
}

impl AccountOutcome {
    pub fn success(account: impl Into<String>, keys_written: usize) -> Self {
        Self {
            account: account.into(),
            keys_written,
            error: None,
        }
    }

    pub fn failure(account: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            keys_written: 0,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a completed run, accounts in member-list order
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub organization: String,
    pub path: PathBuf,
    pub dry_run: bool,
    pub accounts: Vec<AccountOutcome>,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.accounts.iter().filter(|a| a.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.accounts.len() - self.succeeded()
    }

    pub fn keys_written(&self) -> usize {
        self.accounts.iter().map(|a| a.keys_written).sum()
    }
}

/// Append the public keys of every member of the configured organization
/// to the configured authorized_keys file
///
/// Returns `Err` only for the fatal tier; per-account failures are reported
/// in the returned `SyncReport`.
pub async fn sync_organization_keys(config: &SyncConfig) -> Result<SyncReport, SyncError> {
    let client = GitHubClient::with_base_url(config.api_url.as_str())?;
    let file = AuthorizedKeysFile::new(&config.authorized_keys);

    info!(
        org = %config.organization,
        path = %file.path().display(),
        api = %client.base_url(),
        dry_run = config.dry_run,
        "Starting authorized_keys sync"
    );

    if !config.dry_run && file.ensure_exists()? {
        info!(path = %file.path().display(), "Created authorized_keys file");
    }

    let accounts = client.list_org_members(&config.organization).await?;
    info!(org = %config.organization, members = accounts.len(), "Fetched organization members");

    let mut outcomes = Vec::with_capacity(accounts.len());
    for account in accounts {
        let outcome = sync_account(&client, &file, &account, config.dry_run).await;
        outcomes.push(outcome);
    }

    let report = SyncReport {
        organization: config.organization.clone(),
        path: config.authorized_keys.clone(),
        dry_run: config.dry_run,
        accounts: outcomes,
    };

    info!(
        org = %report.organization,
        succeeded = report.succeeded(),
        failed = report.failed(),
        keys = report.keys_written(),
        "Sync finished"
    );

    Ok(report)
}

async fn sync_account(
    client: &GitHubClient,
    file: &AuthorizedKeysFile,
    account: &str,
    dry_run: bool,
) -> AccountOutcome {
    let keys = match client.get_user_keys(account).await {
        Ok(keys) => keys,
        Err(e) => {
            warn!(account = %account, error = %e, "Error getting public keys");
            return AccountOutcome::failure(account, e.to_string());
        }
    };

    if dry_run {
        for key in &keys {
            debug!(account = %account, key_id = key.id, "Would append key");
        }
        info!(account = %account, keys = keys.len(), "Dry run: keys not written");
        return AccountOutcome::success(account, keys.len());
    }

    match file.append_keys(&keys, account) {
        Ok(written) => {
            info!(
                account = %account,
                keys = written,
                path = %file.path().display(),
                "Public keys copied to file"
            );
            AccountOutcome::success(account, written)
        }
        Err(e) => {
            warn!(
                account = %account,
                path = %file.path().display(),
                error = %e,
                "Error writing public keys to file"
            );
            AccountOutcome::failure(account, e.to_string())
        }
    }
}
