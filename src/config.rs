//! Sync configuration

use crate::github::GITHUB_API;
use crate::types::SyncError;
use std::path::PathBuf;

/// Organization synced when none is given
pub const DEFAULT_ORGANIZATION: &str = "huemattic";

/// Settings for one sync run
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// GitHub organization whose members' keys are collected
    pub organization: String,
    /// Target authorized_keys file
    pub authorized_keys: PathBuf,
    /// GitHub REST API root
    pub api_url: String,
    /// Fetch and report without touching the filesystem
    pub dry_run: bool,
}

impl SyncConfig {
    /// Create a config for `organization` writing to `authorized_keys`
    pub fn new(organization: impl Into<String>, authorized_keys: impl Into<PathBuf>) -> Self {
        Self {
            organization: organization.into(),
            authorized_keys: authorized_keys.into(),
            api_url: GITHUB_API.to_string(),
            dry_run: false,
        }
    }

    /// Config for `organization` writing to the current user's
    /// `~/.ssh/authorized_keys`
    pub fn for_current_user(organization: impl Into<String>) -> Result<Self, SyncError> {
        Ok(Self::new(organization, default_authorized_keys_path()?))
    }

    /// Set the API root
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Enable or disable dry-run mode
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// `<home>/.ssh/authorized_keys` for the current user
pub fn default_authorized_keys_path() -> Result<PathBuf, SyncError> {
    let home = home::home_dir()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(SyncError::HomeDirUnavailable)?;
    Ok(authorized_keys_path_in(home))
}

/// `.ssh/authorized_keys` under the given home directory
pub fn authorized_keys_path_in(home: impl Into<PathBuf>) -> PathBuf {
    home.into().join(".ssh").join("authorized_keys")
}
