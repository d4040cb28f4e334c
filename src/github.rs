//! GitHub API Client
//!
//! Unauthenticated wrapper around the two REST endpoints the sync needs:
//! organization members and a user's public SSH keys. Requests are plain
//! JSON GETs with no pagination, no retry and no timeout.

use crate::types::{Member, PublicKey, SyncError};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Public GitHub REST API
pub const GITHUB_API: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("gh-authorized-keys/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// GitHub REST API client
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a client against an API root: `GITHUB_API`, a GitHub Enterprise
    /// host or a mock server
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SyncError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(SyncError::Client)?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn members_url(&self, organization: &str) -> String {
        format!(
            "{}/orgs/{}/members",
            self.base_url,
            urlencoding::encode(organization)
        )
    }

    fn keys_url(&self, account: &str) -> String {
        format!(
            "{}/users/{}/keys",
            self.base_url,
            urlencoding::encode(account)
        )
    }

    /// List the logins of an organization's public members
    ///
    /// Only the first page the API returns is read.
    pub async fn list_org_members(&self, organization: &str) -> Result<Vec<String>, SyncError> {
        let url = self.members_url(organization);
        debug!(org = %organization, url = %url, "Listing organization members");

        let members: Vec<Member> = self.get_json(&url).await?;

        Ok(members.into_iter().map(|m| m.login).collect())
    }

    /// Fetch the public SSH keys of a single account
    pub async fn get_user_keys(&self, account: &str) -> Result<Vec<PublicKey>, SyncError> {
        let url = self.keys_url(account);
        debug!(account = %account, url = %url, "Fetching public keys");

        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SyncError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|source| SyncError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SyncError::UnexpectedStatus {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| SyncError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| SyncError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
