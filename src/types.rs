//! Types for organization key sync
//!
//! Wire records returned by the GitHub REST API and the error type shared
//! by the fetcher, the file writer and the sync loop.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// An organization member as returned by `GET /orgs/{org}/members`.
///
/// Only the login is consumed; every other field in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Member {
    pub login: String,
}

/// A public SSH key as returned by `GET /users/{account}/keys`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    /// GitHub's numeric key ID
    pub id: u64,
    /// Key material in OpenSSH authorized_keys encoding (e.g. "ssh-ed25519 AAAA...")
    pub key: String,
}

/// Errors that can occur while syncing keys
#[derive(Debug, Error)]
pub enum SyncError {
    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with something other than 200 OK
    #[error("Request to {url} returned non-ok status: {status}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The response body was not the JSON we expected
    #[error("Error decoding response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem operation on the authorized_keys file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No explicit path was given and the home directory is unknown
    #[error("Could not determine the current user's home directory")]
    HomeDirUnavailable,
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}
