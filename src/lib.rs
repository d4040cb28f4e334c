//! GitHub Organization authorized_keys Sync
//!
//! Appends the public SSH keys of every member of a GitHub organization to a
//! local `authorized_keys` file. One-shot and sequential: list members, fetch
//! each member's keys, append them with a comment line naming key and owner.
//!
//! Known limitations, kept on purpose:
//! - requests are unauthenticated and only the first page is read
//! - keys are appended, never deduplicated or removed
//! - failed requests are not retried
//!
//! ## Example
//!
//! ```ignore
//! use gh_authorized_keys::{sync_organization_keys, SyncConfig};
//!
//! let config = SyncConfig::for_current_user("huemattic")?;
//! let report = sync_organization_keys(&config).await?;
//! println!("{} keys appended", report.keys_written());
//! ```

pub mod authorized_keys;
pub mod config;
pub mod github;
pub mod sync;
pub mod types;

pub use authorized_keys::AuthorizedKeysFile;
pub use config::SyncConfig;
pub use github::GitHubClient;
pub use sync::{sync_organization_keys, AccountOutcome, SyncReport};
pub use types::{Member, PublicKey, SyncError};
