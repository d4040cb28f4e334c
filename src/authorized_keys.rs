//! authorized_keys File Handling
//!
//! Creates the target file on first use and appends key entries to it.
//! Existing contents are never read: entries are appended as-is, so repeated
//! runs accumulate duplicates.

use crate::types::{PublicKey, SyncError};
use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

/// Mode for a newly created `.ssh` directory
pub const DIR_MODE: u32 = 0o700;
/// Mode for a newly created authorized_keys file
pub const FILE_MODE: u32 = 0o600;

/// Format the entry written for a single key: a comment line naming the key
/// ID and its owner, then the key itself.
pub fn format_entry(key: &PublicKey, account: &str) -> String {
    format!("# Key ID: {}, User: {}\n{}\n", key.id, account, key.key)
}

/// An authorized_keys file on disk
#[derive(Debug, Clone)]
pub struct AuthorizedKeysFile {
    path: PathBuf,
}

impl AuthorizedKeysFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure the file and its parent directory exist
    ///
    /// No-op when the file is already there. Otherwise the directory is
    /// created (owner-only) if needed and an empty owner read/write file is
    /// created. Returns whether the file was created.
    pub fn ensure_exists(&self) -> Result<bool, SyncError> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                debug!(dir = %parent.display(), "Creating directory");
                dir_builder()
                    .create(parent)
                    .map_err(|e| SyncError::io(parent, e))?;
            }
        }

        debug!(path = %self.path.display(), "Creating authorized_keys file");
        open_options()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| SyncError::io(&self.path, e))?;

        Ok(true)
    }

    /// Append one entry per key, in order, for the given account
    ///
    /// Returns the number of keys written. The file is created if it is
    /// missing. A failure part way through leaves earlier entries in place.
    pub fn append_keys(&self, keys: &[PublicKey], account: &str) -> Result<usize, SyncError> {
        let mut file: File = open_options()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| SyncError::io(&self.path, e))?;

        for key in keys {
            file.write_all(format_entry(key, account).as_bytes())
                .map_err(|e| SyncError::io(&self.path, e))?;
        }

        file.flush().map_err(|e| SyncError::io(&self.path, e))?;

        Ok(keys.len())
    }

    #[cfg(test)]
    fn read_to_string(&self) -> Result<String, SyncError> {
        fs::read_to_string(&self.path).map_err(|e| SyncError::io(&self.path, e))
    }
}

fn dir_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder
}

fn open_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    #[cfg(unix)]
    options.mode(FILE_MODE);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(id: u64, material: &str) -> PublicKey {
        PublicKey {
            id,
            key: material.to_string(),
        }
    }

    #[test]
    fn test_format_entry() {
        let entry = format_entry(&key(7, "ssh-ed25519 AAAA"), "octocat");
        assert_eq!(entry, "# Key ID: 7, User: octocat\nssh-ed25519 AAAA\n");
    }

    #[test]
    fn test_ensure_exists_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("home").join(".ssh").join("authorized_keys");
        let file = AuthorizedKeysFile::new(&path);

        assert!(file.ensure_exists().unwrap());
        assert!(path.is_file());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_ensure_exists_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authorized_keys");
        fs::write(&path, "ssh-rsa EXISTING\n").unwrap();

        let file = AuthorizedKeysFile::new(&path);
        assert!(!file.ensure_exists().unwrap());
        assert!(!file.ensure_exists().unwrap());
        assert_eq!(file.read_to_string().unwrap(), "ssh-rsa EXISTING\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_created_with_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let ssh_dir = dir.path().join(".ssh");
        let path = ssh_dir.join("authorized_keys");

        AuthorizedKeysFile::new(&path).ensure_exists().unwrap();

        let file_mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode & !FILE_MODE, 0);
        let dir_mode = fs::metadata(&ssh_dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode & !DIR_MODE, 0);
    }

    #[test]
    fn test_append_preserves_existing_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authorized_keys");
        fs::write(&path, "ssh-rsa EXISTING\n").unwrap();

        let file = AuthorizedKeysFile::new(&path);
        let written = file
            .append_keys(&[key(1, "ssh-ed25519 A"), key(2, "ssh-rsa B")], "alice")
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            file.read_to_string().unwrap(),
            "ssh-rsa EXISTING\n\
             # Key ID: 1, User: alice\nssh-ed25519 A\n\
             # Key ID: 2, User: alice\nssh-rsa B\n"
        );
    }

    #[test]
    fn test_append_no_keys_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let file = AuthorizedKeysFile::new(dir.path().join("authorized_keys"));
        file.ensure_exists().unwrap();

        assert_eq!(file.append_keys(&[], "bob").unwrap(), 0);
        assert_eq!(file.read_to_string().unwrap(), "");
    }

    #[test]
    fn test_append_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let file = AuthorizedKeysFile::new(dir.path().join("missing").join("authorized_keys"));

        let err = file.append_keys(&[key(1, "ssh-ed25519 A")], "alice").unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }
}
