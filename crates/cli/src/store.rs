//! Session Store backed by a JSON file.
//!
//! The file holds the same record the storefront keeps in its cookie
//! session. Clearing deletes the file. On unix the file is created `0600`,
//! since it holds bearer tokens.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bazaar_core::AuthSession;
use bazaar_storefront::session::SessionStore;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Errors reading or writing the session file.
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is not a valid session: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// File-backed [`SessionStore`].
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling the record is written to before the rename.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("session"), ToOwned::to_owned);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> FileStoreError {
        FileStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    type Error = FileStoreError;

    async fn load(&self) -> Result<Option<AuthSession>, Self::Error> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_slice(&contents)
            .map(Some)
            .map_err(|source| FileStoreError::Decode {
                path: self.path.clone(),
                source,
            })
    }

    async fn set_session(&self, session: &AuthSession) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let contents = serde_json::to_vec_pretty(session).map_err(|source| {
            FileStoreError::Decode {
                path: self.path.clone(),
                source,
            }
        })?;

        // Write then rename so a reader never sees half a record
        let staging = self.staging_path();
        write_private(&staging, &contents)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }

    async fn clear_session(&self) -> Result<(), Self::Error> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Write `contents` to a fresh file only the owner can read.
async fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    // A leftover file would keep its old mode
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::Role;

    use super::*;

    fn store(dir: &tempfile::TempDir) -> FileSessionStore {
        FileSessionStore::new(dir.path().join("nested").join("session.json"))
    }

    #[tokio::test]
    async fn test_missing_file_reads_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        assert!(store.load().await.unwrap().is_none());
        assert!(!store.is_authorized().await);
    }

    #[tokio::test]
    async fn test_set_then_read_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let session = AuthSession::new("acc", "ref", "sam@example.com", Role::Seller).unwrap();

        store.set_session(&session).await.unwrap();

        assert_eq!(store.token().await.as_deref(), Some("acc"));
        assert_eq!(store.role().await, Some(Role::Seller));
        assert_eq!(store.display_name().await.as_deref(), Some("sam@example.com"));
        assert_eq!(store.current().await.unwrap().refresh_token(), "ref");
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let session = AuthSession::new("acc", "ref", "cy", Role::Customer).unwrap();

        store.set_session(&session).await.unwrap();
        store.clear_session().await.unwrap();
        store.clear_session().await.unwrap();

        assert!(store.token().await.is_none());
        assert!(!store.path().exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let session = AuthSession::new("acc", "ref", "cy", Role::Customer).unwrap();

        store.set_session(&session).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0, "session file mode {mode:o}");
    }

    #[tokio::test]
    async fn test_tmp_named_file_still_staged_aside() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.tmp"));
        let session = AuthSession::new("acc", "ref", "cy", Role::Customer).unwrap();

        assert_eq!(store.staging_path(), dir.path().join("session.tmp.tmp"));

        store.set_session(&session).await.unwrap();
        store.set_session(&session).await.unwrap();

        assert_eq!(store.token().await.as_deref(), Some("acc"));
        assert!(!store.staging_path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        std::fs::write(store.path(), b"{\"access\": \"\"}").unwrap();

        assert!(matches!(store.load().await, Err(FileStoreError::Decode { .. })));
        assert!(!store.is_authorized().await);
    }
}
