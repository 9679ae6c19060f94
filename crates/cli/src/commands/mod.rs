//! Command implementations.
//!
//! Each command returns the text to print; `main` writes it to stdout.

pub mod auth;
pub mod catalog;
pub mod orders;

use bazaar_core::{AuthSession, Price};
use bazaar_storefront::api::{ApiClient, ApiError};
use bazaar_storefront::session::SessionStore;
use thiserror::Error;

use crate::store::{FileSessionStore, FileStoreError};

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Remote API call failed.
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    /// Session file could not be read or written.
    #[error(transparent)]
    Store(#[from] FileStoreError),

    /// Guarded command run without a stored session.
    #[error("not logged in (run `bazaar login` first)")]
    NotLoggedIn,

    /// Invalid argument value.
    #[error("{0}")]
    InvalidArgument(String),

    /// Ctrl+C arrived before the command finished.
    #[error("interrupted")]
    Interrupted,
}

/// What every command works against.
pub struct Context {
    pub api: ApiClient,
    pub store: FileSessionStore,
    pub currency_symbol: String,
}

impl Context {
    /// The stored session, or [`CliError::NotLoggedIn`].
    ///
    /// # Errors
    ///
    /// `NotLoggedIn` when the store is empty or unreadable.
    pub async fn require_session(&self) -> Result<AuthSession, CliError> {
        self.store.current().await.ok_or(CliError::NotLoggedIn)
    }

    #[must_use]
    pub fn money(&self, price: Price) -> String {
        price.with_symbol(&self.currency_symbol)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_storefront::config::ApiConfig;
    use url::Url;

    use super::*;

    fn context(dir: &tempfile::TempDir) -> Context {
        // Nothing listens here; guarded commands must fail before any request
        let config = ApiConfig::new(Url::parse("http://127.0.0.1:9/api/").unwrap());
        Context {
            api: ApiClient::new(&config).unwrap(),
            store: FileSessionStore::new(dir.path().join("session.json")),
            currency_symbol: "₹".to_string(),
        }
    }

    #[tokio::test]
    async fn test_guarded_commands_require_login() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        assert!(matches!(auth::whoami(&ctx).await, Err(CliError::NotLoggedIn)));
        assert!(matches!(catalog::categories(&ctx).await, Err(CliError::NotLoggedIn)));
        assert!(matches!(orders::cart(&ctx).await, Err(CliError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_whoami_reads_store_only() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let session = AuthSession::new("t", "r", "sam@example.com", bazaar_core::Role::Seller).unwrap();
        ctx.store.set_session(&session).await.unwrap();

        assert_eq!(auth::whoami(&ctx).await.unwrap(), "sam@example.com (seller)");
    }

    #[tokio::test]
    async fn test_logout_without_session_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        assert_eq!(auth::logout(&ctx).await.unwrap(), "Logged out");
    }
}
