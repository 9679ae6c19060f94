//! Session Store: where the signed-in user's credentials live between requests.
//!
//! The store holds at most one [`AuthSession`]. Writing replaces the whole
//! record and clearing removes it, so token and role are always set and
//! cleared together. Reads never touch the network.
//!
//! Backends:
//! - [`CookieSessionStore`] - the storefront's cookie-keyed `tower-sessions` session
//! - a JSON file in the command-line client

use axum::{extract::FromRequestParts, http::request::Parts};
use bazaar_core::{AuthSession, Role};
use tower_sessions::Session;

use crate::error::AppError;

/// Session keys.
pub mod keys {
    /// Key for the signed-in user's [`AuthSession`](bazaar_core::AuthSession).
    pub const AUTH_SESSION: &str = "auth_session";
}

/// Persistent holder of the current [`AuthSession`].
///
/// The provided read helpers fail closed: a backend error is logged and
/// reads as "signed out".
#[allow(async_fn_in_trait)]
pub trait SessionStore {
    /// Backend error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the stored session.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the record cannot be read or decoded.
    async fn load(&self) -> Result<Option<AuthSession>, Self::Error>;

    /// Record a session, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the record cannot be written.
    async fn set_session(&self, session: &AuthSession) -> Result<(), Self::Error>;

    /// Remove the stored session. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the record cannot be removed.
    async fn clear_session(&self) -> Result<(), Self::Error>;

    /// The stored session, or `None` if absent or unreadable.
    async fn current(&self) -> Option<AuthSession> {
        match self.load().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session; treating as signed out");
                None
            }
        }
    }

    /// Bearer token of the current session.
    async fn token(&self) -> Option<String> {
        self.current().await.map(|s| s.token().to_owned())
    }

    /// Role of the signed-in user.
    async fn role(&self) -> Option<Role> {
        self.current().await.map(|s| s.role())
    }

    /// Name shown in the navbar.
    async fn display_name(&self) -> Option<String> {
        self.current().await.map(|s| s.display_name().to_owned())
    }

    /// Whether a token is present. Evaluated fresh on every call.
    async fn is_authorized(&self) -> bool {
        bazaar_core::is_authorized(self.current().await.as_ref())
    }
}

/// Session Store over the request's `tower-sessions` session.
///
/// Extract it directly in handlers that write the session:
///
/// ```rust,ignore
/// async fn logout(store: CookieSessionStore) -> Redirect {
///     let _ = store.clear_session().await;
///     Redirect::to("/login")
/// }
/// ```
#[derive(Clone)]
pub struct CookieSessionStore {
    session: Session,
}

impl CookieSessionStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl SessionStore for CookieSessionStore {
    type Error = tower_sessions::session::Error;

    async fn load(&self) -> Result<Option<AuthSession>, Self::Error> {
        self.session.get::<AuthSession>(keys::AUTH_SESSION).await
    }

    async fn set_session(&self, session: &AuthSession) -> Result<(), Self::Error> {
        // New identity, new session id
        self.session.cycle_id().await?;
        self.session.insert(keys::AUTH_SESSION, session).await
    }

    async fn clear_session(&self) -> Result<(), Self::Error> {
        self.session.flush().await
    }
}

impl<S> FromRequestParts<S> for CookieSessionStore
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self::new)
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))
    }
}
