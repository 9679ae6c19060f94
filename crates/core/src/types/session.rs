//! The authenticated session and the view a request renders with.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::Role;

/// Errors constructing an [`AuthSession`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The access token is empty or whitespace.
    #[error("access token cannot be empty")]
    EmptyToken,
    /// The role is missing from a persisted record.
    #[error("session record has no role")]
    MissingRole,
}

/// Credentials and identity issued by the remote service at login.
///
/// An `AuthSession` always carries a non-empty access token, so holding one
/// means the visitor is authenticated. Tokens are never printed by `Debug`.
///
/// Persisted form uses the fixed keys `access`, `refresh`, `user` and `role`:
///
/// ```
/// use bazaar_core::{AuthSession, Role};
///
/// let session = AuthSession::new("tok", "ref", "ann@example.com", Role::Seller).unwrap();
/// let json = serde_json::to_value(&session).unwrap();
/// assert_eq!(json["access"], "tok");
/// assert_eq!(json["role"], "seller");
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "Record", into = "Record")]
pub struct AuthSession {
    token: SecretString,
    refresh_token: SecretString,
    display_name: String,
    role: Role,
}

impl AuthSession {
    /// Build a session from login output.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] if the access token is blank.
    pub fn new(
        token: impl Into<String>,
        refresh_token: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
    ) -> Result<Self, SessionError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }

        Ok(Self {
            token: SecretString::from(token),
            refresh_token: SecretString::from(refresh_token.into()),
            display_name: display_name.into(),
            role,
        })
    }

    /// Bearer token for API calls.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// Refresh token. Stored but not used for renewal.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct Record {
    access: String,
    #[serde(default)]
    refresh: String,
    #[serde(default)]
    user: String,
    role: Option<Role>,
}

impl TryFrom<Record> for AuthSession {
    type Error = SessionError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let role = record.role.ok_or(SessionError::MissingRole)?;
        Self::new(record.access, record.refresh, record.user, role)
    }
}

impl From<AuthSession> for Record {
    fn from(session: AuthSession) -> Self {
        Self {
            access: session.token.expose_secret().to_owned(),
            refresh: session.refresh_token.expose_secret().to_owned(),
            user: session.display_name,
            role: Some(session.role),
        }
    }
}

/// Whether a request carrying `session` may see guarded pages.
#[must_use]
pub const fn is_authorized(session: Option<&AuthSession>) -> bool {
    session.is_some()
}

/// Who is looking at a page, as far as rendering is concerned.
///
/// Every role-dependent template branches on this exhaustively, so a page
/// never shows controls that belong to a different role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Unauthenticated,
    Customer {
        display_name: String,
    },
    Seller {
        display_name: String,
    },
}

impl Viewer {
    #[must_use]
    pub fn from_session(session: Option<&AuthSession>) -> Self {
        match session {
            None => Self::Unauthenticated,
            Some(s) => match s.role() {
                Role::Customer => Self::Customer {
                    display_name: s.display_name().to_owned(),
                },
                Role::Seller => Self::Seller {
                    display_name: s.display_name().to_owned(),
                },
            },
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }

    #[must_use]
    pub const fn is_customer(&self) -> bool {
        matches!(self, Self::Customer { .. })
    }

    #[must_use]
    pub const fn is_seller(&self) -> bool {
        matches!(self, Self::Seller { .. })
    }

    /// Display name, empty when unauthenticated.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Unauthenticated => "",
            Self::Customer { display_name } | Self::Seller { display_name } => display_name,
        }
    }

    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Unauthenticated => None,
            Self::Customer { .. } => Some(Role::Customer),
            Self::Seller { .. } => Some(Role::Seller),
        }
    }
}
