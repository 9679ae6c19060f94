//! `login`, `logout`, `whoami`.

use bazaar_core::Email;
use bazaar_storefront::session::SessionStore;
use secrecy::SecretString;

use super::{CliError, Context};

/// Exchange credentials for a session and store it.
///
/// # Errors
///
/// Invalid email, rejected credentials, or an unwritable session file.
pub async fn login(ctx: &Context, email: &str, password: SecretString) -> Result<String, CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    let session = ctx.api.login(email.as_str(), &password).await?;
    ctx.store.set_session(&session).await?;
    tracing::info!(role = %session.role(), "Logged in");

    Ok(format!(
        "Logged in as {} ({})",
        session.display_name(),
        session.role()
    ))
}

/// Blacklist the refresh token remotely (best effort) and clear the store.
///
/// # Errors
///
/// Only if the session file cannot be removed.
pub async fn logout(ctx: &Context) -> Result<String, CliError> {
    if let Some(session) = ctx.store.current().await
        && let Err(e) = ctx.api.logout(&session).await
    {
        tracing::warn!(error = %e, "Remote logout failed");
    }

    ctx.store.clear_session().await?;
    Ok("Logged out".to_string())
}

/// Show the stored identity. Never touches the network.
///
/// # Errors
///
/// `NotLoggedIn` when no session is stored.
pub async fn whoami(ctx: &Context) -> Result<String, CliError> {
    let session = ctx.require_session().await?;
    Ok(format!("{} ({})", session.display_name(), session.role()))
}
