//! Authentication route handlers.
//!
//! Login exchanges credentials with the remote service for a token pair and
//! role, and records them in the session store. Logout clears the store.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use bazaar_core::{Email, Role};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use crate::api::Registration;
use crate::error::{self, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{LOGIN_PATH, OptionalAuth};
use crate::routes::layout::{FlashQuery, Page, redirect_with_error, redirect_with_notice};
use crate::session::{CookieSessionStore, SessionStore};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
}

impl RegisterForm {
    /// Local checks before the round trip.
    ///
    /// # Errors
    ///
    /// Returns the message to show on the form.
    pub fn parse(self) -> Result<Registration, String> {
        let email = Email::parse(&self.email).map_err(|e| e.to_string())?;
        if self.password.is_empty() {
            return Err("Password is required.".to_string());
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match!".to_string());
        }
        let role = self
            .role
            .parse::<Role>()
            .map_err(|_| "Please choose customer or seller.".to_string())?;

        Ok(Registration {
            email,
            password: self.password,
            confirm_password: self.confirm_password,
            role,
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: Page,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: Page,
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(session): OptionalAuth,
    Query(flash): Query<FlashQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        page: Page::new(session.as_ref(), flash),
    }
}

/// Handle login form submission.
///
/// # Errors
///
/// Fails if the session cannot be written after a successful login.
#[instrument(skip(state, store, form))]
pub async fn login(
    State(state): State<AppState>,
    store: CookieSessionStore,
    Form(form): Form<LoginForm>,
) -> error::Result<Response> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Ok(
            redirect_with_error(LOGIN_PATH, "Email and password are required").into_response(),
        );
    }
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return Ok(redirect_with_error(LOGIN_PATH, &e.to_string()).into_response()),
    };
    let password = SecretString::from(form.password);

    let session = match state.api().login(email.as_str(), &password).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            return Ok(redirect_with_error(LOGIN_PATH, &e.user_message()).into_response());
        }
    };

    store.set_session(&session).await?;

    set_sentry_user(session.display_name());
    add_breadcrumb("auth", "Logged in", Some(&[("role", session.role().as_str())]));
    tracing::info!(role = %session.role(), "Logged in");

    Ok(Redirect::to("/dashboard").into_response())
}

/// Log out.
///
/// The remote logout only blacklists the refresh token; the local session is
/// cleared whether or not it succeeds.
///
/// # Errors
///
/// Fails if the local session cannot be cleared.
#[instrument(skip(state, store))]
pub async fn logout(
    State(state): State<AppState>,
    store: CookieSessionStore,
) -> error::Result<Response> {
    if let Some(session) = store.current().await
        && let Err(e) = state.api().logout(&session).await
    {
        tracing::warn!(error = %e, "Remote logout failed");
    }

    store.clear_session().await?;
    clear_sentry_user();
    add_breadcrumb("auth", "Logged out", None);

    Ok(Redirect::to(LOGIN_PATH).into_response())
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    OptionalAuth(session): OptionalAuth,
    Query(flash): Query<FlashQuery>,
) -> impl IntoResponse {
    RegisterTemplate {
        page: Page::new(session.as_ref(), flash),
    }
}

/// Handle registration form submission.
#[instrument(skip(state, form))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let registration = match form.parse() {
        Ok(registration) => registration,
        Err(message) => return redirect_with_error("/register", &message).into_response(),
    };

    match state.api().register(&registration).await {
        Ok(()) => {
            tracing::info!(role = %registration.role, "Registered account");
            redirect_with_notice(LOGIN_PATH, "Registered successfully!").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            redirect_with_error("/register", &e.user_message()).into_response()
        }
    }
}
