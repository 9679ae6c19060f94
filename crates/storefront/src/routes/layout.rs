//! Per-page context shared by every template, and the redirect-with-notice
//! convention action handlers use.
//!
//! Actions answer with a 303 back to the page they came from, carrying
//! `?notice=` or `?error=`; the page renders it as an alert.

use axum::response::Redirect;
use bazaar_core::{AuthSession, Viewer};
use serde::Deserialize;

/// Notice/error carried in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// What the base layout needs: who is looking, and any alert to show.
#[derive(Debug, Clone)]
pub struct Page {
    pub viewer: Viewer,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl Page {
    #[must_use]
    pub fn new(session: Option<&AuthSession>, flash: FlashQuery) -> Self {
        Self {
            viewer: Viewer::from_session(session),
            notice: flash.notice.filter(|s| !s.trim().is_empty()),
            error: flash.error.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Show `message` as an error, keeping any error already present.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        if self.error.is_none() {
            self.error = Some(message.into());
        }
        self
    }
}

/// Redirect to `path` with a notice.
#[must_use]
pub fn redirect_with_notice(path: &str, message: &str) -> Redirect {
    redirect_with(path, "notice", message)
}

/// Redirect to `path` with an error.
#[must_use]
pub fn redirect_with_error(path: &str, message: &str) -> Redirect {
    redirect_with(path, "error", message)
}

fn redirect_with(path: &str, key: &str, message: &str) -> Redirect {
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!(
        "{path}{separator}{key}={}",
        urlencoding::encode(message)
    ))
}

/// A form's `return_to` if it is a local path, otherwise `fallback`.
///
/// Rejects scheme-relative (`//host`) and backslash tricks so the value
/// can't send the user off-site.
#[must_use]
pub fn local_path<'a>(candidate: Option<&'a str>, fallback: &'a str) -> &'a str {
    match candidate {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.contains("://") =>
        {
            path
        }
        _ => fallback,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::response::IntoResponse;
    use bazaar_core::Role;

    use super::*;

    fn location(redirect: Redirect) -> String {
        redirect.into_response().headers()["location"]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_redirect_encodes_message() {
        assert_eq!(
            location(redirect_with_error("/login", "Invalid credentials")),
            "/login?error=Invalid%20credentials"
        );
        assert_eq!(
            location(redirect_with_notice("/dashboard?product=1&qty=2", "2 item(s) added to cart!")),
            "/dashboard?product=1&qty=2&notice=2%20item%28s%29%20added%20to%20cart%21"
        );
    }

    #[test]
    fn test_local_path() {
        assert_eq!(local_path(Some("/products/3?qty=2"), "/dashboard"), "/products/3?qty=2");
        assert_eq!(local_path(Some("//evil.example"), "/dashboard"), "/dashboard");
        assert_eq!(local_path(Some("https://evil.example"), "/dashboard"), "/dashboard");
        assert_eq!(local_path(Some("/\\evil.example"), "/dashboard"), "/dashboard");
        assert_eq!(local_path(None, "/dashboard"), "/dashboard");
    }

    #[test]
    fn test_page_drops_blank_flash() {
        let session = AuthSession::new("t", "r", "cy@example.com", Role::Customer).unwrap();
        let page = Page::new(
            Some(&session),
            FlashQuery {
                notice: Some("  ".to_string()),
                error: Some("Out of stock".to_string()),
            },
        );

        assert!(page.notice.is_none());
        assert_eq!(page.error.as_deref(), Some("Out of stock"));
        assert!(page.viewer.is_customer());
        assert_eq!(page.with_error("other").error.as_deref(), Some("Out of stock"));
    }
}
