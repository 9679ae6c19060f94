//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. The only external
//! origin the pages load from is the media host serving product images.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};
use url::Url;

/// Precomputed header values, built once at startup.
#[derive(Clone, Debug)]
pub struct SecurityHeaders {
    csp: HeaderValue,
}

impl SecurityHeaders {
    /// Build the policy for a storefront served at `base_url` whose images
    /// come from `media_url`.
    ///
    /// ```text
    /// default-src 'none';
    /// script-src 'self';
    /// style-src 'self';
    /// img-src 'self' <media origin>;
    /// connect-src 'self';
    /// object-src 'none';
    /// base-uri 'self';
    /// form-action 'self';
    /// frame-ancestors 'none'
    /// ```
    ///
    /// `upgrade-insecure-requests` is added only when served over https.
    #[must_use]
    pub fn new(base_url: &str, media_url: &Url) -> Self {
        let media_origin = media_url.origin().ascii_serialization();
        let mut policy = format!(
            "default-src 'none'; \
             script-src 'self'; \
             style-src 'self'; \
             font-src 'self'; \
             img-src 'self' {media_origin}; \
             connect-src 'self'; \
             frame-src 'none'; \
             object-src 'none'; \
             base-uri 'self'; \
             form-action 'self'; \
             frame-ancestors 'none'"
        );
        if base_url.starts_with("https://") {
            policy.push_str("; upgrade-insecure-requests");
        }

        // Origins are ASCII-serialized, so this only fails on a broken Url
        let csp = HeaderValue::from_str(&policy)
            .unwrap_or_else(|_| HeaderValue::from_static("default-src 'self'"));

        Self { csp }
    }
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: no-referrer` - Zero referrer leakage
/// - `Content-Security-Policy` - see [`SecurityHeaders::new`]
/// - `Permissions-Policy` - Deny sensitive features
/// - `Cache-Control: no-store, max-age=0` - Pages carry per-user data
/// - `Cross-Origin-Opener-Policy: same-origin` - Process isolation
/// - `Cross-Origin-Resource-Policy: same-origin` - Resource isolation
pub async fn security_headers_middleware(
    State(policy): State<SecurityHeaders>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(CONTENT_SECURITY_POLICY, policy.csp);

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), \
             display-capture=(), \
             geolocation=(), \
             microphone=(), \
             payment=(), \
             usb=()",
        ),
    );

    // Static assets set their own caching
    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn csp_for(base_url: &str, media: &str) -> String {
        let headers = SecurityHeaders::new(base_url, &Url::parse(media).unwrap());
        headers.csp.to_str().unwrap().to_string()
    }

    #[test]
    fn test_csp_allows_media_origin() {
        let csp = csp_for("http://localhost:3000", "https://api.example.com/media/");
        assert!(csp.contains("img-src 'self' https://api.example.com;"));
        assert!(!csp.contains("upgrade-insecure-requests"));
    }

    #[test]
    fn test_csp_upgrades_on_https() {
        let csp = csp_for("https://shop.example.com", "https://api.example.com/");
        assert!(csp.ends_with("upgrade-insecure-requests"));
    }

    #[tokio::test]
    async fn test_headers_applied() {
        let state = SecurityHeaders::new(
            "http://localhost:3000",
            &Url::parse("http://127.0.0.1:8000/").unwrap(),
        );
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(state, security_headers_middleware));

        let response = app
            .oneshot(axum::http::Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers[X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[CACHE_CONTROL], "no-store, max-age=0");
        assert!(
            headers[CONTENT_SECURITY_POLICY]
                .to_str()
                .unwrap()
                .contains("http://127.0.0.1:8000")
        );
    }
}
