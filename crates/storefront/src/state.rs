//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::middleware::SecurityHeaders;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the remote API client and configuration. It holds no session data;
/// sessions travel with each request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    security_headers: SecurityHeaders,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let security_headers = SecurityHeaders::new(&config.base_url, &config.api.media_url);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                security_headers,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the remote API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn security_headers(&self) -> &SecurityHeaders {
        &self.inner.security_headers
    }

    /// Format a price with the configured currency symbol.
    #[must_use]
    pub fn money(&self, price: bazaar_core::Price) -> String {
        price.with_symbol(&self.inner.config.currency_symbol)
    }
}
