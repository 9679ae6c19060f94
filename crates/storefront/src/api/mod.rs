//! Client for the remote commerce API.
//!
//! # Architecture
//!
//! - The remote service is the source of truth; nothing is cached locally
//! - One `reqwest` client shared by every request, with a per-request timeout
//! - The bearer token comes from the caller's `AuthSession`, never from
//!   ambient state, so the header is present exactly when a session exists
//! - No retries, no token refresh, no queueing
//!
//! Every response is wrapped in an envelope:
//!
//! ```json
//! { "success": 1, "message": "Product created successfully", "data": { ... } }
//! ```
//!
//! `success` arrives as a bool or as 0/1, and `message` is either a string or
//! a map of field validation errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let session = client.login("ann@example.com", &password).await?;
//! let products = client.list_products(Some(&session)).await?;
//! ```

mod client;
mod envelope;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when calling the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status or `success: false`.
    #[error("Rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    /// The response did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The request was refused before anything was sent.
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl ApiError {
    /// Message suitable for showing to the user.
    ///
    /// Server messages are shown as-is; transport and shape failures get a
    /// generic notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } | Self::Invalid(message) => message.clone(),
            Self::Transport(e) if e.is_timeout() => {
                "The store took too long to respond. Please try again.".to_string()
            }
            Self::Transport(_) => "Could not reach the store. Please try again.".to_string(),
            Self::Malformed(_) => "The store sent an unexpected response.".to_string(),
        }
    }
}
