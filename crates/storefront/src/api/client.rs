//! Remote API client implementation.

use std::sync::Arc;

use bazaar_core::{AuthSession, CartItemId, Price, ProductId, Quantity, Role};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned, de::IgnoredAny};
use tracing::instrument;
use url::Url;

use super::ApiError;
use super::envelope;
use super::types::{
    CartLine, CartPayload, Category, Credentials, LoginData, LogoutInput, Order, OrderInput,
    OrderLineInput, Payment, PaymentInput, Product, ProductInput, Registration,
};
use crate::config::ApiConfig;

const NO_BODY: Option<&()> = None;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the remote commerce API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    media_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialize).
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bazaar/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                media_url: config.media_url.clone(),
            }),
        })
    }

    /// Resolve an image path from the API against the media base.
    ///
    /// Absolute URLs are returned unchanged.
    #[must_use]
    pub fn media_url(&self, path: &str) -> String {
        let relative = path.trim_start_matches('/');
        self.inner.media_url.join(relative).map_or_else(
            |_| format!("{}{relative}", self.inner.media_url),
            String::from,
        )
    }

    /// Issue a request and decode the envelope's `data` into `T`.
    ///
    /// The bearer header is attached iff `auth` is `Some`. A missing `data`
    /// member decodes as JSON `null`, so `T = Option<_>` or `IgnoredAny`
    /// accept bodiless successes.
    ///
    /// # Errors
    ///
    /// `Transport` when no response arrives, `Rejected` for non-2xx statuses
    /// or `success: false`, `Malformed` when the body is not the expected
    /// shape.
    #[instrument(skip(self, auth, body), fields(authenticated = auth.is_some()))]
    pub async fn request<B, T>(
        &self,
        auth: Option<&AuthSession>,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.inner.base_url, path.trim_start_matches('/'));

        let mut request = self
            .inner
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(session) = auth {
            request = request.bearer_auth(session.token());
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.inspect_err(|e| {
            tracing::warn!(error = %e, "API request failed");
        })?;

        let status = response.status();
        let text = response.text().await?;

        let data = envelope::open(status, &text).inspect_err(|e| {
            tracing::warn!(
                status = %status,
                error = %e,
                body = %text.chars().take(200).collect::<String>(),
                "API request unsuccessful"
            );
        })?;

        tracing::debug!(status = %status, "API request succeeded");

        serde_json::from_value(data.unwrap_or_default()).map_err(|e| {
            tracing::warn!(error = %e, "API response data has unexpected shape");
            ApiError::Malformed(e.to_string())
        })
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Exchange credentials for a session.
    ///
    /// The display name is the email the server reports for the account.
    ///
    /// # Errors
    ///
    /// `Rejected` for bad credentials. `Malformed` when the response has no
    /// access token or carries a role this storefront does not serve; no
    /// session is produced in that case.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession, ApiError> {
        let credentials = Credentials {
            email,
            password: password.expose_secret(),
        };

        let data: LoginData = self
            .request(None, Method::POST, "login/", Some(&credentials))
            .await?;

        let raw_role = data
            .role
            .ok_or_else(|| ApiError::Malformed("login response has no role".to_string()))?;
        let role = raw_role
            .parse::<Role>()
            .map_err(|_| ApiError::Malformed(format!("unsupported role '{raw_role}'")))?;

        let display_name = data
            .email
            .or_else(|| data.user.and_then(|u| u.email))
            .unwrap_or_else(|| email.trim().to_string());

        AuthSession::new(data.access, data.refresh, display_name, role)
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// `Rejected` with the server's validation messages.
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .request(None, Method::POST, "register/", Some(registration))
            .await?;
        Ok(())
    }

    /// Blacklist the session's refresh token.
    ///
    /// # Errors
    ///
    /// Any failure; callers treat logout as best effort.
    pub async fn logout(&self, auth: &AuthSession) -> Result<(), ApiError> {
        let body = LogoutInput {
            refresh: auth.refresh_token(),
        };
        let _: IgnoredAny = self
            .request(Some(auth), Method::POST, "logout/", Some(&body))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List products.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn list_products(
        &self,
        auth: Option<&AuthSession>,
    ) -> Result<Vec<Product>, ApiError> {
        let products: Option<Vec<Product>> = self
            .request(auth, Method::GET, "product/list/", NO_BODY)
            .await?;
        Ok(products.unwrap_or_default())
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get_product(
        &self,
        auth: Option<&AuthSession>,
        id: ProductId,
    ) -> Result<Product, ApiError> {
        self.request(auth, Method::GET, &format!("product/{id}/"), NO_BODY)
            .await
    }

    /// List categories.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn list_categories(
        &self,
        auth: Option<&AuthSession>,
    ) -> Result<Vec<Category>, ApiError> {
        let categories: Option<Vec<Category>> = self
            .request(auth, Method::GET, "product/categories/list/", NO_BODY)
            .await?;
        Ok(categories.unwrap_or_default())
    }

    /// Create a product as the signed-in seller.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn create_product(
        &self,
        auth: &AuthSession,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        self.request(Some(auth), Method::POST, "product/create/", Some(input))
            .await
    }

    /// Update a product as the signed-in seller.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn update_product(
        &self,
        auth: &AuthSession,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        self.request(
            Some(auth),
            Method::PUT,
            &format!("product/update/{id}/"),
            Some(input),
        )
        .await
    }

    /// Delete a product as the signed-in seller.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete_product(&self, auth: &AuthSession, id: ProductId) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .request(
                Some(auth),
                Method::DELETE,
                &format!("product/delete/{id}/"),
                NO_BODY,
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Orders, payments & cart
    // =========================================================================

    /// Create an order from cart items.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn create_order(
        &self,
        auth: &AuthSession,
        items: &[OrderLineInput],
    ) -> Result<Order, ApiError> {
        self.request(
            Some(auth),
            Method::POST,
            "orders/create/",
            Some(&OrderInput { items }),
        )
        .await
    }

    /// List the signed-in user's orders.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn list_orders(&self, auth: &AuthSession) -> Result<Vec<Order>, ApiError> {
        let orders: Option<Vec<Order>> = self
            .request(Some(auth), Method::GET, "orders/list/", NO_BODY)
            .await?;
        Ok(orders.unwrap_or_default())
    }

    /// Record a payment against an order.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn create_payment(
        &self,
        auth: &AuthSession,
        input: &PaymentInput,
    ) -> Result<Payment, ApiError> {
        self.request(
            Some(auth),
            Method::POST,
            "orders/payments/create/",
            Some(input),
        )
        .await
    }

    /// Order `quantity` of one product and pay for it by card.
    ///
    /// The amount is `unit_price × quantity`. Two calls place two orders.
    ///
    /// # Errors
    ///
    /// `ApiError::Invalid` without contacting the server if the amount
    /// overflows. Otherwise the first failing step's error. A failed payment
    /// leaves the created order in place on the server.
    pub async fn buy_now(
        &self,
        auth: &AuthSession,
        product_id: ProductId,
        unit_price: Price,
        quantity: Quantity,
    ) -> Result<(Order, Payment), ApiError> {
        let amount = unit_price
            .checked_times(quantity.get())
            .ok_or_else(|| ApiError::Invalid("That order total is too large.".to_string()))?;

        let order = self
            .create_order(
                auth,
                &[OrderLineInput {
                    product_id,
                    quantity,
                }],
            )
            .await?;

        let payment = self
            .create_payment(auth, &PaymentInput::card(order.id, amount))
            .await?;

        Ok((order, payment))
    }

    /// Fetch the cart lines.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get_cart(&self, auth: &AuthSession) -> Result<Vec<CartLine>, ApiError> {
        let cart: Option<CartPayload> = self
            .request(Some(auth), Method::GET, "cart/", NO_BODY)
            .await?;
        Ok(cart.map(CartPayload::into_lines).unwrap_or_default())
    }

    /// Remove one cart line.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn remove_cart_item(&self, auth: &AuthSession, id: CartItemId) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .request(
                Some(auth),
                Method::DELETE,
                &format!("cart/{id}/delete/"),
                NO_BODY,
            )
            .await?;
        Ok(())
    }
}
