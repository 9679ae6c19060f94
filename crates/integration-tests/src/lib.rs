//! Integration test harness for the Bazaar storefront.
//!
//! [`FakeApi`] stands in for the remote commerce service: it speaks the same
//! `{ success, message, data }` envelope and counts the calls that matter.
//! [`spawn_storefront`] runs the real router against it on an ephemeral port.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! Accounts: any email with password [`PASSWORD`]; emails starting with
//! `seller` log in as sellers, everyone else as a customer.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use bazaar_storefront::{
    config::{ApiConfig, StorefrontConfig},
    state::AppState,
};
use serde_json::{Value, json};
use url::Url;

/// The only password the fake accepts.
pub const PASSWORD: &str = "correct-horse";

/// One request the fake saw: path and `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct FakeState {
    order_creates: AtomicUsize,
    payment_creates: AtomicUsize,
    logouts: AtomicUsize,
    reject_orders: Mutex<Option<String>>,
    cart: Mutex<Vec<Value>>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl FakeState {
    fn record(&self, path: &str, headers: &HeaderMap) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SeenRequest {
                path: path.to_string(),
                authorization,
            });
    }
}

/// In-process fake of the remote commerce API.
pub struct FakeApi {
    addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeApi {
    /// Start the fake on an ephemeral port.
    ///
    /// # Panics
    ///
    /// If the listener cannot be bound.
    #[allow(clippy::unwrap_used)]
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        *state.cart.lock().unwrap() = vec![json!({
            "id": 1,
            "product": {"id": 1, "name": "Kettle", "price": "12.50"},
            "quantity": 1
        })];

        let app = Router::new()
            .route("/api/login/", post(login))
            .route("/api/logout/", post(logout))
            .route("/api/register/", post(register))
            .route("/api/product/list/", get(list_products))
            .route("/api/product/categories/list/", get(list_categories))
            .route("/api/product/{id}/", get(get_product))
            .route("/api/orders/create/", post(create_order))
            .route("/api/orders/list/", get(list_orders))
            .route("/api/orders/payments/create/", post(create_payment))
            .route("/api/cart/", get(get_cart))
            .route("/api/cart/{id}/delete/", delete(remove_cart_item))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, state }
    }

    /// Base URL of the fake API, ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    /// Make every order create fail with `message`.
    pub fn reject_orders(&self, message: &str) {
        *self
            .state
            .reject_orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
    }

    #[must_use]
    pub fn order_creates(&self) -> usize {
        self.state.order_creates.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn payment_creates(&self) -> usize {
        self.state.payment_creates.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn logouts(&self) -> usize {
        self.state.logouts.load(Ordering::SeqCst)
    }

    /// Every request seen so far, in arrival order.
    #[must_use]
    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state
            .seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn ok(data: Value) -> Response {
    Json(json!({"success": 1, "message": "ok", "data": data})).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": 0, "message": message}))).into_response()
}

fn products() -> Value {
    json!([
        {"id": 1, "name": "Kettle", "description": "Boils water", "price": "12.50", "quantity": 10,
         "category": {"id": 1, "name": "Kitchen"}},
        {"id": 2, "name": "Mug", "description": "Holds tea", "price": "4.00", "quantity": 25,
         "category": {"id": 1, "name": "Kitchen"}},
        {"id": 3, "name": "Trowel", "description": "Digs", "price": "7.25", "quantity": 3,
         "category": {"id": 2, "name": "Garden"}}
    ])
}

async fn login(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("login/", &headers);
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] != PASSWORD {
        return fail(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let role = if email.starts_with("seller") { "seller" } else { "customer" };
    ok(json!({
        "user": {"id": 7, "email": email, "role": role},
        "access": format!("access-{email}"),
        "refresh": format!("refresh-{email}"),
        "email": email,
        "role": role
    }))
}

async fn logout(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("logout/", &headers);
    if body["refresh"].as_str().is_none_or(str::is_empty) {
        return fail(StatusCode::BAD_REQUEST, "Refresh token required");
    }
    state.logouts.fetch_add(1, Ordering::SeqCst);
    ok(Value::Null)
}

async fn register(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("register/", &headers);
    if body["password"] != body["confirm_password"] {
        return Json(json!({
            "success": 0,
            "message": {"password": ["Passwords do not match."]}
        }))
        .into_response();
    }
    ok(json!({"id": 8, "email": body["email"], "role": body["role"]}))
}

async fn list_products(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    state.record("product/list/", &headers);
    ok(products())
}

async fn list_categories(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    state.record("product/categories/list/", &headers);
    ok(json!([
        {"id": 1, "name": "Kitchen", "description": "Cook and serve"},
        {"id": 2, "name": "Garden"}
    ]))
}

async fn get_product(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.record(&format!("product/{id}/"), &headers);
    products()
        .as_array()
        .and_then(|all| all.iter().find(|p| p["id"] == id).cloned())
        .map_or_else(|| fail(StatusCode::NOT_FOUND, "Product not found"), ok)
}

async fn create_order(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("orders/create/", &headers);
    let n = state.order_creates.fetch_add(1, Ordering::SeqCst) + 1;

    let rejection = state
        .reject_orders
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    if let Some(message) = rejection {
        return fail(StatusCode::BAD_REQUEST, &message);
    }

    ok(json!({
        "id": 100 + n,
        "status": "pending",
        "total_amount": "0.00",
        "items": body["items"]
            .as_array()
            .map(|items| items.iter().enumerate().map(|(i, item)| json!({
                "id": i + 1,
                "product": null,
                "quantity": item["quantity"],
                "price": "0.00",
                "total_price": "0.00"
            })).collect::<Vec<_>>())
            .unwrap_or_default()
    }))
}

async fn list_orders(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    state.record("orders/list/", &headers);
    ok(json!([{
        "id": 41,
        "status": "completed",
        "total_amount": "29.00",
        "items": [
            {"id": 1, "product": {"id": 1, "name": "Kettle", "price": "12.50"},
             "quantity": 2, "price": "12.50", "total_price": "25.00"},
            {"id": 2, "product": null, "quantity": 1, "price": "4.00", "total_price": "4.00"}
        ]
    }]))
}

async fn create_payment(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("orders/payments/create/", &headers);
    let n = state.payment_creates.fetch_add(1, Ordering::SeqCst) + 1;
    ok(json!({
        "id": 500 + n,
        "order": body["order_id"],
        "payment_id": format!("pay_{n}"),
        "payment_method": body["payment_method"],
        "amount": body["amount"],
        "status": "success"
    }))
}

async fn get_cart(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    state.record("cart/", &headers);
    let items = state
        .cart
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    ok(json!({"id": 1, "customer": 7, "items": items, "final_amount": "0.00"}))
}

async fn remove_cart_item(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.record(&format!("cart/{id}/delete/"), &headers);
    state
        .cart
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .retain(|line| line["id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

/// A running storefront wired to a [`FakeApi`].
pub struct TestStorefront {
    pub api: FakeApi,
    pub base_url: String,
}

impl TestStorefront {
    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Start a fake API and a storefront pointed at it.
///
/// # Panics
///
/// If either server cannot start.
#[allow(clippy::unwrap_used)]
pub async fn spawn_storefront() -> TestStorefront {
    let api = FakeApi::start().await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let config = StorefrontConfig {
        host: addr.ip(),
        port: addr.port(),
        base_url: base_url.clone(),
        api: ApiConfig::new(Url::parse(&api.base_url()).unwrap())
            .with_timeout(Duration::from_secs(5)),
        currency_symbol: "₹".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };

    let app = bazaar_storefront::app(AppState::new(config).unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    TestStorefront { api, base_url }
}

/// A browser-like client: keeps cookies, does not follow redirects.
///
/// # Panics
///
/// If the client cannot be built.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// The `Location` header of a redirect.
///
/// # Panics
///
/// If the response has no `Location`.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn location(response: &reqwest::Response) -> String {
    response.headers()[reqwest::header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

/// Log `client` in through the storefront form.
///
/// # Panics
///
/// If the storefront does not redirect to the dashboard.
#[allow(clippy::unwrap_used)]
pub async fn log_in(storefront: &TestStorefront, client: &reqwest::Client, email: &str) {
    let response = client
        .post(storefront.url("/login"))
        .form(&[("email", email), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}
