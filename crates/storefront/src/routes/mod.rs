//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /health                  - Health check
//!
//! # Auth
//! GET  /login                   - Login page
//! POST /login                   - Login action
//! GET  /register                - Register page
//! POST /register                - Register action
//! POST /logout                  - Logout action
//!
//! # Catalog (requires auth)
//! GET  /dashboard               - Product list with role-gated controls
//! GET  /categories              - Category list
//! GET  /products/new            - Seller create form
//! POST /products/new            - Seller create action
//! GET  /products/{id}           - Product detail
//! POST /products/{id}/cart      - Add to cart
//! POST /products/{id}/buy       - Buy now (order + payment)
//! GET  /products/{id}/edit      - Seller edit form
//! POST /products/{id}/edit      - Seller edit action
//! POST /products/{id}/delete    - Seller delete action
//!
//! # Orders & cart (requires auth)
//! GET  /orders                  - Order history
//! GET  /cart                    - Cart page
//! POST /cart/{id}/remove        - Remove a cart line
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod dashboard;
pub mod home;
pub mod layout;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/new", get(products::new_page).post(products::create))
        .route("/{id}", get(products::show))
        .route("/{id}/cart", post(products::add_to_cart))
        .route("/{id}/buy", post(products::buy_now))
        .route("/{id}/edit", get(products::edit_page).post(products::update))
        .route("/{id}/delete", post(products::delete))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/{id}/remove", post(cart::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Auth routes
        .merge(auth_routes())
        // Catalog
        .route("/dashboard", get(dashboard::index))
        .route("/categories", get(categories::index))
        .nest("/products", product_routes())
        // Orders & cart
        .route("/orders", get(orders::index))
        .nest("/cart", cart_routes())
}
