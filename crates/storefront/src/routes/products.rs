//! Product route handlers.
//!
//! Product pages show one of three control sets, picked once per render from
//! the viewer's role:
//! - signed out: no controls
//! - customer: quantity stepper, add-to-cart, buy-now
//! - seller: edit, delete
//!
//! Actions call the remote API and redirect back with a notice or error; a
//! failed action changes nothing locally.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use bazaar_core::{AuthSession, CategoryId, Price, ProductId, Quantity, Role, Viewer};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::api::{Category, OrderLineInput, Product, ProductInput};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::layout::{FlashQuery, Page, local_path, redirect_with_error, redirect_with_notice};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Image display data for templates.
#[derive(Debug, Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

/// Quantity stepper, add-to-cart and buy-now for one product.
#[derive(Debug, Clone)]
pub struct CustomerControls {
    pub product_id: ProductId,
    pub quantity: u32,
    pub line_total: String,
    pub decrement_href: String,
    pub increment_href: String,
    pub at_minimum: bool,
    /// Where actions send the user back to.
    pub return_to: String,
}

/// Edit and delete for one product.
#[derive(Debug, Clone)]
pub struct SellerControls {
    pub product_id: ProductId,
}

/// The control set a product renders with.
#[derive(Debug, Clone)]
pub enum ProductControls {
    Hidden,
    Customer(CustomerControls),
    Seller(SellerControls),
}

/// Which page a stepper link points back at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperTarget {
    Dashboard,
    Detail,
}

impl StepperTarget {
    /// URL showing `id` with `quantity` selected.
    #[must_use]
    pub fn href(self, id: ProductId, quantity: Quantity) -> String {
        match self {
            Self::Dashboard => format!("/dashboard?product={id}&qty={quantity}"),
            Self::Detail => format!("/products/{id}?qty={quantity}"),
        }
    }
}

impl ProductControls {
    /// Pick the control set for `viewer`.
    #[must_use]
    pub fn for_viewer(
        viewer: &Viewer,
        product: &Product,
        quantity: Quantity,
        target: StepperTarget,
        money: impl Fn(Price) -> String,
    ) -> Self {
        match viewer {
            Viewer::Unauthenticated => Self::Hidden,
            Viewer::Customer { .. } => Self::Customer(CustomerControls {
                product_id: product.id,
                quantity: quantity.get(),
                line_total: money(product.price.times(quantity.get())),
                decrement_href: target.href(product.id, quantity.decrement()),
                increment_href: target.href(product.id, quantity.increment()),
                at_minimum: quantity == Quantity::ONE,
                return_to: target.href(product.id, quantity),
            }),
            Viewer::Seller { .. } => Self::Seller(SellerControls {
                product_id: product.id,
            }),
        }
    }
}

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: u32,
    pub in_stock: bool,
    pub category: Option<String>,
    pub image: Option<ImageView>,
    pub controls: ProductControls,
}

impl ProductCard {
    #[must_use]
    pub fn build(
        state: &AppState,
        viewer: &Viewer,
        product: &Product,
        quantity: Quantity,
        target: StepperTarget,
    ) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: state.money(product.price),
            stock: product.quantity,
            in_stock: product.in_stock(),
            category: product.category.as_ref().map(|c| c.name.clone()),
            image: product.featured_image().map(|img| ImageView {
                url: state.api().media_url(&img.image),
                alt: img.alt_text.clone().unwrap_or_else(|| product.name.clone()),
            }),
            controls: ProductControls::for_viewer(viewer, product, quantity, target, |p| {
                state.money(p)
            }),
        }
    }
}

/// Category choice in the seller form.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: CategoryId,
    pub name: String,
    pub selected: bool,
}

/// Seller form field values.
#[derive(Debug, Clone, Default)]
pub struct ProductFormValues {
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: String,
    pub category: Option<CategoryId>,
}

impl From<&Product> for ProductFormValues {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            quantity: product.quantity.to_string(),
            category: product.category.as_ref().map(|c| c.id),
        }
    }
}

// =============================================================================
// Query / Form Types
// =============================================================================

/// Stepper state in the query string. Kept as strings so a bad value falls
/// back to the default instead of rejecting the page.
#[derive(Debug, Default, Deserialize)]
pub struct StepQuery {
    pub product: Option<String>,
    pub qty: Option<String>,
}

/// Parse a requested quantity; anything but a positive integer is 1.
#[must_use]
pub fn requested_quantity(raw: Option<&str>) -> Quantity {
    raw.and_then(|q| q.trim().parse::<u32>().ok())
        .and_then(|q| Quantity::new(q).ok())
        .unwrap_or_default()
}

/// Add-to-cart / buy-now form data.
#[derive(Debug, Deserialize)]
pub struct PurchaseForm {
    pub quantity: Option<String>,
    pub return_to: Option<String>,
}

/// Seller create/edit form data.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: String,
    pub category: String,
}

impl ProductForm {
    /// Validate locally before the round trip.
    ///
    /// # Errors
    ///
    /// Returns the message to show next to the form.
    pub fn parse(&self) -> Result<ProductInput, &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Product name is required.");
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err("Description is required.");
        }
        let price = Decimal::from_str(self.price.trim())
            .ok()
            .filter(|p| !p.is_sign_negative())
            .ok_or("Enter a valid price.")?;
        let quantity = self
            .quantity
            .trim()
            .parse::<u32>()
            .map_err(|_| "Enter a valid quantity.")?;
        let category = self
            .category
            .parse::<CategoryId>()
            .map_err(|_| "Please choose a category.")?;

        Ok(ProductInput {
            name: name.to_string(),
            description: description.to_string(),
            price: price.round_dp(2),
            quantity,
            category,
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub page: Page,
    pub product: Option<ProductCard>,
}

/// Seller create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub page: Page,
    pub heading: &'static str,
    pub action: String,
    pub values: ProductFormValues,
    pub categories: Vec<CategoryOption>,
}

fn category_options(categories: Vec<Category>, selected: Option<CategoryId>) -> Vec<CategoryOption> {
    categories
        .into_iter()
        .map(|c| CategoryOption {
            selected: Some(c.id) == selected,
            id: c.id,
            name: c.name,
        })
        .collect()
}

fn require_seller(session: &AuthSession) -> Option<Redirect> {
    (session.role() != Role::Seller)
        .then(|| redirect_with_error("/dashboard", "Only sellers can manage products."))
}

// =============================================================================
// Detail
// =============================================================================

/// Display a product with role-gated controls.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Path(id): Path<ProductId>,
    Query(flash): Query<FlashQuery>,
    Query(step): Query<StepQuery>,
) -> impl IntoResponse {
    let page = Page::new(Some(&session), flash);
    let quantity = requested_quantity(step.qty.as_deref());

    match state.api().get_product(Some(&session), id).await {
        Ok(product) => {
            let card = ProductCard::build(
                &state,
                &page.viewer,
                &product,
                quantity,
                StepperTarget::Detail,
            );
            ProductTemplate {
                page,
                product: Some(card),
            }
        }
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Failed to fetch product");
            ProductTemplate {
                page: page.with_error(e.user_message()),
                product: None,
            }
        }
    }
}

// =============================================================================
// Customer Actions
// =============================================================================

/// Add a quantity of a product to the cart.
///
/// The remote service models this as order creation.
#[instrument(skip(state, session, form))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<PurchaseForm>,
) -> Response {
    let quantity = requested_quantity(form.quantity.as_deref());
    let back = local_path(form.return_to.as_deref(), "/dashboard");

    let items = [OrderLineInput {
        product_id: id,
        quantity,
    }];

    match state.api().create_order(&session, &items).await {
        Ok(order) => {
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[
                    ("product_id", id.to_string().as_str()),
                    ("quantity", quantity.to_string().as_str()),
                    ("order_id", order.id.to_string().as_str()),
                ]),
            );
            redirect_with_notice(back, &format!("{quantity} item(s) added to cart!")).into_response()
        }
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Add to cart failed");
            redirect_with_error(back, &e.user_message()).into_response()
        }
    }
}

/// Order and pay for a quantity of a product in one step.
///
/// Not deduplicated: each submission places its own order.
#[instrument(skip(state, session, form))]
pub async fn buy_now(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<PurchaseForm>,
) -> Response {
    let quantity = requested_quantity(form.quantity.as_deref());
    let back = local_path(form.return_to.as_deref(), "/dashboard");

    let product = match state.api().get_product(Some(&session), id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Failed to fetch product for purchase");
            return redirect_with_error(back, &e.user_message()).into_response();
        }
    };

    match state
        .api()
        .buy_now(&session, id, product.price, quantity)
        .await
    {
        Ok((order, payment)) => {
            add_breadcrumb(
                "checkout",
                "Bought now",
                Some(&[
                    ("product_id", id.to_string().as_str()),
                    ("order_id", order.id.to_string().as_str()),
                    ("payment_id", payment.id.to_string().as_str()),
                ]),
            );
            let total = state.money(product.price.times(quantity.get()));
            redirect_with_notice(
                back,
                &format!("Purchased {quantity} item(s) successfully! Total: {total}"),
            )
            .into_response()
        }
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Buy now failed");
            redirect_with_error(back, &e.user_message()).into_response()
        }
    }
}

// =============================================================================
// Seller Actions
// =============================================================================

/// Display the empty create form.
#[instrument(skip(state, session))]
pub async fn new_page(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Query(flash): Query<FlashQuery>,
) -> Response {
    if let Some(redirect) = require_seller(&session) {
        return redirect.into_response();
    }

    let mut page = Page::new(Some(&session), flash);
    let categories = match state.api().list_categories(Some(&session)).await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch categories");
            page = page.with_error(e.user_message());
            Vec::new()
        }
    };

    ProductFormTemplate {
        page,
        heading: "Add product",
        action: "/products/new".to_string(),
        values: ProductFormValues::default(),
        categories: category_options(categories, None),
    }
    .into_response()
}

/// Handle the create form.
#[instrument(skip(state, session, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Form(form): Form<ProductForm>,
) -> Response {
    if let Some(redirect) = require_seller(&session) {
        return redirect.into_response();
    }

    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => return redirect_with_error("/products/new", message).into_response(),
    };

    match state.api().create_product(&session, &input).await {
        Ok(product) => {
            add_breadcrumb(
                "catalog",
                "Created product",
                Some(&[("product_id", product.id.to_string().as_str())]),
            );
            redirect_with_notice(
                &format!("/products/{}", product.id),
                "Product created successfully!",
            )
            .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Create product failed");
            redirect_with_error("/products/new", &e.user_message()).into_response()
        }
    }
}

/// Display the edit form, prefilled.
#[instrument(skip(state, session))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Path(id): Path<ProductId>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    if let Some(redirect) = require_seller(&session) {
        return redirect.into_response();
    }

    let (product, categories) = tokio::join!(
        state.api().get_product(Some(&session), id),
        state.api().list_categories(Some(&session)),
    );

    let product = match product {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Failed to fetch product for edit");
            return redirect_with_error("/dashboard", &e.user_message()).into_response();
        }
    };

    let mut page = Page::new(Some(&session), flash);
    let categories = match categories {
        Ok(categories) => categories,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch categories");
            page = page.with_error(e.user_message());
            Vec::new()
        }
    };

    let values = ProductFormValues::from(&product);
    let selected = values.category;

    ProductFormTemplate {
        page,
        heading: "Edit product",
        action: format!("/products/{id}/edit"),
        values,
        categories: category_options(categories, selected),
    }
    .into_response()
}

/// Handle the edit form.
#[instrument(skip(state, session, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Response {
    if let Some(redirect) = require_seller(&session) {
        return redirect.into_response();
    }

    let edit_path = format!("/products/{id}/edit");
    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => return redirect_with_error(&edit_path, message).into_response(),
    };

    match state.api().update_product(&session, id, &input).await {
        Ok(_) => {
            add_breadcrumb(
                "catalog",
                "Updated product",
                Some(&[("product_id", id.to_string().as_str())]),
            );
            redirect_with_notice(&format!("/products/{id}"), "Product updated successfully!")
                .into_response()
        }
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Update product failed");
            redirect_with_error(&edit_path, &e.user_message()).into_response()
        }
    }
}

/// Delete a product.
#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Path(id): Path<ProductId>,
) -> Response {
    if let Some(redirect) = require_seller(&session) {
        return redirect.into_response();
    }

    match state.api().delete_product(&session, id).await {
        Ok(()) => {
            add_breadcrumb(
                "catalog",
                "Deleted product",
                Some(&[("product_id", id.to_string().as_str())]),
            );
            redirect_with_notice("/dashboard", "Product deleted successfully!").into_response()
        }
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Delete product failed");
            redirect_with_error(&format!("/products/{id}"), &e.user_message()).into_response()
        }
    }
}
