//! Cart page and line removal.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use bazaar_core::{CartItemId, Price, ProductId};
use tracing::instrument;

use crate::api::CartLine;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::layout::{FlashQuery, Page, redirect_with_error, redirect_with_notice};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: CartItemId,
    pub product_id: Option<ProductId>,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub page: Page,
    pub lines: Vec<CartLineView>,
    pub total: String,
}

/// Sum of the derived line totals.
fn grand_total(lines: &[CartLine]) -> Price {
    lines.iter().map(CartLine::line_total).sum()
}

/// Display the cart.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Query(flash): Query<FlashQuery>,
) -> impl IntoResponse {
    let mut page = Page::new(Some(&session), flash);

    let lines = match state.api().get_cart(&session).await {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch cart");
            page = page.with_error(e.user_message());
            Vec::new()
        }
    };

    let total = state.money(grand_total(&lines));
    let lines = lines
        .iter()
        .map(|line| CartLineView {
            id: line.id,
            product_id: line.product.as_ref().map(|p| p.id),
            name: line
                .product
                .as_ref()
                .map_or_else(|| "Unknown Product".to_string(), |p| p.name.clone()),
            unit_price: state.money(line.product.as_ref().map_or(Price::ZERO, |p| p.price)),
            quantity: line.quantity.get(),
            line_total: state.money(line.line_total()),
        })
        .collect();

    CartTemplate { page, lines, total }
}

/// Remove a line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Path(id): Path<CartItemId>,
) -> Response {
    match state.api().remove_cart_item(&session, id).await {
        Ok(()) => {
            add_breadcrumb(
                "cart",
                "Removed from cart",
                Some(&[("cart_item_id", id.to_string().as_str())]),
            );
            redirect_with_notice("/cart", "Item removed from cart.").into_response()
        }
        Err(e) => {
            tracing::warn!(cart_item_id = %id, error = %e, "Remove from cart failed");
            redirect_with_error("/cart", &e.user_message()).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_grand_total_sums_derived_line_totals() {
        let lines: Vec<CartLine> = serde_json::from_value(serde_json::json!([
            {"id": 1, "product": {"id": 5, "name": "Kettle", "price": "12.50"}, "quantity": 2},
            {"id": 2, "product": {"id": 6, "name": "Mug", "price": 3}, "quantity": 3},
            {"id": 3, "product": null, "quantity": 4}
        ]))
        .unwrap();

        assert_eq!(grand_total(&lines).amount(), Decimal::new(3400, 2));
        assert_eq!(grand_total(&[]), Price::ZERO);
    }

    #[test]
    fn test_grand_total_saturates() {
        let lines: Vec<CartLine> = serde_json::from_value(serde_json::json!([
            {"id": 1, "product": {"id": 5, "name": "Yacht", "price": "100000000000000000000"}, "quantity": 4294967295u32},
            {"id": 2, "product": {"id": 6, "name": "Mug", "price": "3"}, "quantity": 1}
        ]))
        .unwrap();

        assert_eq!(grand_total(&lines), Price::MAX);
    }
}
