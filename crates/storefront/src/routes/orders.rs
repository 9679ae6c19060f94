//! Order history.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use bazaar_core::{OrderId, OrderStatus};
use tracing::instrument;

use crate::api::Order;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::layout::{FlashQuery, Page};
use crate::state::AppState;

/// One order item line, rendered as `name × qty = total`.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub total: String,
}

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: String,
    pub placed_at: Option<String>,
    pub lines: Vec<OrderLineView>,
}

impl OrderView {
    fn build(state: &AppState, order: &Order) -> Self {
        Self {
            id: order.id,
            status: order.status,
            total: state.money(order.total_amount),
            placed_at: order
                .created_at
                .map(|at| at.format("%b %-d, %Y %H:%M").to_string()),
            lines: order
                .items
                .iter()
                .map(|item| OrderLineView {
                    name: item.product_name().to_string(),
                    quantity: item.quantity,
                    total: state.money(item.total_price),
                })
                .collect(),
        }
    }
}

/// Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders.html")]
pub struct OrdersTemplate {
    pub page: Page,
    pub orders: Vec<OrderView>,
}

/// Display the current user's orders.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Query(flash): Query<FlashQuery>,
) -> impl IntoResponse {
    let mut page = Page::new(Some(&session), flash);

    let orders = match state.api().list_orders(&session).await {
        Ok(orders) => orders.iter().map(|o| OrderView::build(&state, o)).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch orders");
            page = page.with_error(e.user_message());
            Vec::new()
        }
    };

    OrdersTemplate { page, orders }
}
