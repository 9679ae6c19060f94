//! Dashboard: the product list with role-gated controls.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use bazaar_core::{ProductId, Quantity};
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::layout::{FlashQuery, Page};
use crate::routes::products::{
    ProductCard, ProductControls, StepQuery, StepperTarget, requested_quantity,
};
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: Page,
    pub products: Vec<ProductCard>,
}

/// Quantity selected for `id`: the stepper's value for the product it
/// names, 1 for every other product.
fn selected_quantity(step: &StepQuery, id: ProductId) -> Quantity {
    let stepped = step
        .product
        .as_deref()
        .and_then(|p| p.parse::<ProductId>().ok());

    if stepped == Some(id) {
        requested_quantity(step.qty.as_deref())
    } else {
        Quantity::ONE
    }
}

/// Display the dashboard.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Query(flash): Query<FlashQuery>,
    Query(step): Query<StepQuery>,
) -> impl IntoResponse {
    let mut page = Page::new(Some(&session), flash);

    let products = match state.api().list_products(Some(&session)).await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch products");
            page = page.with_error(e.user_message());
            Vec::new()
        }
    };

    let products = products
        .iter()
        .map(|product| {
            ProductCard::build(
                &state,
                &page.viewer,
                product,
                selected_quantity(&step, product.id),
                StepperTarget::Dashboard,
            )
        })
        .collect();

    DashboardTemplate { page, products }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(product: Option<&str>, qty: Option<&str>) -> StepQuery {
        StepQuery {
            product: product.map(String::from),
            qty: qty.map(String::from),
        }
    }

    #[test]
    fn test_default_quantity_is_one_for_every_product() {
        let none = StepQuery::default();
        for id in 1..=20 {
            assert_eq!(selected_quantity(&none, ProductId::new(id)), Quantity::ONE);
        }
    }

    #[test]
    fn test_stepper_overrides_one_product() {
        let step = step(Some("3"), Some("4"));
        assert_eq!(selected_quantity(&step, ProductId::new(3)).get(), 4);
        assert_eq!(selected_quantity(&step, ProductId::new(2)), Quantity::ONE);
    }

    #[test]
    fn test_bad_stepper_values_fall_back() {
        assert_eq!(
            selected_quantity(&step(Some("3"), Some("0")), ProductId::new(3)),
            Quantity::ONE
        );
        assert_eq!(
            selected_quantity(&step(Some("x"), Some("5")), ProductId::new(3)),
            Quantity::ONE
        );
    }
}
