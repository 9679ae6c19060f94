//! Category listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::api::Category;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::layout::{FlashQuery, Page};
use crate::state::AppState;

/// Categories page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub page: Page,
    pub categories: Vec<Category>,
}

/// Display all categories.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Query(flash): Query<FlashQuery>,
) -> impl IntoResponse {
    let page = Page::new(Some(&session), flash);

    match state.api().list_categories(Some(&session)).await {
        Ok(categories) => CategoriesTemplate { page, categories },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch categories");
            CategoriesTemplate {
                page: page.with_error(e.user_message()),
                categories: Vec::new(),
            }
        }
    }
}
