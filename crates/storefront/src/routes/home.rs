//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::Query, response::IntoResponse};

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::layout::{FlashQuery, Page};

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub page: Page,
}

/// Display the landing page.
pub async fn home(
    OptionalAuth(session): OptionalAuth,
    Query(flash): Query<FlashQuery>,
) -> impl IntoResponse {
    HomeTemplate {
        page: Page::new(session.as_ref(), flash),
    }
}
