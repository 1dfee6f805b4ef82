//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::middleware::OptionalAuth;
use crate::views::HeaderView;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub header: HeaderView,
}

/// Display the home page: sign-in links for visitors, a dashboard link
/// otherwise.
pub async fn home(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    let header = match &user {
        Some(user) => HeaderView::signed_in(Some(user)),
        None => HeaderView::guest(),
    };
    HomeTemplate { header }
}
