//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use portal_core::SessionUser;

use crate::middleware::RequireAuth;
use crate::views::HeaderView;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub header: HeaderView,
    pub user: Option<SessionUser>,
}

/// Display the dashboard for the signed-in user.
pub async fn dashboard(RequireAuth { user }: RequireAuth) -> impl IntoResponse {
    DashboardTemplate {
        header: HeaderView::signed_in(user.as_ref()),
        user,
    }
}
