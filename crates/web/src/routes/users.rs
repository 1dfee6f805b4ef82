//! User directory route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use portal_core::{ListQuery, UserId};

use crate::middleware::RequireAuth;
use crate::services::ProfileService;
use crate::services::profile::{PROFILE_LOAD_FAILED, USERS_LOAD_FAILED};
use crate::session::SessionStorage;
use crate::state::AppState;
use crate::views::{HeaderView, ProfileView, UserListView};

use super::page_message;

/// Pagination query parameters, kept as text so a hand-edited URL never
/// fails extraction. Out-of-range numbers are clamped and anything that is
/// not a number falls back to the default.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    fn into_query(self) -> ListQuery {
        ListQuery::new(
            parse_number(self.page.as_deref(), 1),
            parse_number(self.limit.as_deref(), ListQuery::DEFAULT_LIMIT),
        )
    }
}

fn parse_number(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|raw| raw.trim().parse::<i64>().ok())
        .map_or(default, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}

/// User directory page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/list.html")]
pub struct UserListTemplate {
    pub header: HeaderView,
    pub list: Option<UserListView>,
    pub error: Option<String>,
}

/// Single user page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/show.html")]
pub struct UserTemplate {
    pub header: HeaderView,
    pub profile: Option<ProfileView>,
    pub error: Option<String>,
}

/// Display one page of users.
pub async fn index(
    State(state): State<AppState>,
    storage: SessionStorage,
    RequireAuth { user }: RequireAuth,
    Query(params): Query<ListParams>,
) -> Response {
    let mut page = UserListTemplate {
        header: HeaderView::signed_in(user.as_ref()),
        list: None,
        error: None,
    };

    let query = params.into_query();
    match ProfileService::new(state.api(), &storage).list_users(query).await {
        Ok(list) => page.list = Some(list.into()),
        Err(err) => match page_message(err, USERS_LOAD_FAILED) {
            Ok(message) => page.error = Some(message),
            Err(response) => return response,
        },
    }

    page.into_response()
}

/// Display another user's profile.
pub async fn show(
    State(state): State<AppState>,
    storage: SessionStorage,
    RequireAuth { user }: RequireAuth,
    Path(id): Path<String>,
) -> Response {
    let mut page = UserTemplate {
        header: HeaderView::signed_in(user.as_ref()),
        profile: None,
        error: None,
    };

    let id = UserId::new(id);
    match ProfileService::new(state.api(), &storage).get_profile(Some(&id)).await {
        Ok(profile) => page.profile = Some(profile.into()),
        Err(err) => match page_message(err, PROFILE_LOAD_FAILED) {
            Ok(message) => page.error = Some(message),
            Err(response) => return response,
        },
    }

    page.into_response()
}
