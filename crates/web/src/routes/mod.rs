//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                 - Home page
//! GET  /health           - Health check
//!
//! # Auth
//! GET  /auth/login       - Login page
//! POST /auth/login       - Login action (rate limited)
//! GET  /auth/register    - Register page
//! POST /auth/register    - Register action (rate limited)
//! POST /auth/logout      - Logout action
//!
//! # Signed in (redirect to /auth/login otherwise)
//! GET  /dashboard        - Dashboard
//! GET  /profile          - Own profile
//! POST /profile          - Update own profile
//! GET  /users            - User directory (?page=&limit=)
//! GET  /users/{id}       - Another user's profile
//! ```

pub mod auth;
pub mod dashboard;
pub mod home;
pub mod profile;
pub mod users;

use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::{LOGIN_PATH, RateLimiterLayer};
use crate::services::ProfileError;
use crate::state::AppState;

/// Create the auth routes router. Form submissions go through `limiter`.
pub fn auth_routes(limiter: RateLimiterLayer) -> Router<AppState> {
    let submissions = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route_layer(limiter);

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .merge(submissions)
}

/// Create the user directory routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{id}", get(users::show))
}

/// Create all routes for the portal.
pub fn routes(limiter: RateLimiterLayer) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/profile", get(profile::show).post(profile::update))
        .nest("/users", user_routes())
        .nest("/auth", auth_routes(limiter))
}

/// Turn a failed profile call into a message for the page.
///
/// When the page cannot be shown at all the response to send instead is
/// returned as the error: a redirect to the login page after a rejected
/// token, or a 500 for a broken session store.
pub(crate) fn page_message(err: ProfileError, fallback: &str) -> Result<String, Response> {
    if err.is_unauthorized() {
        return Err(Redirect::to(LOGIN_PATH).into_response());
    }

    match err {
        ProfileError::Session(err) => Err(AppError::Session(err).into_response()),
        other => {
            tracing::warn!(error = %other, "profile request failed");
            Ok(other.user_message(fallback))
        }
    }
}
