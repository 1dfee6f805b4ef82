//! Authentication extractors.
//!
//! A browser counts as logged in while its session holds a token that has
//! not expired. Expired tokens are cleared as a side effect of extraction.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use portal_core::SessionUser;

use crate::error::AppError;
use crate::session::{SessionError, SessionStorage};

/// Where unauthenticated browsers are sent.
pub const LOGIN_PATH: &str = "/auth/login";

impl<S> FromRequestParts<S> for SessionStorage
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;
        Ok(Self::new(session))
    }
}

/// Extractor that requires a logged-in browser.
///
/// Redirects to the login page when no usable token is stored. `user` is the
/// cached record for the page header; it is `None` only if the session holds
/// a token without one.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAuth { user }: RequireAuth) -> impl IntoResponse {
///     HeaderView::from(user.as_ref()).name
/// }
/// ```
pub struct RequireAuth {
    pub user: Option<SessionUser>,
}

/// Error returned when authentication is required but the browser is not
/// logged in.
pub enum AuthRejection {
    /// No usable token; send the browser to the login page.
    RedirectToLogin,
    /// The session could not be read.
    Session(AppError),
}

impl From<SessionError> for AuthRejection {
    fn from(err: SessionError) -> Self {
        Self::Session(AppError::Session(err))
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Session(err) => err.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let storage = SessionStorage::from_request_parts(parts, state)
            .await
            .map_err(AuthRejection::Session)?;

        if storage.valid_token(Utc::now()).await?.is_none() {
            tracing::debug!(path = %parts.uri.path(), "not logged in, redirecting");
            return Err(AuthRejection::RedirectToLogin);
        }

        Ok(Self {
            user: storage.user().await?,
        })
    }
}

/// Extractor that optionally gets the logged-in user.
///
/// Unlike `RequireAuth`, this never rejects. Store errors are treated as
/// logged out.
pub struct OptionalAuth(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(storage) = SessionStorage::from_request_parts(parts, state).await else {
            return Ok(Self(None));
        };

        let logged_in = storage.is_logged_in(Utc::now()).await.unwrap_or(false);
        let user = if logged_in {
            storage.user().await.ok().flatten()
        } else {
            None
        };

        Ok(Self(user))
    }
}
