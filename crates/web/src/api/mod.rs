//! REST API client.
//!
//! # Architecture
//!
//! - One shared `reqwest::Client` (connection pooling, timeout, user agent)
//! - Endpoint URLs are built from the configured base URL, one path segment
//!   at a time, so IDs are always percent-encoded
//! - Every request passes through the [`BearerAuth`] interceptor
//! - Non-2xx responses become [`ApiError::Status`] carrying the server's
//!   `error` / `message` text, if any
//!
//! # Endpoints
//!
//! ```text
//! POST  auth/login              AuthApi::login
//! POST  auth/register           AuthApi::register
//! GET   users/profile           UsersApi::current_profile
//! GET   users/profile/{id}      UsersApi::profile
//! PATCH users/profile           UsersApi::update_profile
//! GET   users/list?page&limit   UsersApi::list
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let api = ApiClient::new(&config.api)?;
//! let response = api.auth().login(&credentials).await?;
//! let token = response.token.expect("token");
//! let profile = api.users().current_profile(Some(&token)).await?;
//! ```

mod auth;
pub mod interceptor;
pub mod types;
mod users;

pub use auth::AuthApi;
pub use interceptor::BearerAuth;
pub use types::*;
pub use users::UsersApi;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

const USER_AGENT: &str = concat!("portal-web/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when talking to the REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {}", .message.as_deref().unwrap_or("(no message)"))]
    Status {
        status: StatusCode,
        /// The `error` or `message` field of the response body, verbatim.
        message: Option<String>,
    },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built from the base URL.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status of the failed call, when the API answered at all.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status(),
            Self::Parse(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Whether the API rejected the caller's token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// The message the server sent with the error, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The text to show the user: the server's message verbatim, or `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

/// Error body shapes used by the API: `{"error": "..."}` or `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        [self.error, self.message]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}

/// Extract the server-provided message from an error response body.
fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
}

/// Client for the REST API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built (for
    /// example when the TLS backend fails to initialize).
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Authentication endpoints.
    #[must_use]
    pub const fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// User profile endpoints.
    #[must_use]
    pub const fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    /// Build the URL for an endpoint from its path segments.
    ///
    /// Each segment is percent-encoded, so user-supplied IDs cannot change
    /// the path.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request, passing it through the bearer interceptor.
    pub(crate) fn request(&self, method: Method, url: Url, auth: BearerAuth<'_>) -> RequestBuilder {
        auth.apply(self.inner.client.request(method, url))
    }

    /// Send a request and decode a JSON response.
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::debug!(%status, path = %url, message = ?message, "API request failed");
            return Err(ApiError::Status { status, message });
        }

        tracing::debug!(%status, path = %url, "API request succeeded");
        Ok(serde_json::from_slice(&body)?)
    }
}
