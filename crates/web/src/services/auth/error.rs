//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::session::SessionError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] portal_core::EmailError),

    /// Form input rejected before contacting the API. Carries the text shown
    /// to the user.
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// The API rejected the request or could not be reached.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The API accepted the credentials but sent no token.
    #[error("API response did not include a token")]
    MissingToken,

    /// Session store failure.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

impl AuthError {
    /// The message to show on the form.
    ///
    /// Validation problems and server-provided messages are shown as-is;
    /// everything else becomes `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::Validation(message) => (*message).to_string(),
            Self::Api(err) => err.user_message(fallback),
            Self::MissingToken | Self::Session(_) => fallback.to_string(),
        }
    }

    /// Whether this is a server-side failure worth reporting.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        match self {
            Self::Session(_) | Self::MissingToken => true,
            Self::Api(err) => err.status().is_none_or(|status| status.is_server_error()),
            Self::InvalidEmail(_) | Self::Validation(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    const FALLBACK: &str = "Login failed. Please check your credentials.";

    #[test]
    fn test_server_message_is_shown_verbatim() {
        let err = AuthError::Api(ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            message: Some("invalid email or password".to_string()),
        });
        assert_eq!(err.user_message(FALLBACK), "invalid email or password");
        assert!(!err.is_internal());
    }

    #[test]
    fn test_fallbacks() {
        let err = AuthError::Api(ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            message: None,
        });
        assert_eq!(err.user_message(FALLBACK), FALLBACK);
        assert!(err.is_internal());

        assert_eq!(AuthError::MissingToken.user_message(FALLBACK), FALLBACK);
    }

    #[test]
    fn test_validation_message() {
        let err = AuthError::Validation("Passwords do not match.");
        assert_eq!(err.user_message(FALLBACK), "Passwords do not match.");
        assert!(!err.is_internal());
    }
}
