//! Per-browser session storage.
//!
//! The token and the cached user live in the server-side session under two
//! fixed keys. A browser is logged in exactly when a non-blank token is
//! stored; the user record is written alongside it and is a display cache.
//!
//! # Keys
//!
//! ```text
//! token   raw bearer token (string)
//! user    SessionUser as JSON
//! ```

pub mod token;

use chrono::{DateTime, Utc};
use tower_sessions::Session;

use portal_core::SessionUser;

use crate::api::AccessToken;

pub use token::TokenClaims;

/// Error type for session store operations.
pub type SessionError = tower_sessions::session::Error;

/// Session keys for authentication data.
pub mod keys {
    /// Key for the bearer token issued by the API.
    pub const TOKEN: &str = "token";

    /// Key for the cached user record.
    pub const USER: &str = "user";
}

/// Typed access to the authentication state in a session.
#[derive(Clone)]
pub struct SessionStorage {
    session: Session,
}

impl SessionStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Persist a fresh login.
    ///
    /// The session ID is cycled first so a pre-login cookie cannot be reused
    /// to ride the new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn store(&self, token: &AccessToken, user: &SessionUser) -> Result<(), SessionError> {
        self.session.cycle_id().await?;
        self.session.insert(keys::TOKEN, token.expose()).await?;
        self.session.insert(keys::USER, user).await?;
        tracing::debug!(user_id = %user.id, "stored session token");
        Ok(())
    }

    /// The stored token, if any. Blank tokens count as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn token(&self) -> Result<Option<AccessToken>, SessionError> {
        let token = self.session.get::<String>(keys::TOKEN).await?;
        Ok(token.map(AccessToken::from).filter(|t| !t.is_blank()))
    }

    /// The stored token if it has not expired at `now`.
    ///
    /// An expired token clears the whole session, so the browser ends up
    /// logged out rather than holding a token the API will reject.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn valid_token(&self, now: DateTime<Utc>) -> Result<Option<AccessToken>, SessionError> {
        let Some(token) = self.token().await? else {
            return Ok(None);
        };

        if token::is_expired(token.expose(), now) {
            tracing::info!("session token expired, clearing session");
            self.clear().await?;
            return Ok(None);
        }

        Ok(Some(token))
    }

    /// The cached user record, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn user(&self) -> Result<Option<SessionUser>, SessionError> {
        self.session.get::<SessionUser>(keys::USER).await
    }

    /// Replace the cached user record, leaving the token alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn set_user(&self, user: &SessionUser) -> Result<(), SessionError> {
        self.session.insert(keys::USER, user).await
    }

    /// Whether a usable token is stored at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn is_logged_in(&self, now: DateTime<Utc>) -> Result<bool, SessionError> {
        Ok(self.valid_token(now).await?.is_some())
    }

    /// Remove the token and the user, and drop the session record.
    ///
    /// Safe to call on a session that holds nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.session.flush().await
    }
}
