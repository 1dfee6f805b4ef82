//! Authentication service.
//!
//! Exchanges credentials with the REST API and keeps the resulting token and
//! user record in the browser's session. Storage is only written once a
//! login or registration has fully succeeded, so a failed attempt leaves the
//! previous state untouched.

mod error;

pub use error::AuthError;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};

use portal_core::{Email, SessionUser};

use crate::api::{AccessToken, ApiClient, AuthResponse, LoginRequest, RegisterRequest};
use crate::session::SessionStorage;

/// Shown when a login fails without a server message.
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

/// Shown when a registration fails without a server message.
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Registration form input, before validation.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

/// Authentication service.
///
/// Handles login, registration and logout against the API and the session.
pub struct AuthService<'a> {
    api: &'a ApiClient,
    storage: &'a SessionStorage,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service for one browser session.
    #[must_use]
    pub const fn new(api: &'a ApiClient, storage: &'a SessionStorage) -> Self {
        Self { api, storage }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed,
    /// `AuthError::Validation` if the password is empty, or `AuthError::Api`
    /// with the server's message if the API rejects the credentials.
    pub async fn login(&self, email: &str, password: SecretString) -> Result<SessionUser, AuthError> {
        let email = Email::parse(email)?;
        if password.expose_secret().is_empty() {
            return Err(AuthError::Validation("Password is required."));
        }

        self.login_with(&LoginRequest { email, password }).await
    }

    /// Create an account and log in to it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` / `AuthError::InvalidEmail` for bad
    /// form input (no request is made), or `AuthError::Api` with the
    /// server's message if the API rejects the registration.
    pub async fn register(&self, registration: Registration) -> Result<SessionUser, AuthError> {
        let request = validate_registration(registration)?;
        let current = self.storage.token().await?;
        let response = self.api.auth().register(current.as_ref(), &request).await?;

        match usable_token(&response).cloned() {
            Some(token) => {
                let user = self.resolve_user(&token, response.user).await?;
                self.storage.store(&token, &user).await?;
                tracing::info!(user_id = %user.id, "user registered");
                Ok(user)
            }
            None => {
                tracing::debug!("registration returned no token, logging in");
                self.login_with(&request.credentials()).await
            }
        }
    }

    /// Clear the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.storage.clear().await?;
        tracing::info!("user logged out");
        Ok(())
    }

    /// Whether the browser holds a token that has not expired.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn is_logged_in(&self) -> Result<bool, AuthError> {
        Ok(self.storage.is_logged_in(Utc::now()).await?)
    }

    /// The stored token, if it is still usable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn token(&self) -> Result<Option<AccessToken>, AuthError> {
        Ok(self.storage.valid_token(Utc::now()).await?)
    }

    /// The cached user record, if logged in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn user(&self) -> Result<Option<SessionUser>, AuthError> {
        if !self.is_logged_in().await? {
            return Ok(None);
        }
        Ok(self.storage.user().await?)
    }

    async fn login_with(&self, credentials: &LoginRequest) -> Result<SessionUser, AuthError> {
        let current = self.storage.token().await?;
        let response = self.api.auth().login(current.as_ref(), credentials).await?;
        let token = usable_token(&response).cloned().ok_or(AuthError::MissingToken)?;
        let user = self.resolve_user(&token, response.user).await?;

        self.storage.store(&token, &user).await?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    /// The user from the auth response, or the profile fetched with `token`.
    async fn resolve_user(
        &self,
        token: &AccessToken,
        user: Option<SessionUser>,
    ) -> Result<SessionUser, AuthError> {
        if let Some(user) = user {
            return Ok(user);
        }

        tracing::debug!("auth response had no user, fetching profile");
        let profile = self.api.users().current_profile(Some(token)).await?;
        Ok(profile.into())
    }
}

fn usable_token(response: &AuthResponse) -> Option<&AccessToken> {
    response.token.as_ref().filter(|token| !token.is_blank())
}

/// Check registration input and build the API request.
fn validate_registration(registration: Registration) -> Result<RegisterRequest, AuthError> {
    let name = registration.name.trim();
    if name.is_empty() {
        return Err(AuthError::Validation("Name is required."));
    }

    let email = Email::parse(&registration.email)?;

    let password = registration.password.expose_secret();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation("Password must be at least 6 characters."));
    }
    if password != registration.confirm_password.expose_secret() {
        return Err(AuthError::Validation("Passwords do not match."));
    }

    Ok(RegisterRequest {
        name: name.to_string(),
        email,
        password: registration.password,
    })
}
