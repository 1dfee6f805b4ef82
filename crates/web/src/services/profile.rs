//! Profile service.
//!
//! Reads and updates user profiles on behalf of the logged-in browser. Every
//! call sends the session token through the API client's interceptor. A 401
//! from the API means the server no longer accepts the token, so the session
//! is cleared before the error is returned.

use chrono::Utc;
use thiserror::Error;

use portal_core::{ListQuery, SessionUser, UserId, UserListResponse, UserProfile};

use crate::api::{ApiClient, ApiError, ProfileUpdate};
use crate::session::{SessionError, SessionStorage};

/// Shown when a profile cannot be loaded.
pub const PROFILE_LOAD_FAILED: &str = "Failed to load profile.";

/// Shown when a profile update fails.
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile.";

/// Shown when the user list cannot be loaded.
pub const USERS_LOAD_FAILED: &str = "Failed to load users.";

/// Errors that can occur during profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The API rejected the request or could not be reached.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The update would not change anything.
    #[error("nothing to update")]
    EmptyUpdate,

    /// Session store failure.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

impl ProfileError {
    /// The message to show on the page.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(err) => err.user_message(fallback),
            Self::EmptyUpdate => "No changes to save.".to_string(),
            Self::Session(_) => fallback.to_string(),
        }
    }

    /// Whether the API rejected the session token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_unauthorized())
    }
}

/// Profile service.
pub struct ProfileService<'a> {
    api: &'a ApiClient,
    storage: &'a SessionStorage,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile service for one browser session.
    #[must_use]
    pub const fn new(api: &'a ApiClient, storage: &'a SessionStorage) -> Self {
        Self { api, storage }
    }

    /// Fetch a profile: the given user's, or the logged-in user's when `id`
    /// is `None`.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Api` if the API rejects the request.
    pub async fn get_profile(&self, id: Option<&UserId>) -> Result<UserProfile, ProfileError> {
        let token = self.storage.valid_token(Utc::now()).await?;
        let users = self.api.users();

        let result = match id {
            Some(id) => users.profile(token.as_ref(), id).await,
            None => users.current_profile(token.as_ref()).await,
        };
        self.check(result).await
    }

    /// Apply a partial update to the logged-in user's profile.
    ///
    /// On success the cached session user is replaced with the updated
    /// record.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::EmptyUpdate` if `update` has no fields, or
    /// `ProfileError::Api` if the API rejects the update.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ProfileError> {
        if update.is_empty() {
            return Err(ProfileError::EmptyUpdate);
        }

        let token = self.storage.valid_token(Utc::now()).await?;
        let result = self.api.users().update_profile(token.as_ref(), update).await;
        let profile = self.check(result).await?;

        self.storage.set_user(&SessionUser::from(profile.clone())).await?;
        tracing::info!(user_id = %profile.id, "profile updated");
        Ok(profile)
    }

    /// Fetch one page of users.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Api` if the API rejects the request.
    pub async fn list_users(&self, query: ListQuery) -> Result<UserListResponse, ProfileError> {
        let token = self.storage.valid_token(Utc::now()).await?;
        let result = self.api.users().list(token.as_ref(), query).await;
        self.check(result).await
    }

    /// Clear the session when the API says the token is no good.
    async fn check<T>(&self, result: Result<T, ApiError>) -> Result<T, ProfileError> {
        match result {
            Err(err) if err.is_unauthorized() => {
                tracing::info!("API rejected session token, clearing session");
                self.storage.clear().await?;
                Err(err.into())
            }
            other => Ok(other?),
        }
    }
}
