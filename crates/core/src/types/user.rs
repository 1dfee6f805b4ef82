//! User records exchanged with the REST API.
//!
//! Field names follow the API's JSON shape (`createdAt`, `updatedAt`), so the
//! structs here can be deserialized straight from response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, UserId};

/// The user record cached in the session next to the token.
///
/// This is the `user` object returned by login and registration. It is a
/// transient copy: nothing keeps it in sync with the server apart from an
/// explicit profile update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Server-assigned user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
}

impl SessionUser {
    /// Name shown in the page header, falling back to `"User"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() { "User" } else { name }
    }

    /// Uppercased first letter of each word of the name, or `"U"`.
    #[must_use]
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect();

        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}

impl From<UserProfile> for SessionUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
        }
    }
}

/// A full user profile as served by `/users/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Server-assigned user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Account role, when the API reports one (e.g. `"user"`, `"admin"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Account status, when the API reports one (e.g. `"active"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Pagination parameters for the user list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl ListQuery {
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Largest page size the API accepts.
    pub const MAX_LIMIT: u32 = 100;

    /// Build a query, clamping `page` to at least 1 and `limit` to `1..=100`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// One page of users from `/users/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListResponse {
    /// Users on this page.
    pub users: Vec<UserProfile>,
    /// Total number of users across all pages.
    pub total: u64,
    /// Page number. Older API revisions omit it; zero means "not reported".
    #[serde(default)]
    pub page: u32,
    /// Page size. Older API revisions omit it; zero means "not reported".
    #[serde(default)]
    pub limit: u32,
}

impl UserListResponse {
    /// Fill in `page` / `limit` from the request when the API left them out.
    #[must_use]
    pub fn with_query_defaults(mut self, query: ListQuery) -> Self {
        if self.page == 0 {
            self.page = query.page;
        }
        if self.limit == 0 {
            self.limit = query.limit;
        }
        self
    }

    /// Number of pages, at least 1.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        let limit = u64::from(self.limit.max(1));
        self.total.div_ceil(limit).max(1)
    }

    /// Whether a page before this one exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether a page after this one exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}
