//! Display models handed to templates.
//!
//! Templates only print strings and flags; formatting (dates, initials,
//! pagination links) happens here.

use chrono::{DateTime, Utc};

use portal_core::{SessionUser, UserListResponse, UserProfile};

/// Page header: who is signed in, if anyone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub signed_in: bool,
    pub name: String,
    pub initials: String,
}

impl HeaderView {
    /// Header for an anonymous visitor.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            signed_in: false,
            name: String::new(),
            initials: String::new(),
        }
    }

    /// Header for a signed-in browser. An unknown user shows as "User" / "U".
    #[must_use]
    pub fn signed_in(user: Option<&SessionUser>) -> Self {
        let (name, initials) = user.map_or_else(
            || ("User".to_string(), "U".to_string()),
            |user| (user.display_name().to_string(), user.initials()),
        );

        Self {
            signed_in: true,
            name,
            initials,
        }
    }
}

/// A profile as shown on the profile and user pages.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub initials: String,
    pub role: Option<String>,
    pub status: Option<String>,
    pub joined: String,
    pub updated: String,
}

impl From<UserProfile> for ProfileView {
    fn from(profile: UserProfile) -> Self {
        let joined = format_date(profile.created_at);
        let updated = format_date(profile.updated_at);
        let role = profile.role.clone();
        let status = profile.status.clone();
        let user = SessionUser::from(profile);

        Self {
            id: user.id.to_string(),
            initials: user.initials(),
            name: user.display_name().to_string(),
            email: user.email.to_string(),
            role,
            status,
            joined,
            updated,
        }
    }
}

/// One page of the user directory.
#[derive(Debug, Clone)]
pub struct UserListView {
    pub users: Vec<ProfileView>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
    pub limit: u32,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl From<UserListResponse> for UserListView {
    fn from(list: UserListResponse) -> Self {
        let previous_page = list.has_previous().then(|| list.page.saturating_sub(1));
        let next_page = list.has_next().then(|| list.page.saturating_add(1));

        Self {
            total: list.total,
            page: list.page,
            total_pages: list.total_pages(),
            limit: list.limit,
            previous_page,
            next_page,
            users: list.users.into_iter().map(ProfileView::from).collect(),
        }
    }
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use portal_core::{Email, UserId};

    use super::*;

    fn profile(id: &str, name: &str) -> UserProfile {
        UserProfile {
            id: UserId::new(id),
            name: name.to_string(),
            email: Email::parse("jane@example.com").unwrap(),
            role: Some("admin".to_string()),
            status: None,
            created_at: "2024-03-01T10:00:00Z".parse().unwrap(),
            updated_at: "2024-03-05T10:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_header_fallbacks() {
        let header = HeaderView::signed_in(None);
        assert_eq!(header.name, "User");
        assert_eq!(header.initials, "U");
        assert!(header.signed_in);
        assert!(!HeaderView::guest().signed_in);
    }

    #[test]
    fn test_profile_view_formats_dates() {
        let view = ProfileView::from(profile("u1", "Jane Doe"));
        assert_eq!(view.joined, "Mar 1, 2024");
        assert_eq!(view.updated, "Mar 5, 2024");
        assert_eq!(view.initials, "JD");
        assert_eq!(view.role.as_deref(), Some("admin"));
    }

    #[test]
    fn test_list_view_links() {
        let list = UserListResponse {
            users: vec![profile("u1", "Jane"), profile("u2", "Ada")],
            total: 25,
            page: 2,
            limit: 10,
        };
        let view = UserListView::from(list);
        assert_eq!(view.previous_page, Some(1));
        assert_eq!(view.next_page, Some(3));
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.users.len(), 2);
    }
}
