//! Business logic services for the portal.
//!
//! # Services
//!
//! - `auth` - Login, registration and logout (token lifecycle in the session)
//! - `profile` - Profile reads, partial updates and the user list
//!
//! Both are constructed per request from the shared [`ApiClient`] and the
//! browser's [`SessionStorage`]:
//!
//! ```rust,ignore
//! let auth = AuthService::new(state.api(), &storage);
//! let user = auth.login(&form.email, password).await?;
//! ```
//!
//! [`ApiClient`]: crate::api::ApiClient
//! [`SessionStorage`]: crate::session::SessionStorage

pub mod auth;
pub mod profile;

pub use auth::{AuthError, AuthService, Registration};
pub use profile::{ProfileError, ProfileService};
