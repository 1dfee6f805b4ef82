//! Core types for Portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use user::{ListQuery, SessionUser, UserListResponse, UserProfile};
