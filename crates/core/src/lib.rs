//! Portal Core - Shared types library.
//!
//! This crate provides common types used across all Portal components:
//! - `web` - The server-rendered login, registration, profile and dashboard site
//! - `integration-tests` - End-to-end tests against a mocked REST API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for user IDs and emails, plus user records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
