//! Portal web application library.
//!
//! Server-rendered login, registration, profile and dashboard pages backed by
//! a remote REST API. The browser's API token lives in a server-side session
//! and is attached to every API call as a bearer token.
//!
//! The binary in `main.rs` wires configuration, logging and the `SQLite`
//! session store around [`app::build_router`]; the end-to-end tests call the
//! same function with an in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod views;
