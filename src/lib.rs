//! Turnstile - credential and access-token gate
//!
//! Issues short-lived signed access tokens after an email/password login,
//! checks them on every protected request and lets only the owner of a
//! resource touch it.
//!
//! ## Components
//!
//! - **Token codec**: HS256 JWT issue and verification
//! - **Authenticator**: email/password login
//! - **Request authorizer**: Bearer token check per request
//! - **Ownership guard**: requester vs. resource owner
//! - **Stores**: principals, accounts and events (SQLite or in-memory)

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, TurnstileError};
