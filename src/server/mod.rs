//! HTTP server for turnstile

pub mod http;

pub use http::{route, run, AppState};
