//! Liveness endpoints
//!
//! - /ping   - Minimal liveness answer
//! - /health - Liveness plus build metadata and the active store backend

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use super::json_response;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    /// Short git commit the binary was built from
    pub commit: &'static str,
    pub build_time: &'static str,
    /// Active store backend ("sqlite" or "memory")
    pub store: &'static str,
}

/// GET /ping
pub fn handle_ping() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &PingResponse { message: "pong" })
}

/// GET /health
pub fn handle_health(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let response = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        store: state.store.backend(),
    };

    json_response(StatusCode::OK, &response)
}
