//! HTTP routes for principals
//!
//! - POST /api/users      - Register (public)
//! - PUT  /api/users/{id} - Replace own profile (authorized, owner only)

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use super::{parse_id, parse_json_body, respond, BoxError};
use crate::server::AppState;
use crate::services::{ProfileUpdateRequest, RegisterRequest};

/// POST /api/users
pub async fn handle_register<B>(req: Request<B>, state: Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let result = async {
        let body: RegisterRequest = parse_json_body(req).await?;
        state.users.register(body).await
    }
    .await;

    respond(StatusCode::CREATED, result)
}

/// PUT /api/users/{id}
pub async fn handle_update_user<B>(
    req: Request<B>,
    state: Arc<AppState>,
    id: &str,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let result = async {
        let ctx = state.authorizer.authorize_request(&req)?;
        let id = parse_id(id)?;
        let body: ProfileUpdateRequest = parse_json_body(req).await?;
        state.users.update(&ctx, id, body).await
    }
    .await;

    respond(StatusCode::OK, result)
}
