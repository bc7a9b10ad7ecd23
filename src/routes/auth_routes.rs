//! HTTP routes for authentication
//!
//! - POST /api/login - Authenticate with email/password and get an access token
//! - GET  /api/me    - Identity resolved from the presented token

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{parse_json_body, respond, BoxError};
use crate::auth::IssuedToken;
use crate::db::PrincipalId;
use crate::server::AppState;
use crate::types::{Result, TurnstileError};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: PrincipalId,
    pub email: String,
    pub expires_at: u64,
}

/// POST /api/login
pub async fn handle_login<B>(req: Request<B>, state: Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    respond(StatusCode::OK, login(req, &state).await)
}

async fn login<B>(req: Request<B>, state: &AppState) -> Result<IssuedToken>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let body: LoginRequest = parse_json_body(req).await?;

    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(TurnstileError::BadRequest(
            "Missing required fields: email, password".into(),
        ));
    }

    Ok(state
        .authenticator
        .login(body.email.trim(), &body.password)
        .await?)
}

/// GET /api/me
pub async fn handle_me<B>(req: Request<B>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let result = state
        .authorizer
        .authorize_request(&req)
        .map(|ctx| MeResponse {
            user_id: ctx.principal_id,
            email: ctx.email,
            expires_at: ctx.expires_at,
        })
        .map_err(TurnstileError::from);

    respond(StatusCode::OK, result)
}
