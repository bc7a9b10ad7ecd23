//! HTTP routes for balance accounts
//!
//! - GET /api/account      - Requesting principal's account
//! - GET /api/account/{id} - Account by id (owner only)

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use super::{parse_id, respond};
use crate::server::AppState;

/// GET /api/account
pub async fn handle_own_account<B>(req: Request<B>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let result = async {
        let ctx = state.authorizer.authorize_request(&req)?;
        state.accounts.own_account(&ctx).await
    }
    .await;

    respond(StatusCode::OK, result)
}

/// GET /api/account/{id}
pub async fn handle_account_by_id<B>(
    req: Request<B>,
    state: Arc<AppState>,
    id: &str,
) -> Response<Full<Bytes>> {
    let result = async {
        let ctx = state.authorizer.authorize_request(&req)?;
        let id = parse_id(id)?;
        state.accounts.account(&ctx, id).await
    }
    .await;

    respond(StatusCode::OK, result)
}
