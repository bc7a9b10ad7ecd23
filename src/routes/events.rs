//! HTTP routes for events
//!
//! - POST /api/events      - Create, owned by the requester (authorized)
//! - GET  /api/events/{id} - Public read
//! - PUT  /api/events/{id} - Replace (authorized, owner only)

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use super::{parse_id, parse_json_body, respond, BoxError};
use crate::db::EventInput;
use crate::server::AppState;

/// POST /api/events
pub async fn handle_create_event<B>(req: Request<B>, state: Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let result = async {
        let ctx = state.authorizer.authorize_request(&req)?;
        let input: EventInput = parse_json_body(req).await?;
        state.events.create(&ctx, input).await
    }
    .await;

    respond(StatusCode::CREATED, result)
}

/// GET /api/events/{id}
pub async fn handle_get_event(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    let result = async {
        let id = parse_id(id)?;
        state.events.get(id).await
    }
    .await;

    respond(StatusCode::OK, result)
}

/// PUT /api/events/{id}
pub async fn handle_update_event<B>(
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
        let input: EventInput = parse_json_body(req).await?;
        state.events.update(&ctx, id, input).await
    }
    .await;

    respond(StatusCode::OK, result)
}
