//! HTTP routes for turnstile
//!
//! Handlers are generic over the request body so the router can be driven
//! by `hyper::body::Incoming` in the server and by in-memory bodies in
//! tests.

pub mod accounts;
pub mod auth_routes;
pub mod events;
pub mod health;
pub mod users;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE,
};
use hyper::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::types::{Result, TurnstileError};

pub use accounts::{handle_account_by_id, handle_own_account};
pub use auth_routes::{handle_login, handle_me};
pub use events::{handle_create_event, handle_get_event, handle_update_event};
pub use health::{handle_health, handle_ping};
pub use users::{handle_register, handle_update_user};

/// Largest JSON body accepted
pub const MAX_BODY_BYTES: usize = 10 * 1024;

/// Error type request bodies must convert into
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn with_cors(response: &mut Response<Full<Bytes>>) {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
}

/// JSON response with CORS headers
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(&mut response);
    response
}

/// Render a boundary error as the shared `{error, code}` body
pub fn error_response(err: TurnstileError) -> Response<Full<Bytes>> {
    match &err {
        TurnstileError::Database(detail)
        | TurnstileError::Internal(detail)
        | TurnstileError::Config(detail) => error!("Request failed: {}", detail),
        other => debug!("Request rejected: {}", other),
    }

    let (status, body) = err.into_status_code_and_body();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(&mut response);
    response
}

/// Render a handler result
pub fn respond<T: Serialize>(status: StatusCode, result: Result<T>) -> Response<Full<Bytes>> {
    match result {
        Ok(body) => json_response(status, &body),
        Err(e) => error_response(e),
    }
}

/// Empty 204 answer to a CORS preflight
pub fn cors_preflight() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    with_cors(&mut response);
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    response
}

/// Read and decode a JSON body of at most [`MAX_BODY_BYTES`]
pub async fn parse_json_body<T, B>(req: Request<B>) -> Result<T>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<BoxError>,
{
    let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                TurnstileError::BadRequest("Request body too large".into())
            } else {
                TurnstileError::BadRequest(format!("Failed to read body: {}", e))
            }
        })?;

    Ok(serde_json::from_slice(&body.to_bytes())?)
}

/// Parse a numeric path segment
pub fn parse_id<T: std::str::FromStr>(segment: &str) -> Result<T> {
    segment
        .parse()
        .map_err(|_| TurnstileError::BadRequest(format!("invalid id: {:?}", segment)))
}
