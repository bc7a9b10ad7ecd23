//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo, one task per connection.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::auth::{Argon2Hasher, Authenticator, PasswordHasher, RequestAuthorizer, TokenCodec};
use crate::config::Args;
use crate::db::{CredentialStore, Store};
use crate::routes::{self, BoxError};
use crate::services::{AccountService, EventService, UserService};
use crate::types::{ErrorBody, Result, TurnstileError};

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub store: Arc<dyn Store>,
    pub authenticator: Authenticator,
    pub authorizer: RequestAuthorizer,
    pub users: UserService,
    pub accounts: AccountService,
    pub events: EventService,
}

impl AppState {
    /// Wire every component around one store and one token codec
    pub fn new<S: Store + 'static>(args: Args, store: Arc<S>, codec: TokenCodec) -> Self {
        let codec = Arc::new(codec);
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let store: Arc<dyn Store> = store;

        Self {
            args,
            authenticator: Authenticator::new(credentials, Arc::clone(&hasher), Arc::clone(&codec)),
            authorizer: RequestAuthorizer::new(codec),
            users: UserService::new(Arc::clone(&store), hasher),
            accounts: AccountService::new(Arc::clone(&store)),
            events: EventService::new(Arc::clone(&store)),
            store,
        }
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Turnstile listening on {} (store: {})",
        state.args.listen,
        state.store.backend()
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    info!("[{}] {} {}", addr, req.method(), req.uri().path());
    Ok(route(state, req).await)
}

/// Paths the router knows, with any id segment still unparsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint<'a> {
    Ping,
    Health,
    Login,
    Me,
    Users,
    User(&'a str),
    Account,
    AccountById(&'a str),
    Events,
    Event(&'a str),
}

/// Single non-empty path segment after `prefix`
fn id_segment<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
}

fn endpoint(path: &str) -> Option<Endpoint<'_>> {
    let path = path.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(path);

    let endpoint = match path {
        "/ping" => Endpoint::Ping,
        "/health" => Endpoint::Health,
        "/api/login" => Endpoint::Login,
        "/api/me" => Endpoint::Me,
        "/api/users" => Endpoint::Users,
        "/api/account" => Endpoint::Account,
        "/api/events" => Endpoint::Events,
        p => {
            if let Some(id) = id_segment(p, "/api/users/") {
                Endpoint::User(id)
            } else if let Some(id) = id_segment(p, "/api/account/") {
                Endpoint::AccountById(id)
            } else if let Some(id) = id_segment(p, "/api/events/") {
                Endpoint::Event(id)
            } else {
                return None;
            }
        }
    };
    Some(endpoint)
}

/// Route a request to its handler
///
/// Generic over the body so tests can call it without a socket.
pub async fn route<B>(state: Arc<AppState>, req: Request<B>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    if req.method() == Method::OPTIONS {
        return routes::cors_preflight();
    }

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let Some(endpoint) = endpoint(&path) else {
        return routes::error_response(TurnstileError::NotFound(format!(
            "no route for {}",
            path
        )));
    };

    match (method, endpoint) {
        (Method::GET, Endpoint::Ping) => routes::handle_ping(),
        (Method::GET, Endpoint::Health) => routes::handle_health(state),

        (Method::POST, Endpoint::Login) => routes::handle_login(req, state).await,
        (Method::GET, Endpoint::Me) => routes::handle_me(req, state).await,

        (Method::POST, Endpoint::Users) => routes::handle_register(req, state).await,
        (Method::PUT, Endpoint::User(id)) => routes::handle_update_user(req, state, id).await,

        (Method::GET, Endpoint::Account) => routes::handle_own_account(req, state).await,
        (Method::GET, Endpoint::AccountById(id)) => {
            routes::handle_account_by_id(req, state, id).await
        }

        (Method::POST, Endpoint::Events) => routes::handle_create_event(req, state).await,
        (Method::GET, Endpoint::Event(id)) => routes::handle_get_event(state, id).await,
        (Method::PUT, Endpoint::Event(id)) => routes::handle_update_event(req, state, id).await,

        (method, _) => method_not_allowed(&method, &path),
    }
}

fn method_not_allowed(method: &Method, path: &str) -> Response<Full<Bytes>> {
    routes::json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorBody {
            error: format!("method {} not allowed on {}", method, path),
            code: "METHOD_NOT_ALLOWED",
        },
    )
}
