//! Shared harness for router-level tests

#![allow(dead_code)]

use bytes::Bytes;
use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

use turnstile::auth::TokenCodec;
use turnstile::config::Args;
use turnstile::db::MemoryStore;
use turnstile::server::{route, AppState};

pub const SECRET: &str = "integration-secret-that-is-at-least-32-chars";

pub struct Harness {
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub codec: TokenCodec,
}

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Harness {
    pub fn new() -> Self {
        let args = Args::parse_from(["turnstile", "--jwt-secret", SECRET, "--memory-store"]);
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(args, Arc::clone(&store), TokenCodec::new(SECRET).unwrap());

        Self {
            state: Arc::new(state),
            store,
            codec: TokenCodec::new(SECRET).unwrap(),
        }
    }

    /// Send a request through the router
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        let bytes = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Bytes::from(value.to_string())
            }
            None => Bytes::new(),
        };
        let request = builder.body(Full::new(bytes)).unwrap();

        let response = route(Arc::clone(&self.state), request).await;
        let status = response.status();
        let raw = response.into_body().collect().await.unwrap().to_bytes();
        let body = if raw.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&raw).unwrap()
        };

        Reply { status, body }
    }

    /// Register a principal through the API and return its user id
    pub async fn register(&self, email: &str, password: &str) -> i64 {
        let reply = self
            .send(
                Method::POST,
                "/api/users",
                None,
                Some(json!({
                    "firstname": "Ada",
                    "lastname": "Lovelace",
                    "dni": 30111222,
                    "email": email,
                    "password": password,
                    "phone": "+54 11 5555 0000"
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.body["user_id"].as_i64().unwrap()
    }

    /// Log in through the API and return the bearer header value
    pub async fn login(&self, email: &str, password: &str) -> String {
        let reply = self
            .send(
                Method::POST,
                "/api/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        format!("Bearer {}", reply.body["token"].as_str().unwrap())
    }

    /// Bearer header for an arbitrary subject, minted with the process secret
    pub fn bearer_for(&self, subject: i64) -> String {
        let issued = self
            .codec
            .issue(&subject.to_string(), "minted@x.com")
            .unwrap();
        format!("Bearer {}", issued.token)
    }
}

pub fn event_body(name: &str) -> Value {
    json!({
        "name": name,
        "start_date": "2026-05-01T20:00:00Z",
        "end_date": "2026-05-01T23:00:00Z",
        "capacity": 300,
        "location": {
            "latitude": -34.6,
            "longitude": -58.4,
            "location_name": "Luna Park"
        }
    })
}
