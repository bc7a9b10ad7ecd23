//! Login, token checks and ownership through the router

mod common;

use hyper::{Method, StatusCode};
use serde_json::json;

use common::{event_body, Harness};
use turnstile::auth::jwt::{unix_now, TOKEN_TTL_SECS};
use turnstile::db::{EventStore, EventInput, PrincipalId};

#[tokio::test]
async fn login_issues_verifiable_token() {
    let h = Harness::new();
    let user_id = h.register("a@x.com", "secret123").await;

    let reply = h
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let token = reply.body["token"].as_str().unwrap();
    let claims = h.codec.verify(token).unwrap();
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(reply.body["expires_at"].as_u64().unwrap(), claims.exp);
    assert!(claims.exp > unix_now());
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let h = Harness::new();
    h.register("a@x.com", "secret123").await;

    let wrong_password = h
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "wrong" })),
        )
        .await;
    let unknown_email = h
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "nobody@x.com", "password": "secret123" })),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["error"], "invalid credentials");
    assert_eq!(wrong_password.body["code"], "UNAUTHORIZED");
    assert_eq!(unknown_email.status, wrong_password.status);
    assert_eq!(unknown_email.body, wrong_password.body);
}

#[tokio::test]
async fn login_requires_both_fields() {
    let h = Harness::new();
    let reply = h
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "a@x.com" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn missing_and_invalid_credentials() {
    let h = Harness::new();

    let missing = h.send(Method::GET, "/api/account", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        missing.body["error"],
        "request does not contain an access token"
    );

    let garbage = h
        .send(Method::GET, "/api/account", Some("Bearer garbage"), None)
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.body["error"], "invalid access token");
}

#[tokio::test]
async fn raw_token_without_scheme_is_rejected() {
    let h = Harness::new();
    let user_id = h.register("a@x.com", "secret123").await;
    let bearer = h.bearer_for(user_id);
    let raw = bearer.trim_start_matches("Bearer ");

    let reply = h.send(Method::GET, "/api/me", Some(raw), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "invalid access token");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let h = Harness::new();
    let issued = h
        .codec
        .issue_at("1", "a@x.com", unix_now() - 2 * TOKEN_TTL_SECS)
        .unwrap();

    let reply = h
        .send(
            Method::GET,
            "/api/me",
            Some(&format!("Bearer {}", issued.token)),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "invalid access token");
}

#[tokio::test]
async fn me_reports_resolved_identity() {
    let h = Harness::new();
    let user_id = h.register("a@x.com", "secret123").await;
    let bearer = h.login("a@x.com", "secret123").await;

    let reply = h.send(Method::GET, "/api/me", Some(&bearer), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["user_id"], user_id);
    assert_eq!(reply.body["email"], "a@x.com");
}

#[tokio::test]
async fn foreign_resource_is_forbidden() {
    let h = Harness::new();

    let event = h
        .store
        .create_event(
            PrincipalId(9),
            serde_json::from_value::<EventInput>(event_body("Owned by nine")).unwrap(),
        )
        .await
        .unwrap();

    let reply = h
        .send(
            Method::PUT,
            &format!("/api/events/{}", event.id),
            Some(&h.bearer_for(5)),
            Some(event_body("Hijacked")),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.body["code"], "FORBIDDEN");

    let unchanged = h
        .send(Method::GET, &format!("/api/events/{}", event.id), None, None)
        .await;
    assert_eq!(unchanged.body["name"], "Owned by nine");
}

#[tokio::test]
async fn foreign_profile_is_forbidden() {
    let h = Harness::new();
    let a = h.register("a@x.com", "secret123").await;
    let b = h.register("b@x.com", "secret123").await;
    let bearer = h.login("a@x.com", "secret123").await;

    let reply = h
        .send(
            Method::PUT,
            &format!("/api/users/{}", b),
            Some(&bearer),
            Some(json!({
                "firstname": "Eve",
                "lastname": "Mallory",
                "dni": 1,
                "email": "b@x.com",
                "phone": "0"
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let own = h
        .send(
            Method::PUT,
            &format!("/api/users/{}", a),
            Some(&bearer),
            Some(json!({
                "firstname": "Augusta",
                "lastname": "King",
                "dni": 30111222,
                "email": "ada@x.com",
                "phone": "0"
            })),
        )
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["email"], "ada@x.com");
    assert_eq!(own.body["firstname"], "Augusta");
    assert!(own.body.get("password_hash").is_none());

    // the old token still names the same principal
    let me = h.send(Method::GET, "/api/me", Some(&bearer), None).await;
    assert_eq!(me.body["user_id"], a);
}

#[tokio::test]
async fn password_change_takes_effect() {
    let h = Harness::new();
    let id = h.register("a@x.com", "secret123").await;
    let bearer = h.login("a@x.com", "secret123").await;

    let reply = h
        .send(
            Method::PUT,
            &format!("/api/users/{}", id),
            Some(&bearer),
            Some(json!({
                "firstname": "Ada",
                "lastname": "Lovelace",
                "dni": 30111222,
                "email": "a@x.com",
                "phone": "0",
                "password": "brand-new-secret"
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let old = h
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    h.login("a@x.com", "brand-new-secret").await;
}
