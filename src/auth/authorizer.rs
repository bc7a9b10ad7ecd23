//! Per-request bearer token check
//!
//! Reads the `Authorization` header, verifies the token and resolves the
//! principal it was issued for. The resolved [`AuthorizationContext`] is
//! returned to the caller, which passes it explicitly to whatever runs
//! next. Nothing is cached between requests.
//!
//! Only `Bearer <token>` is accepted. A raw token without the scheme is
//! rejected, never guessed at.

use hyper::header::AUTHORIZATION;
use hyper::Request;
use std::sync::Arc;
use tracing::{debug, warn};

use super::jwt::{TokenCodec, TokenError};
use crate::db::PrincipalId;
use crate::types::TurnstileError;

/// Scheme prefix expected in the `Authorization` header
pub const BEARER_PREFIX: &str = "Bearer ";

/// Client-visible message when no credential was sent
pub const MISSING_CREDENTIAL: &str = "request does not contain an access token";

/// Client-visible message for every other token failure
pub const INVALID_CREDENTIAL: &str = "invalid access token";

/// Identity resolved for the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationContext {
    pub principal_id: PrincipalId,
    pub email: String,
    pub expires_at: u64,
}

/// What was wrong with a presented credential
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialFault {
    #[error("authorization header does not use the Bearer scheme")]
    Scheme,

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Authorization failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizeError {
    #[error("no credential presented")]
    MissingCredential,

    #[error("invalid credential: {0}")]
    InvalidCredential(CredentialFault),

    /// The token verified but its subject is not a principal identifier
    #[error("malformed credential subject: {0:?}")]
    MalformedCredential(String),
}

impl From<AuthorizeError> for TurnstileError {
    fn from(err: AuthorizeError) -> Self {
        match err {
            AuthorizeError::MissingCredential => {
                TurnstileError::Unauthorized(MISSING_CREDENTIAL.into())
            }
            AuthorizeError::InvalidCredential(_) | AuthorizeError::MalformedCredential(_) => {
                TurnstileError::Unauthorized(INVALID_CREDENTIAL.into())
            }
        }
    }
}

/// Resolves request credentials to a principal
#[derive(Debug, Clone)]
pub struct RequestAuthorizer {
    codec: Arc<TokenCodec>,
}

impl RequestAuthorizer {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Authorize a raw `Authorization` header value
    pub fn authorize(&self, header: Option<&str>) -> Result<AuthorizationContext, AuthorizeError> {
        let result = self.resolve(header);
        if let Err(ref e) = result {
            match e {
                AuthorizeError::MissingCredential => debug!("Request rejected: {}", e),
                _ => warn!("Request rejected: {}", e),
            }
        }
        result
    }

    /// Authorize an inbound request by its `Authorization` header
    pub fn authorize_request<B>(
        &self,
        req: &Request<B>,
    ) -> Result<AuthorizationContext, AuthorizeError> {
        match req.headers().get(AUTHORIZATION) {
            None => self.authorize(None),
            Some(value) => match value.to_str() {
                Ok(s) => self.authorize(Some(s)),
                Err(_) => {
                    warn!("Request rejected: non-ASCII authorization header");
                    Err(AuthorizeError::InvalidCredential(CredentialFault::Scheme))
                }
            },
        }
    }

    fn resolve(&self, header: Option<&str>) -> Result<AuthorizationContext, AuthorizeError> {
        let token = extract_bearer_token(header)?;

        let claims = self
            .codec
            .verify(token)
            .map_err(|e| AuthorizeError::InvalidCredential(e.into()))?;

        let principal_id = claims
            .sub
            .parse::<PrincipalId>()
            .map_err(|_| AuthorizeError::MalformedCredential(claims.sub.clone()))?;

        Ok(AuthorizationContext {
            principal_id,
            email: claims.email,
            expires_at: claims.exp,
        })
    }
}

/// Extract the token from a `Bearer <token>` header value.
///
/// An absent or blank header is a missing credential; anything else that
/// is not exactly the Bearer scheme followed by a token is invalid.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthorizeError> {
    let header = match header {
        Some(h) if !h.trim().is_empty() => h,
        _ => return Err(AuthorizeError::MissingCredential),
    };

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthorizeError::InvalidCredential(CredentialFault::Scheme))?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthorizeError::InvalidCredential(CredentialFault::Scheme));
    }

    Ok(token)
}
