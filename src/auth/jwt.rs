//! Access token issue and verification
//!
//! Tokens are compact JWS strings (`header.payload.signature`, each part
//! base64url) signed with HS256. They are self-contained: validity depends
//! only on the signature, the process secret and the current time.
//!
//! Security notes:
//! - The secret is injected at construction; it is never read from the
//!   environment here
//! - Lifetime is fixed at one hour and there is no renewal
//! - A token is expired from the instant `now >= exp` (no leeway)

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::TurnstileError;

/// Token lifetime in seconds
pub const TOKEN_TTL_SECS: u64 = 3600;

/// Shortest signing secret accepted at startup
pub const MIN_SECRET_LEN: usize = 32;

/// Payload stored in the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal identifier, in string form
    pub sub: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// A freshly signed token and the instant it stops being valid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

/// Why a token could not be issued or verified
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired at {expired_at}")]
    Expired { expired_at: u64 },
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired { expired_at: 0 },
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Current Unix time in seconds
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Signs and verifies access tokens with the process secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_secs", &TOKEN_TTL_SECS)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec for the given secret
    ///
    /// Returns an error if the secret is empty or too short
    pub fn new(secret: &str) -> Result<Self, TurnstileError> {
        if secret.is_empty() {
            return Err(TurnstileError::Config("JWT_SECRET is required".into()));
        }

        if secret.len() < MIN_SECRET_LEN {
            return Err(TurnstileError::Config(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_SECRET_LEN
            )));
        }

        // Expiry is checked by hand so that `exp == now` is already expired.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Issue a token for a principal, valid for [`TOKEN_TTL_SECS`] from now
    pub fn issue(&self, subject: &str, email: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, email, unix_now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, subject: &str, email: &str, now: u64) -> Result<IssuedToken, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Verify a token's signature and expiry and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token as if the current time were `now`
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;

        if data.claims.exp <= now {
            return Err(TokenError::Expired {
                expired_at: data.claims.exp,
            });
        }

        Ok(data.claims)
    }
}
