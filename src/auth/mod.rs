//! Authentication and authorization for turnstile
//!
//! Provides:
//! - Access token issue and verification (HS256 JWT)
//! - Password hashing with Argon2
//! - Email/password login
//! - Bearer token authorization per request
//! - Resource ownership checks

pub mod authenticator;
pub mod authorizer;
pub mod jwt;
pub mod ownership;
pub mod password;

pub use authenticator::{Authenticator, LoginError, INVALID_CREDENTIALS};
pub use authorizer::{
    extract_bearer_token, AuthorizationContext, AuthorizeError, CredentialFault,
    RequestAuthorizer, BEARER_PREFIX,
};
pub use jwt::{Claims, IssuedToken, TokenCodec, TokenError, TOKEN_TTL_SECS};
pub use ownership::{check, Decision, DenyReason};
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
