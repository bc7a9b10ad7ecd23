//! Email/password login
//!
//! Flow:
//! 1. Look up the principal by email
//! 2. Verify the password against the stored hash
//! 3. Issue an access token for the principal
//!
//! Each step is terminal on failure; nothing is retried. Both credential
//! failures collapse into the same "invalid credentials" response so a
//! client cannot tell an unknown email from a wrong password.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::jwt::{IssuedToken, TokenCodec, TokenError};
use super::password::{PasswordError, PasswordHasher};
use crate::db::{CredentialStore, StoreError};
use crate::types::TurnstileError;

/// Client-visible message for every credential failure
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Login failure, with the internal reason kept for logs and tests
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("no principal registered with that email")]
    PrincipalNotFound,

    #[error("password does not match")]
    PasswordMismatch,

    #[error("credential store failed: {0}")]
    Store(StoreError),

    #[error("password verification failed: {0}")]
    Hasher(PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<LoginError> for TurnstileError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::PrincipalNotFound | LoginError::PasswordMismatch => {
                TurnstileError::Unauthorized(INVALID_CREDENTIALS.into())
            }
            LoginError::Store(e) => TurnstileError::Database(e.to_string()),
            LoginError::Hasher(e) => TurnstileError::Internal(e.to_string()),
            LoginError::Token(e) => TurnstileError::Internal(e.to_string()),
        }
    }
}

/// Orchestrates credential lookup, password check and token issue
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    codec: Arc<TokenCodec>,
}

impl Authenticator {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            credentials,
            hasher,
            codec,
        }
    }

    /// Authenticate with email and password and issue an access token
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, LoginError> {
        let principal = match self.credentials.find_by_email(email).await {
            Ok(p) => p,
            Err(StoreError::NotFound(_)) => {
                warn!("Login failed - principal not found: {}", email);
                return Err(LoginError::PrincipalNotFound);
            }
            Err(e) => {
                error!("Login failed - credential store error: {}", e);
                return Err(LoginError::Store(e));
            }
        };

        match self.hasher.verify(password, &principal.password_hash) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => {
                warn!("Login failed - invalid password: {}", email);
                return Err(LoginError::PasswordMismatch);
            }
            Err(e) => {
                error!("Login failed - password verification error for {}: {}", email, e);
                return Err(LoginError::Hasher(e));
            }
        }

        let issued = self
            .codec
            .issue(&principal.id.to_string(), &principal.email)
            .inspect_err(|e| error!("Failed to issue token for {}: {}", principal.id, e))?;

        info!("Login successful: {} (principal {})", email, principal.id);
        Ok(issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::Argon2Hasher;
    use crate::db::{MemoryStore, NewPrincipal, PrincipalId};

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    async fn authenticator_with(email: &str, password: &str) -> (Authenticator, PrincipalId, Arc<TokenCodec>) {
        let store = Arc::new(MemoryStore::new());
        let hasher = Arc::new(Argon2Hasher::new());
        let codec = Arc::new(TokenCodec::new(SECRET).unwrap());

        let principal = store
            .insert_principal(NewPrincipal {
                email: email.to_string(),
                password_hash: hasher.hash(password).unwrap(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                dni: 1,
                phone: "0".into(),
            })
            .await
            .unwrap();

        (
            Authenticator::new(store, hasher, Arc::clone(&codec)),
            principal.id,
            codec,
        )
    }

    #[tokio::test]
    async fn test_login_issues_token_for_principal() {
        let (auth, id, codec) = authenticator_with("a@x.com", "secret123").await;

        let issued = auth.login("a@x.com", "secret123").await.unwrap();
        let claims = codec.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp, issued.expires_at);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let (auth, _, _) = authenticator_with("a@x.com", "secret123").await;
        let err = auth.login("a@x.com", "wrong").await.unwrap_err();
        assert!(matches!(err, LoginError::PasswordMismatch));
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let (auth, _, _) = authenticator_with("a@x.com", "secret123").await;
        let err = auth.login("b@x.com", "secret123").await.unwrap_err();
        assert!(matches!(err, LoginError::PrincipalNotFound));
    }

    #[tokio::test]
    async fn test_credential_failures_look_identical() {
        let (auth, _, _) = authenticator_with("a@x.com", "secret123").await;

        let unknown: TurnstileError = auth.login("b@x.com", "secret123").await.unwrap_err().into();
        let mismatch: TurnstileError = auth.login("a@x.com", "nope").await.unwrap_err().into();

        assert_eq!(
            unknown.into_status_code_and_body(),
            mismatch.into_status_code_and_body()
        );
    }
}
