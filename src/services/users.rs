//! Principal registration and profile updates
//!
//! Registration hashes the password, inserts the principal and opens its
//! default zero-balance account. Profile updates are only allowed for the
//! principal itself.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::auth::{ownership, AuthorizationContext, PasswordHasher};
use crate::db::{NewPrincipal, PrincipalId, PrincipalUpdate, Profile, Store};
use crate::types::{Result, TurnstileError};

/// Shortest password accepted at registration or update
pub const MIN_PASSWORD_LEN: usize = 8;

// ============================================================================
// Types
// ============================================================================

/// Body of `POST /api/users`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub firstname: String,
    pub lastname: String,
    pub dni: i64,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Response for a completed registration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registered {
    pub user_id: PrincipalId,
    pub account_id: i64,
    pub email: String,
}

/// Body of `PUT /api/users/{id}`
///
/// The password is optional; when absent or empty the stored hash is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateRequest {
    pub firstname: String,
    pub lastname: String,
    pub dni: i64,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub password: Option<String>,
}

// ============================================================================
// Validation
// ============================================================================

/// Minimal `local@domain` shape check
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TurnstileError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_profile(firstname: &str, lastname: &str, dni: i64, email: &str, phone: &str) -> Result<()> {
    require("firstname", firstname)?;
    require("lastname", lastname)?;
    require("email", email)?;
    require("phone", phone)?;

    if dni <= 0 {
        return Err(TurnstileError::BadRequest("dni is required".into()));
    }
    if !is_valid_email(email) {
        return Err(TurnstileError::BadRequest("email is not a valid address".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(TurnstileError::BadRequest(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

// ============================================================================
// Service
// ============================================================================

/// Registration and profile maintenance
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Register a principal and open its default account
    pub async fn register(&self, req: RegisterRequest) -> Result<Registered> {
        validate_profile(&req.firstname, &req.lastname, req.dni, &req.email, &req.phone)?;
        validate_password(&req.password)?;

        let password_hash = self.hash(&req.password)?;

        let principal = self
            .store
            .insert_principal(NewPrincipal {
                email: req.email.trim().to_string(),
                password_hash,
                first_name: req.firstname,
                last_name: req.lastname,
                dni: req.dni,
                phone: req.phone,
            })
            .await?;

        let account = self.store.create_account(principal.id).await.map_err(|e| {
            error!(
                "Principal {} registered but default account creation failed: {}",
                principal.id, e
            );
            TurnstileError::from(e)
        })?;

        info!("Registered principal {} ({})", principal.id, principal.email);

        Ok(Registered {
            user_id: principal.id,
            account_id: account.id,
            email: principal.email,
        })
    }

    /// Replace a principal's profile. Only the principal itself may do so.
    pub async fn update(
        &self,
        ctx: &AuthorizationContext,
        id: PrincipalId,
        req: ProfileUpdateRequest,
    ) -> Result<Profile> {
        ownership::check(Some(ctx.principal_id), id).into_result()?;

        validate_profile(&req.firstname, &req.lastname, req.dni, &req.email, &req.phone)?;

        let password_hash = match req.password.as_deref() {
            Some(p) if !p.is_empty() => {
                validate_password(p)?;
                Some(self.hash(p)?)
            }
            _ => None,
        };

        let principal = self
            .store
            .update_principal(
                id,
                PrincipalUpdate {
                    email: req.email.trim().to_string(),
                    first_name: req.firstname,
                    last_name: req.lastname,
                    dni: req.dni,
                    phone: req.phone,
                    password_hash,
                },
            )
            .await?;

        info!("Updated profile of principal {}", principal.id);
        Ok(Profile::from(&principal))
    }

    fn hash(&self, password: &str) -> Result<String> {
        self.hasher
            .hash(password)
            .map_err(|e| TurnstileError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Hasher;
    use crate::db::{AccountStore, CredentialStore, MemoryStore};
    use hyper::StatusCode;

    fn service() -> (UserService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let hasher = Arc::new(Argon2Hasher::new());
        (UserService::new(store.clone(), hasher), store)
    }

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            dni: 30111222,
            email: email.into(),
            password: password.into(),
            phone: "+54 11 5555 0000".into(),
        }
    }

    fn update_request(email: &str, password: Option<&str>) -> ProfileUpdateRequest {
        ProfileUpdateRequest {
            firstname: "Augusta".into(),
            lastname: "King".into(),
            dni: 30111222,
            email: email.into(),
            phone: "+54 11 5555 1111".into(),
            password: password.map(str::to_string),
        }
    }

    fn ctx(id: PrincipalId) -> AuthorizationContext {
        AuthorizationContext {
            principal_id: id,
            email: "a@x.com".into(),
            expires_at: u64::MAX,
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("ax.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a@b@c"));
        assert!(!is_valid_email("a b@x.com"));
    }

    #[tokio::test]
    async fn test_register_creates_account() {
        let (service, store) = service();
        let registered = service
            .register(register_request("a@x.com", "secret123"))
            .await
            .unwrap();

        assert_eq!(registered.email, "a@x.com");
        let account = store.find_account_by_owner(registered.user_id).await.unwrap();
        assert_eq!(account.id, registered.account_id);
        assert_eq!(account.available_amount, "0");

        let principal = store.find_by_email("a@x.com").await.unwrap();
        assert_ne!(principal.password_hash, "secret123");
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (service, _) = service();

        let err = service
            .register(register_request("a@x.com", "short"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = service
            .register(register_request("not-an-email", "secret123"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let mut missing = register_request("a@x.com", "secret123");
        missing.firstname = " ".into();
        let err = service.register(missing).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (service, _) = service();
        service
            .register(register_request("a@x.com", "secret123"))
            .await
            .unwrap();

        let err = service
            .register(register_request("a@x.com", "another-secret"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_update_own_profile() {
        let (service, store) = service();
        let registered = service
            .register(register_request("a@x.com", "secret123"))
            .await
            .unwrap();
        let before = store.find_by_id(registered.user_id).await.unwrap();

        let profile = service
            .update(
                &ctx(registered.user_id),
                registered.user_id,
                update_request("ada@x.com", None),
            )
            .await
            .unwrap();

        assert_eq!(profile.email, "ada@x.com");
        assert_eq!(profile.first_name, "Augusta");

        let after = store.find_by_id(registered.user_id).await.unwrap();
        assert_eq!(after.password_hash, before.password_hash);
    }

    #[tokio::test]
    async fn test_update_rehashes_password() {
        let (service, store) = service();
        let registered = service
            .register(register_request("a@x.com", "secret123"))
            .await
            .unwrap();
        let before = store.find_by_id(registered.user_id).await.unwrap();

        service
            .update(
                &ctx(registered.user_id),
                registered.user_id,
                update_request("a@x.com", Some("new-secret-456")),
            )
            .await
            .unwrap();

        let after = store.find_by_id(registered.user_id).await.unwrap();
        assert_ne!(after.password_hash, before.password_hash);
        assert!(Argon2Hasher::new()
            .verify("new-secret-456", &after.password_hash)
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_other_principal_is_forbidden() {
        let (service, _) = service();
        let a = service
            .register(register_request("a@x.com", "secret123"))
            .await
            .unwrap();
        let b = service
            .register(register_request("b@x.com", "secret123"))
            .await
            .unwrap();

        let err = service
            .update(&ctx(a.user_id), b.user_id, update_request("b@x.com", None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let (service, _) = service();
        let a = service
            .register(register_request("a@x.com", "secret123"))
            .await
            .unwrap();
        service
            .register(register_request("b@x.com", "secret123"))
            .await
            .unwrap();

        let err = service
            .update(&ctx(a.user_id), a.user_id, update_request("b@x.com", None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
