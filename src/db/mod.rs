//! Persistence for principals, accounts and events
//!
//! The rest of the crate only sees the store traits below. Two backends
//! implement all of them:
//!
//! - [`SqliteStore`] - relational store used in production
//! - [`MemoryStore`] - in-process tables for tests and local runs

pub mod memory;
pub mod models;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;

use crate::types::TurnstileError;

pub use memory::MemoryStore;
pub use models::{
    Account, Event, EventInput, Location, NewPrincipal, Principal, PrincipalId, PrincipalUpdate,
    Profile,
};
pub use sqlite::SqliteStore;

/// Store failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    /// A uniqueness constraint was violated (duplicate email)
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<StoreError> for TurnstileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => TurnstileError::NotFound(format!("{} not found", what)),
            StoreError::Conflict(msg) => TurnstileError::Conflict(msg),
            StoreError::Database(msg) => TurnstileError::Database(msg),
        }
    }
}

/// Lookup and persistence of principals
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Principal, StoreError>;

    async fn find_by_id(&self, id: PrincipalId) -> Result<Principal, StoreError>;

    /// Insert a principal; fails with `Conflict` if the email is taken
    async fn insert_principal(&self, new: NewPrincipal) -> Result<Principal, StoreError>;

    async fn update_principal(
        &self,
        id: PrincipalId,
        update: PrincipalUpdate,
    ) -> Result<Principal, StoreError>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create the default zero-balance account for a principal
    async fn create_account(&self, owner: PrincipalId) -> Result<Account, StoreError>;

    async fn find_account(&self, id: i64) -> Result<Account, StoreError>;

    async fn find_account_by_owner(&self, owner: PrincipalId) -> Result<Account, StoreError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(&self, owner: PrincipalId, input: EventInput) -> Result<Event, StoreError>;

    async fn find_event(&self, id: i64) -> Result<Event, StoreError>;

    /// Replace the mutable fields; the owner never changes
    async fn update_event(&self, id: i64, input: EventInput) -> Result<Event, StoreError>;
}

/// Everything the HTTP layer needs from a backend
pub trait Store: CredentialStore + AccountStore + EventStore {
    /// Short backend name for health output
    fn backend(&self) -> &'static str;
}

/// Default balance for new accounts
pub const DEFAULT_AVAILABLE_AMOUNT: &str = "0";
