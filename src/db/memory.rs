//! In-memory store
//!
//! Same contract as the SQLite store (unique emails, ids never reused),
//! kept in process. Used by tests and with `MEMORY_STORE=true`.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
    Account, AccountStore, CredentialStore, Event, EventInput, EventStore, NewPrincipal, Principal,
    PrincipalId, PrincipalUpdate, Store, StoreError, DEFAULT_AVAILABLE_AMOUNT,
};

#[derive(Default)]
struct Tables {
    principals: BTreeMap<i64, Principal>,
    accounts: BTreeMap<i64, Account>,
    events: BTreeMap<i64, Event>,
    next_principal_id: i64,
    next_account_id: i64,
    next_event_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Store backed by in-process maps
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|e| StoreError::Database(format!("Lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|e| StoreError::Database(format!("Lock poisoned: {}", e)))
    }
}

fn email_taken(tables: &Tables, email: &str, except: Option<i64>) -> bool {
    tables
        .principals
        .values()
        .any(|p| p.email == email && Some(p.id.0) != except)
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Principal, StoreError> {
        self.read()?
            .principals
            .values()
            .find(|p| p.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("principal".into()))
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Principal, StoreError> {
        self.read()?
            .principals
            .get(&id.0)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("principal".into()))
    }

    async fn insert_principal(&self, new: NewPrincipal) -> Result<Principal, StoreError> {
        let mut tables = self.write()?;
        if email_taken(&tables, &new.email, None) {
            return Err(StoreError::Conflict(
                "An account with this email already exists".into(),
            ));
        }

        let id = next_id(&mut tables.next_principal_id);
        let principal = Principal {
            id: PrincipalId(id),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            dni: new.dni,
            phone: new.phone,
            created_at: Utc::now(),
        };
        tables.principals.insert(id, principal.clone());
        Ok(principal)
    }

    async fn update_principal(
        &self,
        id: PrincipalId,
        update: PrincipalUpdate,
    ) -> Result<Principal, StoreError> {
        let mut tables = self.write()?;
        if email_taken(&tables, &update.email, Some(id.0)) {
            return Err(StoreError::Conflict(
                "An account with this email already exists".into(),
            ));
        }

        let principal = tables
            .principals
            .get_mut(&id.0)
            .ok_or_else(|| StoreError::NotFound("principal".into()))?;

        principal.email = update.email;
        principal.first_name = update.first_name;
        principal.last_name = update.last_name;
        principal.dni = update.dni;
        principal.phone = update.phone;
        if let Some(hash) = update.password_hash {
            principal.password_hash = hash;
        }
        Ok(principal.clone())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, owner: PrincipalId) -> Result<Account, StoreError> {
        let mut tables = self.write()?;
        let id = next_id(&mut tables.next_account_id);
        let account = Account {
            id,
            user_id: owner,
            cvu: None,
            alias: None,
            available_amount: DEFAULT_AVAILABLE_AMOUNT.to_string(),
        };
        tables.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn find_account(&self, id: i64) -> Result<Account, StoreError> {
        self.read()?
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("account".into()))
    }

    async fn find_account_by_owner(&self, owner: PrincipalId) -> Result<Account, StoreError> {
        self.read()?
            .accounts
            .values()
            .find(|a| a.user_id == owner)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("account".into()))
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(&self, owner: PrincipalId, input: EventInput) -> Result<Event, StoreError> {
        let mut tables = self.write()?;
        let id = next_id(&mut tables.next_event_id);
        let event = Event {
            id,
            name: input.name,
            start_date: input.start_date,
            end_date: input.end_date,
            capacity: input.capacity,
            location: input.location,
            user_id: owner,
        };
        tables.events.insert(id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: i64) -> Result<Event, StoreError> {
        self.read()?
            .events
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("event".into()))
    }

    async fn update_event(&self, id: i64, input: EventInput) -> Result<Event, StoreError> {
        let mut tables = self.write()?;
        let event = tables
            .events
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("event".into()))?;

        event.name = input.name;
        event.start_date = input.start_date;
        event.end_date = input.end_date;
        event.capacity = input.capacity;
        event.location = input.location;
        Ok(event.clone())
    }
}

impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }
}
