//! SQLite-backed store
//!
//! A single connection behind a mutex. Queries are short point lookups, so
//! they run inline on the calling task; the lock is never held across an
//! await point.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::schema;
use super::{
    Account, AccountStore, CredentialStore, Event, EventInput, EventStore, Location, NewPrincipal,
    Principal, PrincipalId, PrincipalUpdate, Store, StoreError, DEFAULT_AVAILABLE_AMOUNT,
};

/// Relational store for principals, accounts and events
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database file
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        info!("Opening SQLite database at {:?}", path);

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Database(format!("Failed to open SQLite: {}", e)))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| StoreError::Database(format!("Failed to set PRAGMA: {}", e)))?;

        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        debug!("Opening in-memory SQLite database");

        let conn = Connection::open_in_memory().map_err(|e| {
            StoreError::Database(format!("Failed to open in-memory SQLite: {}", e))
        })?;

        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }
}

fn db_err(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict("An account with this email already exists".into())
        }
        _ => StoreError::Database(err.to_string()),
    }
}

fn parse_time(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn principal_from_row(row: &Row) -> rusqlite::Result<Principal> {
    let created_at: String = row.get("created_at")?;
    Ok(Principal {
        id: PrincipalId(row.get("id")?),
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        dni: row.get("dni")?,
        phone: row.get("phone")?,
        created_at: parse_time(7, &created_at)?,
    })
}

fn account_from_row(row: &Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get("id")?,
        user_id: PrincipalId(row.get("user_id")?),
        cvu: row.get("cvu")?,
        alias: row.get("alias")?,
        available_amount: row.get("available_amount")?,
    })
}

fn event_from_row(row: &Row) -> rusqlite::Result<Event> {
    let start_date: String = row.get("start_date")?;
    let end_date: Option<String> = row.get("end_date")?;
    Ok(Event {
        id: row.get("id")?,
        name: row.get("name")?,
        start_date: parse_time(2, &start_date)?,
        end_date: end_date.as_deref().map(|raw| parse_time(3, raw)).transpose()?,
        capacity: row.get("capacity")?,
        location: Location {
            latitude: row.get("latitude")?,
            longitude: row.get("longitude")?,
            location_name: row.get("location_name")?,
        },
        user_id: PrincipalId(row.get("user_id")?),
    })
}

const PRINCIPAL_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, dni, phone, created_at";
const EVENT_COLUMNS: &str =
    "id, name, start_date, end_date, capacity, latitude, longitude, location_name, user_id";

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn find_by_email(&self, email: &str) -> Result<Principal, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM principals WHERE email = ?1", PRINCIPAL_COLUMNS),
                params![email],
                principal_from_row,
            )
            .optional()
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound("principal".into()))
        })
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Principal, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM principals WHERE id = ?1", PRINCIPAL_COLUMNS),
                params![id.0],
                principal_from_row,
            )
            .optional()
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound("principal".into()))
        })
    }

    async fn insert_principal(&self, new: NewPrincipal) -> Result<Principal, StoreError> {
        let created_at = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO principals (email, password_hash, first_name, last_name, dni, phone, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    new.email,
                    new.password_hash,
                    new.first_name,
                    new.last_name,
                    new.dni,
                    new.phone,
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(db_err)?;

            Ok(Principal {
                id: PrincipalId(conn.last_insert_rowid()),
                email: new.email,
                password_hash: new.password_hash,
                first_name: new.first_name,
                last_name: new.last_name,
                dni: new.dni,
                phone: new.phone,
                created_at,
            })
        })
    }

    async fn update_principal(
        &self,
        id: PrincipalId,
        update: PrincipalUpdate,
    ) -> Result<Principal, StoreError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE principals
                     SET email = ?2, first_name = ?3, last_name = ?4, dni = ?5, phone = ?6,
                         password_hash = COALESCE(?7, password_hash)
                     WHERE id = ?1",
                    params![
                        id.0,
                        update.email,
                        update.first_name,
                        update.last_name,
                        update.dni,
                        update.phone,
                        update.password_hash,
                    ],
                )
                .map_err(db_err)?;

            if changed == 0 {
                return Err(StoreError::NotFound("principal".into()));
            }

            conn.query_row(
                &format!("SELECT {} FROM principals WHERE id = ?1", PRINCIPAL_COLUMNS),
                params![id.0],
                principal_from_row,
            )
            .map_err(db_err)
        })
    }
}

#[async_trait]
impl AccountStore for SqliteStore {
    async fn create_account(&self, owner: PrincipalId) -> Result<Account, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO accounts (user_id, available_amount) VALUES (?1, ?2)",
                params![owner.0, DEFAULT_AVAILABLE_AMOUNT],
            )
            .map_err(db_err)?;

            Ok(Account {
                id: conn.last_insert_rowid(),
                user_id: owner,
                cvu: None,
                alias: None,
                available_amount: DEFAULT_AVAILABLE_AMOUNT.to_string(),
            })
        })
    }

    async fn find_account(&self, id: i64) -> Result<Account, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, cvu, alias, available_amount FROM accounts WHERE id = ?1",
                params![id],
                account_from_row,
            )
            .optional()
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound("account".into()))
        })
    }

    async fn find_account_by_owner(&self, owner: PrincipalId) -> Result<Account, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, cvu, alias, available_amount FROM accounts
                 WHERE user_id = ?1 ORDER BY id LIMIT 1",
                params![owner.0],
                account_from_row,
            )
            .optional()
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound("account".into()))
        })
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn create_event(&self, owner: PrincipalId, input: EventInput) -> Result<Event, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (name, start_date, end_date, capacity, latitude, longitude, location_name, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    input.name,
                    input.start_date.to_rfc3339(),
                    input.end_date.map(|d| d.to_rfc3339()),
                    input.capacity,
                    input.location.latitude,
                    input.location.longitude,
                    input.location.location_name,
                    owner.0,
                ],
            )
            .map_err(db_err)?;

            Ok(Event {
                id: conn.last_insert_rowid(),
                name: input.name,
                start_date: input.start_date,
                end_date: input.end_date,
                capacity: input.capacity,
                location: input.location,
                user_id: owner,
            })
        })
    }

    async fn find_event(&self, id: i64) -> Result<Event, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS),
                params![id],
                event_from_row,
            )
            .optional()
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound("event".into()))
        })
    }

    async fn update_event(&self, id: i64, input: EventInput) -> Result<Event, StoreError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE events
                     SET name = ?2, start_date = ?3, end_date = ?4, capacity = ?5,
                         latitude = ?6, longitude = ?7, location_name = ?8
                     WHERE id = ?1",
                    params![
                        id,
                        input.name,
                        input.start_date.to_rfc3339(),
                        input.end_date.map(|d| d.to_rfc3339()),
                        input.capacity,
                        input.location.latitude,
                        input.location.longitude,
                        input.location.location_name,
                    ],
                )
                .map_err(db_err)?;

            if changed == 0 {
                return Err(StoreError::NotFound("event".into()));
            }

            conn.query_row(
                &format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS),
                params![id],
                event_from_row,
            )
            .map_err(db_err)
        })
    }
}

impl Store for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
