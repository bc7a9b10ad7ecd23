//! Records held by the credential, account and event stores

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a registered principal.
///
/// Assigned by the store on insert and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub i64);

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PrincipalId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(PrincipalId)
    }
}

/// Stored principal, including the opaque password hash
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub dni: i64,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a principal. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub dni: i64,
    pub phone: String,
}

/// Replacement profile fields; `password_hash` is left untouched when `None`
#[derive(Debug, Clone)]
pub struct PrincipalUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub dni: i64,
    pub phone: String,
    pub password_hash: Option<String>,
}

/// Public view of a principal (never carries the hash)
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: PrincipalId,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub dni: i64,
    pub email: String,
    pub phone: String,
}

impl From<&Principal> for Profile {
    fn from(p: &Principal) -> Self {
        Self {
            user_id: p.id,
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            dni: p.dni,
            email: p.email.clone(),
            phone: p.phone.clone(),
        }
    }
}

/// Balance account; every principal gets one at registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: PrincipalId,
    pub cvu: Option<String>,
    pub alias: Option<String>,
    pub available_amount: String,
}

/// Where an event takes place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
}

/// Event owned by the principal that created it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub capacity: u32,
    pub location: Location,
    pub user_id: PrincipalId,
}

/// Mutable event fields, used for both create and update
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventInput {
    pub name: String,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub capacity: u32,
    pub location: Location,
}
