//! Balance account lookups
//!
//! Accounts are created at registration; this service only reads them.

use std::sync::Arc;

use crate::auth::{ownership, AuthorizationContext};
use crate::db::{Account, Store};
use crate::types::Result;

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Account owned by the requesting principal
    pub async fn own_account(&self, ctx: &AuthorizationContext) -> Result<Account> {
        Ok(self.store.find_account_by_owner(ctx.principal_id).await?)
    }

    /// Account by id, if the requesting principal owns it
    pub async fn account(&self, ctx: &AuthorizationContext, id: i64) -> Result<Account> {
        let account = self.store.find_account(id).await?;
        ownership::check(Some(ctx.principal_id), account.user_id).into_result()?;
        Ok(account)
    }
}
