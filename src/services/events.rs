//! Events owned by the principal that created them
//!
//! Reading an event is public. Creating one needs an authorized request,
//! and only the owner may change it afterwards.

use std::sync::Arc;
use tracing::info;

use crate::auth::{ownership, AuthorizationContext};
use crate::db::{Event, EventInput, Store};
use crate::types::{Result, TurnstileError};

fn validate(input: &EventInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(TurnstileError::BadRequest("name is required".into()));
    }
    if input.capacity == 0 {
        return Err(TurnstileError::BadRequest(
            "capacity must be greater than zero".into(),
        ));
    }
    if let Some(end) = input.end_date {
        if end < input.start_date {
            return Err(TurnstileError::BadRequest(
                "end_date must not be before start_date".into(),
            ));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn Store>,
}

impl EventService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create an event owned by the requesting principal
    pub async fn create(&self, ctx: &AuthorizationContext, input: EventInput) -> Result<Event> {
        validate(&input)?;
        let event = self.store.create_event(ctx.principal_id, input).await?;
        info!("Principal {} created event {}", ctx.principal_id, event.id);
        Ok(event)
    }

    pub async fn get(&self, id: i64) -> Result<Event> {
        Ok(self.store.find_event(id).await?)
    }

    /// Replace an event's fields. Only its owner may do so.
    pub async fn update(
        &self,
        ctx: &AuthorizationContext,
        id: i64,
        input: EventInput,
    ) -> Result<Event> {
        let existing = self.store.find_event(id).await?;
        ownership::check(Some(ctx.principal_id), existing.user_id).into_result()?;
        validate(&input)?;

        let event = self.store.update_event(id, input).await?;
        info!("Principal {} updated event {}", ctx.principal_id, event.id);
        Ok(event)
    }
}
