use std::sync::Arc;

use accounts::contract::AccountsApi;
use chrono::Utc;
use modkit::AuthUser;
use notifications::contract::NotificationsApi;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::EventsConfig;
use crate::contract::model::{Event, EventPatch, NewEvent};
use crate::domain::error::DomainError;
use crate::domain::repo::EventStore;

#[derive(Clone)]
pub struct Service {
    pub(crate) store: Arc<dyn EventStore>,
    pub(crate) accounts: Option<Arc<dyn AccountsApi>>,
    pub(crate) notifier: Option<Arc<dyn NotificationsApi>>,
    pub(crate) config: EventsConfig,
}

impl Service {
    pub fn new(
        store: Arc<dyn EventStore>,
        accounts: Option<Arc<dyn AccountsApi>>,
        notifier: Option<Arc<dyn NotificationsApi>>,
        config: EventsConfig,
    ) -> Self {
        Self {
            store,
            accounts,
            notifier,
            config,
        }
    }

    #[instrument(name = "events.service.create_event", skip(self, new), fields(owner_id = %caller.id))]
    pub async fn create_event(&self, caller: AuthUser, new: NewEvent) -> Result<Event, DomainError> {
        let name = required("name", &new.name)?;
        let location = required("location", &new.location)?;
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            owner_id: caller.id,
            name,
            date: new.date,
            time: new.time,
            location,
            event_type: optional(new.event_type),
            description: optional(new.description),
            created_at: now,
            updated_at: now,
        };
        self.store
            .insert_event(event.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(event_id = %event.id, date = %event.date, "event created");
        Ok(event)
    }

    #[instrument(name = "events.service.list_events", skip(self), fields(owner_id = %caller.id))]
    pub async fn list_events(&self, caller: AuthUser) -> Result<Vec<Event>, DomainError> {
        self.store
            .events_of(caller.id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "events.service.get_event", skip(self), fields(event_id = %id))]
    pub async fn get_event(&self, caller: AuthUser, id: Uuid) -> Result<Event, DomainError> {
        self.owned_event(caller, id).await
    }

    #[instrument(name = "events.service.update_event", skip(self, patch), fields(event_id = %id))]
    pub async fn update_event(
        &self,
        caller: AuthUser,
        id: Uuid,
        patch: EventPatch,
    ) -> Result<Event, DomainError> {
        let mut event = self.owned_event(caller, id).await?;
        if let Some(name) = patch.name {
            event.name = required("name", &name)?;
        }
        if let Some(location) = patch.location {
            event.location = required("location", &location)?;
        }
        if let Some(date) = patch.date {
            event.date = date;
        }
        if patch.time.is_some() {
            event.time = patch.time;
        }
        if patch.event_type.is_some() {
            event.event_type = optional(patch.event_type);
        }
        if patch.description.is_some() {
            event.description = optional(patch.description);
        }
        event.updated_at = Utc::now();
        self.store
            .update_event(event.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(event)
    }

    /// Deletes the event, its guest list and its budget.
    #[instrument(name = "events.service.delete_event", skip(self), fields(event_id = %id))]
    pub async fn delete_event(&self, caller: AuthUser, id: Uuid) -> Result<(), DomainError> {
        self.owned_event(caller, id).await?;
        self.store
            .delete_event(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!("event deleted");
        Ok(())
    }

    /// Unchecked lookup for other modules.
    pub async fn find_event(&self, id: Uuid) -> Result<Event, DomainError> {
        self.store
            .find_event(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or(DomainError::EventNotFound { id })
    }

    /// The event, if the caller owns it or is an admin.
    pub(crate) async fn owned_event(&self, caller: AuthUser, id: Uuid) -> Result<Event, DomainError> {
        let event = self.find_event(id).await?;
        if !caller.can_act_for(event.owner_id) {
            return Err(DomainError::NotOwner { event_id: id });
        }
        Ok(event)
    }

    pub(crate) async fn organizer_name(&self, owner_id: Uuid) -> String {
        let Some(accounts) = &self.accounts else {
            return "Your host".to_string();
        };
        match accounts.get_user(owner_id).await {
            Ok(u) => u.name,
            Err(e) => {
                warn!(%owner_id, error = %e, "organizer lookup failed");
                "Your host".to_string()
            }
        }
    }
}

pub(crate) fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(v.to_string())
}

pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
