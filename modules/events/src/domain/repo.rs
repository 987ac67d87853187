use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{Budget, Event, Guest};

#[async_trait]
pub trait EventsRepository: Send + Sync {
    async fn find_event(&self, id: Uuid) -> anyhow::Result<Option<Event>>;
    /// Soonest first.
    async fn events_of(&self, owner_id: Uuid) -> anyhow::Result<Vec<Event>>;
    async fn insert_event(&self, event: Event) -> anyhow::Result<()>;
    async fn update_event(&self, event: Event) -> anyhow::Result<()>;
    /// Removes the event together with its guests and budget.
    async fn delete_event(&self, id: Uuid) -> anyhow::Result<()>;
}

#[async_trait]
pub trait GuestsRepository: Send + Sync {
    async fn find_guest(&self, id: Uuid) -> anyhow::Result<Option<Guest>>;
    async fn guests_of(&self, event_id: Uuid) -> anyhow::Result<Vec<Guest>>;
    async fn guests_by_email(&self, email: &str) -> anyhow::Result<Vec<Guest>>;
    async fn insert_guest(&self, guest: Guest) -> anyhow::Result<()>;
    async fn update_guest(&self, guest: Guest) -> anyhow::Result<()>;
    async fn delete_guest(&self, id: Uuid) -> anyhow::Result<()>;
}

#[async_trait]
pub trait BudgetsRepository: Send + Sync {
    async fn find_budget(&self, event_id: Uuid) -> anyhow::Result<Option<Budget>>;
    async fn save_budget(&self, budget: Budget) -> anyhow::Result<()>;
}

/// Everything the service needs from storage.
pub trait EventStore: EventsRepository + GuestsRepository + BudgetsRepository {}

impl<T> EventStore for T where T: EventsRepository + GuestsRepository + BudgetsRepository {}
