use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{error::EventsError, model::Event};

/// Public API of the events module.
#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn get_event(&self, id: Uuid) -> Result<Event, EventsError>;
}
