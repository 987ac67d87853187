use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{client::EventsApi, error::EventsError, model::Event};
use crate::domain::service::Service;

pub struct EventsLocalClient {
    service: Arc<Service>,
}

impl EventsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventsApi for EventsLocalClient {
    async fn get_event(&self, id: Uuid) -> Result<Event, EventsError> {
        Ok(self.service.find_event(id).await?)
    }
}
