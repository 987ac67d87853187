use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{client::MessagesApi, error::MessagesError, model::BudgetWarning};
use crate::domain::service::Service;

pub struct MessagesLocalClient {
    service: Arc<Service>,
}

impl MessagesLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessagesApi for MessagesLocalClient {
    async fn push_budget_warning(
        &self,
        user_id: Uuid,
        warning: BudgetWarning,
    ) -> Result<usize, MessagesError> {
        Ok(self.service.push_budget_warning(user_id, warning))
    }
}
