use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{client::AccountsApi, error::AccountsError, model::User};
use crate::domain::service::Service;

pub struct AccountsLocalClient {
    service: Arc<Service>,
}

impl AccountsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AccountsApi for AccountsLocalClient {
    async fn get_user(&self, id: Uuid) -> Result<User, AccountsError> {
        Ok(self.service.get_user(id).await?)
    }

    async fn personal_budget(&self, id: Uuid) -> Result<Option<f64>, AccountsError> {
        Ok(self.service.get_user(id).await?.total_budget)
    }
}
