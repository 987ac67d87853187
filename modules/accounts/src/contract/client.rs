use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{error::AccountsError, model::User};

/// Read-only view of accounts for other modules.
#[async_trait]
pub trait AccountsApi: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<User, AccountsError>;

    /// Personal spending limit used by the booking budget check.
    /// `None` when the user never set one.
    async fn personal_budget(&self, id: Uuid) -> Result<Option<f64>, AccountsError>;
}
