use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{error::MessagesError, model::BudgetWarning};

/// Public API of the messages module.
#[async_trait]
pub trait MessagesApi: Send + Sync {
    /// Pushes a `budget-warning` to the user's open live streams.
    /// Returns how many streams received it; zero when the user is offline.
    async fn push_budget_warning(
        &self,
        user_id: Uuid,
        warning: BudgetWarning,
    ) -> Result<usize, MessagesError>;
}
