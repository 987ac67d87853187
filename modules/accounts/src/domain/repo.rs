use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::model::Account;

/// Persistence port for accounts.
#[async_trait]
pub trait AccountsRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>>;
    /// `email` is already normalized (trimmed, lower-case).
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    async fn insert(&self, account: Account) -> anyhow::Result<()>;
    /// Full overwrite by primary key.
    async fn update(&self, account: Account) -> anyhow::Result<()>;
}
