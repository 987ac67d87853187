use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::Message;

#[async_trait]
pub trait MessagesRepository: Send + Sync {
    async fn insert(&self, message: Message) -> anyhow::Result<()>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Message>>;
    /// Both directions between `a` and `b`, oldest first.
    async fn thread(&self, a: Uuid, b: Uuid) -> anyhow::Result<Vec<Message>>;
    /// Every message sent or received by `user_id`, newest first.
    async fn involving(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>>;
    /// Stamps unread messages from `sender_id` to `recipient_id`.
    async fn mark_read(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<u64>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}
