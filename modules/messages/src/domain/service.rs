use std::collections::HashMap;
use std::sync::Arc;

use accounts::contract::{AccountsApi, AccountsError};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::MessagesConfig;
use crate::contract::model::{BudgetWarning, Message};
use crate::domain::error::DomainError;
use crate::domain::events::{room_id, LiveEvent};
use crate::domain::ports::LivePublisher;
use crate::domain::repo::MessagesRepository;

/// One row of the inbox: the latest message with each partner.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub partner_id: Uuid,
    pub partner_name: Option<String>,
    pub last_message: Message,
    pub unread: usize,
}

#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn MessagesRepository>,
    accounts: Option<Arc<dyn AccountsApi>>,
    live: Arc<dyn LivePublisher>,
    config: MessagesConfig,
}

impl Service {
    pub fn new(
        repo: Arc<dyn MessagesRepository>,
        accounts: Option<Arc<dyn AccountsApi>>,
        live: Arc<dyn LivePublisher>,
        config: MessagesConfig,
    ) -> Self {
        Self {
            repo,
            accounts,
            live,
            config,
        }
    }

    #[instrument(name = "messages.service.send", skip(self, text), fields(sender_id = %sender_id, recipient_id = %recipient_id))]
    pub async fn send(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        text: &str,
    ) -> Result<Message, DomainError> {
        if sender_id == recipient_id {
            return Err(DomainError::validation("recipient_id", "cannot message yourself"));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("text", "must not be empty"));
        }
        if text.chars().count() > self.config.max_text_len {
            return Err(DomainError::validation(
                "text",
                format!("must be at most {} characters", self.config.max_text_len),
            ));
        }
        self.ensure_user(recipient_id).await?;

        let message = Message {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            text: text.to_string(),
            read_at: None,
            created_at: Utc::now(),
        };
        self.repo
            .insert(message.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let event = LiveEvent::NewMessage {
            room_id: room_id(sender_id, recipient_id),
            message: message.clone(),
        };
        let delivered = self.live.publish(recipient_id, &event) + self.live.publish(sender_id, &event);
        info!(message_id = %message.id, delivered, "message sent");
        Ok(message)
    }

    /// Latest message per partner, most recent conversation first.
    #[instrument(name = "messages.service.conversations", skip(self), fields(user_id = %user_id))]
    pub async fn conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>, DomainError> {
        let all = self
            .repo
            .involving(user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let mut order: Vec<Uuid> = Vec::new();
        let mut by_partner: HashMap<Uuid, Conversation> = HashMap::new();
        for message in all {
            let partner_id = message.partner_of(user_id);
            let unread = usize::from(message.recipient_id == user_id && message.read_at.is_none());
            match by_partner.get_mut(&partner_id) {
                Some(c) => c.unread += unread,
                None => {
                    order.push(partner_id);
                    by_partner.insert(
                        partner_id,
                        Conversation {
                            partner_id,
                            partner_name: None,
                            last_message: message,
                            unread,
                        },
                    );
                }
            }
        }

        let mut out = Vec::with_capacity(order.len());
        for partner_id in order {
            if let Some(mut c) = by_partner.remove(&partner_id) {
                c.partner_name = self.user_name(partner_id).await;
                out.push(c);
            }
        }
        Ok(out)
    }

    /// The thread with `other`, oldest first. Incoming messages are marked
    /// read; the returned copies carry the new `read_at`.
    #[instrument(name = "messages.service.thread", skip(self), fields(user_id = %user_id, other_id = %other_id))]
    pub async fn thread(&self, user_id: Uuid, other_id: Uuid) -> Result<Vec<Message>, DomainError> {
        let mut messages = self
            .repo
            .thread(user_id, other_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let now = Utc::now();
        let marked = self
            .repo
            .mark_read(user_id, other_id, now)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if marked > 0 {
            for m in messages
                .iter_mut()
                .filter(|m| m.recipient_id == user_id && m.read_at.is_none())
            {
                m.read_at = Some(now);
            }
            debug!(marked, "messages marked read");
        }
        Ok(messages)
    }

    #[instrument(name = "messages.service.delete", skip(self), fields(message_id = %id))]
    pub async fn delete(&self, caller_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let message = self
            .repo
            .find(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or(DomainError::MessageNotFound { id })?;
        if message.sender_id != caller_id {
            return Err(DomainError::NotSender { id });
        }
        self.repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!("message deleted");
        Ok(())
    }

    /// Relays a typing indicator to the recipient. Nothing is stored.
    pub fn typing(&self, user_id: Uuid, recipient_id: Uuid, is_typing: bool) -> usize {
        self.live.publish(
            recipient_id,
            &LiveEvent::Typing {
                room_id: room_id(user_id, recipient_id),
                user_id,
                is_typing,
            },
        )
    }

    pub fn push_budget_warning(&self, user_id: Uuid, warning: BudgetWarning) -> usize {
        let delivered = self.live.publish(user_id, &LiveEvent::BudgetWarning(warning));
        debug!(user_id = %user_id, delivered, "budget warning pushed");
        delivered
    }

    async fn ensure_user(&self, id: Uuid) -> Result<(), DomainError> {
        let Some(accounts) = &self.accounts else {
            return Ok(());
        };
        match accounts.get_user(id).await {
            Ok(_) => Ok(()),
            Err(AccountsError::NotFound { .. }) => Err(DomainError::RecipientNotFound { id }),
            Err(e) => Err(DomainError::database(e.to_string())),
        }
    }

    async fn user_name(&self, id: Uuid) -> Option<String> {
        let accounts = self.accounts.as_ref()?;
        match accounts.get_user(id).await {
            Ok(u) => Some(u.name),
            Err(e) => {
                warn!(user_id = %id, error = %e, "partner lookup failed");
                None
            }
        }
    }
}
