use chrono::{DateTime, Utc};
use modkit::NamedEvent;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{BudgetWarning, Message};
use crate::domain::events::{room_id, LiveEvent};
use crate::domain::service::Conversation;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageDto {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub room_id: String,
    pub text: String,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            room_id: room_id(m.sender_id, m.recipient_id),
            read: m.read_at.is_some(),
            id: m.id,
            sender_id: m.sender_id,
            recipient_id: m.recipient_id,
            text: m.text,
            read_at: m.read_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConversationDto {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub last_message: MessageDto,
    pub unread_count: usize,
}

impl From<Conversation> for ConversationDto {
    fn from(c: Conversation) -> Self {
        Self {
            user_id: c.partner_id,
            name: c.partner_name,
            last_message: c.last_message.into(),
            unread_count: c.unread,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendMessageReq {
    pub recipient_id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TypingReq {
    pub recipient_id: Uuid,
    #[serde(default = "typing_default")]
    pub is_typing: bool,
}

fn typing_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeliveredDto {
    pub delivered: usize,
}

/// Payload of the live stream. The SSE `event:` name tells them apart.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum LiveEventDto {
    NewMessage {
        room_id: String,
        message: MessageDto,
    },
    Typing {
        room_id: String,
        user_id: Uuid,
        is_typing: bool,
    },
    BudgetWarning(BudgetWarning),
}

impl From<&LiveEvent> for LiveEventDto {
    fn from(e: &LiveEvent) -> Self {
        match e {
            LiveEvent::NewMessage { room_id, message } => Self::NewMessage {
                room_id: room_id.clone(),
                message: message.clone().into(),
            },
            LiveEvent::Typing {
                room_id,
                user_id,
                is_typing,
            } => Self::Typing {
                room_id: room_id.clone(),
                user_id: *user_id,
                is_typing: *is_typing,
            },
            LiveEvent::BudgetWarning(w) => Self::BudgetWarning(w.clone()),
        }
    }
}

impl NamedEvent for LiveEventDto {
    fn event_name(&self) -> &'static str {
        match self {
            Self::NewMessage { .. } => "new-message",
            Self::Typing { .. } => "user-typing",
            Self::BudgetWarning(_) => "budget-warning",
        }
    }
}
