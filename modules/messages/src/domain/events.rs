use uuid::Uuid;

use crate::contract::model::{BudgetWarning, Message};

/// Something a connected user should see right away. Transport-agnostic.
#[derive(Debug, Clone)]
pub enum LiveEvent {
    NewMessage { room_id: String, message: Message },
    Typing { room_id: String, user_id: Uuid, is_typing: bool },
    BudgetWarning(BudgetWarning),
}

/// Stable name for the conversation between two users, independent of who
/// is asking.
pub fn room_id(a: Uuid, b: Uuid) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}-{hi}")
}
