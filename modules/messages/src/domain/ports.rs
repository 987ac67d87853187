use uuid::Uuid;

use crate::domain::events::LiveEvent;

/// Output port: deliver a live event to one user's open connections.
pub trait LivePublisher: Send + Sync + 'static {
    /// Returns the number of connections that received the event.
    fn publish(&self, to: Uuid, event: &LiveEvent) -> usize;
}
