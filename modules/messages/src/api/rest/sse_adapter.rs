use std::convert::Infallible;

use axum::response::sse::{Event, Sse};
use dashmap::DashMap;
use futures::Stream;
use modkit::SseBroadcaster;
use uuid::Uuid;

use crate::domain::{events::LiveEvent, ports::LivePublisher};

use super::dto::LiveEventDto;

/// Per-user SSE fan-out. A user's broadcaster lives while at least one of
/// their streams is open; idle ones are dropped on the next subscription.
pub struct SseLiveChannels {
    channels: DashMap<Uuid, SseBroadcaster<LiveEventDto>>,
    capacity: usize,
}

impl SseLiveChannels {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Opens a stream for `user_id`. The subscription is taken before the
    /// map entry is released, so pruning cannot detach it.
    pub fn open(&self, user_id: Uuid) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        self.channels.retain(|_, b| b.receiver_count() > 0);
        let entry = self
            .channels
            .entry(user_id)
            .or_insert_with(|| SseBroadcaster::new(self.capacity));
        entry.sse_response()
    }

    pub fn connected(&self, user_id: Uuid) -> usize {
        self.channels
            .get(&user_id)
            .map_or(0, |b| b.receiver_count())
    }
}

impl LivePublisher for SseLiveChannels {
    fn publish(&self, to: Uuid, event: &LiveEvent) -> usize {
        match self.channels.get(&to) {
            Some(b) => b.send(LiveEventDto::from(event)),
            None => 0,
        }
    }
}
