use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::{convert::Infallible, time::Duration};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// Payloads that choose their own SSE `event:` name.
pub trait NamedEvent {
    fn event_name(&self) -> &'static str;
}

/// Typed fan-out over `tokio::sync::broadcast`. Lagging subscribers lose
/// the oldest events; sends with no subscriber are dropped.
#[derive(Clone)]
pub struct SseBroadcaster<T> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> SseBroadcaster<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns the number of subscribers that received the value.
    pub fn send(&self, value: T) -> usize {
        self.tx.send(value).unwrap_or(0)
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn subscribe_stream(&self) -> impl Stream<Item = T> {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|res| async move { res.ok() })
    }

    /// JSON `data:` with the payload's own event name, plus 15s keepalives.
    pub fn sse_response(&self) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
    where
        T: Serialize + NamedEvent,
    {
        let stream = self.subscribe_stream().map(|msg| {
            let name = msg.event_name();
            let ev = Event::default()
                .event(name)
                .json_data(&msg)
                .unwrap_or_else(|_| Event::default().event(name).data("serialization_error"));
            Ok(ev)
        });
        Sse::new(stream).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("keepalive"),
        )
    }
}
