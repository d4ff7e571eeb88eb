//! # Event demultiplexer.
//!
//! An [`EventStream`] owns one host → supervisor channel registered with the host as an event
//! sink. Each stream is an independent registration with its own in-order delivery; nothing is
//! guaranteed between two streams.
//!
//! ```text
//! open(filter) ──► create_channel(FromHost, 512) ──► createEventProducer{channel, events}
//!                                                         │
//! next() ◄── Event::from_value ◄── wait(channel) ◄────────┘ host delivers
//! ```
//!
//! ## Rules
//! - Single pass: once the channel closes, `next()` returns `Ok(None)` forever. Open a new
//!   stream to resume.
//! - A malformed notification is reported as `Err(MalformedEvent)`; the stream stays usable.
//! - Dropping the stream destroys its channel.

use futures::Stream;
use futures::stream;
use tracing::debug;

use super::event::Event;
use super::kind::EventKind;
use crate::bridge::Bridge;
use crate::channel::{ChannelDirection, ChannelHandle, WaitOutcome};
use crate::error::BridgeError;

/// Lazily produced sequence of host events.
pub struct EventStream {
    bridge: Bridge,
    channel: ChannelHandle,
    done: bool,
}

impl EventStream {
    /// Opens a stream with the configured queue size (`eventQueueSize`, 512 by default).
    ///
    /// `filter = None` receives every kind.
    pub async fn open(bridge: &Bridge, filter: Option<&[EventKind]>) -> Result<Self, BridgeError> {
        let capacity = bridge.config().event_queue_size_clamped();
        Self::open_with_capacity(bridge, filter, capacity).await
    }

    /// Opens a stream with an explicit queue size.
    pub async fn open_with_capacity(
        bridge: &Bridge,
        filter: Option<&[EventKind]>,
        capacity: usize,
    ) -> Result<Self, BridgeError> {
        let channel = bridge.create_channel(ChannelDirection::FromHost, Some(capacity));
        if let Err(e) = bridge.register_event_producer(channel, filter).await {
            let _ = bridge.destroy_channel(channel);
            return Err(e);
        }
        Ok(Self {
            bridge: bridge.clone(),
            channel,
            done: false,
        })
    }

    /// Channel the host delivers this stream's events into.
    #[inline]
    pub fn channel(&self) -> ChannelHandle {
        self.channel
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Waits for the next event. `Ok(None)` once the channel has closed.
    pub async fn next(&mut self) -> Result<Option<Event>, BridgeError> {
        while !self.done {
            let outcome = match self.bridge.wait(self.channel, None).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            };
            match outcome {
                WaitOutcome::Message(raw) => return Event::from_value(raw).map(Some),
                WaitOutcome::Pending => continue,
                WaitOutcome::Closed => {
                    debug!(channel = self.channel.id, "event stream ended");
                    self.done = true;
                }
            }
        }
        Ok(None)
    }

    /// Converts into a [`Stream`] that ends when the channel closes.
    pub fn into_stream(self) -> impl Stream<Item = Result<Event, BridgeError>> {
        stream::unfold(self, |mut s| async move {
            match s.next().await {
                Ok(Some(ev)) => Some((Ok(ev), s)),
                Ok(None) => None,
                Err(e) => Some((Err(e), s)),
            }
        })
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        let _ = self.bridge.destroy_channel(self.channel);
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use serde_json::json;

    use super::*;
    use crate::testing::MockHost;

    #[tokio::test]
    async fn test_events_arrive_in_host_order_then_end() {
        let host = MockHost::new();
        let bridge = host.bridge();
        let mut events = EventStream::open(&bridge, Some(&[EventKind::MissionStart, EventKind::PlayerComment]))
            .await
            .unwrap();

        let registered = host.calls_to("createEventProducer");
        assert_eq!(registered[0]["events"], json!([11, 22]));
        assert_eq!(bridge.channels().capacity(events.channel()).unwrap(), 512);

        let id = events.channel().id;
        assert!(host.deliver(id, json!({"id": 11, "time": 0.0})));
        assert!(host.deliver(id, json!({"id": 22, "time": 3.0, "comment": "hello"})));
        host.close(id);

        assert_eq!(events.next().await.unwrap().unwrap().kind, EventKind::MissionStart);
        assert_eq!(events.next().await.unwrap().unwrap().time, 3.0);
        assert!(events.next().await.unwrap().is_none());
        assert!(events.is_done());
        assert!(events.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_event_does_not_end_stream() {
        let host = MockHost::new();
        let bridge = host.bridge();
        let events = EventStream::open_with_capacity(&bridge, None, 4).await.unwrap();
        let id = events.channel().id;

        host.deliver(id, json!({"id": 200}));
        host.deliver(id, json!({"id": 12, "time": 9.0}));
        host.close(id);

        let items: Vec<_> = events.into_stream().collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_err());
        assert_eq!(items[1].as_ref().unwrap().kind, EventKind::MissionEnd);
    }

    #[tokio::test]
    async fn test_failed_registration_releases_channel() {
        let host = MockHost::new();
        host.fail("createEventProducer", "no mission");
        let bridge = host.bridge();

        assert!(EventStream::open(&bridge, None).await.is_err());
        assert!(bridge.channels().is_empty());
    }

    #[tokio::test]
    async fn test_independent_streams_and_drop() {
        let host = MockHost::new();
        let bridge = host.bridge();
        let a = EventStream::open(&bridge, None).await.unwrap();
        let b = EventStream::open(&bridge, None).await.unwrap();
        assert_ne!(a.channel(), b.channel());
        assert_eq!(bridge.channels().len(), 2);

        drop(a);
        assert_eq!(bridge.channels().len(), 1);
    }
}
