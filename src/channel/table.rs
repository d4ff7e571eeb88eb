//! # Channel table - owner of every live channel.
//!
//! Each channel is a bounded [`tokio::sync::mpsc`] queue plus the metadata needed to
//! validate handles. The table is shared between the supervisor (which waits/sends)
//! and the host glue (which delivers/drains), so all host-facing operations are
//! synchronous and never block.
//!
//! ## Architecture
//! ```text
//! FromHost:   host ── deliver(id, v) ──► [bounded queue] ──► wait(handle) ──► consumer
//!                        └─ full ─► message dropped, channel closed
//!
//! ToHost:     supervisor ── send(handle, v) ──► [bounded queue] ──► host_recv(id) ──► host
//! ```
//!
//! ## Rules
//! - Per-channel FIFO: messages are observed in the order they were accepted.
//! - Overflow and explicit close are the same thing to a consumer: once the queue
//!   drains, every wait returns [`WaitOutcome::Closed`] without blocking.
//! - A timed-out wait returns [`WaitOutcome::Pending`] and leaves the channel open.
//! - Operations on a destroyed (or unknown) handle fail with `ResourceNotFound`.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tracing::{debug, warn};

use super::handle::{ChannelDirection, ChannelHandle, ChannelState, WaitOutcome};
use crate::error::BridgeError;

/// Per-channel storage.
struct Slot {
    resource_id: u32,
    direction: ChannelDirection,
    capacity: usize,
    /// Producer side. `None` once the channel is closed.
    tx: Option<mpsc::Sender<Value>>,
    /// Consumer side; shared so a wait can hold it without holding the table lock.
    rx: Arc<AsyncMutex<mpsc::Receiver<Value>>>,
}

impl Slot {
    fn state(&self) -> ChannelState {
        if self.tx.is_some() {
            ChannelState::Open
        } else {
            ChannelState::Closed
        }
    }
}

/// Registry of live channels, keyed by logical id.
pub struct ChannelTable {
    slots: Mutex<HashMap<u64, Slot>>,
    next_id: AtomicU64,
    next_resource: AtomicU32,
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            next_resource: AtomicU32::new(1),
        }
    }

    /// Creates a channel with the given direction and capacity (minimum 1).
    pub fn create(&self, direction: ChannelDirection, capacity: usize) -> ChannelHandle {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel::<Value>(capacity);
        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        let resource_id = self.next_resource.fetch_add(1, AtomicOrdering::Relaxed);

        self.slots.lock().insert(
            id,
            Slot {
                resource_id,
                direction,
                capacity,
                tx: Some(tx),
                rx: Arc::new(AsyncMutex::new(rx)),
            },
        );
        debug!(channel = id, ?direction, capacity, "channel created");
        ChannelHandle { id, resource_id }
    }

    /// Waits for the next message on a host → supervisor channel.
    ///
    /// - `timeout = None` suspends until a message arrives or the channel closes;
    /// - `timeout = Some(d)` returns [`WaitOutcome::Pending`] after `d` with no message.
    pub async fn wait(
        &self,
        handle: ChannelHandle,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome, BridgeError> {
        let rx = {
            let slots = self.slots.lock();
            let slot = lookup(&slots, handle)?;
            if slot.direction != ChannelDirection::FromHost {
                return Err(BridgeError::WrongDirection {
                    id: handle.id,
                    op: "wait",
                });
            }
            Arc::clone(&slot.rx)
        };

        let mut rx = rx.lock().await;
        let received = match timeout {
            Some(d) => match tokio::time::timeout(d, rx.recv()).await {
                Ok(received) => received,
                Err(_) => return Ok(WaitOutcome::Pending),
            },
            None => rx.recv().await,
        };

        Ok(match received {
            Some(v) => WaitOutcome::Message(v),
            None => WaitOutcome::Closed,
        })
    }

    /// Sends a value on a supervisor → host channel.
    ///
    /// Returns `Ok(false)` when the channel is closed; a full queue closes it (same
    /// contract as host-side overflow) and also returns `Ok(false)`.
    pub fn send(&self, handle: ChannelHandle, value: Value) -> Result<bool, BridgeError> {
        let mut slots = self.slots.lock();
        let slot = lookup_mut(&mut slots, handle)?;
        if slot.direction != ChannelDirection::ToHost {
            return Err(BridgeError::WrongDirection {
                id: handle.id,
                op: "send",
            });
        }
        Ok(push(handle.id, slot, value))
    }

    /// Returns the state of a channel.
    pub fn state(&self, handle: ChannelHandle) -> Result<ChannelState, BridgeError> {
        let slots = self.slots.lock();
        Ok(lookup(&slots, handle)?.state())
    }

    /// Returns the configured capacity of a channel.
    pub fn capacity(&self, handle: ChannelHandle) -> Result<usize, BridgeError> {
        let slots = self.slots.lock();
        Ok(lookup(&slots, handle)?.capacity)
    }

    /// Destroys a channel. Pending and future waits on it observe `Closed`/`ResourceNotFound`.
    pub fn destroy(&self, handle: ChannelHandle) -> Result<(), BridgeError> {
        let mut slots = self.slots.lock();
        lookup(&slots, handle)?;
        slots.remove(&handle.id);
        debug!(channel = handle.id, "channel destroyed");
        Ok(())
    }

    /// Number of live channels.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---------------------------
    // Host side
    // ---------------------------

    /// Delivers a host message into a host → supervisor channel.
    ///
    /// Returns `false` if the channel is unknown, has the other direction, is closed,
    /// or was full (in which case the message is dropped and the channel closes).
    pub fn deliver(&self, id: u64, value: Value) -> bool {
        let mut slots = self.slots.lock();
        match slots.get_mut(&id) {
            Some(slot) if slot.direction == ChannelDirection::FromHost => push(id, slot, value),
            _ => false,
        }
    }

    /// Signals end-of-stream. Already queued messages are still delivered.
    ///
    /// Returns `false` if the channel is unknown.
    pub fn close(&self, id: u64) -> bool {
        let mut slots = self.slots.lock();
        match slots.get_mut(&id) {
            Some(slot) => {
                if slot.tx.take().is_some() {
                    debug!(channel = id, "channel closed");
                }
                true
            }
            None => false,
        }
    }

    /// Takes the next message of a supervisor → host channel, if one is queued.
    pub fn host_recv(&self, id: u64) -> Option<Value> {
        let rx = {
            let slots = self.slots.lock();
            let slot = slots.get(&id)?;
            if slot.direction != ChannelDirection::ToHost {
                return None;
            }
            Arc::clone(&slot.rx)
        };
        let mut rx = rx.try_lock().ok()?;
        rx.try_recv().ok()
    }

    /// Drains every queued message of a supervisor → host channel.
    pub fn host_drain(&self, id: u64) -> Vec<Value> {
        let mut out = Vec::new();
        while let Some(v) = self.host_recv(id) {
            out.push(v);
        }
        out
    }
}

/// Enqueues without blocking; overflow closes the channel.
fn push(id: u64, slot: &mut Slot, value: Value) -> bool {
    let Some(tx) = &slot.tx else {
        return false;
    };
    match tx.try_send(value) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(channel = id, capacity = slot.capacity, "channel overflow, closing");
            slot.tx = None;
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            slot.tx = None;
            false
        }
    }
}

fn lookup(slots: &HashMap<u64, Slot>, handle: ChannelHandle) -> Result<&Slot, BridgeError> {
    slots
        .get(&handle.id)
        .filter(|s| s.resource_id == handle.resource_id)
        .ok_or(BridgeError::ResourceNotFound {
            id: handle.id,
            resource_id: handle.resource_id,
        })
}

fn lookup_mut(
    slots: &mut HashMap<u64, Slot>,
    handle: ChannelHandle,
) -> Result<&mut Slot, BridgeError> {
    slots
        .get_mut(&handle.id)
        .filter(|s| s.resource_id == handle.resource_id)
        .ok_or(BridgeError::ResourceNotFound {
            id: handle.id,
            resource_id: handle.resource_id,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fifo_order_is_preserved() {
        let table = ChannelTable::new();
        let h = table.create(ChannelDirection::FromHost, 32);
        for i in 0..10 {
            assert!(table.deliver(h.id, json!(i)));
        }
        for i in 0..10 {
            assert_eq!(
                table.wait(h, None).await.unwrap(),
                WaitOutcome::Message(json!(i))
            );
        }
    }

    #[tokio::test]
    async fn test_closed_channel_never_blocks() {
        let table = ChannelTable::new();
        let h = table.create(ChannelDirection::FromHost, 4);
        assert!(table.deliver(h.id, json!("last")));
        assert!(table.close(h.id));

        assert_eq!(
            table.wait(h, None).await.unwrap(),
            WaitOutcome::Message(json!("last"))
        );
        for _ in 0..3 {
            assert!(table.wait(h, None).await.unwrap().is_closed());
        }
        assert_eq!(table.state(h).unwrap(), ChannelState::Closed);
        assert!(!table.deliver(h.id, json!("late")));
    }

    #[tokio::test]
    async fn test_overflow_closes_channel() {
        let table = ChannelTable::new();
        let h = table.create(ChannelDirection::FromHost, 2);
        assert!(table.deliver(h.id, json!(1)));
        assert!(table.deliver(h.id, json!(2)));
        assert!(!table.deliver(h.id, json!(3)));
        assert_eq!(table.state(h).unwrap(), ChannelState::Closed);

        assert_eq!(table.wait(h, None).await.unwrap(), WaitOutcome::Message(json!(1)));
        assert_eq!(table.wait(h, None).await.unwrap(), WaitOutcome::Message(json!(2)));
        assert!(table.wait(h, None).await.unwrap().is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_yields_pending_and_keeps_channel_open() {
        let table = ChannelTable::new();
        let h = table.create(ChannelDirection::FromHost, 1);
        let out = table
            .wait(h, Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert_eq!(out, WaitOutcome::Pending);
        assert_eq!(table.state(h).unwrap(), ChannelState::Open);

        assert!(table.deliver(h.id, json!("later")));
        assert_eq!(
            table.wait(h, Some(Duration::from_millis(50))).await.unwrap(),
            WaitOutcome::Message(json!("later"))
        );
    }

    #[tokio::test]
    async fn test_destroyed_handle_is_not_found() {
        let table = ChannelTable::new();
        let h = table.create(ChannelDirection::FromHost, 1);
        table.destroy(h).unwrap();
        assert!(matches!(
            table.wait(h, None).await,
            Err(BridgeError::ResourceNotFound { .. })
        ));
        assert!(matches!(
            table.destroy(h),
            Err(BridgeError::ResourceNotFound { .. })
        ));
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_stale_resource_id_is_rejected() {
        let table = ChannelTable::new();
        let h = table.create(ChannelDirection::FromHost, 1);
        let forged = ChannelHandle {
            id: h.id,
            resource_id: h.resource_id + 100,
        };
        assert!(matches!(
            table.state(forged),
            Err(BridgeError::ResourceNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_direction_is_enforced() {
        let table = ChannelTable::new();
        let to_host = table.create(ChannelDirection::ToHost, 4);
        let from_host = table.create(ChannelDirection::FromHost, 4);

        assert!(matches!(
            table.wait(to_host, None).await,
            Err(BridgeError::WrongDirection { op: "wait", .. })
        ));
        assert!(matches!(
            table.send(from_host, json!(1)),
            Err(BridgeError::WrongDirection { op: "send", .. })
        ));
        assert!(!table.deliver(to_host.id, json!(1)));
    }

    #[test]
    fn test_send_to_host_is_drained_in_order() {
        let table = ChannelTable::new();
        let h = table.create(ChannelDirection::ToHost, 8);
        assert!(table.send(h, json!("a")).unwrap());
        assert!(table.send(h, json!("b")).unwrap());
        assert_eq!(table.host_drain(h.id), vec![json!("a"), json!("b")]);
        assert_eq!(table.host_recv(h.id), None);

        assert!(table.close(h.id));
        assert!(!table.send(h, json!("c")).unwrap());
    }

    #[test]
    fn test_ids_are_unique() {
        let table = ChannelTable::new();
        let a = table.create(ChannelDirection::FromHost, 1);
        let b = table.create(ChannelDirection::FromHost, 1);
        assert_ne!(a.id, b.id);
        assert_ne!(a.resource_id, b.resource_id);
        assert_eq!(table.capacity(a).unwrap(), 1);
        assert_eq!(table.len(), 2);
    }
}
