//! # Channel handle and wait results.
//!
//! A [`ChannelHandle`] is the pair the host and the supervisor both use to name a
//! channel. It is plain data (`Copy`) and serializes as `{"id": .., "resourceId": ..}`,
//! which is the shape the host expects inside remote-call payloads.

use serde::{Deserialize, Serialize};

/// Direction messages flow through a channel.
///
/// Encoded on the wire as `1` (to host) / `2` (from host).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ChannelDirection {
    /// Supervisor → host. The supervisor [`send`](crate::ChannelTable::send)s, the host drains.
    ToHost = 1,
    /// Host → supervisor. The host delivers, the supervisor [`wait`](crate::ChannelTable::wait)s.
    FromHost = 2,
}

impl From<ChannelDirection> for u8 {
    fn from(d: ChannelDirection) -> Self {
        d as u8
    }
}

impl TryFrom<u8> for ChannelDirection {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ChannelDirection::ToHost),
            2 => Ok(ChannelDirection::FromHost),
            other => Err(format!("unknown channel direction {other}")),
        }
    }
}

/// Opaque identifier pair naming one channel.
///
/// - `id`: logical id, the only thing the host needs to deliver messages
/// - `resource_id`: supervisor-side resource id; a handle is valid only while both match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelHandle {
    /// Logical channel id.
    pub id: u64,
    /// Supervisor-side resource id.
    pub resource_id: u32,
}

/// Lifecycle of a channel. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Open,
    Closed,
}

/// Result of a single wait on a host → supervisor channel.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome<T = serde_json::Value> {
    /// Next message in host order.
    Message(T),
    /// The channel closed (explicitly or by overflow) and its queue is drained.
    Closed,
    /// The wait timed out; the channel is still open.
    Pending,
}

impl<T> WaitOutcome<T> {
    /// Returns the message, if any.
    #[inline]
    pub fn into_message(self) -> Option<T> {
        match self {
            WaitOutcome::Message(v) => Some(v),
            WaitOutcome::Closed | WaitOutcome::Pending => None,
        }
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, WaitOutcome::Closed)
    }
}
