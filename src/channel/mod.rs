//! Channels: the bounded, single-direction queues between host and supervisor.
//!
//! ## Contents
//! - [`ChannelHandle`], [`ChannelDirection`], [`ChannelState`], [`WaitOutcome`] data model
//! - [`ChannelTable`] owner of every live channel (create / wait / send / deliver / close)
//!
//! Event streams, command registries and unit watchers are all built on top of a
//! host → supervisor channel plus one remote registration call.

mod handle;
mod table;

pub use handle::{ChannelDirection, ChannelHandle, ChannelState, WaitOutcome};
pub use table::ChannelTable;
