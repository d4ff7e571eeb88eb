//! # Unit watcher.
//!
//! The host polls a set of watched unit names at a fixed interval and delivers a
//! [`UnitWatcherUpdate`] diff into the watcher's channel whenever something changed.
//!
//! ```text
//! create(interval, opts) ──► unitWatcherCreate{updateIntervalSeconds, channel, opts} ──► id
//! add(names) / remove(names) ──► unitWatcherAdd / unitWatcherRemove{id, names} ──► bool
//!
//! host poll ──► channel ──► next_update() ──► stream_updates / stream_units / stream_into
//! ```
//!
//! ## Rules
//! - Single pass, like [`EventStream`](crate::events::EventStream): after the channel
//!   closes, every consumer ends.
//! - A malformed diff is reported as `Err(MalformedEvent)`; the watcher stays usable.

use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use tracing::{debug, warn};

use super::update::{UnitNames, UnitWatcherUpdate, WatchItem, WatchedUnits, WatcherOptions, apply_update};
use crate::bridge::Bridge;
use crate::channel::{ChannelDirection, ChannelHandle, WaitOutcome};
use crate::error::BridgeError;

/// Host-side polling loop exposed as a stream of diffs.
pub struct UnitWatcher {
    bridge: Bridge,
    id: u64,
    channel: ChannelHandle,
    done: bool,
}

impl UnitWatcher {
    /// Starts a host-side watcher.
    ///
    /// `interval = None` uses the configured `watcherIntervalSecs` (1s by default).
    pub async fn create(
        bridge: &Bridge,
        interval: Option<Duration>,
        opts: WatcherOptions,
    ) -> Result<Self, BridgeError> {
        let interval = interval.unwrap_or_else(|| bridge.config().watcher_interval());
        let channel = bridge.create_channel(ChannelDirection::FromHost, None);
        let args = json!({
            "updateIntervalSeconds": interval.as_secs_f64(),
            "channel": channel,
            "opts": opts,
        });

        match bridge.invoke_as::<u64, _>("unitWatcherCreate", args).await {
            Ok(id) => {
                debug!(watcher = id, channel = channel.id, "unit watcher created");
                Ok(Self {
                    bridge: bridge.clone(),
                    id,
                    channel,
                    done: false,
                })
            }
            Err(e) => {
                let _ = bridge.destroy_channel(channel);
                Err(e)
            }
        }
    }

    /// Host watcher id.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn channel(&self) -> ChannelHandle {
        self.channel
    }

    /// Adds names to the watched set.
    pub async fn add(&self, names: impl Into<UnitNames>) -> Result<bool, BridgeError> {
        self.update_names("unitWatcherAdd", names.into()).await
    }

    /// Removes names from the watched set.
    pub async fn remove(&self, names: impl Into<UnitNames>) -> Result<bool, BridgeError> {
        self.update_names("unitWatcherRemove", names.into()).await
    }

    async fn update_names(&self, target: &str, names: UnitNames) -> Result<bool, BridgeError> {
        self.bridge
            .invoke_as(target, json!({ "id": self.id, "names": names.0 }))
            .await
    }

    /// Waits for the next diff. `Ok(None)` once the channel has closed.
    pub async fn next_update(&mut self) -> Result<Option<UnitWatcherUpdate>, BridgeError> {
        while !self.done {
            let outcome = match self.bridge.wait(self.channel, None).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            };
            match outcome {
                WaitOutcome::Message(raw) => {
                    return serde_json::from_value(raw)
                        .map(Some)
                        .map_err(|e| BridgeError::malformed(format!("watcher update: {e}")));
                }
                WaitOutcome::Pending => continue,
                WaitOutcome::Closed => {
                    debug!(watcher = self.id, "unit watcher ended");
                    self.done = true;
                }
            }
        }
        Ok(None)
    }

    /// Raw diffs until the channel closes.
    pub fn stream_updates(self) -> impl Stream<Item = Result<UnitWatcherUpdate, BridgeError>> {
        stream::unfold(self, |mut w| async move {
            match w.next_update().await {
                Ok(Some(update)) => Some((Ok(update), w)),
                Ok(None) => None,
                Err(e) => Some((Err(e), w)),
            }
        })
    }

    /// Diffs flattened into one item per present unit or removed name.
    pub fn stream_units(self) -> impl Stream<Item = Result<WatchItem, BridgeError>> {
        self.stream_updates()
            .map(|res| {
                let items: Vec<Result<WatchItem, BridgeError>> = match res {
                    Ok(update) => update.into_items().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            })
            .flatten()
    }

    /// Folds every diff into `units` until the channel closes.
    ///
    /// Malformed diffs are logged and skipped; other failures end the fold.
    pub async fn stream_into(
        &mut self,
        units: &mut WatchedUnits,
        keep_removed: bool,
    ) -> Result<(), BridgeError> {
        loop {
            match self.next_update().await {
                Ok(Some(update)) => apply_update(units, update, keep_removed),
                Ok(None) => return Ok(()),
                Err(BridgeError::MalformedEvent { reason }) => {
                    warn!(watcher = self.id, %reason, "skipping malformed update");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Drop for UnitWatcher {
    fn drop(&mut self) {
        let _ = self.bridge.destroy_channel(self.channel);
    }
}
