//! # Bridge facade.
//!
//! [`Bridge`] bundles the three things every component needs: the [`BridgeConfig`],
//! the remote call boundary ([`InvokeRef`]) and the [`ChannelTable`]. It is cheap to clone
//! (three `Arc`s) and is passed by value into event streams, registries and watchers.
//!
//! ```text
//!   EventStream ─┐
//!   Registries  ─┼──► Bridge ──► invoke(target, args) ──► host
//!   UnitWatcher ─┘        └────► ChannelTable ◄── deliver/close ── host
//! ```

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::invoke::InvokeRef;
use crate::channel::{ChannelDirection, ChannelHandle, ChannelTable, WaitOutcome};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::events::EventKind;

/// Shared entry point into the host.
#[derive(Clone)]
pub struct Bridge {
    cfg: Arc<BridgeConfig>,
    invoker: InvokeRef,
    channels: Arc<ChannelTable>,
}

impl Bridge {
    /// Creates a bridge with a fresh channel table.
    pub fn new(cfg: BridgeConfig, invoker: InvokeRef) -> Self {
        Self::with_channels(cfg, invoker, Arc::new(ChannelTable::new()))
    }

    /// Creates a bridge over an existing channel table (shared with the host side).
    pub fn with_channels(cfg: BridgeConfig, invoker: InvokeRef, channels: Arc<ChannelTable>) -> Self {
        Self {
            cfg: Arc::new(cfg),
            invoker,
            channels,
        }
    }

    #[inline]
    pub fn config(&self) -> &BridgeConfig {
        &self.cfg
    }

    /// Returns the channel table; the host side delivers into it.
    #[inline]
    pub fn channels(&self) -> &Arc<ChannelTable> {
        &self.channels
    }

    /// Performs one remote call.
    ///
    /// With `monitor_task_performance` set, the elapsed time of every call is logged.
    pub async fn invoke(&self, target: &str, args: Option<Value>) -> Result<Value, BridgeError> {
        if !self.cfg.monitor_task_performance {
            return self.invoker.invoke(target, args).await;
        }
        let started = Instant::now();
        let res = self.invoker.invoke(target, args).await;
        info!(
            target_name = target,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            ok = res.is_ok(),
            "task finished"
        );
        res
    }

    /// Performs a remote call with typed arguments and result.
    pub async fn invoke_as<T, A>(&self, target: &str, args: A) -> Result<T, BridgeError>
    where
        T: DeserializeOwned,
        A: Serialize,
    {
        let args = serde_json::to_value(args).map_err(|e| BridgeError::payload(target, e))?;
        let value = self.invoke(target, Some(args)).await?;
        serde_json::from_value(value).map_err(|e| BridgeError::payload(target, e))
    }

    /// Performs an argument-less remote call.
    pub async fn call(&self, target: &str) -> Result<Value, BridgeError> {
        self.invoke(target, None).await
    }

    /// Creates a channel. `capacity = None` uses the configured default.
    pub fn create_channel(&self, direction: ChannelDirection, capacity: Option<usize>) -> ChannelHandle {
        let capacity = capacity.unwrap_or_else(|| self.cfg.channel_capacity_clamped());
        self.channels.create(direction, capacity)
    }

    /// Waits on a host → supervisor channel.
    ///
    /// `timeout = None` falls back to the configured `wait_timeout_ms` (none by default).
    pub async fn wait(
        &self,
        handle: ChannelHandle,
        timeout: Option<std::time::Duration>,
    ) -> Result<WaitOutcome, BridgeError> {
        self.channels
            .wait(handle, timeout.or_else(|| self.cfg.wait_timeout()))
            .await
    }

    /// Sends on a supervisor → host channel. `Ok(false)` when the channel is closed.
    pub fn send(&self, handle: ChannelHandle, value: Value) -> Result<bool, BridgeError> {
        self.channels.send(handle, value)
    }

    pub fn destroy_channel(&self, handle: ChannelHandle) -> Result<(), BridgeError> {
        self.channels.destroy(handle)
    }

    /// Registers `channel` with the host as an event sink.
    ///
    /// `filter = None` subscribes to every event kind.
    pub async fn register_event_producer(
        &self,
        channel: ChannelHandle,
        filter: Option<&[EventKind]>,
    ) -> Result<(), BridgeError> {
        let events: Option<Vec<u8>> = filter.map(|kinds| kinds.iter().map(|k| k.code()).collect());
        debug!(channel = channel.id, ?events, "registering event producer");
        self.invoke(
            "createEventProducer",
            Some(json!({ "channel": channel, "events": events })),
        )
        .await?;
        Ok(())
    }

    /// Evaluates a code snippet in the host (debugging aid).
    pub async fn eval(&self, code: &str) -> Result<Value, BridgeError> {
        self.invoke("eval", Some(json!({ "code": code }))).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::MockHost;

    #[tokio::test]
    async fn test_invoke_as_round_trips_types() {
        let host = MockHost::new();
        host.reply("getTime", json!(73.5));
        let bridge = host.bridge();

        let t: f64 = bridge.invoke_as("getTime", json!({})).await.unwrap();
        assert_eq!(t, 73.5);

        let err = bridge.invoke_as::<String, _>("getTime", ()).await.unwrap_err();
        assert_eq!(err.as_label(), "bridge_payload_invalid");
    }

    #[tokio::test]
    async fn test_register_event_producer_payload() {
        let host = MockHost::new();
        let bridge = host.bridge();
        let ch = bridge.create_channel(ChannelDirection::FromHost, Some(4));

        bridge
            .register_event_producer(ch, Some(&[EventKind::Shot, EventKind::Dead]))
            .await
            .unwrap();
        bridge.register_event_producer(ch, None).await.unwrap();

        let calls = host.calls_to("createEventProducer");
        assert_eq!(
            calls[0],
            json!({"channel": {"id": ch.id, "resourceId": ch.resource_id}, "events": [1, 8]})
        );
        assert_eq!(calls[1]["events"], Value::Null);
    }

    #[tokio::test]
    async fn test_remote_failure_is_surfaced_without_retry() {
        let host = MockHost::new();
        host.fail("eval", "syntax error");
        let bridge = host.bridge();

        let err = bridge.eval("return 1 +").await.unwrap_err();
        assert!(err.is_remote());
        assert_eq!(host.calls_to("eval").len(), 1);
    }

    #[tokio::test]
    async fn test_default_capacity_comes_from_config() {
        let host = MockHost::new();
        let bridge = host.bridge();
        let ch = bridge.create_channel(ChannelDirection::FromHost, None);
        assert_eq!(bridge.channels().capacity(ch).unwrap(), 32);
        bridge.destroy_channel(ch).unwrap();
        assert!(bridge.channels().is_empty());
    }
}
