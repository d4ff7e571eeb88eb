//! # Bridge configuration.
//!
//! Provides [`BridgeConfig`], centralized settings for channels, streams and remote calls.
//!
//! ## Sentinel values
//! - `wait_timeout_ms = 0` → waits block until a message arrives or the channel closes
//! - capacities of `0` are clamped to `1`
//!
//! ## Loading
//! ```rust
//! use dcs_bridge::BridgeConfig;
//!
//! let cfg = BridgeConfig::from_json_str(r#"{ "eventQueueSize": 1024 }"#).unwrap();
//! assert_eq!(cfg.event_queue_size, 1024);
//! assert_eq!(cfg.channel_capacity, 32);
//! assert!(cfg.wait_timeout().is_none());
//! ```

use std::io::Read;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Global configuration for a [`Bridge`](crate::Bridge).
///
/// ## Field semantics
/// - `channel_capacity`: default capacity for [`Bridge::create_channel`](crate::Bridge::create_channel) callers
/// - `event_queue_size`: capacity of each event stream's channel
/// - `command_queue_size`: capacity of each command registry channel
/// - `watcher_interval_secs`: default host polling interval for unit watchers
/// - `wait_timeout_ms`: timeout applied by stream waits (`0` = none)
/// - `monitor_task_performance`: log the duration of every remote call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Default channel capacity.
    ///
    /// Overflowing a host → supervisor channel drops the message and closes the channel.
    pub channel_capacity: usize,

    /// Capacity of the channel created for each event stream.
    pub event_queue_size: usize,

    /// Capacity of the channel created for each command registry.
    pub command_queue_size: usize,

    /// Default polling interval (seconds) for unit watchers.
    pub watcher_interval_secs: f64,

    /// Timeout for stream waits in milliseconds.
    ///
    /// - `0` = no timeout
    /// - `> 0` = a wait yields "no message yet" after this long; streams keep waiting
    pub wait_timeout_ms: u64,

    /// Log target and elapsed time of every remote call at `info` level.
    pub monitor_task_performance: bool,
}

impl BridgeConfig {
    /// Parses a configuration from JSON text; missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Parses a configuration from a JSON reader (e.g. an opened config file).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Returns the stream wait timeout as an `Option`.
    ///
    /// - `None` → waits block
    /// - `Some(d)` → waits give up after `d`
    #[inline]
    pub fn wait_timeout(&self) -> Option<Duration> {
        if self.wait_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.wait_timeout_ms))
        }
    }

    /// Returns the default channel capacity clamped to a minimum of 1.
    #[inline]
    pub fn channel_capacity_clamped(&self) -> usize {
        self.channel_capacity.max(1)
    }

    /// Returns the event queue size clamped to a minimum of 1.
    #[inline]
    pub fn event_queue_size_clamped(&self) -> usize {
        self.event_queue_size.max(1)
    }

    /// Returns the command queue size clamped to a minimum of 1.
    #[inline]
    pub fn command_queue_size_clamped(&self) -> usize {
        self.command_queue_size.max(1)
    }

    /// Returns the default watcher interval; non-finite or negative values fall back to 1s.
    #[inline]
    pub fn watcher_interval(&self) -> Duration {
        if self.watcher_interval_secs.is_finite() && self.watcher_interval_secs > 0.0 {
            Duration::from_secs_f64(self.watcher_interval_secs)
        } else {
            Duration::from_secs(1)
        }
    }
}

impl Default for BridgeConfig {
    /// Default configuration:
    ///
    /// - `channel_capacity = 32`
    /// - `event_queue_size = 512`
    /// - `command_queue_size = 32`
    /// - `watcher_interval_secs = 1.0`
    /// - `wait_timeout_ms = 0` (no timeout)
    /// - `monitor_task_performance = false`
    fn default() -> Self {
        Self {
            channel_capacity: 32,
            event_queue_size: 512,
            command_queue_size: 32,
            watcher_interval_secs: 1.0,
            wait_timeout_ms: 0,
            monitor_task_performance: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_yields_defaults() {
        let cfg = BridgeConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, BridgeConfig::default());
    }

    #[test]
    fn test_sentinels_and_clamping() {
        let cfg = BridgeConfig {
            channel_capacity: 0,
            event_queue_size: 0,
            command_queue_size: 0,
            watcher_interval_secs: -3.0,
            wait_timeout_ms: 250,
            monitor_task_performance: true,
        };
        assert_eq!(cfg.channel_capacity_clamped(), 1);
        assert_eq!(cfg.event_queue_size_clamped(), 1);
        assert_eq!(cfg.command_queue_size_clamped(), 1);
        assert_eq!(cfg.watcher_interval(), Duration::from_secs(1));
        assert_eq!(cfg.wait_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_reader_accepts_camel_case() {
        let json = br#"{ "channelCapacity": 8, "monitorTaskPerformance": true, "watcherIntervalSecs": 0.5 }"#;
        let cfg = BridgeConfig::from_reader(&json[..]).unwrap();
        assert_eq!(cfg.channel_capacity, 8);
        assert!(cfg.monitor_task_performance);
        assert_eq!(cfg.watcher_interval(), Duration::from_millis(500));
    }
}
