//! # Flat command registry.
//!
//! One registry instance owns one host → supervisor channel. Every command added through it is
//! registered with the host against that channel, and a single dispatch loop routes the host's
//! [`CommandEvent`]s back to the handler stored under the event's path.
//!
//! ## Architecture
//! ```text
//! add(path, handler, target) ──► handlers[path] = handler ──► missionCommandsAddCommand
//! remove(path)               ──► handlers.remove(path)    ──► missionCommandsRemove
//!
//! host pick ──► channel ──► dispatch() ──► handlers[event.path] ──► handler.handle(event)
//!                                └─► unknown path: warn + skip
//! ```
//!
//! ## Rules
//! - A path is unique within the registry; re-adding it is a [`RegistryError::DuplicatePath`].
//! - A failed host call leaves the registry as it was before the call.
//! - Dispatch misses, handler errors and handler panics are logged, never fatal.
//! - Dispatch ends when the channel closes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::handler::{HandlerRef, run_handler};
use super::ops;
use super::path::{CommandEvent, CommandHandle, CommandInput, CommandPath, CommandTarget};
use crate::bridge::Bridge;
use crate::channel::{ChannelDirection, ChannelHandle, WaitOutcome};
use crate::error::{BridgeError, RegistryError};

struct Entry {
    handler: HandlerRef,
    target: Option<CommandTarget>,
}

/// Path-keyed registry of commands sharing one event channel.
pub struct CommandRegistry {
    bridge: Bridge,
    channel: ChannelHandle,
    entries: RwLock<HashMap<CommandPath, Entry>>,
}

impl CommandRegistry {
    /// Creates a registry with its own channel (`commandQueueSize` capacity).
    pub fn new(bridge: &Bridge) -> Arc<Self> {
        let capacity = bridge.config().command_queue_size_clamped();
        let channel = bridge.create_channel(ChannelDirection::FromHost, Some(capacity));
        Arc::new(Self {
            bridge: bridge.clone(),
            channel,
            entries: RwLock::new(HashMap::new()),
        })
    }

    /// Channel the host reports picks on.
    #[inline]
    pub fn channel(&self) -> ChannelHandle {
        self.channel
    }

    /// Adds a command and registers it with the host.
    ///
    /// `target` overrides the target carried by a [`CommandInput::ByHandle`].
    pub async fn add(
        &self,
        input: impl Into<CommandInput>,
        handler: HandlerRef,
        target: Option<CommandTarget>,
    ) -> Result<CommandHandle, BridgeError> {
        let (path, embedded) = input.into().resolve()?;
        let target = target.or(embedded);

        {
            let mut entries = self.entries.write().await;
            if entries.contains_key(&path) {
                return Err(RegistryError::DuplicatePath {
                    path: path.to_string(),
                }
                .into());
            }
            entries.insert(
                path.clone(),
                Entry {
                    handler,
                    target: target.clone(),
                },
            );
        }

        match ops::add_leaf(&self.bridge, &path, target.as_ref(), self.channel).await {
            Ok(handle) => Ok(handle),
            Err(e) => {
                self.entries.write().await.remove(&path);
                Err(e)
            }
        }
    }

    /// Removes a command locally and from the host.
    pub async fn remove(&self, input: impl Into<CommandInput>) -> Result<(), BridgeError> {
        let (path, _) = input.into().resolve()?;
        let entry = self
            .entries
            .write()
            .await
            .remove(&path)
            .ok_or_else(|| RegistryError::UnknownPath {
                path: path.to_string(),
            })?;
        ops::remove_entry(&self.bridge, &path, entry.target.as_ref()).await
    }

    pub async fn contains(&self, path: &CommandPath) -> bool {
        self.entries.read().await.contains_key(path)
    }

    /// Returns the registered paths, sorted.
    pub async fn paths(&self) -> Vec<CommandPath> {
        let entries = self.entries.read().await;
        let mut paths: Vec<CommandPath> = entries.keys().cloned().collect();
        paths.sort_unstable();
        paths
    }

    /// Routes host picks to handlers until the channel closes.
    pub async fn dispatch(&self) -> Result<(), BridgeError> {
        while let Some(event) = next_event(&self.bridge, self.channel).await? {
            let handler = self
                .entries
                .read()
                .await
                .get(&event.path)
                .map(|e| Arc::clone(&e.handler));
            match handler {
                Some(h) => run_handler(&h, event).await,
                None => warn!(path = %event.path, "no handler for command"),
            }
        }
        Ok(())
    }

    /// Spawns [`dispatch`](Self::dispatch) until the channel closes or `token` is cancelled.
    pub fn spawn_dispatch(self: Arc<Self>, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                res = self.dispatch() => {
                    if let Err(e) = res {
                        warn!(error = %e, label = e.as_label(), "command dispatch stopped");
                    }
                }
            }
        })
    }
}

impl Drop for CommandRegistry {
    fn drop(&mut self) {
        let _ = self.bridge.destroy_channel(self.channel);
    }
}

/// Next well-formed command event, `None` once the channel closed.
///
/// Undecodable payloads are logged and skipped.
pub(crate) async fn next_event(
    bridge: &Bridge,
    channel: ChannelHandle,
) -> Result<Option<CommandEvent>, BridgeError> {
    loop {
        match bridge.wait(channel, None).await? {
            WaitOutcome::Message(raw) => match serde_json::from_value::<CommandEvent>(raw) {
                Ok(event) => return Ok(Some(event)),
                Err(e) => warn!(channel = channel.id, error = %e, "malformed command event"),
            },
            WaitOutcome::Pending => continue,
            WaitOutcome::Closed => {
                debug!(channel = channel.id, "command channel closed");
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::commands::HandlerFn;
    use crate::testing::MockHost;

    fn counting(hits: &Arc<AtomicUsize>) -> HandlerRef {
        let hits = Arc::clone(hits);
        HandlerFn::arc(move |_ev: CommandEvent| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BridgeError>(())
            }
        })
    }

    #[tokio::test]
    async fn test_add_dispatch_remove() {
        let host = MockHost::new();
        let bridge = host.bridge();
        let registry = CommandRegistry::new(&bridge);
        let hits = Arc::new(AtomicUsize::new(0));

        let handle = registry.add("Smoke", counting(&hits), None).await.unwrap();
        assert_eq!(handle.path, CommandPath::from("Smoke"));
        assert_eq!(host.menu(None), vec![vec!["Smoke".to_string()]]);

        let id = registry.channel().id;
        host.deliver(id, json!({"path": ["Smoke"]}));
        host.deliver(id, json!({"path": ["Nope"]}));
        host.deliver(id, json!({"garbage": true}));
        host.deliver(id, json!({"path": ["Smoke"]}));
        host.close(id);

        registry.dispatch().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        registry.remove(handle).await.unwrap();
        assert!(host.menu(None).is_empty());
        assert!(registry.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_and_unknown_paths() {
        let host = MockHost::new();
        let bridge = host.bridge();
        let registry = CommandRegistry::new(&bridge);
        let hits = Arc::new(AtomicUsize::new(0));

        ops::add_submenu(&bridge, &CommandPath::from("Menu"), None).await.unwrap();
        registry.add(["Menu", "Go"], counting(&hits), None).await.unwrap();
        let err = registry.add(["Menu", "Go"], counting(&hits), None).await.unwrap_err();
        assert!(matches!(err, BridgeError::Registry(RegistryError::DuplicatePath { .. })));
        assert_eq!(host.calls_to("missionCommandsAddCommand").len(), 1);

        let err = registry.remove("Go").await.unwrap_err();
        assert_eq!(err.as_label(), "registry_unknown_path");
        assert_eq!(registry.paths().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_host_add_rolls_back() {
        let host = MockHost::new();
        host.fail("missionCommandsAddCommand", "menu full");
        let bridge = host.bridge();
        let registry = CommandRegistry::new(&bridge);
        let hits = Arc::new(AtomicUsize::new(0));

        assert!(registry.add("Smoke", counting(&hits), None).await.is_err());
        assert!(!registry.contains(&CommandPath::from("Smoke")).await);
    }

    #[tokio::test]
    async fn test_spawned_dispatch_stops_on_cancel() {
        let host = MockHost::new();
        let bridge = host.bridge();
        let registry = CommandRegistry::new(&bridge);
        let hits = Arc::new(AtomicUsize::new(0));
        let target = Some(CommandTarget::group("Viper-1"));
        registry.add("Smoke", counting(&hits), target.clone()).await.unwrap();
        assert_eq!(host.menu(target.as_ref()).len(), 1);

        let token = CancellationToken::new();
        let join = Arc::clone(&registry).spawn_dispatch(token.clone());
        host.deliver(registry.channel().id, json!({"path": ["Smoke"], "target": {"group": "Viper-1"}}));
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        token.cancel();
        join.await.unwrap();
    }
}
