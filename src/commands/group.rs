//! # Per-group command menu.
//!
//! [`GroupMenu`] keeps one global command set and mirrors it into the F10 menu of every tracked
//! group. Entries with a handler are invocable leaves; entries without one are submenu
//! containers.
//!
//! ## Architecture
//! ```text
//! add_command(path, handler?) ──► commands[path] ──► for g in groups: add leaf | add submenu
//! remove_command(path)        ──► commands - path ──► for g in groups: remove
//! add_group(g)                ──► groups + g      ──► replay submenus, then leaves
//! remove_group(g)             ──► groups - g      ──► remove leaves for g
//! ```
//!
//! ## Rules
//! - Paths are unique; duplicate adds and unknown removals fail with no state change.
//! - `add_group` / `remove_group` are no-ops for a group already tracked / not tracked.
//! - Replication into a new group adds containers before anything placed inside them
//!   (submenus first, each class in path order).
//! - `remove_group` removes only the leaves; the host drops the containers on its own.
//! - Fan-out is not transactional: the local change is kept, the first failed host call is
//!   returned and the remaining groups are not touched.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::handler::{HandlerRef, run_handler};
use super::ops;
use super::path::{CommandInput, CommandPath, CommandTarget};
use super::registry::next_event;
use crate::bridge::Bridge;
use crate::channel::{ChannelDirection, ChannelHandle};
use crate::error::{BridgeError, RegistryError};

/// One entry of the global command set.
#[derive(Clone)]
pub struct GroupCommand {
    pub path: CommandPath,
    /// `None` marks a submenu container.
    pub handler: Option<HandlerRef>,
}

impl GroupCommand {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.handler.is_some()
    }
}

impl std::fmt::Debug for GroupCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupCommand")
            .field("path", &self.path)
            .field("leaf", &self.is_leaf())
            .finish()
    }
}

#[derive(Default)]
struct MenuState {
    groups: BTreeSet<String>,
    commands: BTreeMap<CommandPath, Option<HandlerRef>>,
}

/// Command set replicated into every tracked group.
pub struct GroupMenu {
    bridge: Bridge,
    channel: ChannelHandle,
    state: RwLock<MenuState>,
}

impl GroupMenu {
    /// Creates an empty menu with its own channel (`commandQueueSize` capacity).
    pub fn new(bridge: &Bridge) -> Arc<Self> {
        let capacity = bridge.config().command_queue_size_clamped();
        let channel = bridge.create_channel(ChannelDirection::FromHost, Some(capacity));
        Arc::new(Self {
            bridge: bridge.clone(),
            channel,
            state: RwLock::new(MenuState::default()),
        })
    }

    #[inline]
    pub fn channel(&self) -> ChannelHandle {
        self.channel
    }

    /// Adds an entry and replicates it into every tracked group.
    ///
    /// `handler = None` adds a submenu container.
    pub async fn add_command(
        &self,
        input: impl Into<CommandInput>,
        handler: Option<HandlerRef>,
    ) -> Result<(), BridgeError> {
        let (path, _) = input.into().resolve()?;
        let leaf = handler.is_some();
        let groups: Vec<String> = {
            let mut state = self.state.write().await;
            if state.commands.contains_key(&path) {
                return Err(RegistryError::DuplicatePath {
                    path: path.to_string(),
                }
                .into());
            }
            state.commands.insert(path.clone(), handler);
            state.groups.iter().cloned().collect()
        };

        debug!(%path, leaf, groups = groups.len(), "replicating command");
        for group in groups {
            self.replicate(&path, leaf, &CommandTarget::Group(group)).await?;
        }
        Ok(())
    }

    /// Removes an entry and withdraws it from every tracked group.
    pub async fn remove_command(&self, input: impl Into<CommandInput>) -> Result<(), BridgeError> {
        let (path, _) = input.into().resolve()?;
        let groups: Vec<String> = {
            let mut state = self.state.write().await;
            if state.commands.remove(&path).is_none() {
                return Err(RegistryError::UnknownPath {
                    path: path.to_string(),
                }
                .into());
            }
            state.groups.iter().cloned().collect()
        };

        for group in groups {
            ops::remove_entry(&self.bridge, &path, Some(&CommandTarget::Group(group))).await?;
        }
        Ok(())
    }

    /// Starts tracking `group` and replays the whole command set into it.
    ///
    /// Returns `false` if the group was already tracked.
    pub async fn add_group(&self, group: impl Into<String>) -> Result<bool, BridgeError> {
        let group = group.into();
        let (submenus, leaves) = {
            let mut state = self.state.write().await;
            if !state.groups.insert(group.clone()) {
                return Ok(false);
            }
            let (leaves, submenus): (Vec<_>, Vec<_>) = state
                .commands
                .iter()
                .map(|(path, handler)| (path.clone(), handler.is_some()))
                .partition(|(_, leaf)| *leaf);
            (submenus, leaves)
        };

        debug!(%group, entries = submenus.len() + leaves.len(), "replaying menu into group");
        let target = CommandTarget::Group(group);
        for (path, leaf) in submenus.into_iter().chain(leaves) {
            self.replicate(&path, leaf, &target).await?;
        }
        Ok(true)
    }

    /// Stops tracking `group` and removes its leaf entries.
    ///
    /// Returns `false` if the group was not tracked.
    pub async fn remove_group(&self, group: &str) -> Result<bool, BridgeError> {
        let leaves: Vec<CommandPath> = {
            let mut state = self.state.write().await;
            if !state.groups.remove(group) {
                return Ok(false);
            }
            state
                .commands
                .iter()
                .filter(|(_, handler)| handler.is_some())
                .map(|(path, _)| path.clone())
                .collect()
        };

        debug!(%group, leaves = leaves.len(), "withdrawing menu from group");
        let target = CommandTarget::group(group);
        for path in leaves {
            ops::remove_entry(&self.bridge, &path, Some(&target)).await?;
        }
        Ok(true)
    }

    /// Tracked groups, sorted.
    pub async fn groups(&self) -> Vec<String> {
        self.state.read().await.groups.iter().cloned().collect()
    }

    /// The global command set in path order.
    pub async fn commands(&self) -> Vec<GroupCommand> {
        self.state
            .read()
            .await
            .commands
            .iter()
            .map(|(path, handler)| GroupCommand {
                path: path.clone(),
                handler: handler.clone(),
            })
            .collect()
    }

    /// Routes host picks to handlers until the channel closes.
    pub async fn dispatch(&self) -> Result<(), BridgeError> {
        while let Some(event) = next_event(&self.bridge, self.channel).await? {
            let entry = self.state.read().await.commands.get(&event.path).cloned();
            match entry {
                Some(Some(handler)) => run_handler(&handler, event).await,
                Some(None) => debug!(path = %event.path, "submenu picked, nothing to run"),
                None => warn!(path = %event.path, "no command for path"),
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
                        warn!(error = %e, label = e.as_label(), "group menu dispatch stopped");
                    }
                }
            }
        })
    }

    async fn replicate(
        &self,
        path: &CommandPath,
        leaf: bool,
        target: &CommandTarget,
    ) -> Result<(), BridgeError> {
        if leaf {
            ops::add_leaf(&self.bridge, path, Some(target), self.channel).await?;
        } else {
            ops::add_submenu(&self.bridge, path, Some(target)).await?;
        }
        Ok(())
    }
}

impl Drop for GroupMenu {
    fn drop(&mut self) {
        let _ = self.bridge.destroy_channel(self.channel);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::commands::{CommandEvent, HandlerFn};
    use crate::testing::MockHost;

    fn noop() -> HandlerRef {
        HandlerFn::arc(|_ev: CommandEvent| async move { Ok::<_, BridgeError>(()) })
    }

    fn target(g: &str) -> Option<CommandTarget> {
        Some(CommandTarget::group(g))
    }

    #[tokio::test]
    async fn test_duplicate_path_leaves_state_unchanged() {
        let host = MockHost::new();
        let menu = GroupMenu::new(&host.bridge());
        menu.add_group("Viper-1").await.unwrap();

        menu.add_command("A", None).await.unwrap();
        menu.add_command(["A", "B"], None).await.unwrap();
        let calls_before = host.calls().len();

        let err = menu.add_command(["A", "B"], Some(noop())).await.unwrap_err();
        assert!(matches!(err, BridgeError::Registry(RegistryError::DuplicatePath { .. })));

        let cmds = menu.commands().await;
        assert_eq!(cmds.len(), 2);
        assert!(cmds.iter().all(|c| !c.is_leaf()));
        assert_eq!(host.calls().len(), calls_before);
        assert_eq!(host.calls_to("missionCommandsAddSubMenu").len(), 2);
        assert!(host.calls_to("missionCommandsAddCommand").is_empty());
        assert_eq!(host.menu(target("Viper-1").as_ref()).len(), 2);
    }

    #[tokio::test]
    async fn test_group_replication_round_trip() {
        let host = MockHost::new();
        let menu = GroupMenu::new(&host.bridge());

        menu.add_command("Support", None).await.unwrap();
        menu.add_command(["Support", "Tanker"], Some(noop())).await.unwrap();
        menu.add_command(["Support", "AWACS"], Some(noop())).await.unwrap();
        menu.add_command("Smoke", Some(noop())).await.unwrap();
        let k = menu.commands().await.len();

        host.clear_calls();
        assert!(menu.add_group("Viper-1").await.unwrap());
        assert_eq!(host.menu(target("Viper-1").as_ref()).len(), k);
        let order: Vec<String> = host.calls().into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            order,
            vec![
                "missionCommandsAddSubMenu",
                "missionCommandsAddCommand",
                "missionCommandsAddCommand",
                "missionCommandsAddCommand",
            ]
        );

        assert!(menu.remove_group("Viper-1").await.unwrap());
        let left = host.menu(target("Viper-1").as_ref());
        assert_eq!(left, vec![vec!["Support".to_string()]]);

        assert!(menu.add_group("Viper-1").await.unwrap());
        assert_eq!(host.menu(target("Viper-1").as_ref()).len(), k);
        assert_eq!(menu.groups().await, vec!["Viper-1".to_string()]);
    }

    #[tokio::test]
    async fn test_group_noops() {
        let host = MockHost::new();
        let menu = GroupMenu::new(&host.bridge());
        menu.add_command("Smoke", Some(noop())).await.unwrap();

        assert!(menu.add_group("g").await.unwrap());
        assert!(!menu.add_group("g").await.unwrap());
        assert_eq!(host.calls_to("missionCommandsAddCommand").len(), 1);

        assert!(!menu.remove_group("other").await.unwrap());
        assert!(host.calls_to("missionCommandsRemove").is_empty());
    }

    #[tokio::test]
    async fn test_commands_follow_tracked_groups() {
        let host = MockHost::new();
        let menu = GroupMenu::new(&host.bridge());
        menu.add_group("a").await.unwrap();
        menu.add_group("b").await.unwrap();

        menu.add_command("Smoke", Some(noop())).await.unwrap();
        assert_eq!(host.menu(target("a").as_ref()).len(), 1);
        assert_eq!(host.menu(target("b").as_ref()).len(), 1);

        menu.remove_command("Smoke").await.unwrap();
        assert!(host.menu(target("a").as_ref()).is_empty());
        assert!(host.menu(target("b").as_ref()).is_empty());

        let err = menu.remove_command("Smoke").await.unwrap_err();
        assert_eq!(err.as_label(), "registry_unknown_path");
    }

    #[tokio::test]
    async fn test_partial_fan_out_is_not_rolled_back() {
        let host = MockHost::new();
        let menu = GroupMenu::new(&host.bridge());
        menu.add_group("a").await.unwrap();
        host.fail("missionCommandsAddCommand", "menu full");

        assert!(menu.add_command("Smoke", Some(noop())).await.is_err());
        assert_eq!(menu.commands().await.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_runs_leaf_handlers() {
        let host = MockHost::new();
        let menu = GroupMenu::new(&host.bridge());
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let handler: HandlerRef = HandlerFn::arc(move |ev: CommandEvent| {
            let h = Arc::clone(&h);
            async move {
                assert_eq!(ev.target, Some(CommandTarget::group("a")));
                h.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BridgeError>(())
            }
        });
        menu.add_command("Menu", None).await.unwrap();
        menu.add_command(["Menu", "Go"], Some(handler)).await.unwrap();

        let id = menu.channel().id;
        host.deliver(id, json!({"path": ["Menu", "Go"], "target": {"group": "a"}}));
        host.deliver(id, json!({"path": ["Menu"], "target": {"group": "a"}}));
        host.deliver(id, json!({"path": ["Elsewhere"]}));
        host.close(id);

        menu.dispatch().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
