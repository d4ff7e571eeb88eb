//! # In-process host double.
//!
//! [`MockHost`] implements [`Invoke`] without a scripting runtime behind it. It records every
//! call, answers with scripted replies or failures, and keeps a per-target model of the command
//! menu so menu replication can be checked entry by entry. Its channel table is shared with the
//! bridges it hands out, so tests can play the host side with [`MockHost::deliver`] and
//! [`MockHost::close`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::bridge::{Bridge, Invoke};
use crate::channel::ChannelTable;
use crate::commands::CommandTarget;
use crate::config::BridgeConfig;
use crate::error::BridgeError;

#[derive(Default)]
struct HostState {
    calls: Vec<(String, Value)>,
    replies: HashMap<String, Value>,
    failures: HashMap<String, String>,
    /// Menu entries per serialized target (`null` = everyone).
    menus: HashMap<String, BTreeSet<Vec<String>>>,
}

/// Scriptable fake host.
#[derive(Clone, Default)]
pub struct MockHost {
    state: Arc<Mutex<HostState>>,
    channels: Arc<ChannelTable>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge with default config that calls into this host.
    pub fn bridge(&self) -> Bridge {
        self.bridge_with(BridgeConfig::default())
    }

    pub fn bridge_with(&self, cfg: BridgeConfig) -> Bridge {
        Bridge::with_channels(cfg, Arc::new(self.clone()), Arc::clone(&self.channels))
    }

    /// Answers every later call to `target` with `value`.
    pub fn reply(&self, target: &str, value: Value) {
        self.state.lock().replies.insert(target.to_string(), value);
    }

    /// Fails every later call to `target` with `message`.
    pub fn fail(&self, target: &str, message: &str) {
        self.state
            .lock()
            .failures
            .insert(target.to_string(), message.to_string());
    }

    pub fn clear_failure(&self, target: &str) {
        self.state.lock().failures.remove(target);
    }

    /// Every call so far as `(target, args)`; absent args are `null`.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.state.lock().calls.clone()
    }

    /// Arguments of every call to `target`, in order.
    pub fn calls_to(&self, target: &str) -> Vec<Value> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, args)| args.clone())
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Host → supervisor delivery.
    pub fn deliver(&self, channel_id: u64, value: Value) -> bool {
        self.channels.deliver(channel_id, value)
    }

    /// Host-side end of stream.
    pub fn close(&self, channel_id: u64) -> bool {
        self.channels.close(channel_id)
    }

    /// Menu entries visible to `target` (`None` = entries added without a target), sorted.
    pub fn menu(&self, target: Option<&CommandTarget>) -> Vec<Vec<String>> {
        let key = json!(target).to_string();
        self.state
            .lock()
            .menus
            .get(&key)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn handle(state: &mut HostState, target: &str, args: &Value) -> Result<Value, String> {
        match target {
            "missionCommandsAddCommand" | "missionCommandsAddSubMenu" => {
                let mut path = segments(&args["path"]);
                let parent_known = path.is_empty()
                    || state
                        .menus
                        .get(&args["target"].to_string())
                        .is_some_and(|m| m.contains(&path));
                if !parent_known {
                    return Err(format!("submenu {path:?} does not exist"));
                }
                path.push(args["name"].as_str().unwrap_or_default().to_string());
                state
                    .menus
                    .entry(args["target"].to_string())
                    .or_default()
                    .insert(path.clone());
                Ok(json!({ "path": path }))
            }
            "missionCommandsRemove" => {
                let path = segments(&args["path"]);
                if let Some(menu) = state.menus.get_mut(&args["target"].to_string()) {
                    menu.retain(|entry| !entry.starts_with(&path));
                }
                Ok(Value::Null)
            }
            _ => Ok(state.replies.get(target).cloned().unwrap_or(Value::Null)),
        }
    }
}

fn segments(v: &Value) -> Vec<String> {
    v.as_array()
        .map(|a| {
            a.iter()
                .filter_map(|s| s.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl Invoke for MockHost {
    async fn invoke(&self, target: &str, args: Option<Value>) -> Result<Value, BridgeError> {
        let args = args.unwrap_or(Value::Null);
        let mut state = self.state.lock();
        state.calls.push((target.to_string(), args.clone()));
        if let Some(message) = state.failures.get(target).cloned() {
            return Err(BridgeError::Remote {
                target: target.to_string(),
                message,
            });
        }
        Self::handle(&mut state, target, &args).map_err(|message| BridgeError::Remote {
            target: target.to_string(),
            message,
        })
    }
}

/// Host JSON for a blue F-16 named `name`.
pub fn unit_json(name: &str) -> Value {
    json!({
        "id": 1001,
        "name": name,
        "callsign": "Enfield11",
        "coalition": 2,
        "type": "F-16C_50",
        "position": [42.1, 41.7, 3000.0],
        "groupName": "Viper-1",
        "numberInGroup": 1,
        "speed": 210.5,
        "heading": 1.57,
        "category": 0
    })
}
