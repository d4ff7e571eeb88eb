//! # Host menu calls.
//!
//! The three calls both registries are built on. Each returns once the host acknowledged the
//! change; nothing is retried.
//!
//! | Call                        | Payload                               |
//! |-----------------------------|---------------------------------------|
//! | `missionCommandsAddCommand` | `{name, path, target, channel}`       |
//! | `missionCommandsAddSubMenu` | `{name, path, target}`                |
//! | `missionCommandsRemove`     | `{path, target}`                      |
//!
//! `path` is the parent submenu (`null` at top level) for adds and the full path for removal.

use serde_json::json;
use tracing::debug;

use super::path::{CommandHandle, CommandPath, CommandTarget};
use crate::bridge::Bridge;
use crate::channel::ChannelHandle;
use crate::error::BridgeError;

/// Adds an invocable entry; the host reports picks on `channel`.
pub async fn add_leaf(
    bridge: &Bridge,
    path: &CommandPath,
    target: Option<&CommandTarget>,
    channel: ChannelHandle,
) -> Result<CommandHandle, BridgeError> {
    debug!(%path, ?target, "adding command");
    bridge
        .invoke(
            "missionCommandsAddCommand",
            Some(json!({
                "name": path.name(),
                "path": path.parent(),
                "target": target,
                "channel": channel,
            })),
        )
        .await?;
    Ok(handle(path, target))
}

/// Adds a submenu container.
pub async fn add_submenu(
    bridge: &Bridge,
    path: &CommandPath,
    target: Option<&CommandTarget>,
) -> Result<CommandHandle, BridgeError> {
    debug!(%path, ?target, "adding submenu");
    bridge
        .invoke(
            "missionCommandsAddSubMenu",
            Some(json!({
                "name": path.name(),
                "path": path.parent(),
                "target": target,
            })),
        )
        .await?;
    Ok(handle(path, target))
}

/// Removes an entry (and, host side, anything below it).
pub async fn remove_entry(
    bridge: &Bridge,
    path: &CommandPath,
    target: Option<&CommandTarget>,
) -> Result<(), BridgeError> {
    debug!(%path, ?target, "removing command");
    bridge
        .invoke(
            "missionCommandsRemove",
            Some(json!({ "path": path, "target": target })),
        )
        .await?;
    Ok(())
}

fn handle(path: &CommandPath, target: Option<&CommandTarget>) -> CommandHandle {
    CommandHandle {
        path: path.clone(),
        target: target.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::channel::ChannelDirection;
    use crate::testing::MockHost;

    #[tokio::test]
    async fn test_payload_shapes() {
        let host = MockHost::new();
        let bridge = host.bridge();
        let ch = bridge.create_channel(ChannelDirection::FromHost, None);
        let group = CommandTarget::group("Viper-1");
        let leaf = CommandPath::try_from(&["Support", "Tanker"][..]).unwrap();

        add_submenu(&bridge, &CommandPath::from("Support"), Some(&group)).await.unwrap();
        let h = add_leaf(&bridge, &leaf, Some(&group), ch).await.unwrap();
        remove_entry(&bridge, &h.path, h.target.as_ref()).await.unwrap();

        let sub = &host.calls_to("missionCommandsAddSubMenu")[0];
        assert_eq!(sub["name"], "Support");
        assert_eq!(sub["path"], Value::Null);

        let add = &host.calls_to("missionCommandsAddCommand")[0];
        assert_eq!(add["name"], "Tanker");
        assert_eq!(add["path"], json!(["Support"]));
        assert_eq!(add["target"], json!({"group": "Viper-1"}));
        assert_eq!(add["channel"]["id"], json!(ch.id));

        let rm = &host.calls_to("missionCommandsRemove")[0];
        assert_eq!(rm, &json!({"path": ["Support", "Tanker"], "target": {"group": "Viper-1"}}));
    }
}
