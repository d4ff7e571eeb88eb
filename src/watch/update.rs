//! # Watcher diffs and how they fold into a snapshot map.
//!
//! The host sends [`UnitWatcherUpdate`] diffs, never full snapshots. [`apply_update`] folds a
//! diff into a [`WatchedUnits`] map keyed by unit name:
//!
//! | Entry state   | Map value                        |
//! |---------------|----------------------------------|
//! | never seen    | key absent                       |
//! | present       | `Some(unit)` (latest snapshot)   |
//! | removed       | key absent, or `None` tombstone  |
//!
//! Tombstones are written only with `keep_removed = true`; they tell "seen then removed"
//! apart from "never seen".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::events::Unit;

/// Unit name → latest snapshot (`None` is a removal tombstone).
pub type WatchedUnits = HashMap<String, Option<Unit>>;

/// One diff from the host. Both parts may be omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitWatcherUpdate {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub updated: Vec<Unit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
}

impl UnitWatcherUpdate {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.removed.is_empty()
    }

    /// Flattens the diff: updated units first, then removal markers.
    pub fn into_items(self) -> impl Iterator<Item = WatchItem> {
        self.updated
            .into_iter()
            .map(WatchItem::Present)
            .chain(self.removed.into_iter().map(WatchItem::Removed))
    }
}

/// One element of a flattened diff.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchItem {
    Present(Unit),
    /// Name of a unit that is gone.
    Removed(String),
}

/// Folds `update` into `units`.
///
/// Updated entries are upserted by name; removed names are deleted, or replaced with a `None`
/// tombstone when `keep_removed` is set.
pub fn apply_update(units: &mut WatchedUnits, update: UnitWatcherUpdate, keep_removed: bool) {
    for unit in update.updated {
        units.insert(unit.name.clone(), Some(unit));
    }
    for name in update.removed {
        if keep_removed {
            units.insert(name, None);
        } else {
            units.remove(&name);
        }
    }
}

/// Extra data the host attaches to each snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WatchExtras {
    pub life: bool,
    pub ammo: bool,
    pub radar: bool,
    pub fuel: bool,
}

/// Options for `unitWatcherCreate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WatcherOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<WatchExtras>,
}

/// One or many unit names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitNames(pub Vec<String>);

impl From<&str> for UnitNames {
    fn from(name: &str) -> Self {
        UnitNames(vec![name.to_string()])
    }
}

impl From<String> for UnitNames {
    fn from(name: String) -> Self {
        UnitNames(vec![name])
    }
}

impl From<Vec<String>> for UnitNames {
    fn from(names: Vec<String>) -> Self {
        UnitNames(names)
    }
}

impl From<&[&str]> for UnitNames {
    fn from(names: &[&str]) -> Self {
        UnitNames(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for UnitNames {
    fn from(names: [&str; N]) -> Self {
        UnitNames(names.iter().map(|n| n.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::unit_json;

    fn unit(name: &str) -> Unit {
        serde_json::from_value(unit_json(name)).unwrap()
    }

    fn updated(names: &[&str]) -> UnitWatcherUpdate {
        UnitWatcherUpdate {
            updated: names.iter().map(|n| unit(n)).collect(),
            removed: vec![],
        }
    }

    fn removed(names: &[&str]) -> UnitWatcherUpdate {
        UnitWatcherUpdate {
            updated: vec![],
            removed: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn test_merge_drops_removed_units() {
        let mut units = WatchedUnits::new();
        apply_update(&mut units, updated(&["U1", "U2"]), false);
        apply_update(&mut units, removed(&["U1"]), false);

        assert_eq!(units.len(), 1);
        assert_eq!(units["U2"].as_ref().map(|u| u.name.as_str()), Some("U2"));
    }

    #[test]
    fn test_merge_keeps_tombstones() {
        let mut units = WatchedUnits::new();
        apply_update(&mut units, updated(&["U1", "U2"]), true);
        apply_update(&mut units, removed(&["U1"]), true);

        assert_eq!(units.len(), 2);
        assert_eq!(units.get("U1"), Some(&None));
        assert!(units["U2"].is_some());
        assert!(!units.contains_key("U3"));
    }

    #[test]
    fn test_upsert_replaces_snapshot() {
        let mut units = WatchedUnits::new();
        apply_update(&mut units, updated(&["U1"]), false);
        let mut moved = unit("U1");
        moved.speed = 99.0;
        apply_update(
            &mut units,
            UnitWatcherUpdate {
                updated: vec![moved],
                removed: vec![],
            },
            false,
        );
        assert_eq!(units["U1"].as_ref().map(|u| u.speed), Some(99.0));
    }

    #[test]
    fn test_omitted_parts_decode_empty() {
        let u: UnitWatcherUpdate = serde_json::from_value(json!({"removed": ["a"]})).unwrap();
        assert!(u.updated.is_empty());
        let items: Vec<_> = u.into_items().collect();
        assert_eq!(items, vec![WatchItem::Removed("a".into())]);
        assert!(serde_json::from_value::<UnitWatcherUpdate>(json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_options_wire_shape() {
        assert_eq!(serde_json::to_value(WatcherOptions::default()).unwrap(), json!({}));
        let opts = WatcherOptions {
            extra: Some(WatchExtras {
                fuel: true,
                ..Default::default()
            }),
        };
        assert_eq!(
            serde_json::to_value(opts).unwrap(),
            json!({"extra": {"life": false, "ammo": false, "radar": false, "fuel": true}})
        );
    }
}
