//! # Decoded host events.
//!
//! Every notification carries `{id, time}`; most kinds add an `initiator` and kind-specific
//! fields. [`Event`] keeps the shared part flat and moves the rest into [`EventDetail`], a
//! tagged union keyed by [`EventKind`].
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use dcs_bridge::events::{Event, EventDetail, EventKind};
//!
//! let ev = Event::from_value(json!({"id": 22, "time": 12.0, "comment": "gg"})).unwrap();
//! assert_eq!(ev.kind, EventKind::PlayerComment);
//! assert!(matches!(ev.detail, EventDetail::Comment { ref comment } if comment == "gg"));
//! ```

use serde::Deserialize;
use serde_json::Value;

use super::kind::EventKind;
use super::object::{MarkPanel, SomeObject, Unit, Vec3, Weapon, object_from_value};
use crate::error::BridgeError;

/// One decoded host event. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    /// Mission time in seconds.
    pub time: f64,
    /// Object that caused the event, when the kind has one.
    pub initiator: Option<SomeObject>,
    pub detail: EventDetail,
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EventDetail {
    /// No fields beyond the shared ones.
    Bare,
    /// `Shot`.
    Shot { weapon: Weapon },
    /// `Hit`.
    Hit {
        weapon: Weapon,
        target: Option<SomeObject>,
    },
    /// `TakeOff`, `Land`, `BaseCaptured`, `Birth`, `LandingAfterEjection`.
    Place {
        place: Option<SomeObject>,
        sub_place: Option<f64>,
    },
    /// `Ejection`, `DiscardChairAfterEjection`.
    Target { target: Option<SomeObject> },
    /// `PlayerComment`.
    Comment { comment: String },
    /// `ShootingStart`.
    ShootingStart {
        target: Option<SomeObject>,
        weapon_name: String,
    },
    /// `ShootingEnd`, `WeaponAdd`.
    WeaponName { weapon_name: String },
    /// `MarkAdded`, `MarkChange`, `MarkRemoved`.
    Mark(MarkPanel),
    /// `Kill`.
    Kill {
        target: Option<SomeObject>,
        weapon: Option<Weapon>,
        weapon_name: String,
    },
    /// `LandingQualityMark`.
    LandingQuality {
        place: Option<SomeObject>,
        comment: String,
        sub_place: Option<f64>,
    },
}

/// Union of every field any kind may carry, as the host sends it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    id: u8,
    time: f64,
    #[serde(default)]
    initiator: Value,
    #[serde(default)]
    target: Value,
    #[serde(default)]
    place: Value,
    weapon: Option<Weapon>,
    sub_place: Option<f64>,
    comment: Option<String>,
    weapon_name: Option<String>,
    idx: Option<i64>,
    coalition: Option<i16>,
    text: Option<String>,
    pos: Option<Vec3>,
    #[serde(rename = "groupID")]
    group_id: Option<i64>,
}

impl Event {
    /// Decodes a raw host notification.
    ///
    /// Unknown kind codes and missing required fields yield [`BridgeError::MalformedEvent`].
    pub fn from_value(value: Value) -> Result<Self, BridgeError> {
        let raw: RawEvent = serde_json::from_value(value)
            .map_err(|e| BridgeError::malformed(format!("event payload: {e}")))?;
        let kind = EventKind::from_code(raw.id)
            .ok_or_else(|| BridgeError::malformed(format!("unknown event kind {}", raw.id)))?;

        let initiator = object(raw.initiator, "initiator")?;
        let detail = match kind {
            EventKind::Shot => EventDetail::Shot {
                weapon: required(raw.weapon, kind, "weapon")?,
            },
            EventKind::Hit => EventDetail::Hit {
                weapon: required(raw.weapon, kind, "weapon")?,
                target: object(raw.target, "target")?,
            },
            EventKind::TakeOff
            | EventKind::Land
            | EventKind::BaseCaptured
            | EventKind::Birth
            | EventKind::LandingAfterEjection => EventDetail::Place {
                place: object(raw.place, "place")?,
                sub_place: raw.sub_place,
            },
            EventKind::Ejection | EventKind::DiscardChairAfterEjection => EventDetail::Target {
                target: object(raw.target, "target")?,
            },
            EventKind::PlayerComment => EventDetail::Comment {
                comment: raw.comment.unwrap_or_default(),
            },
            EventKind::ShootingStart => EventDetail::ShootingStart {
                target: object(raw.target, "target")?,
                weapon_name: raw.weapon_name.unwrap_or_default(),
            },
            EventKind::ShootingEnd | EventKind::WeaponAdd => EventDetail::WeaponName {
                weapon_name: raw.weapon_name.unwrap_or_default(),
            },
            EventKind::MarkAdded | EventKind::MarkChange | EventKind::MarkRemoved => {
                EventDetail::Mark(MarkPanel {
                    idx: required(raw.idx, kind, "idx")?,
                    initiator: initiator.as_ref().and_then(SomeObject::as_unit).cloned(),
                    coalition: raw.coalition.unwrap_or(255),
                    text: raw.text.unwrap_or_default(),
                    pos: raw.pos.unwrap_or_default(),
                    group_id: raw.group_id.unwrap_or(-1),
                })
            }
            EventKind::Kill => EventDetail::Kill {
                target: object(raw.target, "target")?,
                weapon: raw.weapon,
                weapon_name: raw.weapon_name.unwrap_or_default(),
            },
            EventKind::LandingQualityMark => EventDetail::LandingQuality {
                place: object(raw.place, "place")?,
                comment: raw.comment.unwrap_or_default(),
                sub_place: raw.sub_place,
            },
            _ => EventDetail::Bare,
        };

        Ok(Event {
            kind,
            time: raw.time,
            initiator,
            detail,
        })
    }

    /// Initiator as a unit, the common case for player and AI activity.
    pub fn initiator_unit(&self) -> Option<&Unit> {
        self.initiator.as_ref().and_then(SomeObject::as_unit)
    }
}

fn object(raw: Value, field: &str) -> Result<Option<SomeObject>, BridgeError> {
    object_from_value(raw).map_err(|e| BridgeError::malformed(format!("{field}: {e}")))
}

fn required<T>(v: Option<T>, kind: EventKind, field: &str) -> Result<T, BridgeError> {
    v.ok_or_else(|| BridgeError::malformed(format!("{kind:?} event without {field}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::unit_json;

    #[test]
    fn test_shot_event() {
        let ev = Event::from_value(json!({
            "id": 1,
            "time": 100.25,
            "initiator": {"unit": unit_json("Viper-1-1")},
            "weapon": {
                "id": 9, "type": "AIM_120C", "position": [1.0, 2.0, 3.0],
                "launcher": unit_json("Viper-1-1")
            }
        }))
        .unwrap();

        assert_eq!(ev.kind, EventKind::Shot);
        assert_eq!(ev.initiator_unit().map(|u| u.name.as_str()), Some("Viper-1-1"));
        match ev.detail {
            EventDetail::Shot { weapon } => assert_eq!(weapon.type_name, "AIM_120C"),
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn test_shot_without_weapon_is_malformed() {
        let err = Event::from_value(json!({"id": 1, "time": 0.0})).unwrap_err();
        assert_eq!(err.as_label(), "bridge_malformed_event");
    }

    #[test]
    fn test_missing_time_is_malformed() {
        let err = Event::from_value(json!({"id": 11})).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedEvent { .. }));
    }

    #[test]
    fn test_unknown_kind_is_malformed() {
        assert!(Event::from_value(json!({"id": 99, "time": 0.0})).is_err());
        assert!(Event::from_value(json!({"time": 0.0})).is_err());
    }

    #[test]
    fn test_mark_event_uses_bare_initiator() {
        let ev = Event::from_value(json!({
            "id": 25,
            "time": 5.0,
            "idx": 12,
            "initiator": unit_json("Hornet-1"),
            "coalition": 2,
            "text": "target here",
            "pos": {"x": 10.0, "y": 0.0, "z": -4.0},
            "groupID": 77
        }))
        .unwrap();

        assert!(ev.kind.is_mark());
        let EventDetail::Mark(mark) = ev.detail else {
            panic!("expected mark detail");
        };
        assert_eq!(mark.idx, 12);
        assert_eq!(mark.initiator.map(|u| u.name), Some("Hornet-1".to_string()));
        assert_eq!(mark.group_id, 77);
    }

    #[test]
    fn test_empty_place_and_bare_kinds() {
        let ev = Event::from_value(json!({"id": 3, "time": 1.0, "initiator": {}, "place": {}, "subPlace": 0}))
            .unwrap();
        assert_eq!(ev.initiator, None);
        assert_eq!(
            ev.detail,
            EventDetail::Place {
                place: None,
                sub_place: Some(0.0)
            }
        );

        let start = Event::from_value(json!({"id": 11, "time": 0.0})).unwrap();
        assert_eq!(start.detail, EventDetail::Bare);
    }
}
