//! # Host objects carried by events and watcher updates.
//!
//! Field names follow the host's JSON (`camelCase`, `groupID`). Objects referenced from an
//! event arrive wrapped in a single-key map naming their kind (`{"unit": {...}}`); an empty
//! map means "no object" and decodes to `None`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// `[latitude, longitude, altitude]`.
pub type Position = [f64; 3];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Side an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Coalition {
    All = -1,
    Neutral = 0,
    Red = 1,
    Blue = 2,
}

impl From<Coalition> for i8 {
    fn from(c: Coalition) -> Self {
        c as i8
    }
}

impl TryFrom<i8> for Coalition {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Coalition::All),
            0 => Ok(Coalition::Neutral),
            1 => Ok(Coalition::Red),
            2 => Ok(Coalition::Blue),
            other => Err(format!("unknown coalition {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum GroupCategory {
    Airplane = 0,
    Helicopter = 1,
    Ground = 2,
    Ship = 3,
    Train = 4,
}

impl From<GroupCategory> for u8 {
    fn from(c: GroupCategory) -> Self {
        c as u8
    }
}

impl TryFrom<u8> for GroupCategory {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GroupCategory::Airplane),
            1 => Ok(GroupCategory::Helicopter),
            2 => Ok(GroupCategory::Ground),
            3 => Ok(GroupCategory::Ship),
            4 => Ok(GroupCategory::Train),
            other => Err(format!("unknown group category {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AirbaseCategory {
    Unspecified = 0,
    Airdrome = 1,
    Helipad = 2,
    Ship = 3,
}

impl From<AirbaseCategory> for u8 {
    fn from(c: AirbaseCategory) -> Self {
        c as u8
    }
}

impl TryFrom<u8> for AirbaseCategory {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AirbaseCategory::Unspecified),
            1 => Ok(AirbaseCategory::Airdrome),
            2 => Ok(AirbaseCategory::Helipad),
            3 => Ok(AirbaseCategory::Ship),
            other => Err(format!("unknown airbase category {other}")),
        }
    }
}

/// Snapshot of a live unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: u64,
    pub name: String,
    pub callsign: String,
    pub coalition: Coalition,
    #[serde(rename = "type")]
    pub type_name: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    pub group_name: String,
    pub number_in_group: u32,
    pub speed: f64,
    pub heading: f64,
    pub category: GroupCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airbase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub callsign: String,
    pub coalition: Coalition,
    pub position: Position,
    pub airbase_category: AirbaseCategory,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: u64,
    #[serde(rename = "type")]
    pub type_name: String,
    pub position: Position,
    pub launcher: Unit,
    #[serde(
        default,
        with = "object_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub target: Option<Box<SomeObject>>,
}

/// Map marker placed by a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkPanel {
    pub idx: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator: Option<Unit>,
    /// Raw coalition code; `255` marks a panel visible to everyone.
    pub coalition: i16,
    pub text: String,
    pub pos: Vec3,
    #[serde(rename = "groupID", default)]
    pub group_id: i64,
}

impl MarkPanel {
    /// Coalition the panel is restricted to, `None` when it is visible to all.
    pub fn coalition(&self) -> Option<Coalition> {
        i8::try_from(self.coalition)
            .ok()
            .and_then(|c| Coalition::try_from(c).ok())
    }
}

/// Any object the host can reference from an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SomeObject {
    Unit(Unit),
    Weapon(Box<Weapon>),
    Airbase(Airbase),
    StaticObject(Value),
    SceneryObject(Value),
}

impl SomeObject {
    /// Returns the unit, if this object is one.
    pub fn as_unit(&self) -> Option<&Unit> {
        match self {
            SomeObject::Unit(u) => Some(u),
            _ => None,
        }
    }

    /// Host name of the object, when it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            SomeObject::Unit(u) => Some(&u.name),
            SomeObject::Weapon(w) => Some(&w.type_name),
            SomeObject::Airbase(a) => Some(&a.name),
            SomeObject::StaticObject(v) | SomeObject::SceneryObject(v) => {
                v.get("name").and_then(Value::as_str)
            }
        }
    }
}

const OBJECT_TAGS: [&str; 5] = ["unit", "weapon", "airbase", "staticObject", "sceneryObject"];

/// Decodes a loosely shaped object reference.
///
/// - `null` / `{}` → `None`
/// - `{"unit": {...}}` and the other tagged forms → the tagged object
/// - a bare unit record (some events reference units directly) → `SomeObject::Unit`
pub(crate) fn object_from_value(value: Value) -> Result<Option<SomeObject>, serde_json::Error> {
    let tagged = match &value {
        Value::Null => return Ok(None),
        Value::Object(map) if map.is_empty() => return Ok(None),
        Value::Object(map) => {
            map.len() == 1 && map.keys().all(|k| OBJECT_TAGS.contains(&k.as_str()))
        }
        _ => false,
    };
    if tagged {
        return serde_json::from_value(value).map(Some);
    }
    serde_json::from_value::<Unit>(value).map(|u| Some(SomeObject::Unit(u)))
}

/// `serde(with = ...)` adapter for optional object references (`{}` means none).
pub(crate) mod object_or_none {
    use serde::de::Error as _;

    use super::*;

    pub fn serialize<S, T>(obj: &Option<T>, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match obj {
            Some(o) => o.serialize(ser),
            None => serde_json::Map::new().serialize(ser),
        }
    }

    pub fn deserialize<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: From<SomeObject>,
    {
        let raw = Value::deserialize(de)?;
        object_from_value(raw)
            .map(|o| o.map(T::from))
            .map_err(D::Error::custom)
    }
}
