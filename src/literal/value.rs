//! # Decoded literal values.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value};

/// Key of a decoded table: `[1]` or `["name"]`.
///
/// Integer keys sort before string keys, and among themselves numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

/// Generic tree produced by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Table(BTreeMap<Key, Decoded>),
    /// Only produced when array emission is enabled and the keys are exactly `1..=n`.
    Array(Vec<Decoded>),
    String(String),
    Number(f64),
    Bool(bool),
    /// `nil`, or a value the decoder did not recognise.
    Nil,
    /// Empty table decoded with `empty_table_absent`.
    Absent,
}

/// Decoder switches. Both are off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Re-express tables keyed exactly `1..=n` as arrays.
    pub emit_arrays: bool,
    /// Decode `{}` to [`Decoded::Absent`] instead of an empty table.
    pub empty_table_absent: bool,
}

impl DecodeOptions {
    /// Both switches on; the usual setting for mission files.
    pub fn mission() -> Self {
        Self {
            emit_arrays: true,
            empty_table_absent: true,
        }
    }
}

impl Decoded {
    /// Looks up a string key in a table.
    pub fn get(&self, key: &str) -> Option<&Decoded> {
        match self {
            Decoded::Table(t) => t.get(&Key::from(key)),
            _ => None,
        }
    }

    /// Looks up an integer key in a table, or a 1-based position in an array.
    pub fn index(&self, i: i64) -> Option<&Decoded> {
        match self {
            Decoded::Table(t) => t.get(&Key::Int(i)),
            Decoded::Array(a) => usize::try_from(i - 1).ok().and_then(|i| a.get(i)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Decoded::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Decoded::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Decoded::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Decoded::Absent)
    }

    /// Converts to JSON.
    ///
    /// - table keys become strings; absent entries are left out
    /// - integral numbers become JSON integers, non-finite numbers `null`
    /// - `Nil` and a top-level `Absent` become `null`
    pub fn to_json(&self) -> Value {
        match self {
            Decoded::Table(t) => {
                let map: Map<String, Value> = t
                    .iter()
                    .filter(|(_, v)| !v.is_absent())
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect();
                Value::Object(map)
            }
            Decoded::Array(a) => Value::Array(a.iter().map(Decoded::to_json).collect()),
            Decoded::String(s) => Value::String(s.clone()),
            Decoded::Number(n) => number(*n),
            Decoded::Bool(b) => Value::Bool(*b),
            Decoded::Nil | Decoded::Absent => Value::Null,
        }
    }
}

fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}
