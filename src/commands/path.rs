//! # Command addressing.
//!
//! A command is addressed by its [`CommandPath`]: a non-empty list of menu labels whose last
//! segment is the entry's own name. An optional [`CommandTarget`] scopes the entry to one group
//! or one coalition; without it the entry is visible to everyone.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::events::Coalition;

/// Non-empty ordered list of menu labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct CommandPath(Vec<String>);

impl CommandPath {
    /// Builds a path, rejecting an empty segment list.
    pub fn new<I, S>(segments: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(RegistryError::EmptyPath);
        }
        Ok(Self(segments))
    }

    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Leaf label (last segment).
    pub fn name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// Containing submenu, `None` for a top-level entry.
    pub fn parent(&self) -> Option<&[String]> {
        match self.0.len() {
            0 | 1 => None,
            n => Some(&self.0[..n - 1]),
        }
    }

    /// Number of segments.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if `self` lies strictly under `prefix`.
    pub fn starts_with(&self, prefix: &CommandPath) -> bool {
        self.0.len() > prefix.0.len() && self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl From<&str> for CommandPath {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for CommandPath {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<CommandPath> for Vec<String> {
    fn from(path: CommandPath) -> Self {
        path.0
    }
}

impl TryFrom<Vec<String>> for CommandPath {
    type Error = RegistryError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl TryFrom<&[&str]> for CommandPath {
    type Error = RegistryError;

    fn try_from(segments: &[&str]) -> Result<Self, Self::Error> {
        Self::new(segments.iter().copied())
    }
}

/// Scope of a menu entry. Wire form `{"group": name}` or `{"coalition": code}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandTarget {
    Group(String),
    Coalition(Coalition),
}

impl CommandTarget {
    pub fn group(name: impl Into<String>) -> Self {
        CommandTarget::Group(name.into())
    }
}

/// A menu entry the host knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandHandle {
    pub path: CommandPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<CommandTarget>,
}

/// Host notification that a player picked a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    pub path: CommandPath,
    #[serde(default)]
    pub target: Option<CommandTarget>,
}

/// Ways a caller may name a command, resolved once at the registry boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandInput {
    /// Top-level entry by label.
    ByName(String),
    /// Full path; must not be empty.
    ByPath(Vec<String>),
    /// Previously returned handle; carries its own target.
    ByHandle(CommandHandle),
}

impl CommandInput {
    /// Resolves to a path plus the target embedded in a handle (if any).
    pub fn resolve(self) -> Result<(CommandPath, Option<CommandTarget>), RegistryError> {
        match self {
            CommandInput::ByName(name) => Ok((CommandPath::from(name), None)),
            CommandInput::ByPath(segments) => Ok((CommandPath::new(segments)?, None)),
            CommandInput::ByHandle(handle) => Ok((handle.path, handle.target)),
        }
    }
}

impl From<&str> for CommandInput {
    fn from(name: &str) -> Self {
        CommandInput::ByName(name.to_string())
    }
}

impl From<String> for CommandInput {
    fn from(name: String) -> Self {
        CommandInput::ByName(name)
    }
}

impl From<Vec<String>> for CommandInput {
    fn from(segments: Vec<String>) -> Self {
        CommandInput::ByPath(segments)
    }
}

impl From<&[&str]> for CommandInput {
    fn from(segments: &[&str]) -> Self {
        CommandInput::ByPath(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CommandInput {
    fn from(segments: [&str; N]) -> Self {
        CommandInput::ByPath(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<CommandHandle> for CommandInput {
    fn from(handle: CommandHandle) -> Self {
        CommandInput::ByHandle(handle)
    }
}

impl From<CommandPath> for CommandInput {
    fn from(path: CommandPath) -> Self {
        CommandInput::ByPath(path.into())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_path_parts() {
        let p = CommandPath::try_from(&["Support", "Tanker", "Request"][..]).unwrap();
        assert_eq!(p.name(), "Request");
        assert_eq!(p.parent(), Some(&["Support".to_string(), "Tanker".to_string()][..]));
        assert_eq!(p.to_string(), "Support/Tanker/Request");
        assert_eq!(CommandPath::from("Top").parent(), None);
        assert!(p.starts_with(&CommandPath::from("Support")));
        assert!(!p.starts_with(&p));
    }

    #[test]
    fn test_empty_path_is_rejected() {
        assert_eq!(CommandPath::new(Vec::<String>::new()), Err(RegistryError::EmptyPath));
        assert!(serde_json::from_value::<CommandPath>(json!([])).is_err());
        assert_eq!(
            CommandInput::ByPath(vec![]).resolve(),
            Err(RegistryError::EmptyPath)
        );
    }

    #[test]
    fn test_target_wire_shape() {
        assert_eq!(
            serde_json::to_value(CommandTarget::group("Viper-1")).unwrap(),
            json!({"group": "Viper-1"})
        );
        assert_eq!(
            serde_json::to_value(CommandTarget::Coalition(Coalition::Red)).unwrap(),
            json!({"coalition": 1})
        );
    }

    #[test]
    fn test_input_resolution() {
        let handle = CommandHandle {
            path: CommandPath::from("Smoke"),
            target: Some(CommandTarget::group("g1")),
        };
        let (path, target) = CommandInput::from(handle.clone()).resolve().unwrap();
        assert_eq!(path, handle.path);
        assert_eq!(target, handle.target);

        let (path, target) = CommandInput::from(["A", "B"]).resolve().unwrap();
        assert_eq!(path.segments(), &["A".to_string(), "B".to_string()]);
        assert_eq!(target, None);

        let event: CommandEvent = serde_json::from_value(json!({"path": ["A", "B"]})).unwrap();
        assert_eq!(event.path, path);
    }
}
