//! Error types used by the bridge, the command registries and the literal decoder.
//!
//! This module defines three enums:
//!
//! - [`BridgeError`]: failures of the bridge machinery itself (channels, remote calls, payloads).
//! - [`RegistryError`]: contract violations when using a command registry.
//! - [`DecodeError`]: malformed host-native table literals.
//!
//! All of them provide `as_label` (stable snake_case label for logs) so callers can
//! report failures without matching on every variant.

use thiserror::Error;

/// # Errors produced by the bridge.
///
/// Channel closure is **not** an error: it is the end-of-stream signal and is
/// reported through [`WaitOutcome::Closed`](crate::WaitOutcome::Closed).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The channel handle does not name a live channel (never created or destroyed).
    #[error("channel {id} (resource {resource_id}) not found")]
    ResourceNotFound {
        /// Logical channel id.
        id: u64,
        /// Resource id the handle carried.
        resource_id: u32,
    },

    /// Operation is not allowed for the channel's direction
    /// (e.g. `send` on a host → supervisor channel).
    #[error("channel {id} has the wrong direction for {op}")]
    WrongDirection {
        /// Logical channel id.
        id: u64,
        /// Operation name (`wait`, `send`, ...).
        op: &'static str,
    },

    /// The host rejected or failed a remote call.
    #[error("remote call {target} failed: {message}")]
    Remote {
        /// Remote procedure name.
        target: String,
        /// Host-provided failure message.
        message: String,
    },

    /// The host dropped the call without ever producing a result.
    #[error("host went away while {target} was pending")]
    HostGone {
        /// Remote procedure name.
        target: String,
    },

    /// Arguments or result of a remote call could not be (de)serialized.
    #[error("payload for {target} is invalid: {source}")]
    Payload {
        /// Remote procedure name.
        target: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A host notification did not have the expected shape.
    #[error("malformed event: {reason}")]
    MalformedEvent {
        /// What was wrong with it.
        reason: String,
    },

    /// Command registry contract violation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Literal decoding failure.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl BridgeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use dcs_bridge::BridgeError;
    ///
    /// let err = BridgeError::HostGone { target: "getTime".into() };
    /// assert_eq!(err.as_label(), "bridge_host_gone");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BridgeError::ResourceNotFound { .. } => "bridge_resource_not_found",
            BridgeError::WrongDirection { .. } => "bridge_wrong_direction",
            BridgeError::Remote { .. } => "bridge_remote_failed",
            BridgeError::HostGone { .. } => "bridge_host_gone",
            BridgeError::Payload { .. } => "bridge_payload_invalid",
            BridgeError::MalformedEvent { .. } => "bridge_malformed_event",
            BridgeError::Registry(e) => e.as_label(),
            BridgeError::Decode(e) => e.as_label(),
        }
    }

    /// Indicates whether the failure came from the host side of a remote call.
    ///
    /// The bridge never retries on its own; callers can use this to decide.
    pub fn is_remote(&self) -> bool {
        matches!(self, BridgeError::Remote { .. } | BridgeError::HostGone { .. })
    }

    pub(crate) fn payload(target: impl Into<String>, source: serde_json::Error) -> Self {
        BridgeError::Payload {
            target: target.into(),
            source,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        BridgeError::MalformedEvent {
            reason: reason.into(),
        }
    }
}

/// # Errors produced by command registries.
///
/// Reported synchronously; the registry is left unchanged.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A command path needs at least one segment.
    #[error("command path is empty")]
    EmptyPath,

    /// The path is already registered.
    #[error("command {path} already exists")]
    DuplicatePath {
        /// Display form of the path.
        path: String,
    },

    /// The path is not registered.
    #[error("command {path} is not registered")]
    UnknownPath {
        /// Display form of the path.
        path: String,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::EmptyPath => "registry_empty_path",
            RegistryError::DuplicatePath { .. } => "registry_duplicate_path",
            RegistryError::UnknownPath { .. } => "registry_unknown_path",
        }
    }
}

/// # Errors produced by the table literal decoder.
///
/// Fatal to a single decode call only.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DecodeError {
    /// A token did not match what the grammar required.
    #[error("expected '{expected}' got '{found}' at offset {offset}")]
    Unexpected {
        /// Expected text.
        expected: String,
        /// Text actually read.
        found: String,
        /// Character offset where reading started.
        offset: usize,
    },

    /// Input ended while more text was required.
    #[error("unexpected end of input, expected '{expected}'")]
    UnexpectedEnd {
        /// Expected text.
        expected: String,
    },

    /// A quoted string was never closed.
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString {
        /// Offset of the opening quote.
        offset: usize,
    },

    /// The decoded tree does not fit the requested type.
    #[error("decoded value does not match target type: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use dcs_bridge::DecodeError;
    ///
    /// let err = DecodeError::UnexpectedEnd { expected: "}".into() };
    /// assert_eq!(err.as_label(), "decode_unexpected_end");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DecodeError::Unexpected { .. } => "decode_unexpected_token",
            DecodeError::UnexpectedEnd { .. } => "decode_unexpected_end",
            DecodeError::UnterminatedString { .. } => "decode_unterminated_string",
            DecodeError::Json(_) => "decode_type_mismatch",
        }
    }
}
