//! Decoder for host-native table literals (`name = { ["key"] = value, ... }`).
//!
//! Mission and configuration files are written in this format. The decoder produces a generic
//! [`Decoded`] tree; [`decode`] goes one step further and deserializes it into a serde type.
//!
//! ## Contents
//! - [`parse_literal`], [`decode`] entry points
//! - [`Decoded`], [`Key`] decoded tree
//! - [`DecodeOptions`] array emission and empty-table handling

mod parser;
mod value;

pub use parser::{decode, parse_literal};
pub use value::{DecodeOptions, Decoded, Key};
