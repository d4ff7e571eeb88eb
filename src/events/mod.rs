//! Host events: kinds, typed payloads and the demultiplexing stream.
//!
//! ## Contents
//! - [`EventKind`] host event codes
//! - [`Event`], [`EventDetail`] decoded notifications
//! - [`Unit`], [`Airbase`], [`Weapon`], [`MarkPanel`], [`SomeObject`] host objects
//! - [`EventStream`] filtered, single-pass event sequence over a dedicated channel

mod event;
mod kind;
mod object;
mod stream;

pub use event::{Event, EventDetail};
pub use kind::EventKind;
pub use object::{
    Airbase, AirbaseCategory, Coalition, GroupCategory, MarkPanel, Position, SomeObject, Unit,
    Vec3, Weapon,
};
pub use stream::EventStream;
