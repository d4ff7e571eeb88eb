//! Host command menus: addressing, handlers and the two registries.
//!
//! ## Contents
//! - [`CommandPath`], [`CommandTarget`], [`CommandHandle`], [`CommandEvent`], [`CommandInput`]
//! - [`CommandHandler`], [`HandlerFn`], [`HandlerRef`] reaction to a player's pick
//! - [`add_leaf`], [`add_submenu`], [`remove_entry`] the raw host calls
//! - [`CommandRegistry`] flat registry, one target per command
//! - [`GroupMenu`] one command set replicated into every tracked group
//!
//! Both registries are explicit instances: create one where the command lifecycle is owned
//! and drop it with its owner.

mod group;
mod handler;
mod ops;
mod path;
mod registry;

pub use group::{GroupCommand, GroupMenu};
pub use handler::{CommandHandler, HandlerFn, HandlerRef};
pub use ops::{add_leaf, add_submenu, remove_entry};
pub use path::{CommandEvent, CommandHandle, CommandInput, CommandPath, CommandTarget};
pub use registry::CommandRegistry;
