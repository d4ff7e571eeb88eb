//! Entity watch engine: host-side polling exposed as a channel of diffs.
//!
//! ## Contents
//! - [`UnitWatcher`] create / add / remove / stream the diffs
//! - [`UnitWatcherUpdate`], [`WatchItem`] diff data model
//! - [`apply_update`], [`WatchedUnits`] folding diffs into a snapshot map

mod update;
mod watcher;

pub use update::{
    UnitNames, UnitWatcherUpdate, WatchExtras, WatchItem, WatchedUnits, WatcherOptions,
    apply_update,
};
pub use watcher::UnitWatcher;
