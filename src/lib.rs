//! # dcs-bridge
//!
//! **dcs-bridge** is the supervisor-side half of a bridge into the DCS mission scripting
//! environment.
//!
//! The host runs scripts inside the simulator; this crate runs in the supervisor next to it.
//! Everything crosses one seam, [`Invoke`] ("call a named host procedure, await the result"),
//! plus a table of bounded one-way [channels](ChannelTable) the host pushes into. Event streams,
//! command menus and unit watchers are each one host registration call plus one channel.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!  │ EventStream  │  │   Registry   │  │  GroupMenu   │  │ UnitWatcher  │
//!  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!         │ register        │ add/remove      │ fan-out         │ create/add
//!         ▼                 ▼                 ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  Bridge (Clone)                                                       │
//! │  - BridgeConfig   (queue sizes, wait timeout, call timing)            │
//! │  - InvokeRef      (remote calls: TaskQueue, InvokeFn, ...)            │
//! │  - ChannelTable   (bounded host ⇄ supervisor queues)                  │
//! └──────────┬──────────────────────────────────────────────┬─────────────┘
//!            │ invoke(target, args)                         ▲ wait(handle)
//!            ▼                                              │
//!    ┌────────────────┐                            ┌────────┴───────┐
//!    │   TaskQueue    │ ◄── drain / complete ───►  │ deliver / close│
//!    └────────────────┘          (host)            └────────────────┘
//! ```
//!
//! ### Channel lifecycle
//! ```text
//! create(direction, capacity) ──► Open ──┬─ deliver ... ──► wait() = Message
//!                                        ├─ overflow / close ──► drain buffer ──► Closed
//!                                        └─ destroy ──► gone (ResourceNotFound)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types                                  |
//! |-------------------|----------------------------------------------------------|--------------------------------------------|
//! | **Calls**         | Remote invocation and the host-polled task queue.        | [`Invoke`], [`TaskQueue`], [`Bridge`]      |
//! | **Channels**      | Bounded single-direction queues with wait timeouts.      | [`ChannelTable`], [`ChannelHandle`]        |
//! | **Events**        | Typed mission events as an async stream.                 | [`events::EventStream`], [`events::Event`] |
//! | **Commands**      | Radio menu entries routed to async handlers.             | [`commands::CommandRegistry`], [`commands::GroupMenu`] |
//! | **Watch**         | Unit diffs folded into a snapshot.                       | [`watch::UnitWatcher`]                     |
//! | **Literals**      | Decoder for host table literals.                         | [`literal::decode`]                        |
//! | **Controller**    | Typed AI options.                                        | [`controller::set_option`]                 |
//! | **Errors**        | Typed errors with stable labels.                         | [`BridgeError`]                            |
//!
//! ## Optional features
//! - `testing`: exposes `testing::MockHost`, an in-process host double.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use dcs_bridge::{Bridge, BridgeConfig, TaskOutcome, TaskQueue};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = Arc::new(TaskQueue::new());
//!     let bridge = Bridge::new(BridgeConfig::default(), queue.clone());
//!
//!     let call = tokio::spawn({
//!         let bridge = bridge.clone();
//!         async move { bridge.call("getTime").await }
//!     });
//!     tokio::task::yield_now().await;
//!
//!     // Host side: pick up the queued call and answer it.
//!     for task in queue.drain() {
//!         queue.complete(task.id, TaskOutcome::Ok(Some(json!(3600.0))));
//!     }
//!     assert_eq!(call.await??, json!(3600.0));
//!     Ok(())
//! }
//! ```
mod bridge;
mod channel;
mod config;
mod error;

pub mod commands;
pub mod controller;
pub mod events;
pub mod literal;
pub mod watch;

// ---- Public re-exports ----

pub use bridge::{Bridge, Invoke, InvokeFn, InvokeRef, QueuedTask, TaskOutcome, TaskQueue, TaskResult};
pub use channel::{ChannelDirection, ChannelHandle, ChannelState, ChannelTable, WaitOutcome};
pub use config::BridgeConfig;
pub use error::{BridgeError, DecodeError, RegistryError};

// Optional: in-process host double for downstream tests.
// Enable with: `--features testing`
#[cfg(any(test, feature = "testing"))]
pub mod testing;
