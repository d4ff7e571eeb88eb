//! Remote call boundary and the facade the rest of the crate is built on.
//!
//! ## Contents
//! - [`Invoke`], [`InvokeFn`], [`InvokeRef`] the single "call host, await result" seam
//! - [`TaskQueue`] host-polled [`Invoke`] implementation (`drain` / `complete`)
//! - [`Bridge`] cloneable bundle of config, invoker and channel table

mod facade;
mod invoke;
mod queue;

pub use facade::Bridge;
pub use invoke::{Invoke, InvokeFn, InvokeRef};
pub use queue::{QueuedTask, TaskOutcome, TaskQueue, TaskResult};
