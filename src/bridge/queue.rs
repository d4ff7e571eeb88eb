//! # Host-polled task queue.
//!
//! The mission scripting host cannot call into the supervisor whenever it likes; it
//! polls once per frame. [`TaskQueue`] turns that into an [`Invoke`] implementation:
//!
//! ```text
//! invoke(target, args) ──► pending (FIFO) ──► host: drain() ──► runs tasks
//!        ▲                                                        │
//!        └────────── oneshot waiter ◄── host: complete(id, outcome) ┘
//! ```
//!
//! ## Rules
//! - Task ids are unique and increase monotonically.
//! - `drain()` hands out tasks in submission order.
//! - Completing an unknown id is ignored (returns `false`).
//! - `reset()` drops every pending task and waiter; awaiting callers get `HostGone`.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use super::invoke::Invoke;
use crate::error::BridgeError;

/// A call waiting for the host to pick it up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedTask {
    pub id: u64,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

/// Host-reported result of one task.
///
/// Wire form: `{"type": "Ok", "value": ...}` or `{"type": "Error", "value": "message"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TaskOutcome {
    Ok(Option<Value>),
    Error(String),
}

/// Host completion record: `{"id": .., "result": {"type": .., "value": ..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub id: u64,
    pub result: TaskOutcome,
}

#[derive(Default)]
struct QueueState {
    next_id: u64,
    pending: VecDeque<QueuedTask>,
    waiters: HashMap<u64, (String, oneshot::Sender<TaskOutcome>)>,
}

/// [`Invoke`] implementation backed by a host-polled queue.
#[derive(Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every pending task (host side).
    pub fn drain(&self) -> Vec<QueuedTask> {
        let mut state = self.state.lock();
        state.pending.drain(..).collect()
    }

    /// Resolves the waiter for `id`. Returns `false` for unknown ids.
    pub fn complete(&self, id: u64, outcome: TaskOutcome) -> bool {
        let waiter = self.state.lock().waiters.remove(&id);
        match waiter {
            Some((target, tx)) => {
                debug!(task = id, %target, "task completed");
                // The caller may have stopped waiting; nothing to do then.
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    /// Resolves a waiter from the host's raw completion record.
    ///
    /// A record whose `result` cannot be decoded still completes the task, as an error.
    pub fn complete_json(&self, record: Value) -> Result<bool, BridgeError> {
        let id = record
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| BridgeError::malformed("task result without numeric id"))?;
        let outcome = match record.get("result").cloned() {
            Some(raw) => serde_json::from_value::<TaskOutcome>(raw).unwrap_or_else(|e| {
                TaskOutcome::Error(format!("failed to process task result: {e}"))
            }),
            None => TaskOutcome::Ok(None),
        };
        Ok(self.complete(id, outcome))
    }

    /// Number of tasks not yet drained by the host.
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Number of calls still awaiting a result.
    pub fn in_flight(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Forgets every pending task and waiter (host state was lost).
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.pending.clear();
        state.waiters.clear();
    }

    fn enqueue(&self, target: &str, args: Option<Value>) -> oneshot::Receiver<TaskOutcome> {
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.pending.push_back(QueuedTask {
            id,
            target: target.to_string(),
            args,
        });
        state.waiters.insert(id, (target.to_string(), tx));
        debug!(task = id, target, "task queued");
        rx
    }
}

#[async_trait]
impl Invoke for TaskQueue {
    async fn invoke(&self, target: &str, args: Option<Value>) -> Result<Value, BridgeError> {
        let rx = self.enqueue(target, args);
        match rx.await {
            Ok(TaskOutcome::Ok(value)) => Ok(value.unwrap_or(Value::Null)),
            Ok(TaskOutcome::Error(message)) => Err(BridgeError::Remote {
                target: target.to_string(),
                message,
            }),
            Err(_) => Err(BridgeError::HostGone {
                target: target.to_string(),
            }),
        }
    }
}
