//! # Command handlers.
//!
//! [`CommandHandler`] is invoked by a registry's dispatch loop for every [`CommandEvent`] whose
//! path it was registered under. [`HandlerFn`] wraps an async closure, producing a fresh future
//! per invocation.
//!
//! ## Example
//! ```rust
//! use dcs_bridge::BridgeError;
//! use dcs_bridge::commands::{CommandEvent, HandlerFn, HandlerRef};
//!
//! let h: HandlerRef = HandlerFn::arc(|ev: CommandEvent| async move {
//!     println!("picked {}", ev.path);
//!     Ok::<_, BridgeError>(())
//! });
//! # let _ = h;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::warn;

use super::path::CommandEvent;
use crate::error::BridgeError;

/// Reacts to one command invocation.
///
/// Errors and panics are logged by the dispatch loop and never stop it.
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    async fn handle(&self, event: CommandEvent) -> Result<(), BridgeError>;
}

/// Shared handle to a [`CommandHandler`].
pub type HandlerRef = Arc<dyn CommandHandler>;

/// Closure-backed [`CommandHandler`].
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps the closure and returns it as a [`HandlerRef`]-compatible `Arc`.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> CommandHandler for HandlerFn<F>
where
    F: Fn(CommandEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BridgeError>> + Send + 'static,
{
    async fn handle(&self, event: CommandEvent) -> Result<(), BridgeError> {
        (self.f)(event).await
    }
}

/// Runs one handler, isolating panics and logging failures.
pub(crate) async fn run_handler(handler: &HandlerRef, event: CommandEvent) {
    let path = event.path.to_string();
    match std::panic::AssertUnwindSafe(handler.handle(event))
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(%path, error = %e, label = e.as_label(), "command handler failed"),
        Err(panic_err) => {
            let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                (*msg).to_string()
            } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            };
            warn!(%path, panic = %info, "command handler panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::commands::CommandPath;

    fn event(name: &str) -> CommandEvent {
        CommandEvent {
            path: CommandPath::from(name),
            target: None,
        }
    }

    #[tokio::test]
    async fn test_handler_fn_sees_event() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let handler: HandlerRef = HandlerFn::arc(move |ev: CommandEvent| {
            let h = Arc::clone(&h);
            async move {
                assert_eq!(ev.path.name(), "Smoke");
                h.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BridgeError>(())
            }
        });

        run_handler(&handler, event("Smoke")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let handler: HandlerRef = HandlerFn::arc(|_ev: CommandEvent| async move {
            if true {
                panic!("boom");
            }
            Ok::<_, BridgeError>(())
        });
        run_handler(&handler, event("x")).await;
    }
}
