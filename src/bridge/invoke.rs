//! # Remote call boundary.
//!
//! [`Invoke`] is the single "invoke remote procedure, await result" primitive every
//! other component is built on. The transport behind it is not this crate's concern:
//! [`TaskQueue`](crate::TaskQueue) is the in-process implementation used when the host
//! polls for work, [`InvokeFn`] adapts any async closure.
//!
//! ## Example
//! ```rust
//! use serde_json::{json, Value};
//! use dcs_bridge::{BridgeError, Invoke, InvokeFn, InvokeRef};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let host: InvokeRef = InvokeFn::arc(|target: String, _args: Option<Value>| async move {
//!     match target.as_str() {
//!         "getTime" => Ok(json!(12.5)),
//!         _ => Err(BridgeError::Remote { target, message: "unknown".into() }),
//!     }
//! });
//!
//! assert_eq!(host.invoke("getTime", None).await.unwrap(), json!(12.5));
//! assert!(host.invoke("nope", None).await.is_err());
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BridgeError;

/// Performs one named call into the host.
///
/// ### Implementation requirements
/// - A call resolves exactly once: with the decoded result or a failure.
/// - Host failures map to [`BridgeError::Remote`]; a call dropped without a result maps
///   to [`BridgeError::HostGone`].
/// - No retries: the caller decides.
#[async_trait]
pub trait Invoke: Send + Sync + 'static {
    /// Invokes `target` with an optional argument payload.
    async fn invoke(&self, target: &str, args: Option<Value>) -> Result<Value, BridgeError>;
}

/// Shared handle to an [`Invoke`] implementation.
pub type InvokeRef = Arc<dyn Invoke>;

/// Closure-backed [`Invoke`] implementation.
///
/// Wraps `F: Fn(String, Option<Value>) -> Fut`, producing a fresh future per call.
pub struct InvokeFn<F> {
    f: F,
}

impl<F> InvokeFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps the closure and returns it as an [`InvokeRef`]-compatible `Arc`.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Invoke for InvokeFn<F>
where
    F: Fn(String, Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, BridgeError>> + Send + 'static,
{
    async fn invoke(&self, target: &str, args: Option<Value>) -> Result<Value, BridgeError> {
        (self.f)(target.to_string(), args).await
    }
}
