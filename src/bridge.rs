//! `RolloutStorage` bridge module.
//!
//! Exposes one preference namespace to a scripting runtime under the method
//! names `getItem`, `setItem` and `removeItem`. A single worker task owns the
//! store and handles requests in arrival order, so a `setItem` followed by a
//! `getItem` on the same key observes the write.
//!
//! `getItem` answers through a one-shot [`PendingItem`]. `setItem` and
//! `removeItem` are fire-and-forget: backend failures are logged and dropped.
//! A `setItem` whose value is `null` removes the key.

use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::{CodePushError, Result};
use crate::store::PreferenceStore;

/// Name the module is registered under on the scripting side.
pub const MODULE_NAME: &str = "RolloutStorage";

enum Request {
    Get {
        key: String,
        reply: oneshot::Sender<Result<Option<String>>>,
    },
    Set {
        key: String,
        value: String,
    },
    Remove {
        key: String,
    },
}

/// Handle to the bridge worker. Cheap to clone; the worker stops once every
/// handle is dropped and queued requests have drained.
#[derive(Clone)]
pub struct RolloutStorage {
    requests: mpsc::UnboundedSender<Request>,
}

impl RolloutStorage {
    /// Start the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(store: Arc<dyn PreferenceStore>) -> Self {
        let (requests, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(store, rx));
        Self { requests }
    }

    pub fn name(&self) -> &'static str {
        MODULE_NAME
    }

    /// Read `key`. Resolves to `None` when the key is absent.
    pub fn get_item(&self, key: impl Into<String>) -> PendingItem {
        let (reply, rx) = oneshot::channel();
        let request = Request::Get {
            key: key.into(),
            reply,
        };

        match self.requests.send(request) {
            Ok(()) => PendingItem::waiting(rx),
            Err(_) => PendingItem::failed(CodePushError::BridgeClosed(
                "worker stopped before getItem".to_string(),
            )),
        }
    }

    /// Write `value` under `key` without waiting for completion.
    pub fn set_item(&self, key: impl Into<String>, value: impl Into<String>) {
        let request = Request::Set {
            key: key.into(),
            value: value.into(),
        };
        if self.requests.send(request).is_err() {
            warn!(module = MODULE_NAME, "setItem dropped: worker stopped");
        }
    }

    /// Delete `key` without waiting for completion.
    pub fn remove_item(&self, key: impl Into<String>) {
        if self.requests.send(Request::Remove { key: key.into() }).is_err() {
            warn!(module = MODULE_NAME, "removeItem dropped: worker stopped");
        }
    }

    /// Dispatch a call by its scripting-side method name.
    ///
    /// `getItem` yields a [`PendingItem`]; the write methods yield `None`.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Option<PendingItem>> {
        match method {
            "getItem" => {
                let key = string_arg(method, args, 0)?;
                Ok(Some(self.get_item(key)))
            }
            "setItem" => {
                let key = string_arg(method, args, 0)?;
                match args.get(1) {
                    Some(Value::Null) => self.remove_item(key),
                    _ => self.set_item(key, string_arg(method, args, 1)?),
                }
                Ok(None)
            }
            "removeItem" => {
                let key = string_arg(method, args, 0)?;
                self.remove_item(key);
                Ok(None)
            }
            other => Err(CodePushError::UnknownMethod(other.to_string())),
        }
    }
}

fn string_arg(method: &str, args: &[Value], index: usize) -> Result<String> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(CodePushError::InvalidArgument {
            method: method.to_string(),
            reason: format!("argument {} must be a string, got {}", index, other),
        }),
        None => Err(CodePushError::InvalidArgument {
            method: method.to_string(),
            reason: format!("missing argument {}", index),
        }),
    }
}

async fn run_worker(store: Arc<dyn PreferenceStore>, mut rx: mpsc::UnboundedReceiver<Request>) {
    debug!(namespace = store.namespace(), "RolloutStorage worker started");

    while let Some(request) = rx.recv().await {
        match request {
            Request::Get { key, reply } => {
                debug!(key = %key, "getItem");
                let result = store.get(&key).await;
                // The caller may have stopped waiting.
                let _ = reply.send(result);
            }
            Request::Set { key, value } => {
                debug!(key = %key, "setItem");
                if let Err(e) = store.set(&key, &value).await {
                    warn!(key = %key, error = %e, "setItem failed");
                }
            }
            Request::Remove { key } => {
                debug!(key = %key, "removeItem");
                if let Err(e) = store.remove(&key).await {
                    warn!(key = %key, error = %e, "removeItem failed");
                }
            }
        }
    }

    debug!(namespace = store.namespace(), "RolloutStorage worker stopped");
}

/// One-shot result of a `getItem` call.
pub struct PendingItem {
    state: PendingState,
}

enum PendingState {
    Waiting(oneshot::Receiver<Result<Option<String>>>),
    Failed(Option<CodePushError>),
}

impl PendingItem {
    fn waiting(rx: oneshot::Receiver<Result<Option<String>>>) -> Self {
        Self {
            state: PendingState::Waiting(rx),
        }
    }

    fn failed(err: CodePushError) -> Self {
        Self {
            state: PendingState::Failed(Some(err)),
        }
    }
}

impl Future for PendingItem {
    type Output = Result<Option<String>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            PendingState::Waiting(rx) => Pin::new(rx).poll(cx).map(|received| match received {
                Ok(result) => result,
                Err(_) => Err(CodePushError::BridgeClosed(
                    "worker dropped getItem".to_string(),
                )),
            }),
            PendingState::Failed(err) => Poll::Ready(Err(err.take().unwrap_or_else(|| {
                CodePushError::BridgeClosed("getItem polled after completion".to_string())
            }))),
        }
    }
}
