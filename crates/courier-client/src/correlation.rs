//! Correlation of in-flight requests with their responses.
//!
//! Every call that expects an answer registers a [`PendingResponse`] under
//! its request id. The transport reports responses through
//! [`CorrelationRegistry::complete`] (or [`complete_response`]), which fills
//! the handle's single-assignment slot, wakes whoever is waiting and, for
//! `CALLBACK` mode calls, hands the outcome to the callback off the
//! reporting thread.
//!
//! # Lifecycle
//!
//! ```text
//! register(id) ──> [pending] ──complete(id)──> [done] ──remove(id)──> gone
//!                      │                                  ▲
//!                      └────────── timeout / drop ────────┘
//! ```
//!
//! Handles with a callback are removed by `complete` itself; all others are
//! removed by their owner (the dispatcher's guard or an [`InvokeFuture`]).
//! A completion that finds no handle is a late arrival and is discarded.
//!
//! [`complete_response`]: CorrelationRegistry::complete_response
//! [`InvokeFuture`]: crate::InvokeFuture

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::time::Duration;

use courier_common::protocol::error::{Result, RpcError};
use courier_common::protocol::{RequestId, RpcResponse, RpcValue};
use tokio::sync::watch;

use crate::callback::InvokeCallback;

/// Outcome of one call: the remote result or the reason there is none.
pub type Outcome = Result<RpcValue>;

static GLOBAL_REGISTRY: OnceLock<Arc<CorrelationRegistry>> = OnceLock::new();

/// Bookkeeping for one request awaiting its response.
pub struct PendingResponse {
    request_id: RequestId,
    slot: watch::Sender<Option<Outcome>>,
    callback: Option<Arc<dyn InvokeCallback>>,
    registry: Weak<CorrelationRegistry>,
}

impl PendingResponse {
    fn new(
        request_id: RequestId,
        callback: Option<Arc<dyn InvokeCallback>>,
        registry: Weak<CorrelationRegistry>,
    ) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            request_id,
            slot,
            callback,
            registry,
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub fn is_done(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Wait for the outcome.
    ///
    /// A zero `timeout` waits without bound. Does not remove the handle.
    pub async fn wait(&self, timeout: Duration) -> Outcome {
        let mut rx = self.slot.subscribe();

        let waited = if timeout.is_zero() {
            rx.wait_for(Option::is_some).await.map(|slot| (*slot).clone())
        } else {
            tokio::time::timeout(timeout, rx.wait_for(Option::is_some))
                .await
                .map_err(|_| RpcError::Timeout(timeout.as_millis() as u64))?
                .map(|slot| (*slot).clone())
        };

        match waited {
            Ok(Some(outcome)) => outcome,
            Ok(None) | Err(_) => Err(RpcError::transport(format!(
                "pending response {} closed without an outcome",
                self.request_id
            ))),
        }
    }

    /// Drop this handle from the registry it was registered with.
    ///
    /// Leaves any newer handle registered under the same id in place.
    pub fn remove_self(self: &Arc<Self>) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove_handle(self);
        }
    }

    /// Store the outcome unless one is already there. First writer wins.
    fn fulfil(&self, outcome: Outcome) -> bool {
        let delivered_to_callback = self.callback.as_ref().map(|cb| (cb.clone(), outcome.clone()));

        let written = self.slot.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
            true
        });

        if written {
            if let Some((callback, outcome)) = delivered_to_callback {
                run_callback(callback, outcome);
            }
        }
        written
    }
}

/// Run a callback off the completing thread.
fn run_callback(callback: Arc<dyn InvokeCallback>, outcome: Outcome) {
    let run = move || match outcome {
        Ok(result) => callback.on_success(result),
        Err(error) => callback.on_failure(error),
    };

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(run);
        }
        Err(_) => {
            std::thread::spawn(run);
        }
    }
}

/// Table of requests awaiting a response, keyed by request id.
///
/// Shared by every reference in the process through [`global`](Self::global);
/// a reference can also be pointed at a private instance.
///
/// # Thread Safety
///
/// Registration, completion and removal may happen from any thread. The
/// internal lock is held only for map operations, never while waiting or
/// running callbacks.
#[derive(Default)]
pub struct CorrelationRegistry {
    pending: Mutex<HashMap<RequestId, Arc<PendingResponse>>>,
}

impl CorrelationRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Process-wide registry, created on first use.
    pub fn global() -> Arc<Self> {
        GLOBAL_REGISTRY.get_or_init(CorrelationRegistry::new).clone()
    }

    /// Register a pending response for `request_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidRequest`] if the id is already pending.
    /// Ids are generated fresh per call, so this signals a caller bug.
    pub fn register(
        self: &Arc<Self>,
        request_id: RequestId,
        callback: Option<Arc<dyn InvokeCallback>>,
    ) -> Result<Arc<PendingResponse>> {
        let mut pending = self.lock();
        match pending.entry(request_id) {
            Entry::Occupied(_) => Err(RpcError::duplicate_request(request_id)),
            Entry::Vacant(slot) => {
                let handle = Arc::new(PendingResponse::new(
                    request_id,
                    callback,
                    Arc::downgrade(self),
                ));
                slot.insert(handle.clone());
                Ok(handle)
            }
        }
    }

    /// Deliver the outcome for `request_id`.
    ///
    /// Returns `false` when nothing was waiting: the handle was already
    /// removed (timeout, abandoned future) or already completed.
    pub fn complete(&self, request_id: RequestId, outcome: Outcome) -> bool {
        let handle = {
            let mut pending = self.lock();
            match pending.get(&request_id) {
                None => None,
                Some(handle) if handle.has_callback() => pending.remove(&request_id),
                Some(handle) => Some(handle.clone()),
            }
        };

        match handle {
            Some(handle) => {
                let written = handle.fulfil(outcome);
                if !written {
                    tracing::debug!(request_id, "Duplicate completion ignored");
                }
                written
            }
            None => {
                tracing::debug!(request_id, "Late response discarded, no pending call");
                false
            }
        }
    }

    /// Deliver a response record reported by the transport.
    pub fn complete_response(&self, response: RpcResponse) -> bool {
        let request_id = response.request_id;
        self.complete(request_id, response.into_outcome())
    }

    /// Wait for the outcome of a registered request.
    ///
    /// Does not remove the handle; the caller stays responsible for that.
    pub async fn await_response(&self, request_id: RequestId, timeout: Duration) -> Outcome {
        let handle = self.lock().get(&request_id).cloned();
        match handle {
            Some(handle) => handle.wait(timeout).await,
            None => Err(RpcError::InvalidRequest(format!(
                "request id {} is not pending",
                request_id
            ))),
        }
    }

    /// Remove the entry for `request_id`, if any. Idempotent.
    pub fn remove(&self, request_id: RequestId) -> bool {
        self.lock().remove(&request_id).is_some()
    }

    pub fn contains(&self, request_id: RequestId) -> bool {
        self.lock().contains_key(&request_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Fail every pending call with a transport error and clear the table.
    ///
    /// Used when the owning transport stops. Returns the number of calls
    /// that were failed.
    pub fn fail_all(&self, reason: &str) -> usize {
        let drained: Vec<Arc<PendingResponse>> = {
            let mut pending = self.lock();
            pending.drain().map(|(_, handle)| handle).collect()
        };

        let failed = drained
            .into_iter()
            .filter(|handle| handle.fulfil(Err(RpcError::transport(reason))))
            .count();

        if failed > 0 {
            tracing::info!(failed, reason, "Failed all pending calls");
        }
        failed
    }

    fn remove_handle(&self, handle: &Arc<PendingResponse>) {
        let mut pending = self.lock();
        if let Entry::Occupied(entry) = pending.entry(handle.request_id) {
            if Arc::ptr_eq(entry.get(), handle) {
                entry.remove();
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestId, Arc<PendingResponse>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes its handle from the registry when dropped.
///
/// Owners of a pending call hold one of these so that every way out of the
/// call (return, error, timeout, cancellation of the caller's future)
/// leaves the registry clean.
pub(crate) struct PendingGuard {
    handle: Arc<PendingResponse>,
}

impl PendingGuard {
    pub(crate) fn new(handle: Arc<PendingResponse>) -> Self {
        Self { handle }
    }

    pub(crate) fn handle(&self) -> &Arc<PendingResponse> {
        &self.handle
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.handle.remove_self();
    }
}
