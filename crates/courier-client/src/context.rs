use std::sync::Arc;

use crate::callback::InvokeCallback;
use crate::future::InvokeFuture;

/// Per-call state passed explicitly into [`ServiceReference::invoke`].
///
/// Carries an optional callback override in and the `FUTURE` mode handle
/// out. One context may be reused across calls; a callback override is
/// consumed by the first `CALLBACK` mode call that sees it.
///
/// [`ServiceReference::invoke`]: crate::ServiceReference::invoke
#[derive(Default)]
pub struct CallContext {
    callback: Option<Arc<dyn InvokeCallback>>,
    future: Option<InvokeFuture>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose next `CALLBACK` mode call reports to `callback`
    /// instead of the reference's configured one.
    pub fn with_callback(mut self, callback: Arc<dyn InvokeCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn set_callback(&mut self, callback: Arc<dyn InvokeCallback>) {
        self.callback = Some(callback);
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Take the handle published by the last `FUTURE` mode call.
    pub fn take_future(&mut self) -> Option<InvokeFuture> {
        self.future.take()
    }

    pub(crate) fn take_callback(&mut self) -> Option<Arc<dyn InvokeCallback>> {
        self.callback.take()
    }

    pub(crate) fn publish_future(&mut self, future: InvokeFuture) {
        self.future = Some(future);
    }
}
