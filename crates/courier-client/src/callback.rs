use courier_common::protocol::{RpcError, RpcValue};
use std::sync::Arc;

/// Receiver of the outcome of a `CALLBACK` mode call.
///
/// Invoked once per call, off the caller's task, when the response
/// arrives or the registry is shut down.
pub trait InvokeCallback: Send + Sync + 'static {
    fn on_success(&self, result: RpcValue);
    fn on_failure(&self, error: RpcError);
}

/// Callback built from a pair of closures.
pub struct FnCallback<S, F> {
    on_success: S,
    on_failure: F,
}

impl<S, F> InvokeCallback for FnCallback<S, F>
where
    S: Fn(RpcValue) + Send + Sync + 'static,
    F: Fn(RpcError) + Send + Sync + 'static,
{
    fn on_success(&self, result: RpcValue) {
        (self.on_success)(result)
    }

    fn on_failure(&self, error: RpcError) {
        (self.on_failure)(error)
    }
}

/// Wrap two closures into a shareable callback.
///
/// # Example
///
/// ```
/// use courier_client::callback_fn;
///
/// let callback = callback_fn(
///     |value| println!("got {}", value),
///     |error| eprintln!("failed: {}", error),
/// );
/// ```
pub fn callback_fn<S, F>(on_success: S, on_failure: F) -> Arc<dyn InvokeCallback>
where
    S: Fn(RpcValue) + Send + Sync + 'static,
    F: Fn(RpcError) + Send + Sync + 'static,
{
    Arc::new(FnCallback {
        on_success,
        on_failure,
    })
}
