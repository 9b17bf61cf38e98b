use std::sync::Arc;
use std::time::Duration;

use courier_common::protocol::error::Result;
use courier_common::protocol::{RequestId, RpcValue};

use crate::correlation::{PendingGuard, PendingResponse};

/// Handle to the eventual result of a `FUTURE` mode call.
///
/// Retrieved from [`CallContext::take_future`] after the call returns.
/// Consuming it with [`get`](Self::get) or dropping it removes the call from
/// the correlation registry, so a response that arrives afterwards is
/// discarded.
///
/// [`CallContext::take_future`]: crate::CallContext::take_future
pub struct InvokeFuture {
    guard: PendingGuard,
    timeout: Duration,
}

impl InvokeFuture {
    pub(crate) fn new(handle: Arc<PendingResponse>, timeout: Duration) -> Self {
        Self {
            guard: PendingGuard::new(handle),
            timeout,
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.guard.handle().request_id()
    }

    /// Whether the response (or a failure) has already been recorded.
    pub fn is_done(&self) -> bool {
        self.guard.handle().is_done()
    }

    /// Wait for the result using the reference's configured timeout.
    pub async fn get(self) -> Result<RpcValue> {
        let timeout = self.timeout;
        self.get_timeout(timeout).await
    }

    /// Wait for the result for at most `timeout`; zero waits without bound.
    pub async fn get_timeout(self, timeout: Duration) -> Result<RpcValue> {
        self.guard.handle().wait(timeout).await
    }

    /// Abandon the call.
    pub fn cancel(self) {
        tracing::debug!(request_id = self.request_id(), "Invoke future cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::CorrelationRegistry;
    use courier_common::protocol::RpcError;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_returns_result_and_removes_entry() {
        let registry = CorrelationRegistry::new();
        let future = InvokeFuture::new(registry.register(1, None).unwrap(), Duration::from_secs(1));

        assert!(!future.is_done());
        registry.complete(1, Ok(json!(42)));
        assert!(future.is_done());

        assert_eq!(future.get().await.unwrap(), json!(42));
        assert!(!registry.contains(1));
    }

    #[tokio::test]
    async fn test_get_timeout_removes_entry() {
        let registry = CorrelationRegistry::new();
        let future = InvokeFuture::new(registry.register(2, None).unwrap(), Duration::from_secs(30));

        let result = future.get_timeout(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(RpcError::Timeout(20))));
        assert!(!registry.contains(2));
    }

    #[tokio::test]
    async fn test_cancel_discards_late_response() {
        let registry = CorrelationRegistry::new();
        let future = InvokeFuture::new(registry.register(3, None).unwrap(), Duration::from_secs(1));
        assert_eq!(future.request_id(), 3);

        future.cancel();
        assert!(!registry.contains(3));
        assert!(!registry.complete(3, Ok(json!("late"))));
    }
}
