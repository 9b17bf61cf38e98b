use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use courier_common::protocol::error::{Result, RpcError};
use courier_common::protocol::{RpcRequest, RpcValue};

use crate::callback::InvokeCallback;
use crate::context::CallContext;
use crate::correlation::{CorrelationRegistry, PendingGuard};
use crate::future::InvokeFuture;
use crate::transport::Transport;

/// How a call hands its result back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallMode {
    /// Wait for the response, up to the configured timeout.
    #[default]
    Sync,
    /// Return at once; the result is read through an [`InvokeFuture`].
    Future,
    /// Return at once; the result goes to an [`InvokeCallback`].
    Callback,
    /// Send and forget.
    Oneway,
}

impl CallMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallMode::Sync => "SYNC",
            CallMode::Future => "FUTURE",
            CallMode::Callback => "CALLBACK",
            CallMode::Oneway => "ONEWAY",
        }
    }
}

impl fmt::Display for CallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallMode {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SYNC" => Ok(CallMode::Sync),
            "FUTURE" => Ok(CallMode::Future),
            "CALLBACK" => Ok(CallMode::Callback),
            "ONEWAY" => Ok(CallMode::Oneway),
            _ => Err(RpcError::Config(format!("unknown call mode: {}", s))),
        }
    }
}

/// Runs one call against a resolved address in the configured mode.
pub(crate) struct CallDispatcher {
    transport: Arc<dyn Transport>,
    correlation: Arc<CorrelationRegistry>,
    mode: CallMode,
    timeout: Duration,
    callback: Option<Arc<dyn InvokeCallback>>,
}

impl CallDispatcher {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        correlation: Arc<CorrelationRegistry>,
        mode: CallMode,
        timeout: Duration,
        callback: Option<Arc<dyn InvokeCallback>>,
    ) -> Self {
        Self {
            transport,
            correlation,
            mode,
            timeout,
            callback,
        }
    }

    pub(crate) fn mode(&self) -> CallMode {
        self.mode
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn correlation(&self) -> &Arc<CorrelationRegistry> {
        &self.correlation
    }

    /// Dispatch `request` to `address`.
    ///
    /// Only `SYNC` returns a value; the other modes return `Ok(None)` once
    /// the request has been handed to the transport.
    pub(crate) async fn dispatch(
        &self,
        ctx: &mut CallContext,
        address: &str,
        request: RpcRequest,
    ) -> Result<Option<RpcValue>> {
        let request_id = request.request_id();
        tracing::debug!(
            request_id,
            address,
            mode = %self.mode,
            service = request.type_name(),
            method = request.method_name(),
            "Dispatching call"
        );

        match self.mode {
            CallMode::Sync => {
                let guard = PendingGuard::new(self.correlation.register(request_id, None)?);
                self.send(address, request)?;

                let outcome = guard.handle().wait(self.timeout).await;
                if let Err(RpcError::Timeout(ms)) = &outcome {
                    tracing::warn!(request_id, address, timeout_ms = *ms, "Call timed out");
                }
                outcome.map(Some)
            }
            CallMode::Future => {
                let future =
                    InvokeFuture::new(self.correlation.register(request_id, None)?, self.timeout);
                self.send(address, request)?;
                ctx.publish_future(future);
                Ok(None)
            }
            CallMode::Callback => {
                let callback = ctx
                    .take_callback()
                    .or_else(|| self.callback.clone())
                    .ok_or_else(|| {
                        RpcError::Config(format!(
                            "no invoke callback for CALLBACK call {}#{}",
                            request.type_name(),
                            request.method_name()
                        ))
                    })?;

                let handle = self.correlation.register(request_id, Some(callback))?;
                if let Err(err) = self.send(address, request) {
                    handle.remove_self();
                    return Err(err);
                }
                Ok(None)
            }
            CallMode::Oneway => {
                self.send(address, request)?;
                Ok(None)
            }
        }
    }

    fn send(&self, address: &str, request: RpcRequest) -> Result<()> {
        let request_id = request.request_id();
        self.transport.async_send(address, request).map_err(|err| {
            tracing::warn!(request_id, address, error = %err, "Failed to send request");
            err
        })
    }
}
