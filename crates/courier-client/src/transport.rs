//! Boundary to the wire.
//!
//! The client never opens connections itself. A [`Transport`] is handed a
//! [`TransportContext`] once when the reference is built, then asked to
//! send each request. Responses come back out of band: the transport calls
//! [`CorrelationRegistry::complete_response`] on the registry from its
//! context.
//!
//! [`CorrelationRegistry::complete_response`]: crate::CorrelationRegistry::complete_response

use std::sync::Arc;
use std::time::Duration;

use courier_common::protocol::error::Result;
use courier_common::protocol::RpcRequest;
use courier_common::serializer::Serializer;

use crate::correlation::CorrelationRegistry;

/// What a transport needs to know about the reference it serves.
#[derive(Clone)]
pub struct TransportContext {
    pub serializer: Serializer,
    pub correlation: Arc<CorrelationRegistry>,
    pub timeout: Duration,
    pub access_token: Option<String>,
}

pub trait Transport: Send + Sync {
    /// Called once, when the owning reference is built.
    fn init(&self, context: TransportContext) -> Result<()>;

    /// Queue `request` for delivery to `address`.
    ///
    /// Must not wait for the response. Fails with a transport error when the
    /// address cannot be reached.
    fn async_send(&self, address: &str, request: RpcRequest) -> Result<()>;
}
