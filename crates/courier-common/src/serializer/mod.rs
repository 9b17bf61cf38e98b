//! Courier Serializers
//!
//! Encoding of [`RpcRequest`](crate::protocol::RpcRequest) and
//! [`RpcResponse`](crate::protocol::RpcResponse) for transports.
//! The invocation engine never touches bytes itself; it hands the configured
//! [`Serializer`] to the transport when a reference is built.

pub mod codec;

pub use codec::{JsonCodec, Serializer};
