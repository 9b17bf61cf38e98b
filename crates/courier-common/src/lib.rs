//! Courier Common Types
//!
//! This crate provides the records and errors shared by every Courier
//! component.
//!
//! # Overview
//!
//! - **Protocol**: the invocation descriptor ([`RpcRequest`]), the response
//!   record ([`RpcResponse`]), parameter type identities ([`ParamType`]) and
//!   service-key construction
//! - **Errors**: the [`RpcError`] taxonomy and the crate-wide [`Result`] alias
//! - **Serializer**: codecs a transport uses to put records on the wire
//!
//! # Example
//!
//! ```
//! use courier_common::{ParamType, RpcRequest, RpcResponse};
//! use serde_json::json;
//!
//! let request = RpcRequest::new(
//!     "com.acme.Calc",
//!     "add",
//!     vec![ParamType::Int, ParamType::Int],
//!     vec![json!(1), json!(2)],
//! )
//! .unwrap();
//!
//! let response = RpcResponse::success(request.request_id(), json!(3));
//! assert_eq!(response.into_outcome().unwrap(), json!(3));
//! ```

pub mod protocol;
pub mod serializer;

pub use protocol::*;
pub use serializer::{JsonCodec, Serializer};
