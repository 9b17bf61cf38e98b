//! Courier Response Types
//!
//! This module defines the response record a transport hands back to the
//! correlation layer.

use serde::{Deserialize, Serialize};

use super::error::{Result, RpcError};
use super::{RequestId, RpcValue};

/// A response for one request, as reported by the transport.
///
/// # Response Flow
///
/// 1. The remote side executes the `RpcRequest`
/// 2. It reports an `RpcResponse` carrying the same `request_id`
/// 3. The transport decodes it and hands it to the correlation registry
/// 4. The registry completes the pending call with [`RpcResponse::into_outcome`]
///
/// # Fields
///
/// - `request_id`: The request this response corresponds to
/// - `result`: The result value (present on success)
/// - `error_msg`: Error message (present on failure)
///
/// # Example
///
/// ```
/// use courier_common::protocol::responses::RpcResponse;
/// use serde_json::json;
///
/// let success = RpcResponse::success(123, json!({"pi": 3.14159}));
/// assert!(success.is_success());
///
/// let failure = RpcResponse::error(123, "Division by zero");
/// assert!(!failure.is_success());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcResponse {
    /// Request identifier this response corresponds to
    pub request_id: RequestId,
    /// Result value (present on success)
    pub result: Option<RpcValue>,
    /// Error message (present on failure)
    pub error_msg: Option<String>,
}

impl RpcResponse {
    /// Creates a successful response.
    pub fn success(request_id: RequestId, result: RpcValue) -> Self {
        RpcResponse {
            request_id,
            result: Some(result),
            error_msg: None,
        }
    }

    /// Creates an error response.
    ///
    /// # Example
    ///
    /// ```
    /// use courier_common::protocol::responses::RpcResponse;
    ///
    /// let response = RpcResponse::error(123, "Division by zero");
    /// assert_eq!(response.error_msg, Some("Division by zero".to_string()));
    /// ```
    pub fn error(request_id: RequestId, error_msg: impl Into<String>) -> Self {
        RpcResponse {
            request_id,
            result: None,
            error_msg: Some(error_msg.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_msg.is_none()
    }

    /// Turn the record into the outcome delivered to the caller.
    ///
    /// An error message always wins over a result. A success without a
    /// result value (a remote `void` method) yields `Value::Null`.
    pub fn into_outcome(self) -> Result<RpcValue> {
        match self.error_msg {
            Some(message) => Err(RpcError::Application(message)),
            None => Ok(self.result.unwrap_or(RpcValue::Null)),
        }
    }
}
