use std::sync::Arc;

use thiserror::Error;

use super::RequestId;

/// Cause attached to a transport failure.
///
/// Kept behind an `Arc` so that one failure can be handed to several
/// observers (the waiting caller, a future, a callback) without losing it.
pub type ErrorCause = Arc<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug, Clone)]
pub enum RpcError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported proxy method [{type_name}#{method}]")]
    UnsupportedCall { type_name: String, method: String },

    #[error("Reference [{type_name}] address empty")]
    AddressEmpty { type_name: String },

    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<ErrorCause>,
    },

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Remote invocation failed: {0}")]
    Application(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RpcError {
    /// Transport failure without an underlying cause.
    pub fn transport(message: impl Into<String>) -> Self {
        RpcError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Transport failure wrapping the error reported by the transport.
    pub fn transport_with<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RpcError::Transport {
            message: message.into(),
            source: Some(Arc::new(cause)),
        }
    }

    pub fn duplicate_request(id: RequestId) -> Self {
        RpcError::InvalidRequest(format!("request id {} is already pending", id))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RpcError::Timeout(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, RpcError::Config(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Transport { .. })
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for RpcError {
    fn from(err: std::io::Error) -> Self {
        RpcError::transport_with("I/O failure", err)
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;
