use crate::protocol::error::Result;
use crate::protocol::{RpcRequest, RpcResponse};

/// Serializer a transport uses to put requests and responses on the wire.
///
/// Only JSON ships today. The enum leaves room for other formats
/// without changing the transport contract.
///
/// # Example
///
/// ```
/// use courier_common::serializer::Serializer;
/// use courier_common::protocol::RpcRequest;
///
/// let serializer = Serializer::default();
/// let request = RpcRequest::new("com.acme.Echo", "echo", vec![], vec![]).unwrap();
///
/// let encoded = serializer.encode_request(&request).unwrap();
/// let decoded = serializer.decode_request(&encoded).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serializer {
    Json(JsonCodec),
}

impl Serializer {
    pub fn json() -> Self {
        Serializer::Json(JsonCodec)
    }

    /// Short name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Serializer::Json(_) => "json",
        }
    }

    pub fn encode_request(&self, request: &RpcRequest) -> Result<Vec<u8>> {
        match self {
            Serializer::Json(_) => JsonCodec::encode_request(request),
        }
    }

    pub fn decode_request(&self, data: &[u8]) -> Result<RpcRequest> {
        match self {
            Serializer::Json(_) => JsonCodec::decode_request(data),
        }
    }

    pub fn encode_response(&self, response: &RpcResponse) -> Result<Vec<u8>> {
        match self {
            Serializer::Json(_) => JsonCodec::encode_response(response),
        }
    }

    pub fn decode_response(&self, data: &[u8]) -> Result<RpcResponse> {
        match self {
            Serializer::Json(_) => JsonCodec::decode_response(data),
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::json()
    }
}

/// JSON codec for requests and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn encode_request(request: &RpcRequest) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(request)?)
    }

    pub fn decode_request(data: &[u8]) -> Result<RpcRequest> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn encode_response(response: &RpcResponse) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(response)?)
    }

    pub fn decode_response(data: &[u8]) -> Result<RpcResponse> {
        Ok(serde_json::from_slice(data)?)
    }
}
