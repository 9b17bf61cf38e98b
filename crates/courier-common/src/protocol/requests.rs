use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use super::error::{Result, RpcError};

pub type RequestId = u64;
pub type TypeName = String;
pub type MethodName = String;
pub type RpcValue = serde_json::Value;

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Type identity of one declared parameter.
///
/// Resolved from the type strings a generic invocation carries, and
/// serialized back to the canonical name on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParamType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Void,
    String,
    /// Any non-primitive type, kept by its fully qualified name.
    Named(TypeName),
}

impl ParamType {
    /// Resolve a declared type string into a type identity.
    pub fn resolve(name: &str) -> Result<Self> {
        let name = name.trim();
        let resolved = match name {
            "" => {
                return Err(RpcError::InvalidRequest(
                    "parameter type name is blank".to_string(),
                ))
            }
            "boolean" | "bool" => ParamType::Boolean,
            "byte" => ParamType::Byte,
            "short" => ParamType::Short,
            "int" => ParamType::Int,
            "long" => ParamType::Long,
            "float" => ParamType::Float,
            "double" => ParamType::Double,
            "char" => ParamType::Char,
            "void" => ParamType::Void,
            "string" | "String" | "java.lang.String" => ParamType::String,
            other => ParamType::Named(other.to_string()),
        };
        Ok(resolved)
    }

    /// Canonical name used on the wire.
    pub fn name(&self) -> &str {
        match self {
            ParamType::Boolean => "boolean",
            ParamType::Byte => "byte",
            ParamType::Short => "short",
            ParamType::Int => "int",
            ParamType::Long => "long",
            ParamType::Float => "float",
            ParamType::Double => "double",
            ParamType::Char => "char",
            ParamType::Void => "void",
            ParamType::String => "string",
            ParamType::Named(name) => name,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamType {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self> {
        ParamType::resolve(s)
    }
}

impl TryFrom<String> for ParamType {
    type Error = RpcError;

    fn try_from(value: String) -> Result<Self> {
        ParamType::resolve(&value)
    }
}

impl From<ParamType> for String {
    fn from(value: ParamType) -> Self {
        value.name().to_string()
    }
}

/// One outgoing invocation: which service, which method, with what.
///
/// Fields are private so a built request cannot be altered on its way to
/// the transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    request_id: RequestId,
    create_millis_time: u64,
    access_token: Option<String>,
    type_name: TypeName,
    method_name: MethodName,
    parameter_types: Vec<ParamType>,
    parameters: Vec<RpcValue>,
    version: Option<String>,
}

impl RpcRequest {
    /// Build a request with a fresh id and the current timestamp.
    ///
    /// Type and method names must not be blank.
    pub fn new(
        type_name: impl Into<TypeName>,
        method_name: impl Into<MethodName>,
        parameter_types: Vec<ParamType>,
        parameters: Vec<RpcValue>,
    ) -> Result<Self> {
        let type_name = type_name.into();
        let method_name = method_name.into();

        if type_name.trim().is_empty() {
            return Err(RpcError::InvalidRequest("type name is blank".to_string()));
        }
        if method_name.trim().is_empty() {
            return Err(RpcError::InvalidRequest(format!(
                "method name is blank for type {}",
                type_name
            )));
        }

        Ok(RpcRequest {
            request_id: generate_request_id(),
            create_millis_time: current_millis(),
            access_token: None,
            type_name,
            method_name,
            parameter_types,
            parameters,
            version: None,
        })
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn create_millis_time(&self) -> u64 {
        self.create_millis_time
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn parameter_types(&self) -> &[ParamType] {
        &self.parameter_types
    }

    pub fn parameters(&self) -> &[RpcValue] {
        &self.parameters
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Lookup key of the service this request targets.
    pub fn service_key(&self) -> String {
        make_service_key(&self.type_name, self.version.as_deref())
    }
}

/// Combine a type name and an optional version into a discovery key.
///
/// A blank version is ignored, so `("Foo", None)` and `("Foo", Some(" "))`
/// address the same service.
pub fn make_service_key(type_name: &str, version: Option<&str>) -> String {
    match version.map(str::trim) {
        Some(version) if !version.is_empty() => format!("{}#{}", type_name, version),
        _ => type_name.to_string(),
    }
}

fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn generate_request_id() -> RequestId {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    // Always increment the counter to ensure uniqueness
    let counter = REQUEST_ID_COUNTER.fetch_add(1, Ordering::SeqCst);

    // Upper 32 bits from the timestamp, lower 32 bits from the counter
    (timestamp & 0xFFFFFFFF00000000) | (counter & 0xFFFFFFFF)
}
