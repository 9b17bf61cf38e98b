//! Generic invocation: calling a service known only by name.
//!
//! A call against [`GENERIC_SERVICE_TYPE`]`#`[`GENERIC_INVOKE_METHOD`]
//! carries its real target in five arguments:
//!
//! | # | Meaning | Shape |
//! |---|---|---|
//! | 0 | type name | string |
//! | 1 | version | string or null |
//! | 2 | method name | string |
//! | 3 | parameter type names | array of strings or null |
//! | 4 | parameter values | array or null |
//!
//! [`unwrap_generic_call`] replaces the call with that target before a
//! request is built.

use courier_common::protocol::error::{Result, RpcError};
use courier_common::protocol::{ParamType, RpcValue};
use serde_json::Value;

use crate::context::CallContext;
use crate::reference::{MethodCall, ServiceReference};

pub const GENERIC_SERVICE_TYPE: &str = "GenericService";
pub const GENERIC_INVOKE_METHOD: &str = "invoke";

/// Root type every interface inherits from. Its methods are never remote.
pub const BASE_OBJECT_TYPE: &str = "Object";

pub fn is_generic_call(call: &MethodCall) -> bool {
    call.declaring_type() == GENERIC_SERVICE_TYPE && call.method() == GENERIC_INVOKE_METHOD
}

pub fn is_base_object_type(type_name: &str) -> bool {
    type_name == BASE_OBJECT_TYPE || type_name == "java.lang.Object"
}

/// Replace a generic call by the call it describes.
///
/// Returns the target call together with its version.
///
/// # Errors
///
/// Returns [`RpcError::InvalidRequest`] when the argument count or shape is
/// wrong or a type name does not resolve.
pub fn unwrap_generic_call(call: MethodCall) -> Result<(MethodCall, Option<String>)> {
    let args = call.into_args();
    let [type_name, version, method, param_types, params]: [RpcValue; 5] =
        args.try_into().map_err(|args: Vec<RpcValue>| {
            invalid(format!("expected 5 arguments, got {}", args.len()))
        })?;

    let type_name = expect_string(type_name, "type name")?;
    let method = expect_string(method, "method name")?;

    let version = match version {
        Value::Null => None,
        Value::String(version) if version.trim().is_empty() => None,
        Value::String(version) => Some(version),
        other => return Err(invalid(format!("version must be a string, got {}", other))),
    };

    let param_types = match param_types {
        Value::Null => Vec::new(),
        Value::Array(names) => names
            .into_iter()
            .map(|name| match name {
                Value::String(name) => ParamType::resolve(&name),
                other => Err(invalid(format!("parameter type must be a string, got {}", other))),
            })
            .collect::<Result<Vec<_>>>()?,
        other => return Err(invalid(format!("parameter types must be an array, got {}", other))),
    };

    let params = match params {
        Value::Null => Vec::new(),
        Value::Array(values) => values,
        other => return Err(invalid(format!("parameters must be an array, got {}", other))),
    };

    let target = MethodCall::new(type_name, method).with_args(param_types, params);
    Ok((target, version))
}

fn expect_string(value: RpcValue, what: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(invalid(format!("{} must be a string, got {}", what, other))),
    }
}

fn invalid(message: String) -> RpcError {
    RpcError::InvalidRequest(format!("generic invoke: {}", message))
}

/// Typed front for generic invocation through any reference.
///
/// # Example
///
/// ```no_run
/// # async fn demo(reference: &courier_client::ServiceReference) -> courier_common::Result<()> {
/// use courier_client::{CallContext, GenericService};
/// use serde_json::json;
///
/// let generic = GenericService::new(reference);
/// let result = generic
///     .invoke(
///         &mut CallContext::new(),
///         "com.acme.Calculator",
///         Some("v1"),
///         "add",
///         &["int", "int"],
///         vec![json!(1), json!(2)],
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct GenericService<'a> {
    reference: &'a ServiceReference,
}

impl<'a> GenericService<'a> {
    pub fn new(reference: &'a ServiceReference) -> Self {
        Self { reference }
    }

    pub async fn invoke(
        &self,
        ctx: &mut CallContext,
        type_name: &str,
        version: Option<&str>,
        method: &str,
        param_types: &[&str],
        params: Vec<RpcValue>,
    ) -> Result<Option<RpcValue>> {
        let call = Self::call(type_name, version, method, param_types, params);
        self.reference.invoke(ctx, call).await
    }

    /// The `GenericService#invoke` call describing the given target.
    pub fn call(
        type_name: &str,
        version: Option<&str>,
        method: &str,
        param_types: &[&str],
        params: Vec<RpcValue>,
    ) -> MethodCall {
        let param_types: Vec<RpcValue> =
            param_types.iter().map(|name| Value::String(name.to_string())).collect();
        let version = version.map_or(Value::Null, |v| Value::String(v.to_string()));

        MethodCall::new(GENERIC_SERVICE_TYPE, GENERIC_INVOKE_METHOD)
            .arg(ParamType::String, Value::String(type_name.to_string()))
            .arg(ParamType::String, version)
            .arg(ParamType::String, Value::String(method.to_string()))
            .arg(ParamType::Named("String[]".to_string()), Value::Array(param_types))
            .arg(ParamType::Named("Object[]".to_string()), Value::Array(params))
    }
}
