use std::sync::Arc;
use std::time::Duration;

use courier_common::protocol::error::{Result, RpcError};
use courier_common::protocol::{MethodName, ParamType, RpcRequest, RpcValue, TypeName};
use courier_common::serializer::Serializer;

use crate::callback::InvokeCallback;
use crate::context::CallContext;
use crate::correlation::CorrelationRegistry;
use crate::dispatcher::{CallDispatcher, CallMode};
use crate::generic;
use crate::load_balance::{LoadBalance, RoundRobin};
use crate::resolver::{AddressResolver, ServiceRegistry};
use crate::transport::{Transport, TransportContext};

pub const DEFAULT_TIMEOUT_MS: i64 = 10_000;

/// Settings for one service reference.
///
/// Fields are public so they can be set directly; the `with_*` setters
/// chain. Nothing is checked until [`ServiceReference::build`].
#[derive(Clone)]
pub struct ReferenceConfig {
    pub transport: Option<Arc<dyn Transport>>,
    pub serializer: Option<Serializer>,
    pub call_mode: Option<CallMode>,
    pub load_balance: Option<Arc<dyn LoadBalance>>,
    /// Name of the interface this reference calls.
    pub iface: Option<TypeName>,
    pub version: Option<String>,
    /// Milliseconds; negative values are treated as zero, which waits
    /// without bound.
    pub timeout_ms: i64,
    /// Fixed address; bypasses discovery when set and not blank.
    pub address: Option<String>,
    pub access_token: Option<String>,
    pub callback: Option<Arc<dyn InvokeCallback>>,
    pub service_registry: Option<Arc<dyn ServiceRegistry>>,
    /// Defaults to [`CorrelationRegistry::global`].
    pub correlation: Option<Arc<CorrelationRegistry>>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            transport: None,
            serializer: Some(Serializer::default()),
            call_mode: Some(CallMode::default()),
            load_balance: Some(Arc::new(RoundRobin::new())),
            iface: None,
            version: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            address: None,
            access_token: None,
            callback: None,
            service_registry: None,
            correlation: None,
        }
    }
}

impl ReferenceConfig {
    pub fn new(iface: impl Into<TypeName>, transport: Arc<dyn Transport>) -> Self {
        Self {
            iface: Some(iface.into()),
            transport: Some(transport),
            ..Self::default()
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = Some(serializer);
        self
    }

    pub fn with_call_mode(mut self, call_mode: CallMode) -> Self {
        self.call_mode = Some(call_mode);
        self
    }

    pub fn with_load_balance(mut self, load_balance: Arc<dyn LoadBalance>) -> Self {
        self.load_balance = Some(load_balance);
        self
    }

    pub fn with_iface(mut self, iface: impl Into<TypeName>) -> Self {
        self.iface = Some(iface.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_callback(mut self, callback: Arc<dyn InvokeCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn with_service_registry(mut self, service_registry: Arc<dyn ServiceRegistry>) -> Self {
        self.service_registry = Some(service_registry);
        self
    }

    pub fn with_correlation(mut self, correlation: Arc<CorrelationRegistry>) -> Self {
        self.correlation = Some(correlation);
        self
    }
}

/// One method call made against a reference, before it becomes a request.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    declaring_type: TypeName,
    method: MethodName,
    param_types: Vec<ParamType>,
    args: Vec<RpcValue>,
}

impl MethodCall {
    pub fn new(declaring_type: impl Into<TypeName>, method: impl Into<MethodName>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            method: method.into(),
            param_types: Vec::new(),
            args: Vec::new(),
        }
    }

    /// Append one argument with its declared type.
    pub fn arg(mut self, param_type: ParamType, value: RpcValue) -> Self {
        self.param_types.push(param_type);
        self.args.push(value);
        self
    }

    /// Replace all arguments at once.
    pub fn with_args(mut self, param_types: Vec<ParamType>, args: Vec<RpcValue>) -> Self {
        self.param_types = param_types;
        self.args = args;
        self
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn param_types(&self) -> &[ParamType] {
        &self.param_types
    }

    pub fn args(&self) -> &[RpcValue] {
        &self.args
    }

    pub(crate) fn into_args(self) -> Vec<RpcValue> {
        self.args
    }
}

/// Client-side handle to a remote interface.
///
/// Built once from a [`ReferenceConfig`] and shared freely; every call goes
/// through [`invoke`](Self::invoke), usually behind a typed wrapper.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # async fn demo(transport: Arc<dyn courier_client::Transport>) -> courier_common::Result<()> {
/// use courier_client::{CallContext, ReferenceConfig, ServiceReference};
/// use courier_common::ParamType;
/// use serde_json::json;
///
/// let reference = ServiceReference::build(
///     ReferenceConfig::new("com.acme.Greeter", transport).with_address("10.0.0.1:7080"),
/// )?;
///
/// let call = reference.method("greet").arg(ParamType::String, json!("world"));
/// let greeting = reference.invoke(&mut CallContext::new(), call).await?;
/// # Ok(())
/// # }
/// ```
pub struct ServiceReference {
    iface: TypeName,
    version: Option<String>,
    access_token: Option<String>,
    serializer: Serializer,
    resolver: AddressResolver,
    dispatcher: CallDispatcher,
}

impl ServiceReference {
    /// Validate `config` and hand the transport its context.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Config`] when the transport, serializer, call
    /// mode, load-balance policy or interface is missing, and passes on any
    /// error from [`Transport::init`].
    pub fn build(config: ReferenceConfig) -> Result<Self> {
        let ReferenceConfig {
            transport,
            serializer,
            call_mode,
            load_balance,
            iface,
            version,
            timeout_ms,
            address,
            access_token,
            callback,
            service_registry,
            correlation,
        } = config;

        let transport = transport.ok_or_else(|| missing("transport"))?;
        let serializer = serializer.ok_or_else(|| missing("serializer"))?;
        let call_mode = call_mode.ok_or_else(|| missing("call mode"))?;
        let load_balance = load_balance.ok_or_else(|| missing("load balance"))?;
        let iface = iface
            .filter(|iface| !iface.trim().is_empty())
            .ok_or_else(|| missing("iface"))?;

        let timeout = Duration::from_millis(timeout_ms.max(0) as u64);
        let correlation = correlation.unwrap_or_else(CorrelationRegistry::global);

        transport.init(TransportContext {
            serializer,
            correlation: correlation.clone(),
            timeout,
            access_token: access_token.clone(),
        })?;

        let resolver = AddressResolver::new(address, service_registry, load_balance);

        tracing::info!(
            iface = %iface,
            version = version.as_deref().unwrap_or(""),
            mode = %call_mode,
            serializer = serializer.name(),
            timeout_ms = timeout.as_millis() as u64,
            address = resolver.static_address().unwrap_or(""),
            "Service reference built"
        );

        Ok(Self {
            iface,
            version,
            access_token,
            serializer,
            resolver,
            dispatcher: CallDispatcher::new(transport, correlation, call_mode, timeout, callback),
        })
    }

    /// Start a call to `method` on this reference's interface.
    pub fn method(&self, method: impl Into<MethodName>) -> MethodCall {
        MethodCall::new(self.iface.clone(), method)
    }

    /// Run one call: build the request, resolve an address, dispatch.
    ///
    /// Returns the result for `SYNC` calls and `None` for every other mode.
    pub async fn invoke(&self, ctx: &mut CallContext, call: MethodCall) -> Result<Option<RpcValue>> {
        let request = self.build_request(call)?;
        let address = self.resolver.resolve(request.type_name(), request.version())?;
        self.dispatcher.dispatch(ctx, &address, request).await
    }

    /// Turn a call into the request that goes on the wire.
    pub fn build_request(&self, call: MethodCall) -> Result<RpcRequest> {
        let (call, version) = if generic::is_generic_call(&call) {
            generic::unwrap_generic_call(call)?
        } else {
            (call, self.version.clone())
        };

        if generic::is_base_object_type(call.declaring_type()) {
            tracing::info!(
                type_name = call.declaring_type(),
                method = call.method(),
                "Rejected call to base object method"
            );
            return Err(RpcError::UnsupportedCall {
                type_name: call.declaring_type.clone(),
                method: call.method.clone(),
            });
        }

        let MethodCall {
            declaring_type,
            method,
            param_types,
            args,
        } = call;

        Ok(RpcRequest::new(declaring_type, method, param_types, args)?
            .with_access_token(self.access_token.clone())
            .with_version(version))
    }

    pub fn iface(&self) -> &str {
        &self.iface
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn call_mode(&self) -> CallMode {
        self.dispatcher.mode()
    }

    pub fn timeout(&self) -> Duration {
        self.dispatcher.timeout()
    }

    pub fn serializer(&self) -> Serializer {
        self.serializer
    }

    pub fn correlation(&self) -> &Arc<CorrelationRegistry> {
        self.dispatcher.correlation()
    }
}

fn missing(what: &str) -> RpcError {
    RpcError::Config(format!("reference {} missing", what))
}
