//! Courier client: turns method calls on a service reference into
//! correlated requests and hands the results back in one of four call
//! modes (`SYNC`, `FUTURE`, `CALLBACK`, `ONEWAY`).

pub mod callback;
pub mod context;
pub mod correlation;
pub mod dispatcher;
pub mod future;
pub mod generic;
pub mod load_balance;
pub mod reference;
pub mod resolver;
pub mod transport;

pub use callback::{callback_fn, FnCallback, InvokeCallback};
pub use context::CallContext;
pub use correlation::{CorrelationRegistry, Outcome, PendingResponse};
pub use dispatcher::CallMode;
pub use future::InvokeFuture;
pub use generic::{GenericService, BASE_OBJECT_TYPE, GENERIC_INVOKE_METHOD, GENERIC_SERVICE_TYPE};
pub use load_balance::{LoadBalance, RoundRobin};
pub use reference::{MethodCall, ReferenceConfig, ServiceReference, DEFAULT_TIMEOUT_MS};
pub use resolver::{AddressResolver, ServiceRegistry};
pub use transport::{Transport, TransportContext};
