pub mod error;
pub mod requests;
pub mod responses;


pub use error::{ErrorCause, Result, RpcError};
pub use requests::{
    make_service_key, MethodName, ParamType, RequestId, RpcRequest, RpcValue, TypeName,
};
pub use responses::RpcResponse;
