//! A JSON-RPC 2.0 client engine that turns calls on declared service contracts into HTTP requests.
//!
//! Services are described by a [`ServiceDescriptor`], either built by hand or generated from a Rust
//! trait by the `#[json_rpc_service]` macro in the `rpcwire` crate.  A descriptor is bound to a
//! [`Client`], which validates it and resolves the service's endpoint; each method invocation on the
//! resulting [`ServiceHandle`] yields a cold [`Call`] that sends exactly one request when awaited
//! and completes with exactly one typed result or [`JsonRpcError`].
//!
//! This is strictly a client.  There is no server, no batching and no notifications.

#[cfg(test)]
extern crate self as rpcwire_jsonrpc;

mod call;
mod client;
pub mod codec;
mod config;
mod descriptor;
mod dispatcher;
mod error;
pub mod error_map;
mod ids;
mod interceptor;
mod params;
mod plan;
mod service;
#[cfg(test)]
pub mod testing;
mod transport;
mod types;

pub use call::{Call, CallFuture, Subscription};
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use descriptor::{DeclarationKind, MethodDescriptor, ParamDescriptor, ParamMode, ReturnShape, ServiceDescriptor};
pub use error::{BoxError, ConfigError, JsonRpcError, ProtocolError, Result};
pub use ids::{IdGenerator, IdStrategy, MAX_SAFE_INTEGER, RandomIds, SequentialIds};
pub use interceptor::{InterceptorChain, RequestInterceptor};
pub use params::{Arguments, bind_params, param_tags};
pub use plan::InvocationPlan;
pub use service::{Binds, ServiceAdapter, ServiceHandle};
pub use transport::{HttpRequest, HttpResponse, JSON_CONTENT_TYPE, ReqwestTransport, Transport};
pub use types::{ErrorObject, Id, JsonValue, Params, Request, ResponseEnvelope, TwoPointZero};
