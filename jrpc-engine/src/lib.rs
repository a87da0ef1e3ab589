//! JSON-RPC 2.0 request/response engine
//!
//! This crate is the server-side half of jrpc: it takes the validated
//! requests produced by `jrpc-core`'s parser, resolves them against a
//! registry of named methods, invokes handlers, and produces spec-compliant
//! responses. Transports stay outside: they deliver raw bytes in and ship
//! serialized responses out.
//!
//! # Core pieces
//!
//! - **Registry**: method name → handler plus its declared parameter shape
//! - **Handler**: async, type-erased method implementations
//! - **Dispatcher**: per-request processing, error downgrading, batch
//!   execution with order-preserving output
//! - **CallHook**: before/after interception around each call, for
//!   parameter injection, result decoration, and error translation
//! - **Service**: the facade running parse → dispatch → build for one input
//!
//! # Quick Start
//!
//! ```rust
//! use jrpc_engine::{from_typed_fn, ParamSpec, Service};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct AddParams { a: i64, b: i64 }
//!
//! # #[tokio::main]
//! # async fn main() -> jrpc_core::Result<()> {
//! let service = Service::builder()
//!     .method("add", ParamSpec::named(&["a", "b"]), from_typed_fn(|p: AddParams| async move {
//!         Ok(p.a + p.b)
//!     }))?
//!     .build();
//!
//! let out = service
//!     .handle(r#"{"jsonrpc":"2.0","id":1,"method":"add","params":{"a":2,"b":3}}"#)
//!     .await?;
//! assert_eq!(out.as_deref(), Some(r#"{"jsonrpc":"2.0","result":5,"id":1}"#));
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency model
//!
//! Processing one input is a plain async call with no internal state; batch
//! members may run on parallel tasks, but output order always matches input
//! order and one member's panic cannot prevent its siblings from being
//! dispatched. The registry is populated before traffic and observed as a
//! consistent snapshot afterwards. Bounding handler execution time, if
//! needed, belongs to the transport wrapping the dispatch call.

mod dispatch;
mod handler;
mod hooks;
mod registry;
mod service;

pub use dispatch::{BatchMode, Dispatcher};
pub use handler::{from_fn, from_typed_fn, AsyncHandler, Handler, HandlerFuture};
pub use hooks::{CallContext, CallHook, HookAction, HookChain};
pub use registry::{MethodEntry, ParamSpec, Registry};
pub use service::{Service, ServiceBuilder};
