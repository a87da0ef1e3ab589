//! jrpc - a JSON-RPC 2.0 server-side request/response engine
//!
//! This is the convenience crate that re-exports the jrpc sub-crates. Use it
//! if you want a single dependency covering the whole pipeline: parsing raw
//! input into validated requests, dispatching them against a registry of
//! named methods, and assembling spec-compliant responses.
//!
//! # Architecture
//!
//! - **jrpc-core**: wire types, error model, request parser, response codec
//! - **jrpc-engine**: method registry, handler abstraction, dispatcher,
//!   batch processing, and the `Service` facade
//!
//! Transports (HTTP, sockets, pipes) live outside this workspace: they hand
//! the engine a raw string or a decoded `serde_json::Value` and ship the
//! serialized output back out.
//!
//! # Quick Start
//!
//! ```rust
//! use jrpc::engine::{from_typed_fn, ParamSpec, Service};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct AddParams { a: i64, b: i64 }
//!
//! #[tokio::main]
//! async fn main() -> jrpc::core::Result<()> {
//!     let service = Service::builder()
//!         .method("add", ParamSpec::named(&["a", "b"]), from_typed_fn(|p: AddParams| async move {
//!             Ok(p.a + p.b)
//!         }))?
//!         .build();
//!
//!     let out = service
//!         .handle(r#"{"jsonrpc":"2.0","id":321,"method":"add","params":{"a":5,"b":13}}"#)
//!         .await?
//!         .expect("calls always get a response");
//!     let out: serde_json::Value = serde_json::from_str(&out).unwrap();
//!     assert_eq!(out["result"], serde_json::json!(18));
//!     assert_eq!(out["id"], serde_json::json!(321));
//!     Ok(())
//! }
//! ```

// Re-export the sub-crates under short module names so users can access
// everything through the `jrpc::` prefix
pub use jrpc_core as core;
pub use jrpc_engine as engine;

// Convenience re-exports of the most commonly used types
pub use jrpc_core::{Id, Params, Request, Response, RpcErrorData};
pub use jrpc_engine::{CallHook, ParamSpec, Registry, Service};
