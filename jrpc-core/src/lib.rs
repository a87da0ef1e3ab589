//! Core JSON-RPC 2.0 types, parser, and codec for jrpc
//!
//! This crate provides the protocol-bound half of the jrpc engine:
//!
//! - **Types**: requests, responses, ids, and parameter shapes
//! - **Error model**: the closed set of standard error kinds plus
//!   application-defined errors
//! - **Parser**: envelope validation turning decoded JSON (or raw text)
//!   into validated requests or inline errors
//! - **Codec**: assembling responses back into JSON for the transport
//!
//! # Architecture
//!
//! The crate is transport-agnostic and does no I/O. The `jrpc-engine` crate
//! builds on it with a method registry and dispatcher; transports hand raw
//! text or decoded values in at one end and ship encoded output out at the
//! other.
//!
//! # Example
//!
//! ```rust
//! use jrpc_core::{codec, parser, Id, Response};
//!
//! let incoming = parser::parse_text(r#"{"jsonrpc":"2.0","method":"add","id":1}"#);
//! assert!(matches!(
//!     incoming,
//!     parser::Incoming::Single(parser::ParsedUnit::Request(_))
//! ));
//!
//! let response = Response::success(serde_json::json!(8), Id::Number(1));
//! let json = codec::encode_response(&response).unwrap();
//! assert!(json.contains("\"result\":8"));
//! ```

pub mod codec;
pub mod error;
pub mod parser;
pub mod types;

// Re-export the most commonly used types for convenience
pub use error::{Error, Result, RpcErrorData, RESERVED_CODE_RANGE};
pub use parser::{Incoming, InvalidUnit, ParsedUnit};
pub use types::{Id, Output, Params, Request, Response};
