//! JSON-RPC 2.0 data model
//!
//! Wire types for the server side of the protocol: request ids, parameter
//! shapes, validated requests, and responses. All types carry serde support
//! and match the JSON-RPC 2.0 wire format exactly.
//!
//! # Calls vs. notifications
//!
//! Presence of `id` distinguishes a **call** (exactly one response) from a
//! **notification** (no response ever, including on error). A request with
//! `"id": null` is treated as a call that must be answered with `"id": null`;
//! this follows the literal protocol text rather than conflating a null id
//! with a notification.

use crate::error::RpcErrorData;
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON-RPC 2.0 request ID
///
/// An id is a string, a number, or null. Null ids are allowed by the spec
/// but make correlation impossible, so the engine only produces them itself
/// when a request's id could not be determined at all.
///
/// Serialized untagged, directly as the inner value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier
    String(String),
    /// Numeric identifier; integers only, fractional ids are rejected by
    /// the parser
    Number(i64),
    /// Null identifier; used for responses whose request id could not be
    /// determined
    Null,
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

/// Parameters of a request: positional or named
///
/// Exactly one of {positional, named, absent} applies to any request; the
/// absent case is `Option<Params>::None` on [`Request`]. Serialized untagged,
/// as a JSON array or object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    /// Ordered positional arguments, bound to the handler by position
    Positional(Vec<serde_json::Value>),
    /// Named arguments, bound to the handler by argument name
    Named(serde_json::Map<String, serde_json::Value>),
}

impl Params {
    /// Number of arguments carried, regardless of shape.
    pub fn len(&self) -> usize {
        match self {
            Params::Positional(args) => args.len(),
            Params::Named(fields) => fields.len(),
        }
    }

    /// Whether no arguments are carried.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The params as a plain JSON value (array or object).
    pub fn into_value(self) -> serde_json::Value {
        match self {
            Params::Positional(args) => serde_json::Value::Array(args),
            Params::Named(fields) => serde_json::Value::Object(fields),
        }
    }
}

/// A validated JSON-RPC 2.0 request
///
/// Produced by the parser only after envelope validation has passed: the
/// `jsonrpc` member equaled `"2.0"`, `method` was a non-empty string, and
/// `id`/`params` had legal types. The `jsonrpc` member itself is not stored;
/// it is implied by the type.
///
/// `id: None` marks a notification. `id: Some(Id::Null)` is a call whose
/// response carries `"id": null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Name of the registered method to invoke
    pub method: String,
    /// Positional or named arguments, if any
    pub params: Option<Params>,
    /// Request id; absent for notifications
    pub id: Option<Id>,
}

impl Request {
    /// Create a call with the given id.
    pub fn call(method: impl Into<String>, params: Option<Params>, id: impl Into<Id>) -> Self {
        Self {
            method: method.into(),
            params,
            id: Some(id.into()),
        }
    }

    /// Create a notification (no id, no response).
    pub fn notification(method: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            method: method.into(),
            params,
            id: None,
        }
    }

    /// Whether this request is a notification.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// The id to echo in a response: the request's own id, or null when the
    /// id was absent.
    pub fn response_id(&self) -> Id {
        self.id.clone().unwrap_or(Id::Null)
    }
}

/// A JSON-RPC 2.0 response
///
/// Exactly one of `result` or `error` is present, enforced by the
/// [`success`](Response::success) and [`error`](Response::error)
/// constructors. `id` echoes the originating request's id exactly, or is
/// null when the id could not be determined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// Successful result, any JSON value including null
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error object, mutually exclusive with `result`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorData>,
    /// Id of the originating request
    pub id: Id,
}

impl Response {
    /// Create a success response.
    pub fn success(result: serde_json::Value, id: Id) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response.
    pub fn error(error: RpcErrorData, id: Id) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }

    /// Whether this response carries a result.
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// Whether this response carries an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Final output of processing one input: a single response or an ordered
/// batch of responses
///
/// The batch variant is never empty; a batch whose calls all turned out to
/// be notifications produces no output at all (`Option<Output>::None` at the
/// dispatch boundary), not an empty array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Output {
    /// Response to a non-batch request
    Single(Response),
    /// Responses to a batch, in input order, notifications omitted
    Batch(Vec<Response>),
}

impl Output {
    /// Wrap an ordered response sequence, yielding `None` when it is empty.
    pub fn from_batch(responses: Vec<Response>) -> Option<Self> {
        if responses.is_empty() {
            None
        } else {
            Some(Output::Batch(responses))
        }
    }
}
