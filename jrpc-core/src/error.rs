//! Error types for jrpc
//!
//! Two error types live here:
//!
//! - **Error**: library-level errors for internal use (uses thiserror)
//! - **RpcErrorData**: wire-format error objects as defined by JSON-RPC 2.0
//!
//! # Spec-defined error codes
//!
//! JSON-RPC 2.0 reserves the code range -32768..=-32000:
//! - `-32700`: Parse error (input is not well-formed JSON)
//! - `-32600`: Invalid Request (envelope is not a valid Request object)
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! Application-defined errors use caller-chosen codes outside the reserved
//! range. [`RpcErrorData::application`] enforces that at construction;
//! reusing a standard code is possible through [`RpcErrorData::new`] but
//! must be deliberate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for jrpc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reserved error-code range of the JSON-RPC 2.0 specification.
pub const RESERVED_CODE_RANGE: std::ops::RangeInclusive<i64> = -32768..=-32000;

/// Library-level error type for jrpc operations
///
/// Handlers return this type; the dispatcher maps each variant onto the wire
/// taxonomy. A declared application failure travels as [`Error::Rpc`] and is
/// reproduced verbatim; every other variant that escapes a handler is
/// downgraded to an opaque internal error so implementation detail never
/// reaches the wire.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A declared JSON-RPC error, already in wire format.
    ///
    /// Handlers signal domain-specific failures by returning this variant;
    /// code, message, and data pass through to the response unchanged.
    #[error("JSON-RPC error: {0}")]
    Rpc(#[from] RpcErrorData),

    /// The method exists but the supplied parameters do not match its
    /// accepted shape. Maps to wire code -32602.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Conversion between Rust types and JSON failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An unexpected failure inside a handler. Maps to wire code -32603
    /// with the detail logged, not transmitted.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Setup-time registry misconfiguration: the method name is already
    /// taken. Never surfaced over the wire.
    #[error("Method \"{0}\" already registered")]
    DuplicateMethod(String),

    /// Setup-time registry misconfiguration: the method name is empty.
    #[error("Method name must not be empty")]
    EmptyMethodName,
}

/// JSON-RPC 2.0 error object as it appears on the wire
///
/// Carried inside the `error` field of a [`Response`](crate::Response), or as
/// the sole payload of a top-level failure (malformed envelope). Per spec the
/// object MUST contain `code` and `message` and MAY contain `data`.
///
/// # Examples
///
/// ```rust
/// use jrpc_core::RpcErrorData;
/// use serde_json::json;
///
/// let standard = RpcErrorData::method_not_found();
/// assert_eq!(standard.code, -32601);
///
/// let app = RpcErrorData::application(1200, "It was all in vain.")
///     .with_data(json!({"attempts": 3}));
/// assert_eq!(app.code, 1200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorData {
    /// Numeric error code. Codes in -32768..=-32000 are reserved by the spec.
    pub code: i64,
    /// Short human-readable description of the error.
    pub message: String,
    /// Optional additional error information, any JSON value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorData {
    /// Create an error object with an arbitrary code and message.
    ///
    /// Use the factory constructors for the standard codes; this constructor
    /// is the escape hatch for intentionally reusing a reserved code.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attach a `data` payload to the error.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Parse error (-32700): input is not well-formed JSON.
    pub fn parse_error() -> Self {
        Self::new(-32700, "Parse error")
    }

    /// Invalid request (-32600) with the default message.
    pub fn invalid_request() -> Self {
        Self::new(-32600, "Invalid request")
    }

    /// Invalid request (-32600) with a more specific message.
    pub fn invalid_request_msg(msg: impl Into<String>) -> Self {
        Self::new(-32600, msg)
    }

    /// Method not found (-32601).
    ///
    /// The message is fixed; which method was missing belongs in logs, not
    /// on the wire.
    pub fn method_not_found() -> Self {
        Self::new(-32601, "Method not found")
    }

    /// Invalid params (-32602) with the default message.
    pub fn invalid_params() -> Self {
        Self::new(-32602, "Invalid params")
    }

    /// Invalid params (-32602) with a more specific message.
    pub fn invalid_params_msg(msg: impl Into<String>) -> Self {
        Self::new(-32602, msg)
    }

    /// Internal error (-32603).
    ///
    /// The message is fixed so handler implementation detail cannot leak;
    /// diagnostics go to the log at the dispatch boundary.
    pub fn internal_error() -> Self {
        Self::new(-32603, "Internal error")
    }

    /// Application-defined error with a caller-chosen code.
    ///
    /// Code, message, and any attached data are reproduced verbatim in the
    /// response.
    ///
    /// # Panics
    ///
    /// Panics if `code` lies inside the reserved range -32768..=-32000.
    /// Application codes must not collide with the standard taxonomy; this
    /// is a setup-time contract, checked the same way registry
    /// misconfiguration is. A deliberate reuse of a standard code goes
    /// through [`RpcErrorData::new`] instead.
    pub fn application(code: i64, message: impl Into<String>) -> Self {
        assert!(
            !RESERVED_CODE_RANGE.contains(&code),
            "application error code {code} lies in the reserved range -32768..=-32000; \
             use RpcErrorData::new to reuse a standard code deliberately"
        );
        Self::new(code, message)
    }

    /// Whether this error's code lies in the reserved range.
    pub fn is_reserved_code(&self) -> bool {
        RESERVED_CODE_RANGE.contains(&self.code)
    }
}

impl std::fmt::Display for RpcErrorData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RpcErrorData {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_error_codes() {
        let errors = vec![
            (RpcErrorData::parse_error(), -32700, "Parse error"),
            (RpcErrorData::invalid_request(), -32600, "Invalid request"),
            (RpcErrorData::method_not_found(), -32601, "Method not found"),
            (RpcErrorData::invalid_params(), -32602, "Invalid params"),
            (RpcErrorData::internal_error(), -32603, "Internal error"),
        ];

        for (error, code, message) in errors {
            assert_eq!(error.code, code);
            assert_eq!(error.message, message);
            assert!(error.data.is_none());
        }
    }

    #[test]
    fn test_application_error_passthrough() {
        let error = RpcErrorData::application(1200, "It was all in vain.");
        assert_eq!(error.code, 1200);
        assert_eq!(error.message, "It was all in vain.");
        assert!(!error.is_reserved_code());
    }

    #[test]
    #[should_panic(expected = "reserved range")]
    fn test_application_rejects_reserved_code() {
        let _ = RpcErrorData::application(-32050, "looks standard but is not");
    }

    #[test]
    #[should_panic(expected = "reserved range")]
    fn test_application_rejects_reserved_range_edges() {
        let _ = RpcErrorData::application(-32000, "edge of the reserved range");
    }

    #[test]
    fn test_application_accepts_codes_outside_reserved_range() {
        assert_eq!(RpcErrorData::application(-31999, "just outside").code, -31999);
        assert_eq!(RpcErrorData::application(-32769, "just outside").code, -32769);
    }

    #[test]
    fn test_reserved_code_detection() {
        assert!(RpcErrorData::new(-32000, "edge").is_reserved_code());
        assert!(RpcErrorData::new(-32768, "edge").is_reserved_code());
        assert!(!RpcErrorData::new(-31999, "outside").is_reserved_code());
        assert!(!RpcErrorData::new(0, "outside").is_reserved_code());
    }

    #[test]
    fn test_with_data() {
        let error = RpcErrorData::invalid_params_msg("expected 2 positional arguments")
            .with_data(json!({"got": 3}));
        assert_eq!(error.code, -32602);
        assert_eq!(error.data, Some(json!({"got": 3})));
    }

    #[test]
    fn test_data_omitted_from_wire_when_absent() {
        let serialized = serde_json::to_string(&RpcErrorData::parse_error()).unwrap();
        assert!(!serialized.contains("data"));
    }

    #[test]
    fn test_error_round_trip() {
        let error = RpcErrorData::application(404, "no such donut").with_data(json!("glazed"));
        let serialized = serde_json::to_string(&error).unwrap();
        let deserialized: RpcErrorData = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, error);
    }

    #[test]
    fn test_display_formatting() {
        let display = RpcErrorData::method_not_found().to_string();
        assert!(display.contains("-32601"));
        assert!(display.contains("Method not found"));
    }

    #[test]
    fn test_library_error_messages() {
        let error = Error::DuplicateMethod("add".to_string());
        assert!(error.to_string().contains("add"));

        let error = Error::InvalidParams("missing \"b\"".to_string());
        assert!(error.to_string().contains("Invalid params"));
    }
}
