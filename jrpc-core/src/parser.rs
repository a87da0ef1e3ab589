//! Request parsing and envelope validation
//!
//! Turns raw JSON text or an already-decoded `serde_json::Value` into
//! validated [`Request`]s, or into inline error units when validation fails
//! before a method is even known.
//!
//! # Batch rules
//!
//! A top-level array is a batch. Two edge cases the protocol calls out
//! explicitly:
//!
//! - An **empty** array is not an empty batch; it is a single top-level
//!   Invalid Request error.
//! - A structurally invalid member inside a batch never aborts its
//!   siblings. The invalid member is carried forward as an inline error so
//!   the dispatcher can emit its response in the right slot.
//!
//! # Validation order
//!
//! Per member: object check, then id extraction (first, so later failures
//! can still echo it), then `jsonrpc`, `method`, `id` type, `params` type.

use crate::error::RpcErrorData;
use crate::types::{Id, Params, Request};
use serde_json::Value;

/// One parsed unit: a valid request, or an inline envelope error
///
/// Invalid units always produce an error response, even when the member
/// carried no id: a malformed envelope cannot be trusted to mark a
/// notification, so the protocol requires reporting it with a null id.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedUnit {
    /// A structurally valid request (call or notification)
    Request(Request),
    /// The member failed envelope validation
    Invalid(InvalidUnit),
}

/// An envelope validation failure for one member
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidUnit {
    /// Id extracted from the member, or null when unavailable
    pub id: Id,
    /// The error to report for this member
    pub error: RpcErrorData,
}

impl InvalidUnit {
    fn new(id: Id, error: RpcErrorData) -> Self {
        Self { id, error }
    }
}

/// The parsed form of one input: a single unit or an ordered batch
///
/// Top-level failures (malformed JSON, empty batch) fold into
/// `Single(ParsedUnit::Invalid(..))` with a null id, so the dispatcher
/// handles every input uniformly.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// A non-batch input
    Single(ParsedUnit),
    /// A batch; one slot per input member, in input order
    Batch(Vec<ParsedUnit>),
}

/// Parse raw JSON text into requests.
///
/// Malformed text yields a single top-level Parse error (-32700) with a
/// null id; the decoder's description is attached as error `data`.
///
/// # Examples
///
/// ```rust
/// use jrpc_core::parser::{parse_text, Incoming, ParsedUnit};
///
/// let incoming = parse_text(r#"{"jsonrpc":"2.0","method":"ping","id":1}"#);
/// assert!(matches!(incoming, Incoming::Single(ParsedUnit::Request(_))));
///
/// let incoming = parse_text("{not json");
/// match incoming {
///     Incoming::Single(ParsedUnit::Invalid(unit)) => assert_eq!(unit.error.code, -32700),
///     _ => unreachable!(),
/// }
/// ```
pub fn parse_text(text: &str) -> Incoming {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => parse_value(value),
        Err(e) => {
            tracing::debug!(error = %e, "input is not well-formed JSON");
            Incoming::Single(ParsedUnit::Invalid(InvalidUnit::new(
                Id::Null,
                RpcErrorData::parse_error().with_data(Value::String(e.to_string())),
            )))
        }
    }
}

/// Parse an already-decoded JSON value into requests.
///
/// A top-level array is treated as a batch, except the empty array, which is
/// a single top-level Invalid Request per the protocol.
pub fn parse_value(value: Value) -> Incoming {
    match value {
        Value::Array(members) => {
            if members.is_empty() {
                return Incoming::Single(ParsedUnit::Invalid(InvalidUnit::new(
                    Id::Null,
                    RpcErrorData::invalid_request_msg("Batch must not be empty"),
                )));
            }
            Incoming::Batch(members.into_iter().map(parse_member).collect())
        }
        other => Incoming::Single(parse_member(other)),
    }
}

/// Validate one member (or the single top-level value) as a Request.
fn parse_member(value: Value) -> ParsedUnit {
    let map = match value {
        Value::Object(map) => map,
        _ => {
            return ParsedUnit::Invalid(InvalidUnit::new(
                Id::Null,
                RpcErrorData::invalid_request_msg("Request must be an object"),
            ));
        }
    };

    // Extract the id before anything else so later validation failures can
    // still be reported against it.
    let id = match map.get("id") {
        None => None,
        Some(Value::Null) => Some(Id::Null),
        Some(Value::String(s)) => Some(Id::String(s.clone())),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(n) => Some(Id::Number(n)),
            None => {
                return ParsedUnit::Invalid(InvalidUnit::new(
                    Id::Null,
                    RpcErrorData::invalid_request_msg(
                        "\"id\" of request must be an integer without fractional part",
                    ),
                ));
            }
        },
        Some(_) => {
            return ParsedUnit::Invalid(InvalidUnit::new(
                Id::Null,
                RpcErrorData::invalid_request_msg(
                    "\"id\" of request must be a string, a number, or null",
                ),
            ));
        }
    };
    let error_id = id.clone().unwrap_or(Id::Null);
    let invalid = |msg: &str| {
        ParsedUnit::Invalid(InvalidUnit::new(
            error_id.clone(),
            RpcErrorData::invalid_request_msg(msg),
        ))
    };

    match map.get("jsonrpc") {
        None => return invalid("Missing \"jsonrpc\" member in request"),
        Some(Value::String(version)) if version == "2.0" => {}
        Some(_) => return invalid("Only JSON-RPC version \"2.0\" is supported"),
    }

    let method = match map.get("method") {
        None => return invalid("Missing \"method\" member in request"),
        Some(Value::String(method)) if method.is_empty() => {
            return invalid("\"method\" of request must not be empty");
        }
        Some(Value::String(method)) => method.clone(),
        Some(_) => return invalid("\"method\" of request must be a string"),
    };

    let params = match map.get("params") {
        None => None,
        Some(Value::Array(args)) => Some(Params::Positional(args.clone())),
        Some(Value::Object(fields)) => Some(Params::Named(fields.clone())),
        Some(_) => {
            return invalid("\"params\" of request must be either an array or an object");
        }
    };

    ParsedUnit::Request(Request { method, params, id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn single_request(incoming: Incoming) -> Request {
        match incoming {
            Incoming::Single(ParsedUnit::Request(request)) => request,
            other => panic!("expected a single request, got {:?}", other),
        }
    }

    fn single_invalid(incoming: Incoming) -> InvalidUnit {
        match incoming {
            Incoming::Single(ParsedUnit::Invalid(unit)) => unit,
            other => panic!("expected a single invalid unit, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_call_with_named_params() {
        let request = single_request(parse_text(
            r#"{"jsonrpc":"2.0","id":321,"method":"add","params":{"a":5,"b":13}}"#,
        ));
        assert_eq!(request.method, "add");
        assert_eq!(request.id, Some(Id::Number(321)));
        assert!(matches!(request.params, Some(Params::Named(_))));
    }

    #[test]
    fn test_parse_call_with_positional_params() {
        let request = single_request(parse_value(
            json!({"jsonrpc": "2.0", "id": "r-1", "method": "subtract", "params": [42, 23]}),
        ));
        assert_eq!(request.id, Some(Id::String("r-1".to_string())));
        assert_eq!(
            request.params,
            Some(Params::Positional(vec![json!(42), json!(23)]))
        );
    }

    #[test]
    fn test_parse_notification() {
        let request =
            single_request(parse_text(r#"{"jsonrpc":"2.0","method":"heartbeat"}"#));
        assert!(request.is_notification());
    }

    #[test]
    fn test_null_id_is_not_a_notification() {
        let request = single_request(parse_text(
            r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#,
        ));
        assert!(!request.is_notification());
        assert_eq!(request.id, Some(Id::Null));
    }

    #[test]
    fn test_malformed_json_is_parse_error_with_null_id() {
        let unit = single_invalid(parse_text("{\"jsonrpc\": "));
        assert_eq!(unit.error.code, -32700);
        assert_eq!(unit.id, Id::Null);
        assert!(unit.error.data.is_some());
    }

    #[test]
    fn test_empty_batch_is_a_single_invalid_request() {
        let unit = single_invalid(parse_text("[]"));
        assert_eq!(unit.error.code, -32600);
        assert_eq!(unit.id, Id::Null);
    }

    #[test]
    fn test_non_object_member_is_invalid() {
        let unit = single_invalid(parse_value(json!("just a string")));
        assert_eq!(unit.error.code, -32600);
    }

    #[test]
    fn test_missing_jsonrpc_member() {
        let unit = single_invalid(parse_value(json!({"id": 9, "method": "ping"})));
        assert_eq!(unit.error.code, -32600);
        assert!(unit.error.message.contains("jsonrpc"));
        // The id is still echoed even though the envelope is invalid.
        assert_eq!(unit.id, Id::Number(9));
    }

    #[test]
    fn test_wrong_version() {
        let unit = single_invalid(parse_value(
            json!({"jsonrpc": "1.0", "id": 1, "method": "ping"}),
        ));
        assert!(unit.error.message.contains("2.0"));
    }

    #[test]
    fn test_missing_method() {
        let unit = single_invalid(parse_value(json!({"jsonrpc": "2.0", "id": 1})));
        assert!(unit.error.message.contains("method"));
    }

    #[test]
    fn test_non_string_method() {
        let unit = single_invalid(parse_value(
            json!({"jsonrpc": "2.0", "id": 1, "method": 7}),
        ));
        assert!(unit.error.message.contains("string"));
    }

    #[test]
    fn test_empty_method() {
        let unit = single_invalid(parse_value(
            json!({"jsonrpc": "2.0", "id": 1, "method": ""}),
        ));
        assert_eq!(unit.error.code, -32600);
    }

    #[test]
    fn test_bad_id_types() {
        let unit = single_invalid(parse_value(
            json!({"jsonrpc": "2.0", "id": {"nested": true}, "method": "ping"}),
        ));
        assert_eq!(unit.error.code, -32600);
        assert_eq!(unit.id, Id::Null);

        let unit = single_invalid(parse_value(
            json!({"jsonrpc": "2.0", "id": 1.5, "method": "ping"}),
        ));
        assert!(unit.error.message.contains("fractional"));
    }

    #[test]
    fn test_bad_params_type() {
        let unit = single_invalid(parse_value(
            json!({"jsonrpc": "2.0", "id": 1, "method": "ping", "params": "nope"}),
        ));
        assert!(unit.error.message.contains("params"));
        assert_eq!(unit.id, Id::Number(1));
    }

    #[test]
    fn test_batch_members_validated_independently() {
        let incoming = parse_value(json!([
            {"jsonrpc": "2.0", "id": 1, "method": "ok"},
            42,
            {"jsonrpc": "2.0", "method": "notify"},
            {"id": 4, "method": "missing_version"}
        ]));

        let units = match incoming {
            Incoming::Batch(units) => units,
            other => panic!("expected a batch, got {:?}", other),
        };
        assert_eq!(units.len(), 4);
        assert!(matches!(&units[0], ParsedUnit::Request(r) if r.id == Some(Id::Number(1))));
        assert!(matches!(&units[1], ParsedUnit::Invalid(u) if u.id == Id::Null));
        assert!(matches!(&units[2], ParsedUnit::Request(r) if r.is_notification()));
        assert!(matches!(&units[3], ParsedUnit::Invalid(u) if u.id == Id::Number(4)));
    }
}
