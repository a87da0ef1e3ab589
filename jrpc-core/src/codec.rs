//! Response assembly and encoding
//!
//! The counterpart of the parser: turns [`Response`]s and [`Output`]s back
//! into generic JSON values or text for the transport to ship out. A single
//! response becomes a top-level object, a batch becomes a top-level array in
//! input order; the case of "no output at all" (notifications only) is
//! represented upstream by `Option::None` and never reaches this module.

use crate::error::{Error, Result};
use crate::types::{Output, Response};
use serde::Serialize;
use serde_json::Value;

/// Encode any serializable message to a JSON string.
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a single response to JSON text.
pub fn encode_response(response: &Response) -> Result<String> {
    encode(response)
}

/// Encode an ordered batch of responses to a JSON array.
pub fn encode_batch_responses(responses: &[Response]) -> Result<String> {
    encode(&responses)
}

/// Encode an output (single or batch) to JSON text, preserving the
/// batch/non-batch shape of the input it answers.
pub fn encode_output(output: &Output) -> Result<String> {
    encode(output)
}

/// Assemble an output as a generic JSON value for transports that do their
/// own encoding.
pub fn output_to_value(output: &Output) -> Result<Value> {
    serde_json::to_value(output).map_err(|e| Error::Serialization(e.to_string()))
}
