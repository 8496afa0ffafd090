//! Encoding of request envelopes to bytes, and decoding of response bytes into typed results.
use serde::de::DeserializeOwned;

use crate::error_map::map_error_object;
use crate::types::{Request, ResponseEnvelope};
use crate::{JsonRpcError, Result};

/// Serialize a request envelope to the bytes of its JSON representation.
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    serde_json::to_vec(request).map_err(|e| JsonRpcError::SerRequest {
        source: e,
        type_name: std::any::type_name::<Request>(),
    })
}

/// Parse a request envelope from its JSON representation.
///
/// The client never receives requests, but this is the inverse of [`encode_request`] and is handy
/// for inspecting what was put on the wire.
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    serde_json::from_slice(bytes).map_err(|e| JsonRpcError::DeserResponse {
        method: String::new(),
        source: e,
        type_name: std::any::type_name::<Request>(),
        response: String::from_utf8_lossy(bytes).to_string(),
    })
}

/// Parse the response envelope, without interpreting it.
pub fn decode_envelope(method: &str, bytes: &[u8]) -> Result<ResponseEnvelope> {
    serde_json::from_slice(bytes).map_err(|e| JsonRpcError::DeserResponse {
        method: method.to_string(),
        source: e,
        type_name: std::any::type_name::<ResponseEnvelope>(),
        response: String::from_utf8_lossy(bytes).to_string(),
    })
}

/// Decode the response to a call to `method` into either the result of type `T` or an error.
///
/// An error object with a non-null code always wins, even if there is also a result.  A success
/// envelope whose result is absent or `null` is not a valid successful completion, and produces
/// [`JsonRpcError::EmptyResult`].
pub fn decode_response<T: DeserializeOwned>(method: &str, bytes: &[u8]) -> Result<T> {
    interpret_envelope(method, decode_envelope(method, bytes)?)
}

/// Interpret an already-parsed response envelope.  See [`decode_response`].
pub fn interpret_envelope<T: DeserializeOwned>(method: &str, envelope: ResponseEnvelope) -> Result<T> {
    let ResponseEnvelope { result, error, .. } = envelope;

    if let Some(error) = error
        && let Some(code) = error.code
    {
        return Err(map_error_object(method, code, error));
    }

    let Some(result) = result else {
        return Err(JsonRpcError::EmptyResult {
            method: method.to_string(),
        });
    };

    serde_json::from_value(result.clone()).map_err(|e| JsonRpcError::DeserResponse {
        method: method.to_string(),
        source: e,
        type_name: std::any::type_name::<T>(),
        response: result.to_string(),
    })
}
