//! Rust struct definitions that ser/de to/from JSON-RPC messages.
//!
//! Only the subset of the protocol that a client issuing one request per HTTP exchange needs is
//! modeled here: the request envelope that goes out, and the response envelope that comes back.
//! The response envelope is deliberately lenient, because plenty of servers in the wild omit the
//! `jsonrpc` member or send both `result` and `error`.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export the bits of the JSON-RPC protocol that `jsonrpsee` already models exactly the way we
/// would ourselves.
pub use jsonrpsee_types::params::TwoPointZero;
pub use serde_json::Value as JsonValue;

/// Request Id
#[derive(Debug, PartialEq, Clone, Hash, Eq, Deserialize, Serialize, PartialOrd, Ord)]
#[serde(deny_unknown_fields)]
#[serde(untagged)]
pub enum Id {
    /// Null
    Null,
    /// Numeric id
    Number(u64),
    /// String id
    Str(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Null => f.write_str("null"),
            Id::Number(n) => write!(f, "{n}"),
            Id::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Id::Number(value)
    }
}

/// The params of a request, either [by-position or
/// by-name](https://www.jsonrpc.org/specification#parameter_structures).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    /// Ordered sequence of argument values
    Positional(Vec<JsonValue>),
    /// Argument values keyed by parameter name
    Named(serde_json::Map<String, JsonValue>),
}

impl Params {
    pub fn len(&self) -> usize {
        match self {
            Params::Positional(values) => values.len(),
            Params::Named(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the named params, if these are named params.
    pub fn as_named_mut(&mut self) -> Option<&mut serde_json::Map<String, JsonValue>> {
        match self {
            Params::Named(map) => Some(map),
            Params::Positional(_) => None,
        }
    }

    /// Get the positional params, if these are positional params.
    pub fn as_positional_mut(&mut self) -> Option<&mut Vec<JsonValue>> {
        match self {
            Params::Positional(values) => Some(values),
            Params::Named(_) => None,
        }
    }
}

/// Serializable [JSON-RPC request object](https://www.jsonrpc.org/specification#request-object).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// JSON-RPC version.
    pub jsonrpc: TwoPointZero,
    /// Request ID
    pub id: Id,
    /// Name of the method to be invoked.
    pub method: String,
    /// Parameter values of the request.
    pub params: Params,
}

impl Request {
    /// Create a serializable JSON-RPC method call.
    pub fn new(id: impl Into<Id>, method: impl Into<String>, params: Params) -> Self {
        Self {
            jsonrpc: TwoPointZero,
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response object as received from the remote peer.
///
/// Per the protocol exactly one of `result` and `error` is present, but this is not enforced when
/// decoding.  A missing or `null` result decodes to `None`, and an `error` whose `code` is `null` is
/// treated as though there were no error at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// JSON-RPC version.  Tolerated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<TwoPointZero>,
    /// Request ID
    #[serde(default)]
    pub id: Option<Id>,
    /// Result payload, in raw JSON form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    /// Error details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl ResponseEnvelope {
    /// Create a successful response
    pub fn success(id: impl Into<Id>, result: JsonValue) -> Self {
        Self {
            jsonrpc: Some(TwoPointZero),
            id: Some(id.into()),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: impl Into<Id>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: Some(TwoPointZero),
            id: Some(id.into()),
            result: None,
            error: Some(ErrorObject {
                code: Some(code),
                message: Some(message.into()),
                data: None,
            }),
        }
    }

    /// The error code, if the response carries an error object with a non-null code.
    pub fn error_code(&self) -> Option<i64> {
        self.error.as_ref().and_then(|error| error.code)
    }
}

/// [JSON-RPC error object](https://www.jsonrpc.org/specification#error_object).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Code
    #[serde(default)]
    pub code: Option<i64>,
    /// Message
    #[serde(default)]
    pub message: Option<String>,
    /// Optional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::{Value, json};

    #[test]
    fn test_request_serialization() {
        // Known-good request in the format defined by JSON-RPC 2.0
        let known_good_json = r#"{"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":1}"#;
        let known_good_value: Value = serde_json::from_str(known_good_json).unwrap();

        let our_request = Request::new(1, "subtract", Params::Positional(vec![json!(42), json!(23)]));
        let our_value = serde_json::to_value(&our_request).unwrap();
        assert_eq!(known_good_value, our_value);

        let deserialized: Request = serde_json::from_str(known_good_json).unwrap();
        assert_eq!(deserialized, our_request);
    }

    #[test]
    fn test_named_request_serialization() {
        let known_good_json =
            r#"{"jsonrpc":"2.0","method":"subtract","params":{"subtrahend":23,"minuend":42},"id":3}"#;
        let known_good_value: Value = serde_json::from_str(known_good_json).unwrap();

        let mut params = serde_json::Map::new();
        params.insert("subtrahend".to_string(), json!(23));
        params.insert("minuend".to_string(), json!(42));
        let our_request = Request::new(3, "subtract", Params::Named(params));

        assert_eq!(known_good_value, serde_json::to_value(&our_request).unwrap());

        let deserialized: Request = serde_json::from_str(known_good_json).unwrap();
        assert_matches!(deserialized.params, Params::Named(map) if map.len() == 2);
    }

    #[test]
    fn test_request_rejects_wrong_version() {
        let json = r#"{"jsonrpc":"1.0","method":"m","params":[],"id":1}"#;
        assert!(serde_json::from_str::<Request>(json).is_err());
    }

    #[test]
    fn test_success_response_deserialization() {
        let response: ResponseEnvelope =
            serde_json::from_str(r#"{"jsonrpc":"2.0","result":{"status":"success"},"id":42}"#).unwrap();
        assert_eq!(response.id, Some(Id::Number(42)));
        assert_eq!(response.result, Some(json!({"status": "success"})));
        assert!(response.error.is_none());
        assert_eq!(response.error_code(), None);
    }

    #[test]
    fn test_lenient_response_deserialization() {
        // No `jsonrpc` member at all
        let response: ResponseEnvelope = serde_json::from_str(r#"{"id": 1, "result": 3}"#).unwrap();
        assert_eq!(response.result, Some(json!(3)));

        // Neither result nor error
        let response: ResponseEnvelope = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert!(response.result.is_none());
        assert!(response.error.is_none());

        // Explicit null result
        let response: ResponseEnvelope = serde_json::from_str(r#"{"id": 1, "result": null}"#).unwrap();
        assert!(response.result.is_none());

        // String id
        let response: ResponseEnvelope = serde_json::from_str(r#"{"id": "abc", "result": 1}"#).unwrap();
        assert_eq!(response.id, Some(Id::Str("abc".to_string())));

        // Error object with a null code doesn't count as an error
        let response: ResponseEnvelope =
            serde_json::from_str(r#"{"id": 1, "result": 5, "error": {"code": null}}"#).unwrap();
        assert!(response.error.is_some());
        assert_eq!(response.error_code(), None);
    }

    #[test]
    fn test_error_response_deserialization() {
        let known_good_json = concat!(
            r#"{"jsonrpc":"2.0","error":{"code":-32600,"message":"Invalid request","#,
            r#""data":{"details":"error details"}},"id":"error-id"}"#
        );

        let response: ResponseEnvelope = serde_json::from_str(known_good_json).unwrap();
        assert_eq!(response.error_code(), Some(-32600));
        assert_matches!(
            response.error,
            Some(ErrorObject { message: Some(message), data: Some(_), .. }) if message == "Invalid request"
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let ours = serde_json::to_value(ResponseEnvelope::error(1, -32601, "Method not found")).unwrap();
        let spec: Value =
            serde_json::from_str(r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":1}"#)
                .unwrap();
        assert_eq!(ours, spec);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(Id::Number(42).to_string(), "42");
        assert_eq!(Id::Str("abc".into()).to_string(), "\"abc\"");
        assert_eq!(Id::Null.to_string(), "null");
    }
}
