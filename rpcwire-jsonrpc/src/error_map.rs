//! Mapping of JSON-RPC error objects received from the remote peer into [`JsonRpcError`] values.
//!
//! The mapping follows the reserved ranges of the [JSON-RPC 2.0
//! spec](https://www.jsonrpc.org/specification#error_object).  Everything with a strictly positive
//! code is a business error defined by the service itself; everything else is a protocol or system
//! error.  Callers branch on that split to decide whether a failure is worth retrying, so it must
//! hold no matter how the rest of the table changes.
use crate::types::ErrorObject;
use crate::{JsonRpcError, ProtocolError};

pub mod codes {
    use jsonrpsee_types::error::{
        INTERNAL_ERROR_CODE, INVALID_PARAMS_CODE, INVALID_REQUEST_CODE, METHOD_NOT_FOUND_CODE,
        PARSE_ERROR_CODE,
    };

    pub const PARSE_ERROR: i64 = PARSE_ERROR_CODE as i64;
    pub const INVALID_REQUEST: i64 = INVALID_REQUEST_CODE as i64;
    pub const METHOD_NOT_FOUND: i64 = METHOD_NOT_FOUND_CODE as i64;
    pub const INVALID_PARAMS: i64 = INVALID_PARAMS_CODE as i64;
    pub const INTERNAL_ERROR: i64 = INTERNAL_ERROR_CODE as i64;

    /// Lower bound (inclusive) of the implementation-defined server error range
    pub const SERVER_ERROR_MIN: i64 = -32099;
    /// Upper bound (inclusive) of the implementation-defined server error range
    pub const SERVER_ERROR_MAX: i64 = -32000;
}

/// Convert an error object reported by the remote peer for a call to `method` into the matching
/// error kind.
pub fn map_error_object(method: impl Into<String>, code: i64, error: ErrorObject) -> JsonRpcError {
    let method = method.into();
    let ErrorObject { message, data, .. } = error;
    let message = message.unwrap_or_default();

    if code > 0 {
        return JsonRpcError::Business {
            method,
            code,
            message,
            data,
        };
    }

    let error = match code {
        codes::PARSE_ERROR => ProtocolError::Parse { message, data },
        codes::INVALID_REQUEST => ProtocolError::InvalidRequest { message, data },
        codes::METHOD_NOT_FOUND => ProtocolError::MethodNotFound { message, data },
        codes::INVALID_PARAMS => ProtocolError::InvalidParams { message, data },
        codes::INTERNAL_ERROR => ProtocolError::Internal { message, data },
        codes::SERVER_ERROR_MIN..=codes::SERVER_ERROR_MAX => ProtocolError::Server { code, message, data },
        _ => ProtocolError::Other { code, message, data },
    };

    JsonRpcError::Protocol { method, error }
}
