use serde_json::Value as JsonValue;
use thiserror::Error;

pub type Result<T, E = JsonRpcError> = std::result::Result<T, E>;

/// Boxed error type used for errors raised by caller-supplied code, such as transports and
/// interceptors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum JsonRpcError {
    /// The service or one of its methods is declared incorrectly.
    ///
    /// These are detected eagerly, when a service is bound or when a method's invocation plan is
    /// resolved, and are never retried.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("Error serializing request {type_name} to JSON")]
    SerRequest {
        source: serde_json::Error,
        type_name: &'static str,
    },

    #[error("Error serializing argument #{index} ({type_name}) to JSON")]
    SerArgument {
        source: serde_json::Error,
        index: usize,
        type_name: &'static str,
    },

    /// One of the registered request interceptors rejected the request
    #[error(transparent)]
    Interceptor(BoxError),

    #[error("Transport error")]
    Transport { source: BoxError },

    #[error("HTTP request failed with status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Error deserializing response to '{method}' as {type_name}")]
    DeserResponse {
        method: String,
        source: serde_json::Error,
        type_name: &'static str,
        response: String,
    },

    /// The remote peer reported a reserved-range, system-level JSON-RPC error
    #[error("Method '{method}' failed: {error}")]
    Protocol { method: String, error: ProtocolError },

    /// The remote peer reported an application-level error with a positive code
    #[error("Method '{method}' failed with business error {code}: {message}")]
    Business {
        method: String,
        code: i64,
        message: String,
        data: Option<JsonValue>,
    },

    /// The response was a success envelope, but it had no usable result
    #[error("Server returned null result for '{method}'")]
    EmptyResult { method: String },
}

impl JsonRpcError {
    /// True if this is an application-level error reported by the remote peer.
    ///
    /// Business errors are part of the service's domain; they are distinct from protocol and system
    /// errors, which callers may want to treat differently when deciding whether to retry.
    pub fn is_business(&self) -> bool {
        matches!(self, JsonRpcError::Business { .. })
    }

    /// True if this is a reserved-range or otherwise non-positive JSON-RPC error reported by the
    /// remote peer.
    pub fn is_protocol(&self) -> bool {
        matches!(self, JsonRpcError::Protocol { .. })
    }

    /// The JSON-RPC error code, if this error was reported by the remote peer.
    pub fn code(&self) -> Option<i64> {
        match self {
            JsonRpcError::Protocol { error, .. } => Some(error.code()),
            JsonRpcError::Business { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn transport(source: impl Into<BoxError>) -> Self {
        JsonRpcError::Transport {
            source: source.into(),
        }
    }
}

/// Errors in the way a service or method is declared, or in the way the client is configured.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API declaration must be a contract, but '{service}' is a concrete type")]
    NotAContract { service: String },

    #[error("Type parameters are not supported on {contract}{}",
        .service.as_ref().map(|s| format!(" which is an interface of {s}")).unwrap_or_default()
    )]
    TypeParameters {
        contract: String,
        /// The service being bound, when the offending contract is one of its ancestors
        service: Option<String>,
        params: Vec<String>,
    },

    #[error("API declaration '{service}' must carry a base path")]
    MissingBasePath { service: String },

    #[error("Invalid base URL '{url}'")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Base URL must be an absolute http or https URL: {url}")]
    UnsupportedBaseUrl { url: String },

    #[error("Base URL must end in /: {url}")]
    BaseUrlMissingTrailingSlash { url: String },

    #[error("Invalid endpoint path '{path}' in {service}")]
    InvalidEndpoint {
        service: String,
        path: String,
        source: Option<url::ParseError>,
    },

    #[error("Only Call<T> is supported as return type, but #{method} returns {found}")]
    UnsupportedReturnType { method: String, found: String },

    #[error("Argument #{index} of #{method} must be tagged with a parameter name")]
    UntaggedParameter { index: usize, method: String },

    #[error("#{method} declares {expected} parameter(s) but was invoked with {actual}")]
    ArgumentCount {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("Service '{service}' does not declare a method '{method}'")]
    UnknownMethod { service: String, method: String },
}

/// Reserved-range and other non-positive JSON-RPC error kinds.
///
/// Positive codes are never represented here; those are [`JsonRpcError::Business`] errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        data: Option<JsonValue>,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
        data: Option<JsonValue>,
    },

    #[error("Method not found: {message}")]
    MethodNotFound {
        message: String,
        data: Option<JsonValue>,
    },

    #[error("Invalid params: {message}")]
    InvalidParams {
        message: String,
        data: Option<JsonValue>,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        data: Option<JsonValue>,
    },

    /// Implementation-defined server error, with a code in `-32099..=-32000`
    #[error("ServerError {code}: {message}")]
    Server {
        code: i64,
        message: String,
        data: Option<JsonValue>,
    },

    /// Any other non-positive code
    #[error("JsonRpcError {code}: {message}")]
    Other {
        code: i64,
        message: String,
        data: Option<JsonValue>,
    },
}

impl ProtocolError {
    pub fn code(&self) -> i64 {
        use crate::error_map::codes;

        match self {
            ProtocolError::Parse { .. } => codes::PARSE_ERROR,
            ProtocolError::InvalidRequest { .. } => codes::INVALID_REQUEST,
            ProtocolError::MethodNotFound { .. } => codes::METHOD_NOT_FOUND,
            ProtocolError::InvalidParams { .. } => codes::INVALID_PARAMS,
            ProtocolError::Internal { .. } => codes::INTERNAL_ERROR,
            ProtocolError::Server { code, .. } | ProtocolError::Other { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ProtocolError::Parse { message, .. }
            | ProtocolError::InvalidRequest { message, .. }
            | ProtocolError::MethodNotFound { message, .. }
            | ProtocolError::InvalidParams { message, .. }
            | ProtocolError::Internal { message, .. }
            | ProtocolError::Server { message, .. }
            | ProtocolError::Other { message, .. } => message,
        }
    }
}
