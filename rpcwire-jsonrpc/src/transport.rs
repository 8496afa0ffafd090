//! In this crate, the concept of a "transport" abstracts away the details of how a serialized
//! JSON-RPC request is delivered to the remote service over HTTP, and how the response comes back.
//!
//! The transport's job is deliberately tiny: POST some bytes to a URL, and return the status and
//! body of the response.  Connection pooling, TLS, proxies, retries at the socket level and
//! timeouts are all the transport's business; the JSON-RPC layer knows nothing about them.  A
//! [`reqwest`]-based implementation is provided in [`ReqwestTransport`].
//!
//! Cancellation is expressed the usual Rust way: if the future returned by
//! [`Transport::execute`] is dropped before it completes, the operation is abandoned.
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::{FutureExt, TryFutureExt};
use url::Url;

use crate::{JsonRpcError, Result};

/// Content type of every request body
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// An HTTP POST request carrying a serialized JSON-RPC request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn post_json(url: Url, body: Vec<u8>) -> Self {
        Self {
            url,
            content_type: JSON_CONTENT_TYPE,
            body,
        }
    }
}

/// The parts of an HTTP response the JSON-RPC layer cares about.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase or similar human-readable description of the status
    pub status_message: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with a `200 OK` status
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            status_message: "OK".to_string(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A transport sends HTTP requests on behalf of the JSON-RPC client.
///
/// Implementations must be cheap to share; the client holds one behind an `Arc` and uses it from
/// many concurrent calls.
pub trait Transport: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send the request and wait for the complete response.
    ///
    /// Any HTTP status is a successful result at this level, as long as a response was received.
    /// If the returned future is dropped before it completes, the request should be abandoned.
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, Self::Error>> + Send + '_;
}

/// Internal dyn-compatible wrapper trait around [`Transport`] to erase the types and allow dynamic
/// dispatch
pub(crate) trait BoxedTransport: Send + Sync + 'static {
    fn boxed_execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>>;
}

impl<T> BoxedTransport for T
where
    T: Transport,
{
    fn boxed_execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>> {
        <Self as Transport>::execute(self, request)
            .map_err(JsonRpcError::transport)
            .boxed()
    }
}

/// [`Transport`] implementation on top of a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default `reqwest` client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use a caller-configured `reqwest` client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Create a transport with an optional overall request timeout and user agent
    pub fn with_options(timeout: Option<Duration>, user_agent: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(Self {
            client: builder.build().map_err(JsonRpcError::transport)?,
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    type Error = reqwest::Error;

    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, Self::Error>> + Send + '_ {
        let HttpRequest {
            url,
            content_type,
            body,
        } = request;

        self.client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .and_then(|response| {
                let status = response.status();
                let status_message = status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.to_string());

                response.bytes().map_ok(move |body| HttpResponse {
                    status: status.as_u16(),
                    status_message,
                    body: body.to_vec(),
                })
            })
    }
}
