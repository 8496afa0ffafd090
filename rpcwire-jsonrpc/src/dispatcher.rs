//! Sending serialized requests through the transport and turning HTTP responses into results.
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::codec;
use crate::transport::{BoxedTransport, HttpRequest, HttpResponse, Transport};
use crate::types::Id;
use crate::{JsonRpcError, Result};

/// Cheaply-clonable handle to the transport, shared by the client and every bound service.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    transport: Arc<dyn BoxedTransport>,
}

impl Dispatcher {
    pub(crate) fn new(transport: impl Transport) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// POST the request body to `url` and wait for the response.
    ///
    /// This is the only point in the life of a call that performs I/O.  Dropping the returned
    /// future drops the in-flight transport operation with it.
    #[instrument(skip_all, fields(url = %url, len = body.len()))]
    pub(crate) async fn send(&self, url: Url, body: Vec<u8>) -> Result<HttpResponse> {
        let response = self
            .transport
            .boxed_execute(HttpRequest::post_json(url, body))
            .await?;

        tracing::trace!(
            status = response.status,
            body = %String::from_utf8_lossy(&response.body),
            "Received response"
        );

        Ok(response)
    }

    /// Send a request for `method` and decode the response as `T`.
    #[instrument(skip_all, fields(method = %method, request_id = %request_id))]
    pub(crate) async fn dispatch<T: DeserializeOwned>(
        &self,
        method: &str,
        request_id: Id,
        url: Url,
        body: Vec<u8>,
    ) -> Result<T> {
        let response = self.send(url, body).await?;

        if !response.is_success() {
            return Err(status_error(method, response));
        }

        let envelope = codec::decode_envelope(method, &response.body)?;
        if let Some(response_id) = &envelope.id
            && *response_id != request_id
        {
            tracing::debug!(%response_id, "Response ID does not match the request ID");
        }

        codec::interpret_envelope(method, envelope)
    }
}

/// Build the error for a response with a non-success HTTP status.
///
/// Some servers report JSON-RPC errors with a 4xx or 5xx status; if the body carries a decodable
/// error object, that's the more useful error to report.  Otherwise report the HTTP status.
fn status_error(method: &str, response: HttpResponse) -> JsonRpcError {
    if let Ok(envelope) = codec::decode_envelope(method, &response.body)
        && envelope.error_code().is_some()
        && let Err(e) = codec::interpret_envelope::<serde_json::Value>(method, envelope)
    {
        return e;
    }

    tracing::warn!(
        method,
        status = response.status,
        status_message = %response.status_message,
        "HTTP request failed"
    );

    JsonRpcError::HttpStatus {
        status: response.status,
        message: response.status_message,
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
