//! The single-value completion handle returned by every invocation.
//!
//! A [`Call`] is cold: everything that can be checked without I/O (plan resolution, parameter
//! binding, interceptors, serialization) has already happened when the call is created, but the
//! request isn't sent until the call is awaited or subscribed to.
//!
//! There are two ways to consume a call:
//!
//! - `.await` it, which yields `Result<T>`.  Dropping the future before it completes cancels the
//!   request; whatever the transport was doing is dropped along with it.
//! - [`Call::subscribe`], which starts the request on the tokio runtime right away and returns a
//!   [`Subscription`] that can be cancelled explicitly with [`Subscription::cancel`] and awaited
//!   for the outcome.
use std::fmt;
use std::future::{Future, IntoFuture};
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::FutureExt;
use futures::future::BoxFuture;
use pin_project::pin_project;
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tokio_util::sync::{CancellationToken, DropGuard};
use url::Url;

use crate::dispatcher::Dispatcher;
use crate::types::Id;
use crate::{JsonRpcError, Result};

/// Pending invocation of a remote method, which completes with a value of type `T` or an error.
#[must_use = "a Call does nothing until it is awaited or subscribed to"]
pub struct Call<T> {
    state: CallState,
    _type: PhantomData<fn() -> T>,
}

enum CallState {
    Ready(PreparedRequest),
    /// The invocation failed before anything could be sent
    Rejected(JsonRpcError),
}

pub(crate) struct PreparedRequest {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) method: String,
    pub(crate) request_id: Id,
    pub(crate) url: Url,
    pub(crate) body: Vec<u8>,
}

impl<T> Call<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub(crate) fn prepared(request: PreparedRequest) -> Self {
        Self {
            state: CallState::Ready(request),
            _type: PhantomData,
        }
    }

    /// A call that fails with `error` as soon as it's awaited, without sending anything.
    pub fn rejected(error: impl Into<JsonRpcError>) -> Self {
        Self {
            state: CallState::Rejected(error.into()),
            _type: PhantomData,
        }
    }

    /// The error this call will fail with, if it was rejected before anything was sent.
    pub fn rejection(&self) -> Option<&JsonRpcError> {
        match &self.state {
            CallState::Rejected(e) => Some(e),
            CallState::Ready(_) => None,
        }
    }

    /// ID of the request this call will send, if it wasn't rejected.
    pub fn request_id(&self) -> Option<&Id> {
        match &self.state {
            CallState::Ready(request) => Some(&request.request_id),
            CallState::Rejected(_) => None,
        }
    }

    /// The serialized request body this call will send, if it wasn't rejected.
    pub fn request_body(&self) -> Option<&[u8]> {
        match &self.state {
            CallState::Ready(request) => Some(&request.body),
            CallState::Rejected(_) => None,
        }
    }

    /// Start the request in a new tokio task, returning a handle that can cancel it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe(self) -> Subscription<T> {
        let cancellation_token = CancellationToken::new();
        let (tx, rx) = oneshot::channel();

        let token = cancellation_token.clone();
        let future = self.into_future();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("Call cancelled before completion");
                }
                result = future => {
                    if !token.is_cancelled() && tx.send(result).is_err() {
                        tracing::trace!("Subscription dropped before the call completed");
                    }
                }
            }
        });

        Subscription {
            receiver: rx,
            cancellation_token: cancellation_token.clone(),
            _guard: cancellation_token.drop_guard(),
        }
    }
}

impl<T> IntoFuture for Call<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = Result<T>;
    type IntoFuture = CallFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        let inner = match self.state {
            CallState::Rejected(e) => futures::future::ready(Err(e)).boxed(),
            CallState::Ready(PreparedRequest {
                dispatcher,
                method,
                request_id,
                url,
                body,
            }) => async move { dispatcher.dispatch(&method, request_id, url, body).await }.boxed(),
        };

        CallFuture { inner }
    }
}

impl<T> fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Call");
        match &self.state {
            CallState::Ready(request) => s
                .field("method", &request.method)
                .field("request_id", &request.request_id)
                .field("url", &request.url.as_str()),
            CallState::Rejected(e) => s.field("rejected", e),
        };
        s.finish()
    }
}

/// Future returned by awaiting a [`Call`].
///
/// Dropping it before it completes cancels the request.
#[must_use = "futures do nothing unless polled"]
pub struct CallFuture<T> {
    inner: BoxFuture<'static, Result<T>>,
}

impl<T> Future for CallFuture<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

/// A call running in the background, which can be cancelled.
///
/// Awaiting a subscription yields `Some` with the outcome of the call, or `None` if the call was
/// cancelled first.  Once [`Subscription::cancel`] has been called, no outcome is ever delivered,
/// even if the response was already on its way.  Dropping the subscription cancels the call too.
#[pin_project]
#[must_use = "dropping a Subscription cancels the call"]
pub struct Subscription<T> {
    #[pin]
    receiver: oneshot::Receiver<Result<T>>,
    cancellation_token: CancellationToken,
    _guard: DropGuard,
}

impl<T> Subscription<T> {
    /// Request cancellation.  The in-flight request, if any, is dropped.
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Token which is cancelled when this subscription is, for tying other work to its lifetime
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }
}

impl<T> Future for Subscription<T> {
    type Output = Option<Result<T>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        if this.cancellation_token.is_cancelled() {
            return Poll::Ready(None);
        }

        match ready!(this.receiver.poll(cx)) {
            Ok(result) if !this.cancellation_token.is_cancelled() => Poll::Ready(Some(result)),
            // Either cancelled while the result was in flight, or the task ended without sending
            // anything, which only happens on cancellation
            _ => Poll::Ready(None),
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.cancellation_token.is_cancelled())
            .finish_non_exhaustive()
    }
}
