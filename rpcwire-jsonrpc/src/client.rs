use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::config::ClientConfig;
use crate::descriptor::ServiceDescriptor;
use crate::dispatcher::Dispatcher;
use crate::ids::{IdGenerator, RandomIds};
use crate::interceptor::{InterceptorChain, RequestInterceptor};
use crate::service::{ServiceAdapter, ServiceHandle};
use crate::transport::{ReqwestTransport, Transport};
use crate::{ConfigError, Result};

/// Builder for a [`Client`].
///
/// The base URL is mandatory, so it's the first thing to set; everything else is optional.
pub struct ClientBuilder<Stage> {
    stage: Stage,
}

impl Default for ClientBuilder<Stage1> {
    fn default() -> Self {
        Self { stage: Stage1 }
    }
}

impl ClientBuilder<Stage1> {
    /// Set the root URL that every service's base path is resolved against.
    ///
    /// It must be an absolute `http` or `https` URL, and its path must end in `/`.
    pub fn base_url(self, url: &str) -> Result<ClientBuilder<Stage2>> {
        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: url.to_string(),
            source: e,
        })?;

        self.with_base_url(parsed)
    }

    /// Set the root URL from an already-parsed [`Url`].  See [`Self::base_url`].
    pub fn with_base_url(self, url: Url) -> Result<ClientBuilder<Stage2>> {
        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            return Err(ConfigError::UnsupportedBaseUrl { url: url.into() }.into());
        }
        if !url.path().ends_with('/') {
            return Err(ConfigError::BaseUrlMissingTrailingSlash { url: url.into() }.into());
        }

        Ok(ClientBuilder {
            stage: Stage2 {
                base_url: url,
                dispatcher: None,
                interceptors: InterceptorChain::new(),
                ids: None,
            },
        })
    }
}

impl ClientBuilder<Stage2> {
    /// Send requests with a custom transport instead of the default [`ReqwestTransport`]
    pub fn with_transport(mut self, transport: impl Transport) -> Self {
        self.stage.dispatcher = Some(Dispatcher::new(transport));
        self
    }

    /// Add an interceptor, which runs after all those added before it
    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor) -> Self {
        self.stage.interceptors.push(interceptor);
        self
    }

    /// Generate request IDs with something other than [`RandomIds`]
    pub fn with_id_generator(mut self, ids: impl IdGenerator) -> Self {
        self.stage.ids = Some(Box::new(ids));
        self
    }

    fn with_boxed_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.stage.ids = Some(ids);
        self
    }

    pub fn build(self) -> Client {
        let Stage2 {
            base_url,
            dispatcher,
            interceptors,
            ids,
        } = self.stage;

        Client {
            inner: Arc::new(ClientInner {
                base_url,
                dispatcher: dispatcher.unwrap_or_else(|| Dispatcher::new(ReqwestTransport::new())),
                interceptors,
                ids: ids.unwrap_or_else(|| Box::new(RandomIds)),
            }),
        }
    }
}

#[doc(hidden)]
pub struct Stage1;

#[doc(hidden)]
pub struct Stage2 {
    base_url: Url,
    dispatcher: Option<Dispatcher>,
    interceptors: InterceptorChain,
    ids: Option<Box<dyn IdGenerator>>,
}

/// Entry point for talking to JSON-RPC services over HTTP.
///
/// A client holds the base URL, the transport, the interceptors and the request ID generator.
/// Service declarations are bound to it to get a [`ServiceHandle`], or a generated adapter via
/// [`Client::create`].  Clones are cheap and share everything.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    base_url: Url,
    dispatcher: Dispatcher,
    interceptors: InterceptorChain,
    ids: Box<dyn IdGenerator>,
}

impl ClientInner {
    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub(crate) fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.ids.next_id()
    }
}

impl Client {
    pub fn builder() -> ClientBuilder<Stage1> {
        ClientBuilder::default()
    }

    /// Build a client using the default `reqwest` transport, configured from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::with_options(config.timeout, config.user_agent.as_deref())?;

        Ok(Self::builder()
            .base_url(&config.base_url)?
            .with_transport(transport)
            .with_boxed_id_generator(config.id_strategy.generator())
            .build())
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.inner.interceptors
    }

    /// Validate a service declaration and bind it to its endpoint.
    ///
    /// Fails if the declaration is not a contract, if it or any contract it extends has type
    /// parameters, if neither it nor any ancestor has a base path, or if the base path doesn't
    /// resolve to an `http` or `https` URL.  Individual methods are validated later, the first
    /// time each is invoked.
    pub fn bind(&self, descriptor: impl Into<Arc<ServiceDescriptor>>) -> Result<ServiceHandle> {
        Ok(ServiceHandle::bind(self.inner.clone(), descriptor.into())?)
    }

    /// Bind the contract of a generated adapter type and wrap the handle in it.
    pub fn create<A: ServiceAdapter>(&self) -> Result<A> {
        self.bind(A::descriptor()).map(A::from_handle)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("interceptors", &self.inner.interceptors)
            .finish_non_exhaustive()
    }
}
