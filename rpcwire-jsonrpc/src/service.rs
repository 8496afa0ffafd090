//! Binding a service declaration to an endpoint, and invoking its methods.
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use itertools::Itertools;
use serde::de::DeserializeOwned;
use url::Url;

use crate::call::{Call, PreparedRequest};
use crate::client::ClientInner;
use crate::descriptor::{DeclarationKind, ServiceDescriptor};
use crate::params::{self, Arguments};
use crate::plan::InvocationPlan;
use crate::types::Request;
use crate::{ConfigError, Result, codec};

type PlanCache = HashMap<String, Arc<InvocationPlan>>;

/// A service declaration bound to a client and a resolved endpoint URL.
///
/// Handles are cheap to clone.  Clones share the cache of resolved invocation plans, so each
/// method's declaration is validated at most once per bound service no matter how many clones
/// invoke it.
#[derive(Clone)]
pub struct ServiceHandle {
    client: Arc<ClientInner>,
    descriptor: Arc<ServiceDescriptor>,
    endpoint: Url,
    plans: Arc<RwLock<PlanCache>>,
}

impl ServiceHandle {
    /// Validate the service declaration and resolve its endpoint.
    pub(crate) fn bind(client: Arc<ClientInner>, descriptor: Arc<ServiceDescriptor>) -> Result<Self, ConfigError> {
        if descriptor.kind() != DeclarationKind::Contract {
            return Err(ConfigError::NotAContract {
                service: descriptor.name().to_string(),
            });
        }

        for contract in descriptor.ancestry() {
            if !contract.type_params().is_empty() {
                let is_ancestor = !std::ptr::eq(contract, descriptor.as_ref());
                return Err(ConfigError::TypeParameters {
                    contract: contract.name().to_string(),
                    service: is_ancestor.then(|| descriptor.name().to_string()),
                    params: contract.type_params().to_vec(),
                });
            }
        }

        let path = descriptor
            .effective_base_path()
            .ok_or_else(|| ConfigError::MissingBasePath {
                service: descriptor.name().to_string(),
            })?;

        let endpoint = client
            .base_url()
            .join(path)
            .map_err(|e| ConfigError::InvalidEndpoint {
                service: descriptor.name().to_string(),
                path: path.to_string(),
                source: Some(e),
            })?;
        if !matches!(endpoint.scheme(), "http" | "https") || !endpoint.has_host() {
            return Err(ConfigError::InvalidEndpoint {
                service: descriptor.name().to_string(),
                path: path.to_string(),
                source: None,
            });
        }

        tracing::debug!(
            service = descriptor.name(),
            ancestors = %descriptor.ancestry().skip(1).map(ServiceDescriptor::name).join(", "),
            %endpoint,
            "Bound service"
        );

        Ok(Self {
            client,
            descriptor,
            endpoint,
            plans: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    /// The URL every request of this service is sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get the invocation plan for a method, resolving it on first use.
    ///
    /// Plans that fail to resolve are not cached; every invocation of such a method fails the same
    /// way.
    pub fn plan(&self, method: &str) -> Result<Arc<InvocationPlan>, ConfigError> {
        if let Some(plan) = self
            .plans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
        {
            return Ok(plan.clone());
        }

        let declaration = self
            .descriptor
            .find_method(method)
            .ok_or_else(|| ConfigError::UnknownMethod {
                service: self.descriptor.name().to_string(),
                method: method.to_string(),
            })?;
        let plan = Arc::new(InvocationPlan::resolve(declaration)?);

        // Another thread may have resolved the same plan in the meantime; keep whichever got there
        // first so there's only ever one plan per method.
        let mut plans = self.plans.write().unwrap_or_else(PoisonError::into_inner);
        Ok(plans.entry(method.to_string()).or_insert(plan).clone())
    }

    /// Number of methods whose invocation plan has been resolved so far
    pub fn cached_plans(&self) -> usize {
        self.plans.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Prepare an invocation of `method` with the given arguments.
    ///
    /// Everything short of sending the request happens here: plan resolution, parameter binding,
    /// interceptors and serialization.  Any failure is reported immediately; on success the
    /// returned [`Call`] sends the request when it's awaited or subscribed to.
    pub fn invoke<T>(&self, method: &str, arguments: Arguments) -> Result<Call<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let plan = self.plan(method)?;
        let params = params::bind_params(method, plan.mode(), plan.param_names(), arguments.into_values()?)?;

        let mut request = Request::new(self.client.next_id(), plan.rpc_name(), params);
        self.client.interceptors().apply(&mut request, plan.method())?;
        let body = codec::encode_request(&request)?;

        tracing::debug!(
            method,
            rpc_name = %request.method,
            request_id = %request.id,
            result_type = plan.result_type(),
            "Prepared call"
        );

        Ok(Call::prepared(PreparedRequest {
            dispatcher: self.client.dispatcher().clone(),
            method: request.method,
            request_id: request.id,
            url: self.endpoint.clone(),
            body,
        }))
    }

    /// Like [`Self::invoke`], but reports a failure to prepare the request through the returned
    /// [`Call`] instead.  This is what generated adapters use.
    pub fn call<T>(&self, method: &str, arguments: Arguments) -> Call<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.invoke(method, arguments).unwrap_or_else(Call::rejected)
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("service", &self.descriptor.name())
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

/// A typed client for one service contract, wrapping a [`ServiceHandle`].
///
/// Implemented by the client types that `#[json_rpc_service]` generates, and used by
/// [`crate::Client::create`].
pub trait ServiceAdapter: Sized {
    /// The declaration of the contract this adapter implements
    fn descriptor() -> Arc<ServiceDescriptor>;

    fn from_handle(handle: ServiceHandle) -> Self;

    fn handle(&self) -> &ServiceHandle;
}

/// Marker stating that an adapter can serve the methods of contract `C`.
///
/// Every adapter binds its own contract, and the contracts its contract extends.  Generated code
/// implements each contract trait for every adapter that binds it.
pub trait Binds<C: ServiceAdapter>: ServiceAdapter {}
