//! Hooks that can inspect and modify each outgoing request before it's serialized.
use std::fmt;
use std::sync::Arc;

use crate::descriptor::MethodDescriptor;
use crate::error::BoxError;
use crate::types::Request;
use crate::{JsonRpcError, Result};

/// Observer of outgoing requests.
///
/// Interceptors are called in the order they were registered with the client, after the request
/// has been built and before it's serialized.  Returning an error aborts the call; the remaining
/// interceptors are not run and the error is reported to the caller as is.
///
/// Any `Fn(&mut Request, &MethodDescriptor) -> Result<(), BoxError>` closure is an interceptor.
pub trait RequestInterceptor: Send + Sync + 'static {
    fn intercept(&self, request: &mut Request, method: &MethodDescriptor) -> Result<(), BoxError>;
}

impl<F> RequestInterceptor for F
where
    F: Fn(&mut Request, &MethodDescriptor) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn intercept(&self, request: &mut Request, method: &MethodDescriptor) -> Result<(), BoxError> {
        self(request, method)
    }
}

/// Ordered list of interceptors, shared by a client and every service bound from it.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interceptor: impl RequestInterceptor) {
        self.interceptors.push(Arc::new(interceptor));
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run every interceptor in registration order, stopping at the first one that fails.
    pub fn apply(&self, request: &mut Request, method: &MethodDescriptor) -> Result<()> {
        for (index, interceptor) in self.interceptors.iter().enumerate() {
            interceptor.intercept(request, method).map_err(|e| {
                tracing::debug!(index, method = method.name(), error = %e, "Interceptor rejected request");
                JsonRpcError::Interceptor(e)
            })?;
        }

        Ok(())
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Params;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::sync::Mutex;

    fn request() -> Request {
        Request::new(1, "plus", Params::Named(serde_json::Map::new()))
    }

    #[test]
    fn interceptors_run_in_order_and_can_mutate() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut chain = InterceptorChain::new();

        let o = order.clone();
        chain.push(move |request: &mut Request, _: &MethodDescriptor| -> Result<(), BoxError> {
            o.lock().unwrap().push("first");
            if let Some(params) = request.params.as_named_mut() {
                params.insert("token".into(), json!("secret"));
            }
            Ok(())
        });
        let o = order.clone();
        chain.push(move |request: &mut Request, _: &MethodDescriptor| -> Result<(), BoxError> {
            o.lock().unwrap().push("second");
            assert!(request.params.as_named_mut().unwrap().contains_key("token"));
            Ok(())
        });

        let mut request = request();
        chain.apply(&mut request, &MethodDescriptor::new("plus")).unwrap();

        assert_eq!(*order.lock().unwrap(), ["first", "second"]);
        assert_eq!(serde_json::to_value(&request.params).unwrap(), json!({"token": "secret"}));
    }

    #[test]
    fn failing_interceptor_stops_the_chain() {
        let later_ran = Arc::new(Mutex::new(false));
        let mut chain = InterceptorChain::new();

        chain.push(|_: &mut Request, _: &MethodDescriptor| -> Result<(), BoxError> { Err("not authorized".into()) });
        let flag = later_ran.clone();
        chain.push(move |_: &mut Request, _: &MethodDescriptor| -> Result<(), BoxError> {
            *flag.lock().unwrap() = true;
            Ok(())
        });

        let error = chain
            .apply(&mut request(), &MethodDescriptor::new("plus"))
            .unwrap_err();

        assert_matches!(&error, JsonRpcError::Interceptor(_));
        assert_eq!(error.to_string(), "not authorized");
        assert!(!*later_ran.lock().unwrap());
    }
}
