//! Declarative metadata describing a JSON-RPC service contract and its methods.
//!
//! Descriptors are plain data.  They are usually generated by the `#[json_rpc_service]` attribute
//! macro from a Rust trait, but can just as well be built by hand with the builder-style methods
//! here.  Nothing is validated when a descriptor is built; validation happens when the descriptor
//! is bound by [`crate::Client::bind`] and when each method's invocation plan is resolved.
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use strum::{Display, EnumString};

/// Whether a declaration is an abstract contract or a concrete type.
///
/// Only contracts can be bound to a remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Contract,
    Concrete,
}

/// How the arguments of a method are passed in the `params` member of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ParamMode {
    /// By-name: `params` is an object keyed by each parameter's name tag
    #[default]
    Named,
    /// By-position: `params` is an array in declared order
    Positional,
}

/// One declared parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// The name the parameter has in the declaring code; only used for diagnostics
    pub declared_name: Option<String>,
    /// The wire name of the parameter.  Every parameter needs one, regardless of [`ParamMode`].
    pub tag: Option<String>,
}

/// The declared return shape of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnShape {
    /// The single-value completion handle [`crate::Call`], with the name of its result type
    Single { result_type: String },
    /// Anything else, which can't be bound
    Other { type_name: String },
}

/// Declaration of one method of a service contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    name: String,
    rpc_name: Option<String>,
    param_mode: ParamMode,
    params: Vec<ParamDescriptor>,
    returns: ReturnShape,
}

impl MethodDescriptor {
    /// Declare a method.  By default it uses named params, its RPC name is its declared name, it
    /// has no parameters, and it returns a JSON value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rpc_name: None,
            param_mode: ParamMode::Named,
            params: Vec::new(),
            returns: ReturnShape::Single {
                result_type: std::any::type_name::<serde_json::Value>().to_string(),
            },
        }
    }

    /// Override the name of the method on the wire
    pub fn rpc_name(mut self, rpc_name: impl Into<String>) -> Self {
        self.rpc_name = Some(rpc_name.into());
        self
    }

    pub fn param_mode(mut self, mode: ParamMode) -> Self {
        self.param_mode = mode;
        self
    }

    pub fn named(self) -> Self {
        self.param_mode(ParamMode::Named)
    }

    pub fn positional(self) -> Self {
        self.param_mode(ParamMode::Positional)
    }

    /// Add a parameter tagged with its wire name
    pub fn param(mut self, tag: impl Into<String>) -> Self {
        self.params.push(ParamDescriptor {
            declared_name: None,
            tag: Some(tag.into()),
        });
        self
    }

    /// Add a parameter that has no name tag.
    ///
    /// Such a method can be declared, but any attempt to invoke it fails.
    pub fn untagged_param(mut self, declared_name: impl Into<String>) -> Self {
        self.params.push(ParamDescriptor {
            declared_name: Some(declared_name.into()),
            tag: None,
        });
        self
    }

    /// Add a fully-specified parameter descriptor
    pub fn param_descriptor(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    /// Declare that the method returns `Call<T>`
    pub fn returns<T>(self) -> Self {
        self.returns_single(std::any::type_name::<T>())
    }

    /// Declare that the method returns `Call<_>` for a result type with the given name
    pub fn returns_single(mut self, result_type: impl Into<String>) -> Self {
        self.returns = ReturnShape::Single {
            result_type: result_type.into(),
        };
        self
    }

    /// Declare that the method returns something other than `Call<_>`
    pub fn returns_other(mut self, type_name: impl Into<String>) -> Self {
        self.returns = ReturnShape::Other {
            type_name: type_name.into(),
        };
        self
    }

    /// The method name as declared
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The method name on the wire, which defaults to the declared name
    pub fn wire_name(&self) -> &str {
        self.rpc_name.as_deref().unwrap_or(&self.name)
    }

    pub fn mode(&self) -> ParamMode {
        self.param_mode
    }

    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    pub fn return_shape(&self) -> &ReturnShape {
        &self.returns
    }
}

/// Declaration of a JSON-RPC service contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    name: String,
    kind: DeclarationKind,
    base_path: Option<String>,
    type_params: Vec<String>,
    extends: Vec<Arc<ServiceDescriptor>>,
    methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    /// Declare a service contract with the given name
    pub fn contract(name: impl Into<String>) -> Self {
        Self::new(name, DeclarationKind::Contract)
    }

    /// Declare a concrete type.  This exists so that binding can reject it.
    pub fn concrete(name: impl Into<String>) -> Self {
        Self::new(name, DeclarationKind::Concrete)
    }

    fn new(name: impl Into<String>, kind: DeclarationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            base_path: None,
            type_params: Vec::new(),
            extends: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Set the endpoint path, relative to the client's base URL (or absolute)
    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Record an unresolved type parameter on this contract
    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    /// Record a contract that this one extends
    pub fn extends(mut self, parent: impl Into<Arc<ServiceDescriptor>>) -> Self {
        self.extends.push(parent.into());
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    pub fn declared_base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    pub fn type_params(&self) -> &[String] {
        &self.type_params
    }

    pub fn parents(&self) -> &[Arc<ServiceDescriptor>] {
        &self.extends
    }

    /// The methods declared directly on this contract, not including inherited ones
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Iterate over this contract and all of its ancestors, breadth-first, visiting each distinct
    /// contract once.
    pub fn ancestry(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        let mut queue: VecDeque<&ServiceDescriptor> = VecDeque::from([self]);
        let mut seen: HashSet<*const ServiceDescriptor> = HashSet::new();

        std::iter::from_fn(move || {
            while let Some(candidate) = queue.pop_front() {
                if seen.insert(candidate as *const _) {
                    queue.extend(candidate.extends.iter().map(Arc::as_ref));
                    return Some(candidate);
                }
            }
            None
        })
    }

    /// The effective base path: this contract's own, or the nearest ancestor's in breadth-first
    /// order.
    pub fn effective_base_path(&self) -> Option<&str> {
        self.ancestry().find_map(|candidate| candidate.declared_base_path())
    }

    /// Look up a method by its declared name, on this contract or any ancestor.
    pub fn find_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.ancestry()
            .flat_map(|candidate| candidate.methods.iter())
            .find(|method| method.name == name)
    }
}
