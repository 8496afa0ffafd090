//! Resolved, validated form of a method declaration.
use crate::descriptor::{MethodDescriptor, ParamMode, ReturnShape};
use crate::params;
use crate::ConfigError;

/// Everything needed to turn an invocation of one method into a request.
///
/// A plan is resolved the first time a method is invoked on a bound service, and reused for every
/// later invocation of that method on the same handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationPlan {
    method: MethodDescriptor,
    param_names: Vec<String>,
    result_type: String,
}

impl InvocationPlan {
    /// Validate a method declaration and resolve its plan.
    ///
    /// Fails if the method doesn't return a single-value `Call<T>`, or if any of its parameters
    /// lacks a name tag.
    pub fn resolve(method: &MethodDescriptor) -> Result<Self, ConfigError> {
        let result_type = match method.return_shape() {
            ReturnShape::Single { result_type } => result_type.clone(),
            ReturnShape::Other { type_name } => {
                return Err(ConfigError::UnsupportedReturnType {
                    method: method.name().to_string(),
                    found: type_name.clone(),
                });
            }
        };

        let param_names = params::param_tags(method)?;

        tracing::debug!(
            method = method.name(),
            rpc_name = method.wire_name(),
            mode = %method.mode(),
            ?param_names,
            result_type,
            "Resolved invocation plan"
        );

        Ok(Self {
            method: method.clone(),
            param_names,
            result_type,
        })
    }

    pub fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    pub fn rpc_name(&self) -> &str {
        self.method.wire_name()
    }

    pub fn mode(&self) -> ParamMode {
        self.method.mode()
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn result_type(&self) -> &str {
        &self.result_type
    }
}
