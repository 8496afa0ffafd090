//! Binding of the caller's runtime arguments to the `params` member of a request.
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::descriptor::{MethodDescriptor, ParamMode};
use crate::types::Params;
use crate::{ConfigError, JsonRpcError, Result};

/// Argument values for one invocation, in declared order.
///
/// Each value is serialized to JSON as soon as it's added.  The first serialization failure is
/// remembered and reported when the arguments are bound, so that arguments can be added fluently.
#[derive(Debug, Default)]
pub struct Arguments {
    values: Vec<JsonValue>,
    error: Option<JsonRpcError>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments which have already been converted to JSON
    pub fn from_values(values: impl IntoIterator<Item = JsonValue>) -> Self {
        Self {
            values: values.into_iter().collect(),
            error: None,
        }
    }

    /// Add the next argument
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        if let Err(e) = self.push(value) {
            self.error.get_or_insert(e);
        }
        self
    }

    /// Add the next argument, failing immediately if it can't be serialized
    pub fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let index = self.values.len();
        let value = serde_json::to_value(value).map_err(|e| JsonRpcError::SerArgument {
            source: e,
            index,
            type_name: std::any::type_name::<T>(),
        })?;
        self.values.push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn into_values(self) -> Result<Vec<JsonValue>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.values),
        }
    }
}

/// The name tags of every parameter of `method`, in declared order.
///
/// Tags are required in both parameter modes; in positional mode they aren't sent over the wire,
/// but they are still part of the method's declaration.  Fails on the first untagged parameter.
pub fn param_tags(method: &MethodDescriptor) -> Result<Vec<String>, ConfigError> {
    method
        .params()
        .iter()
        .enumerate()
        .map(|(index, param)| {
            param.tag.clone().ok_or_else(|| ConfigError::UntaggedParameter {
                index,
                method: method.name().to_string(),
            })
        })
        .collect()
}

/// Pair argument values with their parameters according to the parameter mode.
///
/// `tags` must be the result of [`param_tags`] for the method named `method`.
pub fn bind_params(method: &str, mode: ParamMode, tags: &[String], values: Vec<JsonValue>) -> Result<Params> {
    if tags.len() != values.len() {
        return Err(ConfigError::ArgumentCount {
            method: method.to_string(),
            expected: tags.len(),
            actual: values.len(),
        }
        .into());
    }

    let params = match mode {
        ParamMode::Named => Params::Named(tags.iter().cloned().zip(values).collect()),
        ParamMode::Positional => Params::Positional(values),
    };

    Ok(params)
}
