//! Serializable client configuration.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ids::IdStrategy;

/// Configuration for a [`crate::Client`] that uses the default `reqwest` transport.
///
/// ```yaml
/// base_url: https://example.com/api/
/// timeout: 30s
/// user_agent: my-app/1.0
/// id_strategy: sequential
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root URL that service base paths are resolved against.  Must end in `/`.
    pub base_url: String,

    /// Overall timeout for each HTTP request, including reading the response body.
    ///
    /// No timeout by default.
    #[serde(with = "humantime_serde", default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(default)]
    pub id_strategy: IdStrategy,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
            user_agent: None,
            id_strategy: IdStrategy::default(),
        }
    }
}
