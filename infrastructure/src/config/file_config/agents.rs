//! Agent roster from TOML (`[[agents]]` array)
//!
//! Example configuration:
//!
//! ```toml
//! [[agents]]
//! provider = "openai"
//! model = "gpt-4o-mini"
//! endpoint = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! price_per_1k_tokens = 0.0006
//! timeout_ms = 8000
//!
//! [[agents]]
//! provider = "scripted"
//! model = "echo"
//! ```

use super::ConfigValidationError;
use council_domain::AgentRef;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One agent of the roster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Provider name: "scripted" or an OpenAI-compatible provider
    pub provider: String,
    pub model: String,
    /// Per-call timeout (otherwise the phase deadline)
    pub timeout_ms: Option<u64>,
    /// Flat cost estimate per call, used by the cost gate
    pub cost_per_call: Option<f64>,
    /// Price per 1000 tokens, used to turn usage into actual cost
    pub price_per_1k_tokens: Option<f64>,
    /// Base URL of an OpenAI-compatible API
    pub endpoint: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    pub max_tokens: Option<u32>,
}

impl FileAgentConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Parse a `provider:model` reference (a bare model is `scripted`)
    pub fn parse(spec: &str) -> Self {
        match spec.split_once(':') {
            Some((provider, model)) => Self::new(provider.trim(), model.trim()),
            None => Self::new("scripted", spec.trim()),
        }
    }

    pub fn agent_ref(&self) -> AgentRef {
        AgentRef::new(&self.provider, &self.model)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub(super) fn validate(&self, index: usize, errors: &mut Vec<ConfigValidationError>) {
        if self.provider.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyProvider(index));
        }
        if self.model.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyModelName(index));
        }
        if self.timeout_ms == Some(0) {
            errors.push(ConfigValidationError::ZeroValue("agents.timeout_ms"));
        }
        if self
            .cost_per_call
            .into_iter()
            .chain(self.price_per_1k_tokens)
            .any(|c| !(c.is_finite() && c >= 0.0))
        {
            errors.push(ConfigValidationError::NegativeCost(index));
        }
    }
}
