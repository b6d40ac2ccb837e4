//! Agent identity value object

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identity of one participating model (Value Object)
///
/// Written as `provider:model`, e.g. `openai:gpt-4.1` or
/// `anthropic:claude-sonnet-4.5`. The client that actually talks to the
/// provider is bound outside the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentRef {
    provider: String,
    model: String,
}

impl AgentRef {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Short label used in traces and prompts, e.g. `gpt-4.1`
    pub fn short_name(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Display for AgentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}

impl std::str::FromStr for AgentRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = s
            .split_once(':')
            .ok_or_else(|| DomainError::InvalidAgent(format!("expected provider:model, got {s}")))?;
        let provider = provider.trim();
        let model = model.trim();
        if provider.is_empty() || model.is_empty() {
            return Err(DomainError::InvalidAgent(s.to_string()));
        }
        Ok(Self::new(provider, model))
    }
}

impl Serialize for AgentRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AgentRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
