//! Roster construction: config entries to session agents
//!
//! The position of an entry in the roster is the agent's stable index,
//! used for tie-breaks; its `provider:model` reference is the label shown
//! in traces and progress events.

use super::ProviderKind;
use super::scripted::ScriptedAgentClient;
use crate::config::FileAgentConfig;
use council_application::{Agent, AgentClient};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors while building agent clients
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RosterError {
    #[error("agent '{agent}': provider '{provider}' needs an endpoint")]
    MissingEndpoint { agent: String, provider: String },

    #[error("agent '{agent}': HTTP providers are not available in this build")]
    HttpDisabled { agent: String },

    #[error("agent '{agent}': {reason}")]
    Client { agent: String, reason: String },
}

/// Build one agent per entry, in order
pub fn build_roster(entries: &[FileAgentConfig]) -> Result<Vec<Agent>, RosterError> {
    entries.iter().map(build_agent).collect()
}

/// Build the agent for one entry
pub fn build_agent(entry: &FileAgentConfig) -> Result<Agent, RosterError> {
    let agent_ref = entry.agent_ref();
    let kind = ProviderKind::from_name(&entry.provider);
    debug!("Building agent {} ({:?})", agent_ref, kind);

    let client: Arc<dyn AgentClient> = match kind {
        ProviderKind::Scripted => Arc::new(
            ScriptedAgentClient::new(&entry.model)
                .with_cost_per_call(entry.cost_per_call.unwrap_or(0.0)),
        ),
        _ => http_client(entry, kind)?,
    };

    let mut agent = Agent::new(agent_ref, client);
    if let Some(timeout) = entry.timeout() {
        agent = agent.with_timeout(timeout);
    }
    Ok(agent)
}

#[cfg(feature = "http")]
fn http_client(
    entry: &FileAgentConfig,
    kind: ProviderKind,
) -> Result<Arc<dyn AgentClient>, RosterError> {
    use super::openai_compat::{OpenAiCompatClient, OpenAiCompatConfig};

    let agent = entry.agent_ref().to_string();
    let endpoint = entry
        .endpoint
        .clone()
        .or_else(|| kind.default_endpoint().map(str::to_string))
        .ok_or_else(|| RosterError::MissingEndpoint {
            agent: agent.clone(),
            provider: entry.provider.clone(),
        })?;
    let api_key = entry
        .api_key_env
        .as_deref()
        .or(kind.default_api_key_env())
        .and_then(|var| std::env::var(var).ok())
        .filter(|key| !key.is_empty());

    let client = OpenAiCompatClient::new(OpenAiCompatConfig {
        endpoint,
        model: entry.model.clone(),
        api_key,
        price_per_1k_tokens: entry.price_per_1k_tokens.unwrap_or(0.0),
        cost_per_call: entry.cost_per_call,
        max_tokens: entry.max_tokens,
    })
    .map_err(|e| RosterError::Client {
        agent,
        reason: e.to_string(),
    })?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "http"))]
fn http_client(
    entry: &FileAgentConfig,
    _kind: ProviderKind,
) -> Result<Arc<dyn AgentClient>, RosterError> {
    Err(RosterError::HttpDisabled {
        agent: entry.agent_ref().to_string(),
    })
}
