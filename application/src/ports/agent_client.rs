//! Agent client port
//!
//! Defines the single capability the orchestration core needs from a
//! language-model provider: complete one prompt. Provider adapters live in
//! the infrastructure layer; which adapter backs which agent is decided
//! before a session starts.

use async_trait::async_trait;
use council_domain::{AgentRef, Completion, TaskInput};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors an agent client can report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    /// Timeout, rate limit (429) or server-side (5xx) failure; worth retrying
    #[error("Transient error: {0}")]
    Transient(String),

    /// Authentication or validation failure; retrying cannot help
    #[error("Fatal error: {0}")]
    Fatal(String),

    #[error("Cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn is_transient(&self) -> bool {
        matches!(self, AgentError::Transient(_))
    }

    /// Classify an HTTP status code
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let message = format!("HTTP {}: {}", code, message.into());
        match code {
            408 | 429 | 500..=599 => AgentError::Transient(message),
            _ => AgentError::Fatal(message),
        }
    }
}

/// Uniform "complete a prompt" capability bound to one model
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Run one completion.
    ///
    /// Implementations should stop early and return [`AgentError::Cancelled`]
    /// once `cancel` fires; the phase executor also drops the future at its
    /// deadline, so cooperation is best effort.
    async fn complete(
        &self,
        task: &TaskInput,
        cancel: CancellationToken,
    ) -> Result<Completion, AgentError>;

    /// Worst-case cost of one call for `task`, used to reserve budget
    fn estimate_cost(&self, _task: &TaskInput) -> f64 {
        0.0
    }
}

/// A session participant: identity, bound client and timeout override
#[derive(Clone)]
pub struct Agent {
    pub agent_ref: AgentRef,
    pub client: Arc<dyn AgentClient>,
    /// Per-call timeout; the phase deadline applies when absent
    pub timeout: Option<Duration>,
}

impl Agent {
    pub fn new(agent_ref: AgentRef, client: Arc<dyn AgentClient>) -> Self {
        Self {
            agent_ref,
            client,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Display label used in events and traces (`provider:model`)
    pub fn label(&self) -> String {
        self.agent_ref.to_string()
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("agent_ref", &self.agent_ref)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
