//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No agents configured for the council")]
    NoAgents,

    #[error("Too many agents: {0} (at most {max} allowed)", max = crate::MAX_AGENTS)]
    TooManyAgents(usize),

    #[error("Unknown collaboration mode: {0}")]
    UnknownMode(String),

    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    #[error("Invalid agent: {0}")]
    InvalidAgent(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
