//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agents;
mod orchestration;
mod output;

pub use agents::FileAgentConfig;
pub use orchestration::FileOrchestrationConfig;
pub use output::{FileOutputConfig, FileOutputFormat};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroValue(&'static str),

    #[error("agents[{0}]: model name cannot be empty")]
    EmptyModelName(usize),

    #[error("agents[{0}]: provider cannot be empty")]
    EmptyProvider(usize),

    #[error("agents[{0}]: costs must be non-negative numbers")]
    NegativeCost(usize),

    #[error("orchestration.quorum: invalid rule '{value}': {reason}")]
    InvalidQuorum { value: String, reason: String },

    #[error("orchestration.flagged_ratio_threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Deadlines, quorum, retries and admission
    pub orchestration: FileOrchestrationConfig,
    /// Agent roster, in order
    pub agents: Vec<FileAgentConfig>,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        self.orchestration.validate(&mut errors);
        for (index, agent) in self.agents.iter().enumerate() {
            agent.validate(index, &mut errors);
        }
        errors
    }
}
