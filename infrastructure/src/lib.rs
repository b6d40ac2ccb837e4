//! Infrastructure layer for llm-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentConfig, FileConfig, FileOrchestrationConfig,
    FileOutputConfig, FileOutputFormat,
};
pub use logging::JsonlEventLog;
pub use providers::{
    ProviderKind,
    roster::{RosterError, build_agent, build_roster},
    scripted::ScriptedAgentClient,
};
