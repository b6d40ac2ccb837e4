//! Application layer for llm-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::OrchestrationParams;
pub use ports::{
    agent_client::{Agent, AgentClient, AgentError},
    event_publisher::{EventPublisher, FanoutPublisher, NoEvents},
};
pub use use_cases::execute_phase::{ExecutePhaseError, PhaseContext, PhaseExecutor, RetryPolicy};
pub use use_cases::run_session::{RunSessionError, SessionCoordinator, SessionRequest};
