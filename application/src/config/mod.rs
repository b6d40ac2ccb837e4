//! Application-level configuration.
//!
//! - [`OrchestrationParams`]: deadlines, quorum, retries, admission limits
//!   and protocol tunables for the session coordinator

pub mod orchestration_params;

pub use orchestration_params::OrchestrationParams;
