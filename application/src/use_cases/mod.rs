//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod execute_phase;
pub mod run_session;
#[cfg(test)]
pub(crate) mod test_support;
