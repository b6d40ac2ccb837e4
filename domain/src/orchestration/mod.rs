//! Orchestration vocabulary
//!
//! Modes name the collaboration protocols; phases are the bounded rounds
//! of concurrent agent calls those protocols are built from.

pub mod mode;
pub mod phase;
