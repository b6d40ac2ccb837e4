//! Core domain concepts shared across all subdomains.
//!
//! - [`agent::AgentRef`]: a participant identity (`provider:model`)
//! - [`question::Question`]: a validated prompt to pose to the council
//! - [`error::DomainError`]: domain-level errors

pub mod agent;
pub mod error;
pub mod question;
pub mod string;
