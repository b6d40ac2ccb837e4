//! Domain layer for llm-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns and no
//! async runtime: everything here is pure and deterministic.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is an ordered roster of language-model agents that answer one
//! question together. The collaboration [`Mode`] decides how:
//!
//! - **round_table**: draft, critique, vote, synthesize
//! - **sequential_critique_chain**: each agent amends the previous version
//! - **validated_consensus**: co-draft, verify claims, rewrite once if needed
//! - **creative_brainstorm_swarm**: ideate, fuse, vote, expand
//! - **hybrid_guarded_braintrust**: ideate, rank, verify survivors, elaborate
//!
//! ## Phases and protocols
//!
//! Each mode is a [`Protocol`] state machine that hands out [`PhaseSpec`]s
//! and consumes the [`AggregateResult`] of each phase. The reductions from
//! raw agent output to the next phase's input live in [`aggregate`].
//!
//! ## Quorum and budget
//!
//! A session only completes (rather than ending partial) when the
//! [`QuorumRule`] holds; the [`CostLedger`] gates every phase against the
//! caller's cost cap.

pub mod aggregate;
pub mod config;
pub mod core;
pub mod cost;
pub mod orchestration;
pub mod prompt;
pub mod protocol;
pub mod quorum;
pub mod session;

/// Largest roster a session accepts
pub const MAX_AGENTS: usize = 6;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{agent::AgentRef, error::DomainError, question::Question};
pub use cost::CostLedger;
pub use orchestration::{
    mode::Mode,
    phase::{CompletionParams, CritiqueStyle, PhaseKind, PhaseSpec, TaskInput},
};
pub use prompt::PromptTemplate;
pub use protocol::{Conclusion, Protocol, ProtocolParams, Transition, protocol_for};
pub use quorum::{QuorumRule, VoteTally};
pub use session::{
    entities::{Session, SessionStatus},
    event::ProgressEvent,
    result::{AgentTrace, FinalResult, FinalStatus, PhaseOutput},
    task::{AggregateResult, Completion, TaskOutcome, TaskStatus},
};
