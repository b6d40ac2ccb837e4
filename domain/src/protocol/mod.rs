//! Protocol state machines
//!
//! Each [`Mode`] is driven by its own finite state machine behind the
//! [`Protocol`] trait. The session coordinator asks for the first phase with
//! [`Protocol::start`], feeds every phase's [`AggregateResult`] back through
//! [`Protocol::advance`] and stops at [`Transition::Terminal`]. When the
//! coordinator has to stop early (deadline, budget, caller abort, a phase
//! without enough successes) it calls [`Protocol::conclude`], which builds
//! the best answer available from whatever state the machine reached.

mod brainstorm_swarm;
mod critique_chain;
mod guarded_braintrust;
mod round_table;
mod validated_consensus;

pub use brainstorm_swarm::BrainstormSwarm;
pub use critique_chain::CritiqueChain;
pub use guarded_braintrust::GuardedBraintrust;
pub use round_table::RoundTable;
pub use validated_consensus::ValidatedConsensus;

use crate::core::question::Question;
use crate::orchestration::mode::Mode;
use crate::orchestration::phase::PhaseSpec;
use crate::session::task::AggregateResult;

/// Best answer a protocol can give from its current state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conclusion {
    pub content: String,
    pub rationale: Option<String>,
}

impl Conclusion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            rationale: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        let rationale = rationale.into();
        self.rationale = (!rationale.is_empty()).then_some(rationale);
        self
    }
}

/// Outcome of a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Run this phase next
    Dispatch(PhaseSpec),
    /// The protocol reached its terminal state
    Terminal(Conclusion),
}

impl Transition {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Transition::Terminal(_))
    }
}

/// Tunables shared by the protocol state machines
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolParams {
    /// Flagged-claim ratio above which validated consensus rewrites
    pub flagged_ratio_threshold: f64,
    /// Ideas kept after the braintrust ranking pass (3 to 5)
    pub rank_survivors: usize,
    /// Rewrite loops validated consensus may run
    pub max_rewrite_loops: usize,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            flagged_ratio_threshold: 0.04,
            rank_survivors: 3,
            max_rewrite_loops: 1,
        }
    }
}

impl ProtocolParams {
    pub fn with_flagged_ratio_threshold(mut self, threshold: f64) -> Self {
        self.flagged_ratio_threshold = threshold;
        self
    }

    /// Clamped to 3..=5
    pub fn with_rank_survivors(mut self, survivors: usize) -> Self {
        self.rank_survivors = survivors.clamp(3, 5);
        self
    }
}

/// A collaboration protocol as a finite state machine over phases
pub trait Protocol: Send {
    fn mode(&self) -> Mode;

    /// First phase of the protocol
    fn start(&mut self) -> Transition;

    /// Consume a phase's result and decide what happens next
    fn advance(&mut self, result: &AggregateResult) -> Transition;

    /// Best answer from the current state, for forced termination
    fn conclude(&self) -> Conclusion;

    /// Whether the protocol can carry on after `spec` fell short of its
    /// minimum successes. Without a degraded path the session stops there.
    fn has_degraded_path(&self, _spec: &PhaseSpec) -> bool {
        false
    }
}

/// Build the state machine for `mode` over a roster of `agents` agents
pub fn protocol_for(
    mode: Mode,
    question: &Question,
    agents: usize,
    params: &ProtocolParams,
) -> Box<dyn Protocol> {
    let question = question.content().to_string();
    match mode {
        Mode::RoundTable => Box::new(RoundTable::new(question, agents)),
        Mode::SequentialCritiqueChain => Box::new(CritiqueChain::new(question, agents)),
        Mode::ValidatedConsensus => Box::new(ValidatedConsensus::new(
            question,
            agents,
            params.flagged_ratio_threshold,
            params.max_rewrite_loops,
        )),
        Mode::CreativeBrainstormSwarm => Box::new(BrainstormSwarm::new(question, agents)),
        Mode::HybridGuardedBraintrust => Box::new(GuardedBraintrust::new(
            question,
            agents,
            params.rank_survivors.clamp(3, 5),
            params.flagged_ratio_threshold,
        )),
    }
}
