//! Quorum and voting
//!
//! - [`rule::QuorumRule`] decides how many agents must succeed for a
//!   non-degraded result.
//! - [`vote`] holds ballots and tallies for the vote phases.
//! - [`parsing`] extracts ballots, scores, claim verdicts and critique
//!   flags from free-form agent output.

pub mod parsing;
pub mod rule;
pub mod vote;

pub use parsing::{
    ClaimVerdict, Verdict, candidate_label, parse_ballot, parse_candidate_scores,
    parse_claim_verdicts, parse_critique_flags, parse_score, parse_sources,
};
pub use rule::QuorumRule;
pub use vote::{Ballot, VoteTally};
