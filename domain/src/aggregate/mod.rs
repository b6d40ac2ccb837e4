//! Aggregator / synthesizer functions
//!
//! Pure reductions from a phase's [`AggregateResult`](crate::session::task::AggregateResult)
//! plus previously accumulated context into the input of the next phase
//! (and any decision signal the protocol branches on). No I/O and no
//! hidden state: the same inputs always give the same output.
//!
//! | Function | Phase | Output |
//! |----------|-------|--------|
//! | [`merge_drafts`] | draft / rewrite | [`MergedDrafts`] |
//! | [`collect_critiques`] | critique | [`CritiqueSummary`] |
//! | [`tally_votes`] | vote | [`VoteTally`](crate::quorum::VoteTally) |
//! | [`score_claims`] | verify | [`ClaimReport`] (flagged ratio) |
//! | [`fuse_ideas`] | fuse | [`CandidateSet`] of fusions |
//! | [`rank_candidates`] | rank | [`Ranking`] |
//! | [`summarize_chain`] | chain amend | [`ChainSummary`] |

pub mod candidates;
pub mod chain;
pub mod claims;
pub mod critique;
pub mod drafts;
pub mod fusion;
pub mod ranking;
pub mod votes;

pub use candidates::{Candidate, CandidateSet};
pub use chain::{ChainLink, ChainSummary, summarize_chain};
pub use claims::{ClaimReport, score_claims};
pub use critique::{CritiqueSummary, collect_critiques};
pub use drafts::{MergedDrafts, merge_drafts};
pub use fusion::fuse_ideas;
pub use ranking::{Ranking, rank_candidates};
pub use votes::tally_votes;
