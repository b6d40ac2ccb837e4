//! Vote tallying

use crate::aggregate::candidates::CandidateSet;
use crate::quorum::parsing::parse_ballot;
use crate::quorum::vote::{Ballot, VoteTally};
use crate::session::task::AggregateResult;

/// Tally the ballots of a vote phase.
///
/// Each successful voter casts at most one ballot. Votes for the voter's
/// own candidate are never counted, even if the agent names it.
pub fn tally_votes(result: &AggregateResult, candidates: &CandidateSet) -> VoteTally {
    let ballots = result
        .texts()
        .into_iter()
        .map(|(voter, text)| Ballot::new(voter, parse_ballot(text, &candidates.options_for(voter))))
        .collect();
    VoteTally::from_ballots(candidates.len(), ballots)
}
