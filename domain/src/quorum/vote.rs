//! Ballots and tallies for vote phases

use serde::{Deserialize, Serialize};

/// A single agent's ballot in a vote phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// Roster index of the voting agent
    pub voter: usize,
    /// Candidate chosen, or `None` for an abstention / unusable ballot
    pub choice: Option<usize>,
}

impl Ballot {
    pub fn new(voter: usize, choice: Option<usize>) -> Self {
        Self { voter, choice }
    }

    pub fn is_abstention(&self) -> bool {
        self.choice.is_none()
    }
}

/// Result of counting ballots over a candidate set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Votes received, indexed by candidate
    pub counts: Vec<usize>,
    pub ballots: Vec<Ballot>,
}

impl VoteTally {
    /// Count ballots for `candidates` options. Choices outside the range
    /// are treated as abstentions.
    pub fn from_ballots(candidates: usize, ballots: Vec<Ballot>) -> Self {
        let mut counts = vec![0; candidates];
        for ballot in &ballots {
            if let Some(choice) = ballot.choice
                && let Some(count) = counts.get_mut(choice)
            {
                *count += 1;
            }
        }
        Self { counts, ballots }
    }

    pub fn votes_for(&self, candidate: usize) -> usize {
        self.counts.get(candidate).copied().unwrap_or(0)
    }

    pub fn total_votes(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn abstentions(&self) -> usize {
        self.ballots.len() - self.total_votes()
    }

    /// Candidate with the most votes.
    ///
    /// Ties are broken by the smallest `tiebreak` key; callers pass a key
    /// that ends with something unique (such as the author index) so the
    /// result is deterministic. Returns `None` for an empty candidate set.
    pub fn leader_by<K: Ord>(&self, tiebreak: impl Fn(usize) -> K) -> Option<usize> {
        (0..self.counts.len()).min_by(|&a, &b| {
            self.counts[b]
                .cmp(&self.counts[a])
                .then_with(|| tiebreak(a).cmp(&tiebreak(b)))
        })
    }

    /// Generate a visual tally (e.g., "A:2 B:0 C:1")
    pub fn summary(&self) -> String {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}:{}", super::parsing::candidate_label(i), c))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
