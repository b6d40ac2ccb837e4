//! Draft merging

use crate::aggregate::candidates::{Candidate, CandidateSet};
use crate::session::task::AggregateResult;

/// Drafts in hand after a draft or rewrite phase
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDrafts {
    /// One candidate per author, ordered by author index
    pub drafts: CandidateSet,
    /// All drafts rendered as one working document
    pub consensus_draft: String,
}

/// Merge a phase's drafts into the prior draft set.
///
/// A successful output replaces the prior draft of the same author; authors
/// that failed this round keep their previous draft.
pub fn merge_drafts(result: &AggregateResult, prior: &CandidateSet) -> MergedDrafts {
    let mut drafts: Vec<Candidate> = prior.iter().cloned().collect();

    for (agent, text) in result.texts() {
        match drafts.iter_mut().find(|d| d.author == agent) {
            Some(existing) => existing.text = text.to_string(),
            None => drafts.push(Candidate::new(agent, text)),
        }
    }
    drafts.sort_by_key(|d| d.author);

    let consensus_draft = match drafts.as_slice() {
        [] => String::new(),
        [only] => only.text.trim().to_string(),
        many => many
            .iter()
            .enumerate()
            .map(|(i, d)| {
                format!(
                    "### Draft {}\n{}",
                    crate::quorum::candidate_label(i),
                    d.text.trim()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
    };

    MergedDrafts {
        drafts: CandidateSet::new(drafts),
        consensus_draft,
    }
}
