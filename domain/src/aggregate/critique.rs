//! Critique collection

use crate::aggregate::candidates::CandidateSet;
use crate::quorum::parsing::parse_critique_flags;
use crate::session::task::AggregateResult;

/// Flags raised against each draft during a critique phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CritiqueSummary {
    /// Flags received, indexed by candidate
    pub flag_counts: Vec<usize>,
    /// `(candidate, issue)` in critic order
    pub issues: Vec<(usize, String)>,
    /// `(critic, full review)` ordered by critic index
    pub reviews: Vec<(usize, String)>,
}

impl CritiqueSummary {
    pub fn flags_for(&self, candidate: usize) -> usize {
        self.flag_counts.get(candidate).copied().unwrap_or(0)
    }

    pub fn issues_for(&self, candidate: usize) -> impl Iterator<Item = &str> {
        self.issues
            .iter()
            .filter(move |(c, _)| *c == candidate)
            .map(|(_, issue)| issue.as_str())
    }
}

/// Count critique flags per draft. Flags a critic raises against its own
/// draft, or against labels that do not exist, are ignored.
pub fn collect_critiques(result: &AggregateResult, drafts: &CandidateSet) -> CritiqueSummary {
    let mut summary = CritiqueSummary {
        flag_counts: vec![0; drafts.len()],
        ..Default::default()
    };

    for (critic, text) in result.texts() {
        let allowed = drafts.options_for(critic);
        for (candidate, issue) in parse_critique_flags(text) {
            if allowed.contains(&candidate) {
                summary.flag_counts[candidate] += 1;
                summary.issues.push((candidate, issue));
            }
        }
        summary.reviews.push((critic, text.to_string()));
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::candidates::Candidate;
    use crate::aggregate::test_support::aggregate;
    use crate::orchestration::phase::PhaseKind;

    #[test]
    fn test_counts_flags_excluding_self() {
        let drafts = CandidateSet::new(vec![Candidate::new(0, "a"), Candidate::new(1, "b")]);
        let result = aggregate(
            PhaseKind::Critique,
            &[
                (0, Some("FLAG B: vague\nFLAG B: wrong\nFLAG A: self-flag")),
                (1, Some("FLAG A: too long\nFLAG C: no such draft")),
                (2, None),
            ],
        );
        let summary = collect_critiques(&result, &drafts);
        assert_eq!(summary.flag_counts, vec![1, 2]);
        assert_eq!(summary.issues_for(1).collect::<Vec<_>>(), vec!["vague", "wrong"]);
        assert_eq!(summary.reviews.len(), 2);
    }
}
