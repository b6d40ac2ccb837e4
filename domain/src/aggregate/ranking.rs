//! Candidate ranking

use crate::aggregate::candidates::CandidateSet;
use crate::quorum::parsing::parse_candidate_scores;
use crate::session::task::AggregateResult;

const NEUTRAL_SCORE: f64 = 5.0;

/// Candidates ordered by mean score, best first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    /// `(candidate, mean score)`; ties keep the lower index first
    pub scores: Vec<(usize, f64)>,
}

impl Ranking {
    /// The best `k` candidate indices
    pub fn top(&self, k: usize) -> Vec<usize> {
        self.scores.iter().take(k).map(|(i, _)| *i).collect()
    }

    pub fn score_of(&self, candidate: usize) -> Option<f64> {
        self.scores
            .iter()
            .find(|(i, _)| *i == candidate)
            .map(|(_, s)| *s)
    }
}

/// Average the `SCORE X: n` lines of a rank phase per candidate.
///
/// Agents cannot score their own candidate. A candidate nobody scored gets
/// the neutral 5.0; when a scorer repeats a label only its first score counts.
pub fn rank_candidates(result: &AggregateResult, candidates: &CandidateSet) -> Ranking {
    let mut sums = vec![0.0; candidates.len()];
    let mut counts = vec![0usize; candidates.len()];

    for (scorer, text) in result.texts() {
        let allowed = candidates.options_for(scorer);
        let mut seen = Vec::new();
        for (candidate, score) in parse_candidate_scores(text) {
            if allowed.contains(&candidate) && !seen.contains(&candidate) {
                seen.push(candidate);
                sums[candidate] += score;
                counts[candidate] += 1;
            }
        }
    }

    let mut scores: Vec<(usize, f64)> = (0..candidates.len())
        .map(|i| {
            let mean = if counts[i] == 0 {
                NEUTRAL_SCORE
            } else {
                sums[i] / counts[i] as f64
            };
            (i, mean)
        })
        .collect();
    scores.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    Ranking { scores }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::candidates::Candidate;
    use crate::aggregate::test_support::aggregate;
    use crate::orchestration::phase::PhaseKind;

    fn ideas() -> CandidateSet {
        CandidateSet::new((0..4).map(|i| Candidate::new(i, format!("idea {i}"))).collect())
    }

    #[test]
    fn test_rank_by_mean_score() {
        let result = aggregate(
            PhaseKind::Rank,
            &[
                (0, Some("SCORE B: 9\nSCORE C: 4\nSCORE D: 6")),
                (1, Some("SCORE A: 8\nSCORE C: 6\nSCORE D: 6")),
            ],
        );
        let ranking = rank_candidates(&result, &ideas());
        assert_eq!(ranking.top(2), vec![1, 0]);
        assert_eq!(ranking.score_of(2), Some(5.0));
        assert_eq!(ranking.scores[3], (2, 5.0));
    }

    #[test]
    fn test_self_scores_are_ignored() {
        let result = aggregate(PhaseKind::Rank, &[(0, Some("SCORE A: 10\nSCORE B: 2"))]);
        let ranking = rank_candidates(&result, &ideas());
        assert_eq!(ranking.score_of(0), Some(5.0));
        assert_eq!(ranking.score_of(1), Some(2.0));
    }

    #[test]
    fn test_unscored_candidates_tie_by_index() {
        let result = aggregate(PhaseKind::Rank, &[(0, None)]);
        let ranking = rank_candidates(&result, &ideas());
        assert_eq!(ranking.top(3), vec![0, 1, 2]);
    }
}
