//! Claim scoring for verify phases

use crate::aggregate::candidates::CandidateSet;
use crate::quorum::parsing::{ClaimVerdict, Verdict, parse_claim_verdicts};
use crate::session::task::AggregateResult;

/// Verdicts collected in a verify phase and the flagged ratio derived from them
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimReport {
    /// Verdicts ordered by verifier index, then by line
    pub verdicts: Vec<ClaimVerdict>,
    /// Flagged verdicts over all verdicts (0.0 when there are none)
    pub flagged_ratio: f64,
    pub threshold: f64,
}

impl ClaimReport {
    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.verdicts.iter().filter(|v| v.verdict == verdict).count()
    }

    /// True when the flagged ratio is strictly above the threshold
    pub fn exceeds_threshold(&self) -> bool {
        self.flagged_ratio > self.threshold
    }

    pub fn claims_with(&self, verdict: Verdict) -> Vec<&str> {
        self.verdicts
            .iter()
            .filter(|v| v.verdict == verdict)
            .map(|v| v.claim.as_str())
            .collect()
    }

    /// Share of a candidate's claims that survived verification.
    ///
    /// Returns 0.5 (neutral) when no verifier tagged a claim to it.
    pub fn verification_score(&self, candidate: usize) -> f64 {
        let tagged: Vec<&ClaimVerdict> = self
            .verdicts
            .iter()
            .filter(|v| v.candidate == Some(candidate))
            .collect();
        if tagged.is_empty() {
            return 0.5;
        }
        let flagged = tagged.iter().filter(|v| v.verdict == Verdict::Flagged).count();
        1.0 - flagged as f64 / tagged.len() as f64
    }
}

/// Collect every verifier's claim verdicts and compute the flagged ratio.
///
/// A verdict on a candidate of `candidates` written by the verifier itself
/// is discarded.
pub fn score_claims(
    result: &AggregateResult,
    candidates: &CandidateSet,
    threshold: f64,
) -> ClaimReport {
    let verdicts: Vec<ClaimVerdict> = result
        .texts()
        .into_iter()
        .flat_map(|(verifier, text)| {
            parse_claim_verdicts(text).into_iter().filter(move |v| {
                !v.candidate
                    .and_then(|c| candidates.get(c))
                    .is_some_and(|c| c.author == verifier)
            })
        })
        .collect();

    let flagged = verdicts
        .iter()
        .filter(|v| v.verdict == Verdict::Flagged)
        .count();
    let flagged_ratio = if verdicts.is_empty() {
        0.0
    } else {
        flagged as f64 / verdicts.len() as f64
    };

    ClaimReport {
        verdicts,
        flagged_ratio,
        threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::candidates::Candidate;
    use crate::aggregate::test_support::aggregate;
    use crate::orchestration::phase::PhaseKind;

    fn verified_lines(n: usize) -> String {
        (0..n)
            .map(|i| format!("VERIFIED [A]: claim {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_five_percent_exceeds_four_percent_threshold() {
        let mut text = verified_lines(19);
        text.push_str("\nFLAGGED [A]: wrong claim");
        let result = aggregate(PhaseKind::Verify, &[(2, Some(&text))]);
        let report = score_claims(&result, &CandidateSet::default(), 0.04);
        assert_eq!(report.total(), 20);
        assert!((report.flagged_ratio - 0.05).abs() < 1e-9);
        assert!(report.exceeds_threshold());
        assert_eq!(report.claims_with(Verdict::Flagged), vec!["wrong claim"]);
    }

    #[test]
    fn test_ratio_at_threshold_does_not_exceed() {
        let mut text = verified_lines(24);
        text.push_str("\nFLAGGED [A]: wrong claim");
        let result = aggregate(PhaseKind::Verify, &[(2, Some(&text))]);
        let report = score_claims(&result, &CandidateSet::default(), 0.04);
        assert!((report.flagged_ratio - 0.04).abs() < 1e-9);
        assert!(!report.exceeds_threshold());
    }

    #[test]
    fn test_no_verdicts_means_zero_ratio() {
        let result = aggregate(PhaseKind::Verify, &[(2, Some("Looks fine")), (3, None)]);
        let report = score_claims(&result, &CandidateSet::default(), 0.04);
        assert_eq!(report.flagged_ratio, 0.0);
        assert!(!report.exceeds_threshold());
    }

    #[test]
    fn test_verification_score_per_candidate() {
        let text = "VERIFIED [A]: x\nFLAGGED [A]: y\nVERIFIED [B]: z";
        let result = aggregate(PhaseKind::Verify, &[(0, Some(text))]);
        let report = score_claims(&result, &CandidateSet::default(), 0.04);
        assert!((report.verification_score(0) - 0.5).abs() < 1e-9);
        assert!((report.verification_score(1) - 1.0).abs() < 1e-9);
        assert!((report.verification_score(2) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_verdicts_on_own_candidate_are_discarded() {
        let ideas = CandidateSet::new(vec![Candidate::new(0, "idea"), Candidate::new(1, "other")]);
        let result = aggregate(
            PhaseKind::Verify,
            &[
                (0, Some("VERIFIED [A]: a\nVERIFIED [A]: b\nVERIFIED [A]: c\nVERIFIED [A]: d")),
                (1, Some("FLAGGED [A]: a")),
                (2, Some("FLAGGED [A]: b\nVERIFIED [B]: e")),
            ],
        );
        let report = score_claims(&result, &ideas, 0.04);
        assert_eq!(report.total(), 3);
        assert_eq!(report.verification_score(0), 0.0);
        assert_eq!(report.verification_score(1), 1.0);
    }
}
