//! validated_consensus: co-draft → verify → (rewrite → verify) → finalize

use super::{Conclusion, Protocol, Transition};
use crate::aggregate::{CandidateSet, ClaimReport, MergedDrafts, merge_drafts, score_claims};
use crate::orchestration::mode::Mode;
use crate::orchestration::phase::{PhaseKind, PhaseSpec, TaskInput};
use crate::prompt::PromptTemplate;
use crate::quorum::Verdict;
use crate::session::task::AggregateResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    CoDraft,
    Verify,
    Rewrite,
    Finalize,
    Done,
}

/// Two agents co-draft, the rest check the draft claim by claim. When the
/// flagged-claim ratio is above the threshold the co-drafters rewrite once
/// and the draft is checked again; then the first surviving co-drafter
/// finalizes with inline
/// confidence tags.
#[derive(Debug, Clone)]
pub struct ValidatedConsensus {
    question: String,
    agents: usize,
    threshold: f64,
    max_rewrite_loops: usize,
    rewrites: usize,
    stage: Stage,
    drafts: MergedDrafts,
    report: Option<ClaimReport>,
    /// Agent that writes the finalized answer
    lead: usize,
    final_text: Option<String>,
}

impl ValidatedConsensus {
    pub fn new(
        question: impl Into<String>,
        agents: usize,
        threshold: f64,
        max_rewrite_loops: usize,
    ) -> Self {
        Self {
            question: question.into(),
            agents,
            threshold,
            max_rewrite_loops,
            rewrites: 0,
            stage: Stage::CoDraft,
            drafts: MergedDrafts {
                drafts: CandidateSet::default(),
                consensus_draft: String::new(),
            },
            report: None,
            lead: 0,
            final_text: None,
        }
    }

    /// Rewrite loops run so far
    pub fn rewrites(&self) -> usize {
        self.rewrites
    }

    fn co_drafters(&self) -> Vec<usize> {
        (0..self.agents.min(2)).collect()
    }

    /// Agents outside the co-draft pair; the co-drafters cross-check each
    /// other when there is nobody else.
    fn verifiers(&self) -> Vec<usize> {
        if self.agents > 2 {
            (2..self.agents).collect()
        } else {
            self.co_drafters()
        }
    }

    fn verify_phase(&mut self) -> Transition {
        if self.drafts.drafts.is_empty() {
            self.stage = Stage::Done;
            return Transition::Terminal(self.conclude());
        }
        let tasks: Vec<TaskInput> = self
            .verifiers()
            .into_iter()
            .filter(|&agent| !self.drafts.drafts.options_for(agent).is_empty())
            .map(|agent| {
                TaskInput::new(
                    agent,
                    PromptTemplate::verify_system(),
                    PromptTemplate::verify_prompt(
                        &self.question,
                        &self.drafts.drafts.render_for("Draft", agent),
                    ),
                )
            })
            .collect();
        if tasks.is_empty() {
            return self.finalize_phase();
        }
        let label = if self.rewrites == 0 {
            "verify".to_string()
        } else {
            format!("verify (after rewrite {})", self.rewrites)
        };
        self.stage = Stage::Verify;
        Transition::Dispatch(PhaseSpec::new(PhaseKind::Verify, label, tasks))
    }

    fn rewrite_phase(&mut self, report: &ClaimReport) -> Transition {
        self.rewrites += 1;
        let flagged = report.claims_with(Verdict::Flagged);
        let tasks = self
            .drafts
            .drafts
            .iter()
            .map(|draft| {
                TaskInput::new(
                    draft.author,
                    PromptTemplate::draft_system(),
                    PromptTemplate::rewrite_prompt(&self.question, draft.text.trim(), &flagged),
                )
            })
            .collect();
        self.stage = Stage::Rewrite;
        Transition::Dispatch(
            PhaseSpec::new(PhaseKind::Rewrite, "rewrite", tasks).with_min_successes(0),
        )
    }

    fn finalize_phase(&mut self) -> Transition {
        let (flagged, uncertain) = match &self.report {
            Some(report) => (
                report.claims_with(Verdict::Flagged),
                report.claims_with(Verdict::Uncertain),
            ),
            None => (Vec::new(), Vec::new()),
        };
        let prompt = PromptTemplate::finalize_prompt(
            &self.question,
            &self.drafts.consensus_draft,
            &flagged,
            &uncertain,
        );
        self.lead = self.drafts.drafts.iter().next().map_or(0, |d| d.author);
        self.stage = Stage::Finalize;
        Transition::Dispatch(PhaseSpec::new(
            PhaseKind::Synthesize,
            "finalize",
            vec![TaskInput::new(self.lead, PromptTemplate::synthesis_system(), prompt)],
        ))
    }

    fn rationale(&self) -> String {
        let Some(report) = &self.report else {
            return String::new();
        };
        format!(
            "{} claims checked: {} verified, {} flagged, {} uncertain (flagged ratio {:.1}%, threshold {:.1}%); rewrites: {}",
            report.total(),
            report.count(Verdict::Verified),
            report.count(Verdict::Flagged),
            report.count(Verdict::Uncertain),
            report.flagged_ratio * 100.0,
            report.threshold * 100.0,
            self.rewrites
        )
    }
}

impl Protocol for ValidatedConsensus {
    fn mode(&self) -> Mode {
        Mode::ValidatedConsensus
    }

    fn start(&mut self) -> Transition {
        self.stage = Stage::CoDraft;
        let tasks = self
            .co_drafters()
            .into_iter()
            .map(|agent| {
                TaskInput::new(
                    agent,
                    PromptTemplate::draft_system(),
                    PromptTemplate::co_draft_prompt(&self.question),
                )
            })
            .collect();
        Transition::Dispatch(PhaseSpec::new(PhaseKind::Draft, "co-draft", tasks))
    }

    fn advance(&mut self, result: &AggregateResult) -> Transition {
        match self.stage {
            Stage::CoDraft => {
                self.drafts = merge_drafts(result, &CandidateSet::default());
                self.verify_phase()
            }
            Stage::Verify => {
                let report = score_claims(result, &self.drafts.drafts, self.threshold);
                let rewrite = report.exceeds_threshold() && self.rewrites < self.max_rewrite_loops;
                self.report = Some(report.clone());
                if rewrite {
                    self.rewrite_phase(&report)
                } else {
                    self.finalize_phase()
                }
            }
            Stage::Rewrite => {
                self.drafts = merge_drafts(result, &self.drafts.drafts);
                self.verify_phase()
            }
            Stage::Finalize => {
                self.final_text = result.text_of(self.lead).map(|t| t.trim().to_string());
                self.stage = Stage::Done;
                Transition::Terminal(self.conclude())
            }
            Stage::Done => Transition::Terminal(self.conclude()),
        }
    }

    /// Without a finalized answer, fall back to the consensus draft with
    /// every flagged claim listed as uncertain.
    fn conclude(&self) -> Conclusion {
        let content = match &self.final_text {
            Some(text) => text.clone(),
            None => {
                let mut content = self.drafts.consensus_draft.clone();
                if let Some(report) = &self.report {
                    let flagged = report.claims_with(Verdict::Flagged);
                    if !flagged.is_empty() {
                        content.push_str("\n\n");
                        let lines: Vec<String> =
                            flagged.iter().map(|c| format!("[uncertain] {}", c)).collect();
                        content.push_str(&lines.join("\n"));
                    }
                }
                content
            }
        };
        Conclusion::new(content).with_rationale(self.rationale())
    }
}
