//! round_table: draft → critique → vote → synthesize

use super::{Conclusion, Protocol, Transition};
use crate::aggregate::{
    CandidateSet, CritiqueSummary, MergedDrafts, collect_critiques, merge_drafts, tally_votes,
};
use crate::orchestration::mode::Mode;
use crate::orchestration::phase::{PhaseKind, PhaseSpec, TaskInput};
use crate::prompt::PromptTemplate;
use crate::quorum::{VoteTally, candidate_label};
use crate::session::task::AggregateResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Draft,
    Critique,
    Vote,
    Synthesize,
    Done,
}

/// Every agent drafts, reviews the others, votes, and the author of the
/// winning draft merges the result.
#[derive(Debug, Clone)]
pub struct RoundTable {
    question: String,
    agents: usize,
    stage: Stage,
    drafts: MergedDrafts,
    critiques: CritiqueSummary,
    tally: Option<VoteTally>,
    winner: Option<usize>,
    synthesis: Option<String>,
}

impl RoundTable {
    pub fn new(question: impl Into<String>, agents: usize) -> Self {
        Self {
            question: question.into(),
            agents,
            stage: Stage::Draft,
            drafts: MergedDrafts {
                drafts: CandidateSet::default(),
                consensus_draft: String::new(),
            },
            critiques: CritiqueSummary::default(),
            tally: None,
            winner: None,
            synthesis: None,
        }
    }

    /// Winning draft index: most votes, then fewest critique flags, then
    /// lowest author index.
    fn pick_winner(&self) -> Option<usize> {
        let drafts = &self.drafts.drafts;
        if drafts.is_empty() {
            return None;
        }
        let tally = self
            .tally
            .clone()
            .unwrap_or_else(|| VoteTally::from_ballots(drafts.len(), Vec::new()));
        tally.leader_by(|i| {
            (
                self.critiques.flags_for(i),
                drafts.get(i).map_or(usize::MAX, |d| d.author),
            )
        })
    }

    fn critique_phase(&self) -> PhaseSpec {
        let tasks = (0..self.agents)
            .filter(|&agent| !self.drafts.drafts.options_for(agent).is_empty())
            .map(|agent| {
                TaskInput::new(
                    agent,
                    PromptTemplate::critique_system(),
                    PromptTemplate::critique_prompt(
                        &self.question,
                        &self.drafts.drafts.render_for("Draft", agent),
                    ),
                )
            })
            .collect();
        PhaseSpec::new(PhaseKind::Critique, "critique", tasks).with_min_successes(0)
    }

    fn vote_phase(&self) -> PhaseSpec {
        let notes = self
            .critiques
            .issues
            .iter()
            .map(|(i, issue)| format!("- Draft {}: {}", candidate_label(*i), issue))
            .collect::<Vec<_>>()
            .join("\n");
        let tasks = (0..self.agents)
            .filter(|&agent| !self.drafts.drafts.options_for(agent).is_empty())
            .map(|agent| {
                TaskInput::new(
                    agent,
                    PromptTemplate::vote_system(),
                    PromptTemplate::vote_prompt(
                        &self.question,
                        "Draft",
                        &self.drafts.drafts.render_for("Draft", agent),
                        Some(notes.as_str()),
                    ),
                )
            })
            .collect();
        PhaseSpec::new(PhaseKind::Vote, "vote", tasks).with_min_successes(0)
    }

    fn synthesize_phase(&mut self) -> Transition {
        self.winner = self.pick_winner();
        let Some(winner) = self.winner else {
            return Transition::Terminal(self.conclude());
        };
        let drafts = &self.drafts.drafts;
        let Some(lead) = drafts.get(winner) else {
            return Transition::Terminal(self.conclude());
        };

        let others: Vec<usize> = (0..drafts.len()).filter(|&i| i != winner).collect();
        let issues: Vec<String> = self
            .critiques
            .issues_for(winner)
            .map(str::to_string)
            .collect();
        let prompt = PromptTemplate::round_table_synthesis_prompt(
            &self.question,
            lead.text.trim(),
            &drafts.render("Draft", &others),
            &issues,
        );
        let author = lead.author;

        self.stage = Stage::Synthesize;
        Transition::Dispatch(PhaseSpec::new(
            PhaseKind::Synthesize,
            "synthesize",
            vec![TaskInput::new(
                author,
                PromptTemplate::synthesis_system(),
                prompt,
            )],
        ))
    }

    fn rationale(&self) -> String {
        let mut lines = Vec::new();
        let drafts = &self.drafts.drafts;
        if !drafts.is_empty() {
            lines.push(format!("{} drafts considered", drafts.len()));
        }
        if let Some(tally) = &self.tally {
            lines.push(format!("votes: {}", tally.summary()));
        }
        if !self.critiques.issues.is_empty() {
            let flags = (0..drafts.len())
                .map(|i| format!("{}:{}", candidate_label(i), self.critiques.flags_for(i)))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(format!("critique flags: {}", flags));
        }
        if let Some(winner) = self.winner
            && let Some(draft) = drafts.get(winner)
        {
            lines.push(format!(
                "selected draft {} (agent #{})",
                candidate_label(winner),
                draft.author + 1
            ));
        }
        lines.join("; ")
    }
}

impl Protocol for RoundTable {
    fn mode(&self) -> Mode {
        Mode::RoundTable
    }

    fn start(&mut self) -> Transition {
        self.stage = Stage::Draft;
        let tasks = (0..self.agents)
            .map(|agent| {
                TaskInput::new(
                    agent,
                    PromptTemplate::draft_system(),
                    PromptTemplate::draft_prompt(&self.question),
                )
            })
            .collect();
        Transition::Dispatch(PhaseSpec::new(PhaseKind::Draft, "draft", tasks))
    }

    fn advance(&mut self, result: &AggregateResult) -> Transition {
        match self.stage {
            Stage::Draft => {
                self.drafts = merge_drafts(result, &CandidateSet::default());
                if self.drafts.drafts.len() < 2 {
                    return self.synthesize_phase();
                }
                self.stage = Stage::Critique;
                Transition::Dispatch(self.critique_phase())
            }
            Stage::Critique => {
                self.critiques = collect_critiques(result, &self.drafts.drafts);
                self.stage = Stage::Vote;
                Transition::Dispatch(self.vote_phase())
            }
            Stage::Vote => {
                self.tally = Some(tally_votes(result, &self.drafts.drafts));
                self.synthesize_phase()
            }
            Stage::Synthesize => {
                let lead = self
                    .winner
                    .and_then(|w| self.drafts.drafts.get(w))
                    .map(|d| d.author);
                self.synthesis = lead
                    .and_then(|agent| result.text_of(agent))
                    .map(|text| text.trim().to_string());
                self.stage = Stage::Done;
                Transition::Terminal(self.conclude())
            }
            Stage::Done => Transition::Terminal(self.conclude()),
        }
    }

    fn conclude(&self) -> Conclusion {
        let drafts = &self.drafts.drafts;
        let content = self
            .synthesis
            .clone()
            .or_else(|| {
                self.winner
                    .or_else(|| self.pick_winner())
                    .and_then(|w| drafts.get(w))
                    .map(|d| d.text.trim().to_string())
            })
            .unwrap_or_default();
        Conclusion::new(content).with_rationale(self.rationale())
    }
}
