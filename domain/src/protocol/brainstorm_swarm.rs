//! creative_brainstorm_swarm: ideate → fuse → vote → expand

use std::cmp::Reverse;

use super::{Conclusion, Protocol, Transition};
use crate::aggregate::{CandidateSet, fuse_ideas, merge_drafts, tally_votes};
use crate::orchestration::mode::Mode;
use crate::orchestration::phase::{CompletionParams, PhaseKind, PhaseSpec, TaskInput};
use crate::prompt::PromptTemplate;
use crate::quorum::{VoteTally, candidate_label};
use crate::session::task::AggregateResult;

const IDEATION_TEMPERATURE: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Ideate,
    Fuse,
    Vote,
    Expand,
    Done,
}

/// Solo ideation without critique, fusion of at least two ideas per
/// agent, a vote in which nobody may pick their own fusion, and an
/// expansion of the winning fusion by its author.
#[derive(Debug, Clone)]
pub struct BrainstormSwarm {
    question: String,
    agents: usize,
    stage: Stage,
    ideas: CandidateSet,
    fusions: CandidateSet,
    tally: Option<VoteTally>,
    winner: Option<usize>,
    expansion: Option<String>,
}

impl BrainstormSwarm {
    pub fn new(question: impl Into<String>, agents: usize) -> Self {
        Self {
            question: question.into(),
            agents,
            stage: Stage::Ideate,
            ideas: CandidateSet::default(),
            fusions: CandidateSet::default(),
            tally: None,
            winner: None,
            expansion: None,
        }
    }

    /// Top-voted fusion; ties go to the fusion drawing on more ideas, then
    /// to the lowest author index.
    fn pick_winner(&self) -> Option<usize> {
        if self.fusions.is_empty() {
            return None;
        }
        let tally = self
            .tally
            .clone()
            .unwrap_or_else(|| VoteTally::from_ballots(self.fusions.len(), Vec::new()));
        tally.leader_by(|i| {
            self.fusions
                .get(i)
                .map_or((Reverse(0), usize::MAX), |f| (Reverse(f.sources.len()), f.author))
        })
    }

    fn fuse_phase(&mut self) -> Transition {
        let ideas = self.ideas.render_all("Idea");
        let tasks = (0..self.agents)
            .map(|agent| {
                TaskInput::new(
                    agent,
                    PromptTemplate::ideate_system(),
                    PromptTemplate::fuse_prompt(&self.question, &ideas),
                )
            })
            .collect();
        self.stage = Stage::Fuse;
        Transition::Dispatch(PhaseSpec::new(PhaseKind::Fuse, "fuse", tasks))
    }

    fn vote_phase(&mut self) -> Transition {
        let tasks = (0..self.agents)
            .filter(|&agent| !self.fusions.options_for(agent).is_empty())
            .map(|agent| {
                TaskInput::new(
                    agent,
                    PromptTemplate::vote_system(),
                    PromptTemplate::vote_prompt(
                        &self.question,
                        "Fusion",
                        &self.fusions.render_for("Fusion", agent),
                        None,
                    ),
                )
            })
            .collect();
        self.stage = Stage::Vote;
        Transition::Dispatch(PhaseSpec::new(PhaseKind::Vote, "vote", tasks).with_min_successes(0))
    }

    /// Expand the winning fusion, or the only idea when fusion was impossible
    fn expand_phase(&mut self) -> Transition {
        self.winner = self.pick_winner();
        let target = match self.winner {
            Some(w) => self.fusions.get(w),
            None => self.ideas.get(0),
        };
        let Some(target) = target else {
            self.stage = Stage::Done;
            return Transition::Terminal(self.conclude());
        };
        let author = target.author;
        let prompt = PromptTemplate::expand_prompt(&self.question, target.text.trim());

        self.stage = Stage::Expand;
        Transition::Dispatch(PhaseSpec::new(
            PhaseKind::Synthesize,
            "expand",
            vec![TaskInput::new(author, PromptTemplate::synthesis_system(), prompt)],
        ))
    }

    fn expander(&self) -> Option<usize> {
        match self.winner {
            Some(w) => self.fusions.get(w).map(|f| f.author),
            None => self.ideas.get(0).map(|i| i.author),
        }
    }

    fn rationale(&self) -> String {
        let mut parts = vec![format!(
            "{} ideas, {} fusions",
            self.ideas.len(),
            self.fusions.len()
        )];
        if let Some(tally) = &self.tally {
            parts.push(format!("votes: {}", tally.summary()));
        }
        if let Some(w) = self.winner
            && let Some(fusion) = self.fusions.get(w)
        {
            let sources = fusion
                .sources
                .iter()
                .map(|&s| candidate_label(s))
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!(
                "expanded fusion {} (agent #{}, from ideas {})",
                candidate_label(w),
                fusion.author + 1,
                if sources.is_empty() { "-".to_string() } else { sources }
            ));
        }
        parts.join("; ")
    }
}

impl Protocol for BrainstormSwarm {
    fn mode(&self) -> Mode {
        Mode::CreativeBrainstormSwarm
    }

    fn start(&mut self) -> Transition {
        self.stage = Stage::Ideate;
        let tasks = (0..self.agents)
            .map(|agent| {
                TaskInput::new(
                    agent,
                    PromptTemplate::ideate_system(),
                    PromptTemplate::ideate_prompt(&self.question),
                )
                .with_params(CompletionParams::default().with_temperature(IDEATION_TEMPERATURE))
            })
            .collect();
        Transition::Dispatch(
            PhaseSpec::new(PhaseKind::Draft, "ideate", tasks).with_min_successes(self.agents.min(2)),
        )
    }

    fn advance(&mut self, result: &AggregateResult) -> Transition {
        match self.stage {
            Stage::Ideate => {
                self.ideas = merge_drafts(result, &CandidateSet::default()).drafts;
                if self.ideas.len() < 2 {
                    return self.expand_phase();
                }
                self.fuse_phase()
            }
            Stage::Fuse => {
                self.fusions = fuse_ideas(result, &self.ideas);
                if self.fusions.len() < 2 {
                    return self.expand_phase();
                }
                self.vote_phase()
            }
            Stage::Vote => {
                self.tally = Some(tally_votes(result, &self.fusions));
                self.expand_phase()
            }
            Stage::Expand => {
                self.expansion = self
                    .expander()
                    .and_then(|agent| result.text_of(agent))
                    .map(|t| t.trim().to_string());
                self.stage = Stage::Done;
                Transition::Terminal(self.conclude())
            }
            Stage::Done => Transition::Terminal(self.conclude()),
        }
    }

    fn conclude(&self) -> Conclusion {
        let content = self
            .expansion
            .clone()
            .or_else(|| {
                self.winner
                    .or_else(|| self.pick_winner())
                    .and_then(|w| self.fusions.get(w))
                    .or_else(|| self.ideas.get(0))
                    .map(|c| c.text.trim().to_string())
            })
            .unwrap_or_default();
        Conclusion::new(content).with_rationale(self.rationale())
    }
}
