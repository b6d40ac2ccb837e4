//! hybrid_guarded_braintrust: ideate → rank → verify survivors → elaborate

use super::{Conclusion, Protocol, Transition};
use crate::aggregate::{
    CandidateSet, ClaimReport, Ranking, merge_drafts, rank_candidates, score_claims,
};
use crate::orchestration::mode::Mode;
use crate::orchestration::phase::{CompletionParams, PhaseKind, PhaseSpec, TaskInput};
use crate::prompt::PromptTemplate;
use crate::quorum::{Verdict, candidate_label};
use crate::session::task::AggregateResult;

const IDEATION_TEMPERATURE: f32 = 0.9;
const NEUTRAL_SCORE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Ideate,
    Rank,
    Verify,
    Elaborate,
    Done,
}

/// Creative ideation guarded by a fact check: the best ranked ideas are
/// verified and the one with the highest combined creativity and
/// verification score is elaborated into the answer.
#[derive(Debug, Clone)]
pub struct GuardedBraintrust {
    question: String,
    agents: usize,
    survivors_kept: usize,
    threshold: f64,
    stage: Stage,
    ideas: CandidateSet,
    ranking: Option<Ranking>,
    survivors: Vec<usize>,
    report: Option<ClaimReport>,
    best: Option<usize>,
    elaboration: Option<String>,
}

impl GuardedBraintrust {
    pub fn new(question: impl Into<String>, agents: usize, survivors_kept: usize, threshold: f64) -> Self {
        Self {
            question: question.into(),
            agents,
            survivors_kept,
            threshold,
            stage: Stage::Ideate,
            ideas: CandidateSet::default(),
            ranking: None,
            survivors: Vec::new(),
            report: None,
            best: None,
            elaboration: None,
        }
    }

    /// Creativity (mean rank score scaled to 0..1) plus verification score
    /// (share of the idea's claims not flagged, 0.5 when unchecked)
    pub fn combined_score(&self, idea: usize) -> f64 {
        let creativity = self
            .ranking
            .as_ref()
            .and_then(|r| r.score_of(idea))
            .unwrap_or(NEUTRAL_SCORE)
            / 10.0;
        let verification = self
            .report
            .as_ref()
            .map_or(0.5, |r| r.verification_score(idea));
        creativity + verification
    }

    /// Survivor with the best combined score; ties keep rank order
    fn pick_best(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &idea in &self.survivors {
            let score = self.combined_score(idea);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((idea, score));
            }
        }
        best.map(|(idea, _)| idea)
    }

    fn rank_phase(&mut self) -> Transition {
        let tasks: Vec<TaskInput> = (0..self.agents)
            .filter(|&agent| !self.ideas.options_for(agent).is_empty())
            .map(|agent| {
                TaskInput::new(
                    agent,
                    PromptTemplate::rank_system(),
                    PromptTemplate::rank_prompt(&self.question, &self.ideas.render_for("Idea", agent)),
                )
            })
            .collect();
        if self.ideas.len() < 2 || tasks.is_empty() {
            self.survivors = (0..self.ideas.len()).collect();
            return self.verify_phase();
        }
        self.stage = Stage::Rank;
        Transition::Dispatch(PhaseSpec::new(PhaseKind::Rank, "rank", tasks).with_min_successes(0))
    }

    fn verify_phase(&mut self) -> Transition {
        if self.survivors.is_empty() {
            self.stage = Stage::Done;
            return Transition::Terminal(self.conclude());
        }
        // Nobody checks their own idea
        let tasks: Vec<TaskInput> = (0..self.agents)
            .filter_map(|agent| {
                let checked: Vec<usize> = self
                    .survivors
                    .iter()
                    .copied()
                    .filter(|&i| self.ideas.get(i).is_some_and(|idea| idea.author != agent))
                    .collect();
                (!checked.is_empty()).then(|| {
                    TaskInput::new(
                        agent,
                        PromptTemplate::verify_system(),
                        PromptTemplate::verify_prompt(
                            &self.question,
                            &self.ideas.render("Idea", &checked),
                        ),
                    )
                })
            })
            .collect();
        if tasks.is_empty() {
            return self.elaborate_phase();
        }
        self.stage = Stage::Verify;
        Transition::Dispatch(
            PhaseSpec::new(PhaseKind::Verify, "verify survivors", tasks).with_min_successes(0),
        )
    }

    fn elaborate_phase(&mut self) -> Transition {
        self.best = self.pick_best();
        let Some(idea) = self.best.and_then(|b| self.ideas.get(b)) else {
            self.stage = Stage::Done;
            return Transition::Terminal(self.conclude());
        };
        let flagged: Vec<&str> = self
            .report
            .as_ref()
            .map(|r| {
                r.verdicts
                    .iter()
                    .filter(|v| v.verdict == Verdict::Flagged && v.candidate == self.best)
                    .map(|v| v.claim.as_str())
                    .collect()
            })
            .unwrap_or_default();
        let author = idea.author;
        let prompt = PromptTemplate::elaborate_prompt(&self.question, idea.text.trim(), &flagged);

        self.stage = Stage::Elaborate;
        Transition::Dispatch(PhaseSpec::new(
            PhaseKind::Synthesize,
            "elaborate",
            vec![TaskInput::new(author, PromptTemplate::synthesis_system(), prompt)],
        ))
    }

    fn rationale(&self) -> String {
        let mut parts = vec![format!("{} ideas", self.ideas.len())];
        if !self.survivors.is_empty() {
            let survivors = self
                .survivors
                .iter()
                .map(|&i| format!("{}={:.2}", candidate_label(i), self.combined_score(i)))
                .collect::<Vec<_>>()
                .join(" ");
            parts.push(format!("survivors (combined score): {}", survivors));
        }
        if let Some(report) = &self.report {
            parts.push(format!(
                "{} of {} claims flagged",
                report.count(Verdict::Flagged),
                report.total()
            ));
        }
        if let Some(best) = self.best
            && let Some(idea) = self.ideas.get(best)
        {
            parts.push(format!(
                "elaborated idea {} (agent #{})",
                candidate_label(best),
                idea.author + 1
            ));
        }
        parts.join("; ")
    }
}

impl Protocol for GuardedBraintrust {
    fn mode(&self) -> Mode {
        Mode::HybridGuardedBraintrust
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
        Transition::Dispatch(PhaseSpec::new(PhaseKind::Draft, "ideate", tasks))
    }

    fn advance(&mut self, result: &AggregateResult) -> Transition {
        match self.stage {
            Stage::Ideate => {
                self.ideas = merge_drafts(result, &CandidateSet::default()).drafts;
                self.rank_phase()
            }
            Stage::Rank => {
                let ranking = rank_candidates(result, &self.ideas);
                self.survivors = ranking.top(self.survivors_kept);
                self.ranking = Some(ranking);
                self.verify_phase()
            }
            Stage::Verify => {
                self.report = Some(score_claims(result, &self.ideas, self.threshold));
                self.elaborate_phase()
            }
            Stage::Elaborate => {
                let author = self.best.and_then(|b| self.ideas.get(b)).map(|i| i.author);
                self.elaboration = author
                    .and_then(|agent| result.text_of(agent))
                    .map(|t| t.trim().to_string());
                self.stage = Stage::Done;
                Transition::Terminal(self.conclude())
            }
            Stage::Done => Transition::Terminal(self.conclude()),
        }
    }

    fn conclude(&self) -> Conclusion {
        let fallback = || {
            self.best
                .or_else(|| self.pick_best())
                .or_else(|| self.ranking.as_ref().and_then(|r| r.top(1).first().copied()))
                .and_then(|i| self.ideas.get(i))
                .or_else(|| self.ideas.get(0))
                .map(|idea| idea.text.trim().to_string())
        };
        let content = self
            .elaboration
            .clone()
            .or_else(fallback)
            .unwrap_or_default();
        Conclusion::new(content).with_rationale(self.rationale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_support::{expect_dispatch, run};

    #[test]
    fn test_rank_then_verify_top_survivors() {
        let mut bt = GuardedBraintrust::new("Q?", 4, 3, 0.04);
        let ideate = expect_dispatch(bt.start());
        let rank = expect_dispatch(bt.advance(&run(&ideate, |a, _| Some(format!("idea {a}")))));
        assert_eq!(rank.kind, PhaseKind::Rank);
        assert!(!rank.tasks[0].prompt.contains("idea 0"));

        // D scores lowest and is cut
        let verify = expect_dispatch(bt.advance(&run(&rank, |_, _| {
            Some("SCORE A: 8\nSCORE B: 7\nSCORE C: 6\nSCORE D: 2".into())
        })));
        assert_eq!(verify.kind, PhaseKind::Verify);
        assert!(verify.tasks[1].prompt.contains("idea 0"));
        assert!(verify.tasks[1].prompt.contains("idea 2"));
        assert!(!verify.tasks[1].prompt.contains("idea 3"));
    }

    #[test]
    fn test_survivors_are_not_self_verified() {
        let mut bt = GuardedBraintrust::new("Q?", 3, 3, 0.04);
        let ideate = expect_dispatch(bt.start());
        let rank = expect_dispatch(bt.advance(&run(&ideate, |a, _| Some(format!("idea {a}")))));
        let verify = expect_dispatch(bt.advance(&run(&rank, |_, _| {
            Some("SCORE A: 8\nSCORE B: 7\nSCORE C: 6".into())
        })));
        for task in &verify.tasks {
            assert!(!task.prompt.contains(&format!("idea {}", task.agent)));
        }

        // The author vouches for its own idea; both other agents flag it
        let elaborate = expect_dispatch(bt.advance(&run(&verify, |a, _| {
            Some(if a == 0 { "VERIFIED [A]: x\nVERIFIED [A]: y" } else { "FLAGGED [A]: x" }.into())
        })));
        assert!(bt.combined_score(0) < bt.combined_score(1));
        assert_ne!(elaborate.active_agents(), vec![0]);
    }

    #[test]
    fn test_flagged_leader_loses_to_verified_runner_up() {
        let mut bt = GuardedBraintrust::new("Q?", 4, 3, 0.04);
        let ideate = expect_dispatch(bt.start());
        let rank = expect_dispatch(bt.advance(&run(&ideate, |a, _| Some(format!("idea {a}")))));
        let verify = expect_dispatch(bt.advance(&run(&rank, |_, _| {
            Some("SCORE A: 8\nSCORE B: 7\nSCORE C: 6\nSCORE D: 2".into())
        })));
        let elaborate = expect_dispatch(bt.advance(&run(&verify, |_, _| {
            Some("FLAGGED [A]: perpetual motion\nVERIFIED [B]: solar panels exist".into())
        })));
        assert_eq!(elaborate.label, "elaborate");
        assert_eq!(elaborate.active_agents(), vec![1]);
        assert!(elaborate.tasks[0].prompt.contains("idea 1"));
        assert!(bt.combined_score(1) > bt.combined_score(0));

        match bt.advance(&run(&elaborate, |_, _| Some("elaborated".into()))) {
            Transition::Terminal(c) => {
                assert_eq!(c.content, "elaborated");
                assert!(c.rationale.unwrap().contains("elaborated idea B"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_single_idea_skips_ranking() {
        let mut bt = GuardedBraintrust::new("Q?", 3, 3, 0.04);
        let ideate = expect_dispatch(bt.start());
        let verify =
            expect_dispatch(bt.advance(&run(&ideate, |a, _| (a == 1).then(|| "only".into()))));
        assert_eq!(verify.kind, PhaseKind::Verify);
    }

    #[test]
    fn test_forced_conclusion_uses_top_ranked_idea() {
        let mut bt = GuardedBraintrust::new("Q?", 3, 3, 0.04);
        let ideate = expect_dispatch(bt.start());
        let rank = expect_dispatch(bt.advance(&run(&ideate, |a, _| Some(format!("idea {a}")))));
        bt.advance(&run(&rank, |_, _| Some("SCORE C: 9\nSCORE B: 4".into())));
        assert_eq!(bt.conclude().content, "idea 2");
    }
}
