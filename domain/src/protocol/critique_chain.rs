//! sequential_critique_chain: each agent amends the previous agent's version

use super::{Conclusion, Protocol, Transition};
use crate::aggregate::{ChainSummary, summarize_chain};
use crate::orchestration::mode::Mode;
use crate::orchestration::phase::{CompletionParams, CritiqueStyle, PhaseKind, PhaseSpec, TaskInput};
use crate::prompt::PromptTemplate;
use crate::session::task::AggregateResult;

/// Strictly ordered single-agent phases followed by a synthesis of the
/// chain's evolution.
///
/// Agent 0 writes the first version; agent *i* receives only the latest
/// version (verbatim) and a critique style picked by its position. A failed
/// step is skipped and the next agent amends the last version that exists.
#[derive(Debug, Clone)]
pub struct CritiqueChain {
    question: String,
    agents: usize,
    /// Next agent to take a turn; equal to `agents` once the chain is walked
    next: usize,
    chain: ChainSummary,
    /// Author of the latest version; it writes the closing synthesis
    lead: Option<usize>,
    synthesis: Option<String>,
    done: bool,
}

impl CritiqueChain {
    pub fn new(question: impl Into<String>, agents: usize) -> Self {
        Self {
            question: question.into(),
            agents,
            next: 0,
            chain: ChainSummary::default(),
            lead: None,
            synthesis: None,
            done: false,
        }
    }

    /// Phase for the agent whose turn it is, or the closing synthesis
    fn next_phase(&mut self) -> Transition {
        if self.next >= self.agents {
            return self.synthesis_phase();
        }
        let agent = self.next;
        self.next += 1;

        let spec = match self.chain.latest() {
            None => PhaseSpec::new(
                PhaseKind::Draft,
                format!("draft {}/{}", agent + 1, self.agents),
                vec![TaskInput::new(
                    agent,
                    PromptTemplate::draft_system(),
                    PromptTemplate::draft_prompt(&self.question),
                )],
            ),
            Some(previous) => {
                let style = CritiqueStyle::for_position(agent);
                PhaseSpec::new(
                    PhaseKind::Critique,
                    format!("amend {}/{}", agent + 1, self.agents),
                    vec![
                        TaskInput::new(
                            agent,
                            PromptTemplate::chain_system(style),
                            PromptTemplate::chain_amend_prompt(&self.question, &previous.text, style),
                        )
                        .with_params(CompletionParams::default().with_critique_style(style)),
                    ],
                )
            }
        };
        Transition::Dispatch(spec)
    }

    fn synthesis_phase(&mut self) -> Transition {
        let Some(latest) = self.chain.latest() else {
            self.done = true;
            return Transition::Terminal(self.conclude());
        };
        // A single link has nothing to summarize
        if self.chain.links.len() < 2 {
            self.done = true;
            return Transition::Terminal(self.conclude());
        }

        let prompt =
            PromptTemplate::chain_synthesis_prompt(&self.question, &self.chain.evolution, &latest.text);
        let lead = latest.agent;
        self.lead = Some(lead);
        Transition::Dispatch(PhaseSpec::new(
            PhaseKind::Synthesize,
            "synthesize",
            vec![TaskInput::new(lead, PromptTemplate::synthesis_system(), prompt)],
        ))
    }
}

impl Protocol for CritiqueChain {
    fn mode(&self) -> Mode {
        Mode::SequentialCritiqueChain
    }

    fn start(&mut self) -> Transition {
        self.next = 0;
        self.next_phase()
    }

    fn advance(&mut self, result: &AggregateResult) -> Transition {
        if self.done {
            return Transition::Terminal(self.conclude());
        }
        if let Some(lead) = self.lead {
            self.synthesis = result.text_of(lead).map(|t| t.trim().to_string());
            self.done = true;
            return Transition::Terminal(self.conclude());
        }
        self.chain = summarize_chain(result, &self.chain.links);
        self.next_phase()
    }

    fn conclude(&self) -> Conclusion {
        let content = self
            .synthesis
            .clone()
            .or_else(|| self.chain.latest().map(|l| l.text.clone()))
            .unwrap_or_default();
        Conclusion::new(content).with_rationale(self.chain.evolution.clone())
    }

    /// Draft and amend steps may be skipped; the synthesis may not
    fn has_degraded_path(&self, spec: &PhaseSpec) -> bool {
        matches!(spec.kind, PhaseKind::Draft | PhaseKind::Critique)
    }
}
