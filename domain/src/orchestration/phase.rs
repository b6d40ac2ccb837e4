//! Phase specification types
//!
//! A [`PhaseSpec`] is what a protocol state machine hands to the phase
//! executor: one [`TaskInput`] per active agent plus the minimum number of
//! successes the protocol needs from the round.

use serde::{Deserialize, Serialize};

/// Kind of a phase within a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Independent first answers (also used for solo ideation)
    Draft,
    /// Review of other agents' drafts, or an amend step in a chain
    Critique,
    /// Ballot over a candidate set
    Vote,
    /// Factual claim checking
    Verify,
    /// Rewrite addressing flagged claims
    Rewrite,
    /// Merge two or more ideas into a new one
    Fuse,
    /// Quick scoring pass over candidates
    Rank,
    /// Single-agent reduction into the final answer
    Synthesize,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Draft => "draft",
            PhaseKind::Critique => "critique",
            PhaseKind::Vote => "vote",
            PhaseKind::Verify => "verify",
            PhaseKind::Rewrite => "rewrite",
            PhaseKind::Fuse => "fuse",
            PhaseKind::Rank => "rank",
            PhaseKind::Synthesize => "synthesize",
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stance an agent takes when amending the previous link of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CritiqueStyle {
    Agree,
    Balanced,
    Disagree,
}

impl CritiqueStyle {
    /// Style for the agent at a given chain position (cycles agree → balanced → disagree)
    pub fn for_position(position: usize) -> Self {
        match position % 3 {
            0 => CritiqueStyle::Agree,
            1 => CritiqueStyle::Balanced,
            _ => CritiqueStyle::Disagree,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CritiqueStyle::Agree => "agree",
            CritiqueStyle::Balanced => "balanced",
            CritiqueStyle::Disagree => "disagree",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            CritiqueStyle::Agree => {
                "Build on the previous version: keep its structure and strengthen its best points."
            }
            CritiqueStyle::Balanced => {
                "Weigh the previous version fairly: keep what is right, fix what is weak."
            }
            CritiqueStyle::Disagree => {
                "Challenge the previous version: question its assumptions and correct its mistakes."
            }
        }
    }
}

/// Generation parameters forwarded to the agent client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critique_style: Option<CritiqueStyle>,
}

impl CompletionParams {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_critique_style(mut self, style: CritiqueStyle) -> Self {
        self.critique_style = Some(style);
        self
    }
}

/// Input of one agent call within a phase
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInput {
    /// Index of the agent in the session roster
    pub agent: usize,
    pub system_prompt: String,
    pub prompt: String,
    pub params: CompletionParams,
}

impl TaskInput {
    pub fn new(agent: usize, system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            agent,
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            params: CompletionParams::default(),
        }
    }

    pub fn with_params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }
}

/// One round of concurrent agent calls requested by a protocol
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSpec {
    pub kind: PhaseKind,
    /// Human-readable name, e.g. `ideate` or `amend 2/3`
    pub label: String,
    pub tasks: Vec<TaskInput>,
    /// Successful tasks the protocol needs for the round to count
    pub min_successes: usize,
}

impl PhaseSpec {
    /// Create a phase that counts once a single task succeeds.
    /// Use [`PhaseSpec::with_min_successes`] to demand more.
    pub fn new(kind: PhaseKind, label: impl Into<String>, tasks: Vec<TaskInput>) -> Self {
        Self {
            kind,
            label: label.into(),
            min_successes: 1,
            tasks,
        }
    }

    pub fn with_min_successes(mut self, min: usize) -> Self {
        self.min_successes = min;
        self
    }

    /// Agent indices dispatched in this phase, in task order
    pub fn active_agents(&self) -> Vec<usize> {
        self.tasks.iter().map(|t| t.agent).collect()
    }
}
