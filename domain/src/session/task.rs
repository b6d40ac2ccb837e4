//! Agent task outcomes and phase-level aggregates

use crate::orchestration::phase::PhaseKind;
use serde::{Deserialize, Serialize};

/// Lifecycle of a single agent call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Done,
    TimedOut,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Done => "done",
            TaskStatus::TimedOut => "timed_out",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text generated by an agent, with its usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub text: String,
    pub token_count: u32,
    /// Realized cost in dollars
    pub cost: f64,
}

impl Completion {
    pub fn new(text: impl Into<String>, token_count: u32, cost: f64) -> Self {
        Self {
            text: text.into(),
            token_count,
            cost,
        }
    }
}

/// Terminal record of one agent task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    /// Index of the agent in the session roster
    pub agent: usize,
    pub status: TaskStatus,
    pub completion: Option<Completion>,
    pub error: Option<String>,
    /// Calls made, including retries
    pub attempts: u32,
    pub elapsed_ms: u64,
}

impl TaskOutcome {
    pub fn done(agent: usize, completion: Completion, attempts: u32, elapsed_ms: u64) -> Self {
        Self {
            agent,
            status: TaskStatus::Done,
            completion: Some(completion),
            error: None,
            attempts,
            elapsed_ms,
        }
    }

    pub fn unsuccessful(
        agent: usize,
        status: TaskStatus,
        error: impl Into<String>,
        attempts: u32,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            agent,
            status,
            completion: None,
            error: Some(error.into()),
            attempts,
            elapsed_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Done && self.completion.is_some()
    }

    pub fn text(&self) -> Option<&str> {
        self.completion.as_ref().map(|c| c.text.as_str())
    }

    pub fn cost(&self) -> f64 {
        self.completion.as_ref().map_or(0.0, |c| c.cost)
    }
}

/// Phase-level collection of task outcomes
///
/// Outcomes are stored in completion order; the accessors below present
/// them by roster index so reductions stay deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    pub kind: PhaseKind,
    pub label: String,
    pub outcomes: Vec<TaskOutcome>,
}

impl AggregateResult {
    pub fn new(kind: PhaseKind, label: impl Into<String>, outcomes: Vec<TaskOutcome>) -> Self {
        Self {
            kind,
            label: label.into(),
            outcomes,
        }
    }

    /// Successful outcomes ordered by agent index
    pub fn successful(&self) -> Vec<&TaskOutcome> {
        let mut ok: Vec<&TaskOutcome> = self.outcomes.iter().filter(|o| o.is_success()).collect();
        ok.sort_by_key(|o| o.agent);
        ok
    }

    /// `(agent, text)` pairs of successful outcomes ordered by agent index
    pub fn texts(&self) -> Vec<(usize, &str)> {
        self.successful()
            .into_iter()
            .filter_map(|o| o.text().map(|t| (o.agent, t)))
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn text_of(&self, agent: usize) -> Option<&str> {
        self.outcomes
            .iter()
            .find(|o| o.agent == agent && o.is_success())
            .and_then(|o| o.text())
    }

    pub fn total_cost(&self) -> f64 {
        self.outcomes.iter().map(TaskOutcome::cost).sum()
    }

    pub fn count_with_status(&self, status: TaskStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}
