//! Final result handed back to the caller

use crate::orchestration::phase::PhaseKind;
use crate::session::task::TaskStatus;
use serde::{Deserialize, Serialize};

/// Outcome status reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Completed,
    Partial,
    Aborted,
}

impl FinalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalStatus::Completed => "completed",
            FinalStatus::Partial => "partial",
            FinalStatus::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What one agent produced in one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseOutput {
    pub phase: String,
    pub kind: PhaseKind,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub token_count: u32,
    pub cost: f64,
}

/// Everything one agent did during the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTrace {
    pub agent: String,
    pub phase_outputs: Vec<PhaseOutput>,
}

impl AgentTrace {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            phase_outputs: Vec::new(),
        }
    }

    pub fn successes(&self) -> usize {
        self.phase_outputs
            .iter()
            .filter(|o| o.status == TaskStatus::Done)
            .count()
    }
}

/// Reconciled answer of a session plus its per-agent trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub session_id: String,
    pub mode: String,
    pub status: FinalStatus,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub per_agent_trace: Vec<AgentTrace>,
    pub cost_actual: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
}

impl FinalResult {
    pub fn is_completed(&self) -> bool {
        self.status == FinalStatus::Completed
    }

    pub fn trace_for(&self, agent: &str) -> Option<&AgentTrace> {
        self.per_agent_trace.iter().find(|t| t.agent == agent)
    }
}
