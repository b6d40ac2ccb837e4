//! Progress events emitted while a session runs

use crate::session::task::TaskStatus;
use serde::{Deserialize, Serialize};

/// A progress event for live display
///
/// One `PhaseChange` is emitted per phase transition (including the final
/// transition to the terminal state) and one `AgentStatus` per agent task
/// status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    #[serde(rename_all = "camelCase")]
    PhaseChange {
        session_id: String,
        phase: String,
        /// Active agent set for the phase (empty on the terminal transition)
        agents: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    AgentStatus {
        session_id: String,
        phase: String,
        agent: String,
        status: TaskStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl ProgressEvent {
    pub fn phase_change(
        session_id: impl Into<String>,
        phase: impl Into<String>,
        agents: Vec<String>,
    ) -> Self {
        ProgressEvent::PhaseChange {
            session_id: session_id.into(),
            phase: phase.into(),
            agents,
            message: None,
        }
    }

    pub fn agent_status(
        session_id: impl Into<String>,
        phase: impl Into<String>,
        agent: impl Into<String>,
        status: TaskStatus,
    ) -> Self {
        ProgressEvent::AgentStatus {
            session_id: session_id.into(),
            phase: phase.into(),
            agent: agent.into(),
            status,
            message: None,
        }
    }

    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            ProgressEvent::PhaseChange { message, .. }
            | ProgressEvent::AgentStatus { message, .. } => *message = Some(text.into()),
        }
        self
    }

    pub fn session_id(&self) -> &str {
        match self {
            ProgressEvent::PhaseChange { session_id, .. }
            | ProgressEvent::AgentStatus { session_id, .. } => session_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            ProgressEvent::PhaseChange { .. } => "phase_change",
            ProgressEvent::AgentStatus { .. } => "agent_status",
        }
    }
}
