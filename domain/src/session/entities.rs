//! Session entity

use crate::core::agent::AgentRef;
use crate::core::question::Question;
use crate::orchestration::mode::Mode;
use crate::orchestration::phase::PhaseKind;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Lifecycle status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Completed,
    Partial,
    Aborted,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

/// One collaboration run (Entity)
///
/// Owned by a single coordinator for its whole lifetime. At most one
/// phase is active at a time; phases are numbered from zero in the order
/// they were dispatched.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    question: Question,
    mode: Mode,
    agents: Vec<AgentRef>,
    cost_cap: Option<f64>,
    deadline: Instant,
    phase_index: usize,
    active_phase: Option<PhaseKind>,
    status: SessionStatus,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        question: Question,
        mode: Mode,
        agents: Vec<AgentRef>,
        cost_cap: Option<f64>,
        global_timeout: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            question,
            mode,
            agents,
            cost_cap,
            deadline: Instant::now() + global_timeout,
            phase_index: 0,
            active_phase: None,
            status: SessionStatus::Running,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn agents(&self) -> &[AgentRef] {
        &self.agents
    }

    pub fn cost_cap(&self) -> Option<f64> {
        self.cost_cap
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Number of phases dispatched so far
    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn active_phase(&self) -> Option<PhaseKind> {
        self.active_phase
    }

    /// Time left before the global deadline (zero once it has passed)
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Mark a phase as active. Returns `false` if another phase is still active.
    pub fn begin_phase(&mut self, kind: PhaseKind) -> bool {
        if self.active_phase.is_some() {
            return false;
        }
        self.active_phase = Some(kind);
        true
    }

    pub fn end_phase(&mut self) {
        if self.active_phase.take().is_some() {
            self.phase_index += 1;
        }
    }

    pub fn finish(&mut self, status: SessionStatus) {
        self.active_phase = None;
        self.status = status;
    }
}
