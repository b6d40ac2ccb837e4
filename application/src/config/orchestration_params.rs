//! Orchestration parameters: session and phase control.
//!
//! [`OrchestrationParams`] groups the static parameters that control how
//! [`SessionCoordinator`](crate::use_cases::run_session::SessionCoordinator)
//! and [`PhaseExecutor`](crate::use_cases::execute_phase::PhaseExecutor)
//! run a session. Per-request values (cost cap, timeout override) come with
//! the request instead.

use council_domain::{ProtocolParams, QuorumRule};
use std::time::Duration;

/// Session and phase control parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationParams {
    /// Global deadline of a session unless the request overrides it
    pub global_timeout: Duration,
    /// Optional cap on a single phase (phases otherwise get all remaining time)
    pub phase_timeout: Option<Duration>,
    /// Successful agents required for a `completed` result
    pub quorum: QuorumRule,
    /// Flagged-claim ratio that triggers a validated consensus rewrite
    pub flagged_ratio_threshold: f64,
    /// Retries for transient agent errors (after the first attempt)
    pub max_retries: u32,
    /// Backoff before the first retry; doubles on every further retry
    pub backoff_base: Duration,
    /// Agent calls in flight at once across every session sharing an executor
    pub max_in_flight: usize,
    /// Ideas kept after the braintrust ranking pass
    pub rank_survivors: usize,
}

impl Default for OrchestrationParams {
    fn default() -> Self {
        Self {
            global_timeout: Duration::from_millis(13_000),
            phase_timeout: None,
            quorum: QuorumRule::default(),
            flagged_ratio_threshold: 0.04,
            max_retries: 2,
            backoff_base: Duration::from_millis(200),
            max_in_flight: 16,
            rank_survivors: 3,
        }
    }
}

impl OrchestrationParams {
    // ==================== Builder Methods ====================

    pub fn with_global_timeout(mut self, timeout: Duration) -> Self {
        self.global_timeout = timeout;
        self
    }

    pub fn with_phase_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.phase_timeout = timeout;
        self
    }

    pub fn with_quorum(mut self, quorum: QuorumRule) -> Self {
        self.quorum = quorum;
        self
    }

    pub fn with_flagged_ratio_threshold(mut self, threshold: f64) -> Self {
        self.flagged_ratio_threshold = threshold;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max;
        self
    }

    pub fn with_rank_survivors(mut self, survivors: usize) -> Self {
        self.rank_survivors = survivors;
        self
    }

    /// Tunables handed to the protocol state machines
    pub fn protocol_params(&self) -> ProtocolParams {
        ProtocolParams::default()
            .with_flagged_ratio_threshold(self.flagged_ratio_threshold)
            .with_rank_survivors(self.rank_survivors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = OrchestrationParams::default();
        assert_eq!(params.global_timeout, Duration::from_secs(13));
        assert_eq!(params.quorum, QuorumRule::AtLeast(3));
        assert_eq!(params.max_retries, 2);
        assert!((params.flagged_ratio_threshold - 0.04).abs() < f64::EPSILON);
    }

    #[test]
    fn test_protocol_params_clamp_survivors() {
        let params = OrchestrationParams::default()
            .with_rank_survivors(10)
            .with_flagged_ratio_threshold(0.1);
        let protocol = params.protocol_params();
        assert_eq!(protocol.rank_survivors, 5);
        assert!((protocol.flagged_ratio_threshold - 0.1).abs() < f64::EPSILON);
    }
}
