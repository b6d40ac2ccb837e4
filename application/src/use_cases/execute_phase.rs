//! Execute Phase use case
//!
//! Runs one phase: a bounded-concurrency fan-out of agent calls with
//! per-call timeouts, retries for transient failures, and cancellation at
//! the phase deadline or on caller abort.
//!
//! # Admission
//!
//! Every call holds a permit of a shared [`Semaphore`] while it is in
//! flight. Clones of a [`PhaseExecutor`] share the semaphore, so the limit
//! holds across all sessions driven by the same executor. Permits are
//! released between attempts so backoff sleeps do not occupy a slot.
//!
//! # Termination
//!
//! [`PhaseExecutor::execute`] returns once every task is terminal or the
//! phase deadline passes, whichever comes first. Tasks still running at the
//! deadline are aborted and recorded `timed_out`; on caller abort they are
//! recorded `cancelled`. Results of tasks that already finished are kept.

use crate::config::OrchestrationParams;
use crate::ports::agent_client::{Agent, AgentError};
use crate::ports::event_publisher::EventPublisher;
use council_domain::{
    AggregateResult, PhaseSpec, ProgressEvent, TaskInput, TaskOutcome, TaskStatus,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that indicate a malformed phase (programming errors)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutePhaseError {
    #[error("Phase '{0}' has no active agents")]
    EmptyPhase(String),

    #[error("Phase '{phase}' names unknown agent #{agent}")]
    UnknownAgent { phase: String, agent: usize },

    #[error("Phase '{phase}' assigns agent #{agent} more than one task")]
    DuplicateAgent { phase: String, agent: usize },
}

/// Retry policy for transient agent errors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given (1-based) failed attempt
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1 << exponent)
    }
}

/// Everything a phase needs from the session running it
pub struct PhaseContext<'a> {
    pub session_id: &'a str,
    /// Session roster; task inputs refer to agents by index into it
    pub agents: &'a [Agent],
    /// Hard stop for the phase
    pub deadline: Instant,
    /// Session token; cancelled only on caller abort
    pub cancel: &'a CancellationToken,
    pub publisher: &'a dyn EventPublisher,
}

/// Runs phases under a shared admission limit
#[derive(Clone)]
pub struct PhaseExecutor {
    admission: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl PhaseExecutor {
    /// Create an executor allowing `max_in_flight` concurrent agent calls
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            admission: Arc::new(Semaphore::new(max_in_flight.max(1))),
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_params(params: &OrchestrationParams) -> Self {
        Self::new(params.max_in_flight).with_retry_policy(RetryPolicy {
            max_retries: params.max_retries,
            backoff_base: params.backoff_base,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Permits currently free in the shared admission semaphore
    pub fn available_permits(&self) -> usize {
        self.admission.available_permits()
    }

    /// Run every task of `spec` concurrently and collect the outcomes.
    ///
    /// Individual task failures never fail the phase; only a malformed
    /// phase (no tasks, unknown or repeated agent index) is an error.
    pub async fn execute(
        &self,
        ctx: &PhaseContext<'_>,
        spec: &PhaseSpec,
    ) -> Result<AggregateResult, ExecutePhaseError> {
        if spec.tasks.is_empty() {
            return Err(ExecutePhaseError::EmptyPhase(spec.label.clone()));
        }
        if let Some(task) = spec.tasks.iter().find(|t| t.agent >= ctx.agents.len()) {
            return Err(ExecutePhaseError::UnknownAgent {
                phase: spec.label.clone(),
                agent: task.agent,
            });
        }
        let mut seen = HashSet::with_capacity(spec.tasks.len());
        if let Some(task) = spec.tasks.iter().find(|t| !seen.insert(t.agent)) {
            return Err(ExecutePhaseError::DuplicateAgent {
                phase: spec.label.clone(),
                agent: task.agent,
            });
        }

        info!(
            "Phase '{}': dispatching {} tasks",
            spec.label,
            spec.tasks.len()
        );

        let started = Instant::now();
        let phase_token = ctx.cancel.child_token();
        let mut join_set = JoinSet::new();
        let mut pending: Vec<usize> = Vec::with_capacity(spec.tasks.len());

        for task in &spec.tasks {
            let agent = ctx.agents[task.agent].clone();
            ctx.publisher.publish(&ProgressEvent::agent_status(
                ctx.session_id,
                &spec.label,
                agent.label(),
                TaskStatus::Running,
            ));
            pending.push(task.agent);

            join_set.spawn(run_task(
                agent,
                task.clone(),
                Arc::clone(&self.admission),
                self.retry,
                ctx.deadline,
                phase_token.clone(),
            ));
        }

        let mut outcomes = Vec::with_capacity(spec.tasks.len());

        let interrupted = loop {
            let joined = tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => {
                    break Some((TaskStatus::Cancelled, "cancelled by caller"));
                }
                joined = join_set.join_next() => joined,
                _ = sleep_until(ctx.deadline) => {
                    break Some((TaskStatus::TimedOut, "phase deadline reached"));
                }
            };

            match joined {
                Some(Ok(outcome)) => record(ctx, spec, outcome, &mut pending, &mut outcomes),
                Some(Err(e)) => warn!("Task join error: {}", e),
                None => break None,
            }
        };

        if let Some((_, reason)) = interrupted {
            // Keep whatever finished before the interruption
            while let Some(joined) = join_set.try_join_next() {
                if let Ok(outcome) = joined {
                    record(ctx, spec, outcome, &mut pending, &mut outcomes);
                }
            }
            phase_token.cancel();
            join_set.abort_all();
            warn!(
                "Phase '{}': {} ({} tasks unfinished)",
                spec.label,
                reason,
                pending.len()
            );
        }

        let (status, reason) = interrupted.unwrap_or((TaskStatus::Failed, "agent task panicked"));
        let elapsed_ms = started.elapsed().as_millis() as u64;
        for agent in std::mem::take(&mut pending) {
            let outcome = TaskOutcome::unsuccessful(agent, status, reason, 0, elapsed_ms);
            record(ctx, spec, outcome, &mut pending, &mut outcomes);
        }

        let result = AggregateResult::new(spec.kind, spec.label.clone(), outcomes);
        info!(
            "Phase '{}': {}/{} tasks succeeded in {}ms",
            spec.label,
            result.success_count(),
            spec.tasks.len(),
            elapsed_ms
        );
        Ok(result)
    }
}

/// Publish a terminal task status and store the outcome
fn record(
    ctx: &PhaseContext<'_>,
    spec: &PhaseSpec,
    outcome: TaskOutcome,
    pending: &mut Vec<usize>,
    outcomes: &mut Vec<TaskOutcome>,
) {
    pending.retain(|&a| a != outcome.agent);

    let label = ctx.agents[outcome.agent].label();
    let mut event =
        ProgressEvent::agent_status(ctx.session_id, &spec.label, &label, outcome.status);
    match &outcome.error {
        Some(error) => {
            warn!("{} {} in '{}': {}", label, outcome.status, spec.label, error);
            event = event.with_message(error.clone());
        }
        None => debug!(
            "{} finished '{}' in {}ms ({} attempts)",
            label, spec.label, outcome.elapsed_ms, outcome.attempts
        ),
    }
    ctx.publisher.publish(&event);
    outcomes.push(outcome);
}

/// One agent task: admission, attempt with timeout, retry transient errors
async fn run_task(
    agent: Agent,
    input: TaskInput,
    admission: Arc<Semaphore>,
    retry: RetryPolicy,
    deadline: Instant,
    cancel: CancellationToken,
) -> TaskOutcome {
    let index = input.agent;
    let started = Instant::now();
    let elapsed = || started.elapsed().as_millis() as u64;
    let mut attempts = 0u32;

    loop {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return TaskOutcome::unsuccessful(index, TaskStatus::Cancelled, "cancelled", attempts, elapsed());
            }
            _ = sleep_until(deadline) => {
                return TaskOutcome::unsuccessful(index, TaskStatus::TimedOut, "no admission before the phase deadline", attempts, elapsed());
            }
            permit = Arc::clone(&admission).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => {
                    return TaskOutcome::unsuccessful(index, TaskStatus::Failed, "admission closed", attempts, elapsed());
                }
            },
        };
        attempts += 1;

        let attempt_deadline = match agent.timeout {
            Some(timeout) => deadline.min(Instant::now() + timeout),
            None => deadline,
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AgentError::Cancelled),
            _ = sleep_until(attempt_deadline) => Err(AgentError::Transient(format!(
                "no response within {}ms",
                attempt_deadline.saturating_duration_since(started).as_millis()
            ))),
            result = agent.client.complete(&input, cancel.child_token()) => result,
        };
        drop(permit);

        let error = match result {
            Ok(completion) => return TaskOutcome::done(index, completion, attempts, elapsed()),
            Err(AgentError::Cancelled) => {
                return TaskOutcome::unsuccessful(index, TaskStatus::Cancelled, "cancelled", attempts, elapsed());
            }
            Err(e) if Instant::now() >= deadline => {
                return TaskOutcome::unsuccessful(index, TaskStatus::TimedOut, e.to_string(), attempts, elapsed());
            }
            Err(e) if e.is_transient() && attempts <= retry.max_retries => e,
            Err(e) => {
                return TaskOutcome::unsuccessful(index, TaskStatus::Failed, e.to_string(), attempts, elapsed());
            }
        };

        let backoff = retry.backoff(attempts);
        warn!(
            "{} attempt {} failed ({}); retrying in {}ms",
            agent.label(),
            attempts,
            error,
            backoff.as_millis()
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return TaskOutcome::unsuccessful(index, TaskStatus::Cancelled, "cancelled", attempts, elapsed());
            }
            _ = sleep_until(deadline) => {
                return TaskOutcome::unsuccessful(index, TaskStatus::TimedOut, error.to_string(), attempts, elapsed());
            }
            _ = sleep(backoff) => {}
        }
    }
}
