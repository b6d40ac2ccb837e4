//! Run Session use case
//!
//! Drives one collaboration session from request to [`FinalResult`]: it
//! validates the request, asks the mode's [`Protocol`] for phases, gates
//! each phase on the cost cap and the global deadline, runs it through the
//! [`PhaseExecutor`], and reconciles the outcome into a final answer.
//!
//! A session ends `completed` only when the protocol reached its normal
//! conclusion, no phase fell short of its minimum, and the quorum rule is
//! satisfied by the number of distinct agents that produced output.
//! Everything else that still produced output ends `partial` with a
//! disclaimer, or `aborted` when the caller cancelled.

use crate::config::OrchestrationParams;
use crate::ports::agent_client::Agent;
use crate::ports::event_publisher::{EventPublisher, NoEvents};
use crate::use_cases::execute_phase::{PhaseContext, PhaseExecutor};
use council_domain::{
    AgentTrace, AggregateResult, Conclusion, CostLedger, DomainError, FinalResult, FinalStatus,
    MAX_AGENTS, Mode, PhaseOutput, PhaseSpec, ProgressEvent, Question, Session, SessionStatus,
    Transition, protocol_for,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Errors that end a session without a result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunSessionError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cost cap ${cap:.4} would be exceeded before any output (phase estimate ${estimate:.4})")]
    CostExceeded { estimate: f64, cap: f64 },

    #[error("Session aborted by caller before any output")]
    AbortedByCaller,
}

impl From<DomainError> for RunSessionError {
    fn from(e: DomainError) -> Self {
        RunSessionError::InvalidRequest(e.to_string())
    }
}

/// Input for the RunSession use case
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// The question to answer
    pub prompt: String,
    /// Collaboration mode name (see [`Mode`])
    pub mode: String,
    /// Ordered roster of agents
    pub agents: Vec<Agent>,
    /// Upper bound on total spend
    pub cost_cap: Option<f64>,
    /// Overrides the configured global timeout
    pub global_timeout: Option<Duration>,
}

impl SessionRequest {
    pub fn new(prompt: impl Into<String>, mode: impl Into<String>, agents: Vec<Agent>) -> Self {
        Self {
            prompt: prompt.into(),
            mode: mode.into(),
            agents,
            cost_cap: None,
            global_timeout: None,
        }
    }

    pub fn with_cost_cap(mut self, cap: f64) -> Self {
        self.cost_cap = Some(cap);
        self
    }

    pub fn with_global_timeout(mut self, timeout: Duration) -> Self {
        self.global_timeout = Some(timeout);
        self
    }

    /// Check the request and resolve its question and mode
    pub fn validate(&self) -> Result<(Question, Mode), RunSessionError> {
        if self.agents.is_empty() {
            return Err(DomainError::NoAgents.into());
        }
        if self.agents.len() > MAX_AGENTS {
            return Err(DomainError::TooManyAgents(self.agents.len()).into());
        }
        let mode: Mode = self.mode.parse()?;
        let question = Question::try_new(self.prompt.clone())
            .ok_or_else(|| DomainError::InvalidPrompt("prompt is empty".to_string()))?;
        if let Some(cap) = self.cost_cap
            && !(cap.is_finite() && cap >= 0.0)
        {
            return Err(RunSessionError::InvalidRequest(format!(
                "cost cap must be a non-negative number, got {}",
                cap
            )));
        }
        if self.global_timeout.is_some_and(|t| t.is_zero()) {
            return Err(RunSessionError::InvalidRequest(
                "global timeout must be positive".to_string(),
            ));
        }
        Ok((question, mode))
    }
}

/// How the phase loop stopped
enum Ending {
    /// The protocol reached its terminal state
    Concluded(Conclusion),
    /// The session had to stop early; carries the reason
    Forced(String),
    /// The caller cancelled
    Aborted,
}

/// Coordinates sessions over a shared [`PhaseExecutor`]
///
/// The coordinator is cheap to clone and can drive any number of sessions
/// concurrently; they all share the executor's admission limit.
#[derive(Clone)]
pub struct SessionCoordinator {
    executor: PhaseExecutor,
    params: OrchestrationParams,
    publisher: Arc<dyn EventPublisher>,
}

impl SessionCoordinator {
    pub fn new(params: OrchestrationParams) -> Self {
        Self {
            executor: PhaseExecutor::from_params(&params),
            params,
            publisher: Arc::new(NoEvents),
        }
    }

    /// Share an existing executor (and its admission limit)
    pub fn with_executor(mut self, executor: PhaseExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn params(&self) -> &OrchestrationParams {
        &self.params
    }

    pub fn executor(&self) -> &PhaseExecutor {
        &self.executor
    }

    /// Run a session to completion
    pub async fn run(&self, request: SessionRequest) -> Result<FinalResult, RunSessionError> {
        self.run_with_cancel(request, CancellationToken::new()).await
    }

    /// Run a session that the caller can abort through `cancel`
    pub async fn run_with_cancel(
        &self,
        request: SessionRequest,
        cancel: CancellationToken,
    ) -> Result<FinalResult, RunSessionError> {
        let (question, mode) = request.validate()?;
        let global_timeout = request.global_timeout.unwrap_or(self.params.global_timeout);
        let agents = request.agents;

        let mut session = Session::new(
            Uuid::new_v4().to_string(),
            question,
            mode,
            agents.iter().map(|a| a.agent_ref.clone()).collect(),
            request.cost_cap,
            global_timeout,
        );
        let deadline = Instant::from_std(session.deadline());
        let token = cancel.child_token();
        let mut ledger = CostLedger::new(request.cost_cap);
        let mut protocol = protocol_for(
            mode,
            session.question(),
            agents.len(),
            &self.params.protocol_params(),
        );
        let mut traces: Vec<AgentTrace> = agents.iter().map(|a| AgentTrace::new(a.label())).collect();
        let mut shortfalls: Vec<String> = Vec::new();
        let mut useful_phases = 0usize;

        info!(
            "Session {}: {} with {} agents (timeout {}ms, cost cap {})",
            session.id(),
            mode,
            agents.len(),
            global_timeout.as_millis(),
            request
                .cost_cap
                .map_or("none".to_string(), |c| format!("${:.4}", c))
        );

        let mut transition = protocol.start();
        let ending = loop {
            let spec = match transition {
                Transition::Terminal(conclusion) => break Ending::Concluded(conclusion),
                Transition::Dispatch(spec) => spec,
            };

            if token.is_cancelled() {
                break Ending::Aborted;
            }
            let now = Instant::now();
            if now >= deadline {
                break Ending::Forced(format!(
                    "the global deadline passed before phase '{}'",
                    spec.label
                ));
            }

            let estimate = estimate_phase(&agents, &spec);
            if !ledger.reserve(estimate) {
                let cap = ledger.cap().unwrap_or_default();
                warn!(
                    "Session {}: phase '{}' estimate ${:.4} exceeds remaining budget (cap ${:.4}, spent ${:.4})",
                    session.id(),
                    spec.label,
                    estimate,
                    cap,
                    ledger.realized()
                );
                if useful_phases == 0 {
                    self.finish(&mut session, SessionStatus::Failed, "cost cap exceeded");
                    return Err(RunSessionError::CostExceeded { estimate, cap });
                }
                break Ending::Forced(format!(
                    "the cost cap stopped the session before phase '{}'",
                    spec.label
                ));
            }

            if !session.begin_phase(spec.kind) {
                warn!("Session {}: phase '{}' started while another was active", session.id(), spec.label);
            }
            self.publisher.publish(&ProgressEvent::phase_change(
                session.id(),
                &spec.label,
                spec.active_agents()
                    .into_iter()
                    .filter_map(|i| agents.get(i).map(Agent::label))
                    .collect(),
            ));

            let phase_deadline = match self.params.phase_timeout {
                Some(cap) => deadline.min(now + cap),
                None => deadline,
            };
            let ctx = PhaseContext {
                session_id: session.id(),
                agents: &agents,
                deadline: phase_deadline,
                cancel: &token,
                publisher: self.publisher.as_ref(),
            };
            let executed = self.executor.execute(&ctx, &spec).await;
            session.end_phase();

            let result = match executed {
                Ok(result) => result,
                Err(e) => {
                    ledger.reconcile(estimate, 0.0);
                    error!("Session {}: {}", session.id(), e);
                    break Ending::Forced(format!("phase '{}' could not run", spec.label));
                }
            };
            ledger.reconcile(estimate, result.total_cost());
            record_traces(&mut traces, &spec, &result);

            let successes = result.success_count();
            if successes > 0 {
                useful_phases += 1;
            }
            debug!(
                "Session {}: phase '{}' done, {} succeeded, spent ${:.4}",
                session.id(),
                spec.label,
                successes,
                ledger.realized()
            );

            if token.is_cancelled() {
                break Ending::Aborted;
            }
            if successes < spec.min_successes {
                let shortfall = format!(
                    "phase '{}' had {} successful agents of {} needed",
                    spec.label, successes, spec.min_successes
                );
                if !protocol.has_degraded_path(&spec) {
                    break Ending::Forced(shortfall);
                }
                warn!("Session {}: {}; continuing degraded", session.id(), shortfall);
                shortfalls.push(shortfall);
            }

            transition = protocol.advance(&result);
        };

        let contributors = traces.iter().filter(|t| t.successes() > 0).count();
        let quorum_met = self.params.quorum.is_satisfied(contributors, agents.len());

        let (status, conclusion, mut disclaimers) = match ending {
            Ending::Concluded(conclusion) => {
                let mut disclaimers = shortfalls;
                if !quorum_met {
                    disclaimers.push(format!(
                        "only {} of {} agents contributed (quorum: {})",
                        contributors,
                        agents.len(),
                        self.params.quorum.description()
                    ));
                }
                // Skipped degraded steps are noted but do not demote a met quorum
                let status = if quorum_met {
                    FinalStatus::Completed
                } else {
                    FinalStatus::Partial
                };
                (status, conclusion, disclaimers)
            }
            Ending::Forced(reason) => {
                let mut disclaimers = shortfalls;
                disclaimers.push(reason);
                (FinalStatus::Partial, protocol.conclude(), disclaimers)
            }
            Ending::Aborted => {
                if useful_phases == 0 {
                    self.finish(&mut session, SessionStatus::Aborted, "aborted by caller");
                    return Err(RunSessionError::AbortedByCaller);
                }
                (
                    FinalStatus::Aborted,
                    protocol.conclude(),
                    vec!["aborted by caller".to_string()],
                )
            }
        };
        if status != FinalStatus::Completed && conclusion.content.is_empty() {
            disclaimers.push("no agent output was available to build an answer".to_string());
        }

        let session_status = match status {
            FinalStatus::Completed => SessionStatus::Completed,
            FinalStatus::Partial => SessionStatus::Partial,
            FinalStatus::Aborted => SessionStatus::Aborted,
        };
        self.finish(&mut session, session_status, status.as_str());

        let disclaimer = (!disclaimers.is_empty()).then(|| disclaimers.join("; "));
        if let Some(disclaimer) = &disclaimer {
            warn!("Session {} ended {}: {}", session.id(), status, disclaimer);
        }
        info!(
            "Session {} {} after {} phases, cost ${:.4}",
            session.id(),
            status,
            session.phase_index(),
            ledger.realized()
        );

        Ok(FinalResult {
            session_id: session.id().to_string(),
            mode: mode.to_string(),
            status,
            content: conclusion.content,
            rationale: conclusion.rationale,
            per_agent_trace: traces,
            cost_actual: ledger.realized(),
            disclaimer,
        })
    }

    /// Mark the session terminal and publish the final transition
    fn finish(&self, session: &mut Session, status: SessionStatus, message: &str) {
        session.finish(status);
        self.publisher.publish(
            &ProgressEvent::phase_change(session.id(), "finished", Vec::new()).with_message(message),
        );
    }
}

/// Sum of the clients' cost estimates for every task of the phase
fn estimate_phase(agents: &[Agent], spec: &PhaseSpec) -> f64 {
    spec.tasks
        .iter()
        .filter_map(|task| agents.get(task.agent).map(|a| a.client.estimate_cost(task)))
        .sum()
}

/// Append each outcome to its agent's trace
fn record_traces(traces: &mut [AgentTrace], spec: &PhaseSpec, result: &AggregateResult) {
    for outcome in &result.outcomes {
        let Some(trace) = traces.get_mut(outcome.agent) else {
            continue;
        };
        trace.phase_outputs.push(PhaseOutput {
            phase: spec.label.clone(),
            kind: spec.kind,
            status: outcome.status,
            text: outcome.text().map(str::to_string),
            error: outcome.error.clone(),
            token_count: outcome.completion.as_ref().map_or(0, |c| c.token_count),
            cost: outcome.cost(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_client::AgentError;
    use crate::use_cases::test_support::{
        RecordingPublisher, ScriptedClient, Step, agents, council_reply,
    };
    use council_domain::{QuorumRule, TaskStatus};

    fn council(n: usize) -> Vec<Arc<ScriptedClient>> {
        (0..n).map(|_| ScriptedClient::responding(council_reply)).collect()
    }

    fn coordinator() -> SessionCoordinator {
        SessionCoordinator::new(OrchestrationParams::default())
    }

    #[tokio::test]
    async fn test_every_mode_completes_when_all_agents_answer() {
        for mode in Mode::ALL {
            let clients = council(3);
            let request = SessionRequest::new("How do tides work?", mode.as_str(), agents(&clients));

            let result = coordinator().run(request).await.unwrap();

            assert_eq!(result.status, FinalStatus::Completed, "mode {mode}");
            assert!(!result.content.is_empty(), "mode {mode}");
            assert!(result.disclaimer.is_none(), "mode {mode}");
            assert_eq!(result.mode, mode.as_str());
            assert_eq!(result.per_agent_trace.len(), 3);
            assert!(result.cost_actual > 0.0);
        }
    }

    #[tokio::test]
    async fn test_quorum_met_with_one_failing_agent() {
        let mut clients = council(3);
        clients.push(ScriptedClient::failing(AgentError::Fatal("bad key".into())));

        let result = coordinator()
            .run(SessionRequest::new("Q?", "round_table", agents(&clients)))
            .await
            .unwrap();

        assert_eq!(result.status, FinalStatus::Completed);
        assert_eq!(result.per_agent_trace.len(), 4);
        let failed = result.trace_for("scripted:agent-3").unwrap();
        assert_eq!(failed.successes(), 0);
        assert_eq!(failed.phase_outputs[0].status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn test_quorum_missed_is_partial() {
        let mut clients = council(2);
        clients.push(ScriptedClient::failing(AgentError::Fatal("bad key".into())));

        let result = coordinator()
            .run(SessionRequest::new("Q?", "round_table", agents(&clients)))
            .await
            .unwrap();

        assert_eq!(result.status, FinalStatus::Partial);
        assert!(!result.content.is_empty());
        assert!(result.disclaimer.unwrap().contains("only 2 of 3 agents contributed"));
    }

    #[tokio::test]
    async fn test_custom_quorum_rule() {
        let mut clients = council(2);
        clients.push(ScriptedClient::failing(AgentError::Fatal("bad key".into())));
        let params = OrchestrationParams::default().with_quorum(QuorumRule::Majority);

        let result = SessionCoordinator::new(params)
            .run(SessionRequest::new("Q?", "round_table", agents(&clients)))
            .await
            .unwrap();

        assert_eq!(result.status, FinalStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_deadline_returns_partial_in_time() {
        let clients: Vec<_> = (0..3)
            .map(|_| ScriptedClient::echo().with_delay(Duration::from_secs(60)))
            .collect();
        let request = SessionRequest::new("Q?", "round_table", agents(&clients))
            .with_global_timeout(Duration::from_secs(1));

        let started = Instant::now();
        let result = coordinator().run(request).await.unwrap();

        assert!(started.elapsed() <= Duration::from_millis(1050));
        assert_eq!(result.status, FinalStatus::Partial);
        assert!(result.disclaimer.is_some());
        for trace in &result.per_agent_trace {
            assert_eq!(trace.phase_outputs.len(), 1);
            assert_eq!(trace.phase_outputs[0].status, TaskStatus::TimedOut);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_timeout_caps_a_phase_not_the_session() {
        // Agent 2 hangs in every phase; the others answer at once
        let mut clients = council(2);
        clients.push(ScriptedClient::echo().with_delay(Duration::from_secs(60)));
        let params = OrchestrationParams::default()
            .with_phase_timeout(Some(Duration::from_secs(2)))
            .with_quorum(QuorumRule::AtLeast(2));

        let started = Instant::now();
        let result = SessionCoordinator::new(params)
            .run(SessionRequest::new("Q?", "round_table", agents(&clients)))
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(13));
        assert_eq!(result.status, FinalStatus::Completed);
        let hung = result.trace_for("scripted:agent-2").unwrap();
        assert!(hung.phase_outputs.iter().all(|o| o.status == TaskStatus::TimedOut));
    }

    #[tokio::test]
    async fn test_cost_cap_blocks_first_phase_without_calls() {
        let clients: Vec<_> = (0..3)
            .map(|_| ScriptedClient::responding(council_reply).with_costs(0.0167, 0.0167))
            .collect();
        let request = SessionRequest::new("Q?", "round_table", agents(&clients)).with_cost_cap(0.01);

        let error = coordinator().run(request).await.unwrap_err();

        match error {
            RunSessionError::CostExceeded { estimate, cap } => {
                assert!((estimate - 0.0501).abs() < 1e-9);
                assert_eq!(cap, 0.01);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(clients.iter().all(|c| c.calls().is_empty()));
    }

    #[tokio::test]
    async fn test_cost_cap_mid_session_is_partial() {
        let clients: Vec<_> = (0..3)
            .map(|_| ScriptedClient::responding(council_reply).with_costs(0.01, 0.01))
            .collect();
        // Drafts cost 0.03; the critique phase would need another 0.03
        let request = SessionRequest::new("Q?", "round_table", agents(&clients)).with_cost_cap(0.05);

        let result = coordinator().run(request).await.unwrap();

        assert_eq!(result.status, FinalStatus::Partial);
        assert!(result.disclaimer.unwrap().contains("cost cap"));
        assert!((result.cost_actual - 0.03).abs() < 1e-9);
        assert_eq!(result.content, "answer from agent 0");
        assert!(clients.iter().all(|c| c.calls().len() == 1));
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected() {
        let clients = council(3);
        let cases = vec![
            SessionRequest::new("Q?", "round_table", Vec::new()),
            SessionRequest::new("Q?", "town_hall", agents(&clients)),
            SessionRequest::new("   ", "round_table", agents(&clients)),
            SessionRequest::new("Q?", "round_table", agents(&council(7))),
            SessionRequest::new("Q?", "round_table", agents(&clients)).with_cost_cap(-1.0),
        ];

        for request in cases {
            let error = coordinator().run(request).await.unwrap_err();
            assert!(matches!(error, RunSessionError::InvalidRequest(_)), "{error:?}");
        }
        assert!(clients.iter().all(|c| c.calls().is_empty()));
    }

    #[tokio::test]
    async fn test_abort_before_any_output() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let error = coordinator()
            .run_with_cancel(
                SessionRequest::new("Q?", "round_table", agents(&council(3))),
                cancel,
            )
            .await
            .unwrap_err();

        assert_eq!(error, RunSessionError::AbortedByCaller);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_after_drafts_returns_aborted_result() {
        // Drafts come back at once; critiques hang until the caller aborts
        let clients: Vec<_> = (0..3)
            .map(|_| {
                ScriptedClient::responding(|task| match council_reply(task) {
                    Step::Reply(text) if text.starts_with("FLAG") => {
                        Step::Delay(Duration::from_secs(60), text)
                    }
                    other => other,
                })
            })
            .collect();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let result = coordinator()
            .run_with_cancel(SessionRequest::new("Q?", "round_table", agents(&clients)), cancel)
            .await
            .unwrap();

        assert_eq!(result.status, FinalStatus::Aborted);
        assert_eq!(result.content, "answer from agent 0");
        for trace in &result.per_agent_trace {
            assert_eq!(trace.phase_outputs[0].status, TaskStatus::Done);
            assert_eq!(trace.phase_outputs[1].status, TaskStatus::Cancelled);
        }
    }

    #[tokio::test]
    async fn test_events_follow_the_phases() {
        let publisher = Arc::new(RecordingPublisher::default());
        let result = coordinator()
            .with_publisher(publisher.clone())
            .run(SessionRequest::new("Q?", "round_table", agents(&council(3))))
            .await
            .unwrap();

        assert_eq!(
            publisher.phases(),
            vec!["draft", "critique", "vote", "synthesize", "finished"]
        );
        assert!(publisher.events().iter().all(|e| e.session_id() == result.session_id));
        let done = publisher
            .agent_statuses()
            .into_iter()
            .filter(|(_, s)| *s == TaskStatus::Done)
            .count();
        assert_eq!(done, 3 + 3 + 3 + 1);
    }

    #[tokio::test]
    async fn test_chain_survives_a_failed_link() {
        let clients = vec![
            ScriptedClient::responding(|_| Step::Reply("first version".into())),
            ScriptedClient::failing(AgentError::Fatal("down".into())),
            ScriptedClient::responding(|task| Step::Reply(format!("amended: {}", task.agent))),
        ];

        let result = coordinator()
            .run(SessionRequest::new("Q?", "sequential_critique_chain", agents(&clients)))
            .await
            .unwrap();

        // The third agent amends the first agent's version
        let prompts = clients[2].prompts();
        assert!(prompts[0].contains("first version"));
        assert_eq!(result.status, FinalStatus::Partial);
        assert!(result.disclaimer.unwrap().contains("amend 2/3"));
    }

    #[tokio::test]
    async fn test_failed_first_agent_does_not_block_the_closing_phase() {
        for mode in ["validated_consensus", "sequential_critique_chain"] {
            let mut clients = vec![ScriptedClient::failing(AgentError::Fatal("bad key".into()))];
            clients.extend(council(3));

            let result = coordinator()
                .run(SessionRequest::new("Q?", mode, agents(&clients)))
                .await
                .unwrap();

            assert_eq!(result.status, FinalStatus::Completed, "mode {mode}");
            assert!(result.content.starts_with("answer from agent"), "mode {mode}");
            assert_ne!(result.content, "answer from agent 0", "mode {mode}");
            let failed = result.trace_for("scripted:agent-0").unwrap();
            assert_eq!(failed.successes(), 0);
        }
    }

    #[tokio::test]
    async fn test_validated_consensus_rewrites_at_most_once() {
        let flagging = |task: &council_domain::TaskInput| {
            if task.prompt.contains("VERIFIED [<label>]") {
                Step::Reply("FLAGGED [A]: the moon is cheese\nVERIFIED [A]: water is wet".into())
            } else {
                council_reply(task)
            }
        };
        let clients: Vec<_> = (0..3).map(|_| ScriptedClient::responding(flagging)).collect();
        let publisher = Arc::new(RecordingPublisher::default());

        let result = coordinator()
            .with_publisher(publisher.clone())
            .run(SessionRequest::new("Q?", "validated_consensus", agents(&clients)))
            .await
            .unwrap();

        let phases = publisher.phases();
        assert_eq!(phases.iter().filter(|p| p.as_str() == "rewrite").count(), 1);
        assert_eq!(phases.last().map(String::as_str), Some("finished"));
        assert!(phases.contains(&"finalize".to_string()));
        assert!(result.rationale.unwrap().contains("rewrites: 1"));
    }

    #[tokio::test]
    async fn test_sessions_share_the_admission_limit() {
        let clients: Vec<_> = (0..6)
            .map(|_| ScriptedClient::echo().with_delay(Duration::from_millis(20)))
            .collect();
        let gauge = ScriptedClient::shared_gauge(&clients);
        let coordinator =
            SessionCoordinator::new(OrchestrationParams::default().with_max_in_flight(2));

        let first = coordinator.run(SessionRequest::new("Q1?", "round_table", agents(&clients[..3])));
        let second = coordinator.run(SessionRequest::new("Q2?", "round_table", agents(&clients[3..])));
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok() && second.is_ok());
        assert_eq!(gauge.peak(), 2);
        assert_eq!(coordinator.executor().available_permits(), 2);
    }
}
