//! Scripted agent client and event recorder shared by use case tests

use crate::ports::agent_client::{Agent, AgentClient, AgentError};
use crate::ports::event_publisher::EventPublisher;
use async_trait::async_trait;
use council_domain::{AgentRef, Completion, ProgressEvent, TaskInput, TaskStatus};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A scripted response for the mock client
#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    /// Reply after a delay (the delay is dropped if the call is cancelled)
    Delay(Duration, String),
    Fail(AgentError),
}

type Responder = dyn Fn(&TaskInput) -> Step + Send + Sync;

/// Tracks how many calls are in flight across the clients sharing it
#[derive(Default)]
pub struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(self: &Arc<Self>) -> GaugeGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        GaugeGuard(Arc::clone(self))
    }
}

struct GaugeGuard(Arc<Gauge>);

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock client: plays its script first, then falls back to the responder.
/// Every task it receives is recorded for assertions.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Step>>,
    responder: Box<Responder>,
    delay: Option<Duration>,
    cost_per_call: f64,
    estimate: f64,
    calls: Mutex<Vec<TaskInput>>,
    gauge: Mutex<Option<Arc<Gauge>>>,
}

impl ScriptedClient {
    fn build(responder: Box<Responder>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            responder,
            delay: None,
            cost_per_call: 0.001,
            estimate: 0.001,
            calls: Mutex::new(Vec::new()),
            gauge: Mutex::new(None),
        }
    }

    /// Replies `reply to <prompt>` to every call
    pub fn echo() -> Arc<Self> {
        Arc::new(Self::build(Box::new(|task: &TaskInput| {
            Step::Reply(format!("reply to {}", task.prompt))
        })))
    }

    /// Answers with `respond(task)`
    pub fn responding(respond: impl Fn(&TaskInput) -> Step + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self::build(Box::new(respond)))
    }

    /// Always fails with the given error
    pub fn failing(error: AgentError) -> Arc<Self> {
        Self::responding(move |_| Step::Fail(error.clone()))
    }

    pub fn with_script(self: Arc<Self>, steps: Vec<Step>) -> Arc<Self> {
        self.script.lock().unwrap().extend(steps);
        self
    }

    /// Delay every responder answer by `delay`
    pub fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        let mut client = Arc::into_inner(self).expect("client not shared yet");
        client.delay = Some(delay);
        Arc::new(client)
    }

    pub fn with_costs(self: Arc<Self>, cost_per_call: f64, estimate: f64) -> Arc<Self> {
        let mut client = Arc::into_inner(self).expect("client not shared yet");
        client.cost_per_call = cost_per_call;
        client.estimate = estimate;
        Arc::new(client)
    }

    /// Attach one gauge to all `clients`
    pub fn shared_gauge(clients: &[Arc<ScriptedClient>]) -> Arc<Gauge> {
        let gauge = Arc::new(Gauge::default());
        for client in clients {
            *client.gauge.lock().unwrap() = Some(Arc::clone(&gauge));
        }
        gauge
    }

    pub fn calls(&self) -> Vec<TaskInput> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|t| t.prompt).collect()
    }
}

#[async_trait]
impl AgentClient for ScriptedClient {
    async fn complete(
        &self,
        task: &TaskInput,
        _cancel: CancellationToken,
    ) -> Result<Completion, AgentError> {
        self.calls.lock().unwrap().push(task.clone());
        let _guard = self.gauge.lock().unwrap().as_ref().map(|g| g.enter());

        let scripted = self.script.lock().unwrap().pop_front();
        let step = match scripted {
            Some(step) => step,
            None => match (self.responder)(task) {
                Step::Reply(text) => match self.delay {
                    Some(delay) => Step::Delay(delay, text),
                    None => Step::Reply(text),
                },
                other => other,
            },
        };

        match step {
            Step::Reply(text) => Ok(Completion::new(text, 10, self.cost_per_call)),
            Step::Delay(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(Completion::new(text, 10, self.cost_per_call))
            }
            Step::Fail(error) => Err(error),
        }
    }

    fn estimate_cost(&self, _task: &TaskInput) -> f64 {
        self.estimate
    }
}

/// Roster `scripted:agent-<i>` backed by `clients`
pub fn agents(clients: &[Arc<ScriptedClient>]) -> Vec<Agent> {
    clients
        .iter()
        .enumerate()
        .map(|(i, client)| {
            Agent::new(
                AgentRef::new("scripted", format!("agent-{i}")),
                Arc::clone(client) as Arc<dyn AgentClient>,
            )
        })
        .collect()
}

/// Publisher that keeps every event
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn agent_statuses(&self) -> Vec<(String, TaskStatus)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::AgentStatus { agent, status, .. } => Some((agent, status)),
                _ => None,
            })
            .collect()
    }

    /// Phase names of every `phase_change` event, in order
    pub fn phases(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::PhaseChange { phase, .. } => Some(phase),
                _ => None,
            })
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Candidate labels of every `--- <Noun> <label> ---` header in `prompt`
fn header_labels(prompt: &str) -> Vec<String> {
    prompt
        .lines()
        .filter(|l| l.starts_with("--- ") && l.ends_with(" ---"))
        .filter_map(|l| l.split_whitespace().nth(2).map(str::to_string))
        .collect()
}

/// Well-formed answer for whatever phase `task` belongs to
pub fn council_reply(task: &TaskInput) -> Step {
    let labels = header_labels(&task.prompt);
    let first = labels.first().cloned().unwrap_or_else(|| "A".to_string());
    let text = if task.prompt.contains("VOTE: <label") {
        format!("VOTE: {first}")
    } else if task.prompt.contains("SCORE <label>") {
        labels
            .iter()
            .map(|l| format!("SCORE {l}: 7"))
            .collect::<Vec<_>>()
            .join("\n")
    } else if task.prompt.contains("VERIFIED [<label>]") {
        format!("VERIFIED [{first}]: the sky is blue\nVERIFIED [{first}]: water is wet")
    } else if task.prompt.contains("SOURCES: <label") {
        "a fused idea\nSOURCES: A, B".to_string()
    } else if task.prompt.contains("FLAG <label>") {
        format!("FLAG {first}: could be clearer")
    } else {
        format!("answer from agent {}", task.agent)
    };
    Step::Reply(text)
}
