//! Offline agent client with deterministic answers
//!
//! Backs the `scripted` provider so the CLI can run every collaboration
//! mode without credentials or network access. The model name selects the
//! behavior:
//!
//! - `fail`: every call fails with a fatal error
//! - `flaky`: every other call fails with a transient error
//! - `slow`: answers after [`SLOW_LATENCY`]
//! - anything else: answers at once
//!
//! Answers follow the reply format each phase asks for (ballots, flags,
//! scores, claim verdicts, fusion sources), always picking the first
//! candidate offered.

use async_trait::async_trait;
use council_application::{AgentClient, AgentError};
use council_domain::{Completion, TaskInput};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Latency of the `slow` model
pub const SLOW_LATENCY: Duration = Duration::from_secs(3);

/// Deterministic offline client
pub struct ScriptedAgentClient {
    model: String,
    cost_per_call: f64,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedAgentClient {
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        let latency = (model == "slow").then_some(SLOW_LATENCY);
        Self {
            model,
            cost_per_call: 0.0,
            latency,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_cost_per_call(mut self, cost: f64) -> Self {
        self.cost_per_call = cost;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer in the format the prompt asks for
    fn answer(&self, task: &TaskInput) -> String {
        let labels = candidate_labels(&task.prompt);
        let first = labels.first().map_or("A", String::as_str);
        let prompt = task.prompt.as_str();

        if prompt.contains("VOTE: <label") {
            format!("Candidate {first} is the most complete.\nVOTE: {first}")
        } else if prompt.contains("SCORE <label>") {
            labels
                .iter()
                .enumerate()
                .map(|(rank, label)| format!("SCORE {}: {}", label, 8usize.saturating_sub(rank).max(1)))
                .collect::<Vec<_>>()
                .join("\n")
        } else if prompt.contains("VERIFIED [<label>]") {
            labels
                .iter()
                .map(|label| format!("VERIFIED [{label}]: the main claim of {label} holds"))
                .collect::<Vec<_>>()
                .join("\n")
        } else if prompt.contains("SOURCES: <label") {
            let sources = labels.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
            format!(
                "{} combines the strongest ideas.\nSOURCES: {}",
                self.model, sources
            )
        } else if prompt.contains("FLAG <label>") {
            format!("FLAG {first}: the reasoning skips a step\nOverall the drafts are sound.")
        } else {
            format!(
                "{} answers: {}",
                self.model,
                question_line(prompt).unwrap_or("(no question)")
            )
        }
    }
}

/// Labels of every `--- <Noun> <label> ---` candidate header
fn candidate_labels(prompt: &str) -> Vec<String> {
    prompt
        .lines()
        .filter_map(|line| line.strip_prefix("--- ")?.strip_suffix(" ---"))
        .filter_map(|header| header.split_whitespace().nth(1).map(str::to_string))
        .collect()
}

/// First non-empty line that is not a section heading
fn question_line(prompt: &str) -> Option<&str> {
    prompt
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.ends_with(':'))
}

#[async_trait]
impl AgentClient for ScriptedAgentClient {
    async fn complete(
        &self,
        task: &TaskInput,
        cancel: CancellationToken,
    ) -> Result<Completion, AgentError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.model.as_str() {
            "fail" => return Err(AgentError::Fatal("scripted failure".to_string())),
            "flaky" if call % 2 == 0 => {
                return Err(AgentError::Transient("scripted hiccup".to_string()));
            }
            _ => {}
        }

        if let Some(latency) = self.latency {
            tokio::select! {
                _ = cancel.cancelled() => return Err(AgentError::Cancelled),
                _ = tokio::time::sleep(latency) => {}
            }
        }

        let text = self.answer(task);
        let tokens = text.split_whitespace().count() as u32;
        Ok(Completion::new(text, tokens, self.cost_per_call))
    }

    fn estimate_cost(&self, _task: &TaskInput) -> f64 {
        self.cost_per_call
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::PromptTemplate;

    fn task(prompt: String) -> TaskInput {
        TaskInput::new(0, "system", prompt)
    }

    async fn reply(client: &ScriptedAgentClient, prompt: String) -> String {
        client
            .complete(&task(prompt), CancellationToken::new())
            .await
            .unwrap()
            .text
    }

    #[tokio::test]
    async fn test_draft_mentions_the_question() {
        let client = ScriptedAgentClient::new("echo").with_cost_per_call(0.002);
        let completion = client
            .complete(
                &task(PromptTemplate::draft_prompt("Why is the sky blue?")),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(completion.text.starts_with("echo answers:"));
        assert!(completion.text.contains("Why is the sky blue?"));
        assert_eq!(completion.cost, 0.002);
        assert_eq!(client.estimate_cost(&task(String::new())), 0.002);
    }

    #[tokio::test]
    async fn test_ballot_picks_first_offered_candidate() {
        let client = ScriptedAgentClient::new("echo");
        let prompt = PromptTemplate::vote_prompt(
            "Q?",
            "Draft",
            "--- Draft B ---\nsecond\n\n--- Draft C ---\nthird\n",
            None,
        );

        assert!(reply(&client, prompt).await.ends_with("VOTE: B"));
    }

    #[tokio::test]
    async fn test_scores_and_verdicts_cover_every_candidate() {
        let client = ScriptedAgentClient::new("echo");
        let ideas = "--- Idea A ---\none\n\n--- Idea B ---\ntwo\n";

        let scores = reply(&client, PromptTemplate::rank_prompt("Q?", ideas)).await;
        assert_eq!(scores, "SCORE A: 8\nSCORE B: 7");

        let verdicts = reply(&client, PromptTemplate::verify_prompt("Q?", ideas)).await;
        assert_eq!(verdicts.lines().count(), 2);
        assert!(verdicts.lines().all(|l| l.starts_with("VERIFIED [")));
    }

    #[tokio::test]
    async fn test_fusion_names_two_sources() {
        let client = ScriptedAgentClient::new("echo");
        let ideas = "--- Idea A ---\none\n\n--- Idea B ---\ntwo\n\n--- Idea C ---\nthree\n";

        let fusion = reply(&client, PromptTemplate::fuse_prompt("Q?", ideas)).await;
        assert!(fusion.ends_with("SOURCES: A, B"));
    }

    #[tokio::test]
    async fn test_fail_and_flaky_models() {
        let input = task("Q?".to_string());

        let fail = ScriptedAgentClient::new("fail");
        let error = fail.complete(&input, CancellationToken::new()).await.unwrap_err();
        assert!(!error.is_transient());

        let flaky = ScriptedAgentClient::new("flaky");
        let first = flaky.complete(&input, CancellationToken::new()).await;
        assert!(first.unwrap_err().is_transient());
        assert!(flaky.complete(&input, CancellationToken::new()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_model_stops_on_cancel() {
        let client = ScriptedAgentClient::new("slow");
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = tokio::time::Instant::now();
        let result = client.complete(&task("Q?".to_string()), cancel).await;

        assert_eq!(result.unwrap_err(), AgentError::Cancelled);
        assert!(started.elapsed() < SLOW_LATENCY);
    }
}
