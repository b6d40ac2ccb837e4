//! OpenAI-compatible chat completions client
//!
//! Works with any endpoint that speaks the `/chat/completions` protocol
//! (OpenAI, OpenRouter, vLLM, Ollama). Actual cost is derived from the
//! reported token usage and the configured price per 1000 tokens.

use async_trait::async_trait;
use council_application::{AgentClient, AgentError};
use council_domain::{Completion, TaskInput};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Completion budget assumed when estimating cost without `max_tokens`
const DEFAULT_COMPLETION_TOKENS: u32 = 1024;

/// Connection settings for one model
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub price_per_1k_tokens: f64,
    /// Flat per-call price, used only when no token price is set
    pub cost_per_call: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Chat completions client bound to one model
pub struct OpenAiCompatClient {
    client: Client,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatClient {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AgentError::Fatal(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiCompatConfig {
        &self.config
    }

    fn request(&self, task: &TaskInput) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::new("system", &task.system_prompt),
                ChatMessage::new("user", &task.prompt),
            ],
            temperature: task.params.temperature,
            max_tokens: task.params.max_tokens.or(self.config.max_tokens),
        }
    }

    fn cost_of(&self, tokens: u32) -> f64 {
        if self.config.price_per_1k_tokens > 0.0 {
            tokens as f64 / 1000.0 * self.config.price_per_1k_tokens
        } else {
            self.config.cost_per_call.unwrap_or(0.0)
        }
    }

    async fn send(&self, task: &TaskInput) -> Result<Completion, AgentError> {
        let url = format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );

        let mut request = self.client.post(&url).json(&self.request(task));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.text().await.map_err(classify)?;
        if !status.is_success() {
            return Err(AgentError::from_status(status.as_u16(), body.trim()));
        }

        let (text, tokens) = parse_response(&body)?;
        debug!("{} returned {} tokens", self.config.model, tokens);
        Ok(Completion::new(text, tokens, self.cost_of(tokens)))
    }
}

/// Connection problems and timeouts are worth retrying; anything else is not
fn classify(e: reqwest::Error) -> AgentError {
    if e.is_timeout() || e.is_connect() || e.is_request() {
        AgentError::Transient(e.to_string())
    } else {
        AgentError::Fatal(e.to_string())
    }
}

/// Extract the first choice's text and the total token count
fn parse_response(body: &str) -> Result<(String, u32), AgentError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| AgentError::Fatal(format!("malformed response: {}", e)))?;
    let text = response
        .choices
        .into_iter()
        .find_map(|c| c.message.content)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AgentError::Transient("response contained no text".to_string()))?;
    let tokens = response.usage.map_or(0, |u| u.total_tokens);
    Ok((text, tokens))
}

#[async_trait]
impl AgentClient for OpenAiCompatClient {
    async fn complete(
        &self,
        task: &TaskInput,
        cancel: CancellationToken,
    ) -> Result<Completion, AgentError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AgentError::Cancelled),
            result = self.send(task) => result,
        }
    }

    fn estimate_cost(&self, task: &TaskInput) -> f64 {
        if self.config.price_per_1k_tokens <= 0.0 {
            return self.cost_of(0);
        }
        // Rough prompt size (4 characters per token) plus the full completion budget
        let prompt_tokens = (task.system_prompt.len() + task.prompt.len()) as u32 / 4;
        let completion_tokens = task
            .params
            .max_tokens
            .or(self.config.max_tokens)
            .unwrap_or(DEFAULT_COMPLETION_TOKENS);
        self.cost_of(prompt_tokens + completion_tokens)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::CompletionParams;

    fn client(price: f64, cost_per_call: Option<f64>) -> OpenAiCompatClient {
        OpenAiCompatClient::new(OpenAiCompatConfig {
            endpoint: "http://localhost:9/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            price_per_1k_tokens: price,
            cost_per_call,
            max_tokens: Some(200),
        })
        .unwrap()
    }

    #[test]
    fn test_request_carries_prompts_and_params() {
        let task = TaskInput::new(0, "be brief", "Q?")
            .with_params(CompletionParams::default().with_temperature(0.9));
        let body = serde_json::to_value(client(0.0, None).request(&task)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be brief");
        assert_eq!(body["messages"][1]["content"], "Q?");
        assert!((body["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert_eq!(body["max_tokens"], 200);
    }

    #[test]
    fn test_parse_response_reads_text_and_usage() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Paris"}}],"usage":{"prompt_tokens":10,"completion_tokens":2,"total_tokens":12}}"#;
        assert_eq!(parse_response(body).unwrap(), ("Paris".to_string(), 12));
    }

    #[test]
    fn test_empty_or_malformed_responses() {
        let empty = r#"{"choices":[{"message":{"role":"assistant","content":"  "}}]}"#;
        assert!(parse_response(empty).unwrap_err().is_transient());

        let malformed = r#"{"error":"nope"}"#;
        assert!(!parse_response(malformed).unwrap_err().is_transient());
    }

    #[test]
    fn test_cost_from_usage_and_estimate() {
        let priced = client(0.5, None);
        assert!((priced.cost_of(2000) - 1.0).abs() < 1e-9);

        // 8 prompt characters → 2 tokens, plus 200 completion tokens
        let task = TaskInput::new(0, "sys", "abcde");
        assert!((priced.estimate_cost(&task) - 0.101).abs() < 1e-9);

        let flat = client(0.0, Some(0.01));
        assert_eq!(flat.estimate_cost(&task), 0.01);
        assert_eq!(flat.cost_of(5000), 0.01);
    }

    #[tokio::test]
    async fn test_cancelled_before_response() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = client(0.0, None)
            .complete(&TaskInput::new(0, "sys", "Q?"), cancel)
            .await;

        assert_eq!(result.unwrap_err(), AgentError::Cancelled);
    }

    #[test]
    fn test_estimate_and_actual_share_the_token_price() {
        let both = client(0.5, Some(0.0001));
        let task = TaskInput::new(0, "sys", "abcde");
        assert!((both.estimate_cost(&task) - both.cost_of(202)).abs() < 1e-12);
        assert!((both.cost_of(2000) - 1.0).abs() < 1e-9);
    }
}
