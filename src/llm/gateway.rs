//! Model Gateway: one structured completion per call, bound to one output
//! schema and one tier budget. Failures come back as [`TaskFailure`] values.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{LlmConfig, Tier, TierConfig};
use crate::error::{FailureKind, TaskFailure, TaskResult};

/// A single completion call as sent to the provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Task name, used for logging and failure reports.
    pub task: &'static str,
    /// Output-shape instruction.
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Raw LLM transport. Returns the model's text content.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// A type the model can be asked to produce.
pub trait StructuredOutput: DeserializeOwned + Send + 'static {
    const SCHEMA_NAME: &'static str;
    /// JSON shape shown to the model.
    const SHAPE: &'static str;

    /// Constraints serde cannot express.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Structured completions with tier-based budgets. Cheap to clone.
#[derive(Clone)]
pub struct ModelGateway {
    backend: Arc<dyn CompletionBackend>,
    tiers: TierConfig,
}

impl ModelGateway {
    pub fn new(backend: Arc<dyn CompletionBackend>, tiers: TierConfig) -> Self {
        Self { backend, tiers }
    }

    pub fn tiers(&self) -> &TierConfig {
        &self.tiers
    }

    /// Run one completion and parse it into `T`.
    pub async fn complete<T: StructuredOutput>(
        &self,
        task: &'static str,
        prompt: String,
        tier: Tier,
    ) -> TaskResult<T> {
        let budget = self.tiers.budget(tier);
        let request = CompletionRequest {
            task,
            system: schema_instruction::<T>(),
            prompt,
            max_tokens: budget.max_tokens,
        };

        let started = Instant::now();
        let raw = match tokio::time::timeout(budget.timeout(), self.backend.complete(&request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!("Model task {task} failed: {e:#}");
                return Err(TaskFailure::new(task, FailureKind::Transport, format!("{e:#}")));
            }
            Err(_) => {
                tracing::warn!("Model task {task} timed out after {}s", budget.timeout_secs);
                return Err(TaskFailure::timeout(task, budget.timeout()));
            }
        };

        match parse_structured::<T>(&raw) {
            Ok(value) => {
                tracing::debug!(
                    "Model task {task} done in {:.2}s",
                    started.elapsed().as_secs_f64()
                );
                Ok(value)
            }
            Err(detail) => {
                tracing::warn!("Model task {task} returned unusable output: {detail}");
                Err(TaskFailure::new(task, FailureKind::InvalidOutput, detail))
            }
        }
    }
}

fn schema_instruction<T: StructuredOutput>() -> String {
    format!(
        "You are a precise linguistic assistant. Respond with ONLY a JSON object \
         matching the {} schema below. No markdown, no explanation.\n{}",
        T::SCHEMA_NAME,
        T::SHAPE
    )
}

/// Parse model text into `T`, tolerating prose or code fences around the
/// JSON object.
pub fn parse_structured<T: StructuredOutput>(content: &str) -> Result<T, String> {
    let json_str = extract_json_object(content);
    let value: T = serde_json::from_str(json_str)
        .map_err(|e| format!("{} parse error: {e}", T::SCHEMA_NAME))?;
    value
        .validate()
        .map_err(|e| format!("{} validation failed: {e}", T::SCHEMA_NAME))?;
    Ok(value)
}

fn extract_json_object(content: &str) -> &str {
    if let Some(start) = content.find('{') {
        if let Some(end) = content.rfind('}') {
            if end > start {
                return &content[start..=end];
            }
        }
    }
    content
}

// ─── HTTP backend ────────────────────────────────────────

/// Ollama or OpenAI-compatible chat completion in JSON mode.
pub struct HttpCompletionBackend {
    client: reqwest::Client,
    config: LlmConfig,
}

impl HttpCompletionBackend {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        match self.config.provider.as_str() {
            "ollama" => call_ollama(&self.client, &self.config, request).await,
            "openai" => call_openai(&self.client, &self.config, request).await,
            other => anyhow::bail!("Unknown LLM provider: {other}"),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

fn messages(request: &CompletionRequest) -> Vec<Message> {
    vec![
        Message {
            role: "system".to_string(),
            content: request.system.clone(),
        },
        Message {
            role: "user".to_string(),
            content: request.prompt.clone(),
        },
    ]
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Message,
}

async fn call_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    request: &CompletionRequest,
) -> Result<String> {
    let url = format!("{}/api/chat", config.base_url);

    let req = OllamaChatRequest {
        model: config.chat_model.clone(),
        messages: messages(request),
        stream: false,
        format: "json",
        options: OllamaOptions {
            temperature: 0.0,
            num_predict: request.max_tokens,
        },
    };

    let resp = client
        .post(&url)
        .json(&req)
        .send()
        .await
        .with_context(|| format!("Failed to call Ollama chat API for {}", request.task))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Ollama chat API returned {status}: {body}");
    }

    let body: OllamaChatResponse = resp.json().await?;
    Ok(body.message.content)
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

async fn call_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    request: &CompletionRequest,
) -> Result<String> {
    let url = format!("{}/v1/chat/completions", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiChatRequest {
        model: config.chat_model.clone(),
        messages: messages(request),
        temperature: 0.0,
        max_tokens: request.max_tokens,
        response_format: ResponseFormat {
            kind: "json_object",
        },
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .with_context(|| format!("Failed to call OpenAI chat API for {}", request.task))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI chat API returned {status}: {body}");
    }

    let body: OpenAiChatResponse = resp.json().await?;
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("OpenAI chat API returned no content")
}
