use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::sleep;
use tracing::warn;

use super::{GenerationError, PromptTemplate, Sentence, SentenceGenerator, SentenceRequest};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_RETRIES: usize = 3;
const BASE_BACKOFF_MS: u64 = 200;
const SCHEMA_NAME: &str = "word_learning";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct SentencesPayload {
    sentences: Vec<Sentence>,
}

/// Generates practice sentences through an OpenAI-compatible chat completions
/// endpoint using a strict JSON schema response format.
#[derive(Clone)]
pub struct LlmSentenceGenerator {
    config: LlmConfig,
    prompt: PromptTemplate,
    client: reqwest::Client,
}

impl LlmSentenceGenerator {
    pub fn new(config: LlmConfig, prompt: PromptTemplate) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config: LlmConfig {
                api_endpoint: normalize_endpoint(&config.api_endpoint),
                ..config
            },
            prompt,
            client,
        })
    }

    pub fn is_available(&self) -> bool {
        self.api_key().is_some() && !self.config.model.trim().is_empty()
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
    }

    fn payload(&self, prompt: String) -> serde_json::Value {
        let messages = [ChatMessage {
            role: "user".into(),
            content: prompt,
        }];
        json!({
            "model": self.config.model,
            "messages": messages,
            "stream": false,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": SCHEMA_NAME,
                    "strict": true,
                    "schema": response_schema(),
                }
            }
        })
    }

    async fn post_with_retry(
        &self,
        url: &str,
        api_key: &str,
        payload: &serde_json::Value,
    ) -> Result<ChatResponse, GenerationError> {
        let mut retry = 0;
        loop {
            let err = match self.client.post(url).bearer_auth(api_key).json(payload).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let bytes = resp.bytes().await?;
                        return Ok(serde_json::from_slice(&bytes)?);
                    }
                    let body = resp.text().await.unwrap_or_default();
                    if !is_retryable(status) {
                        return Err(GenerationError::HttpStatus { status, body });
                    }
                    GenerationError::HttpStatus { status, body }
                }
                Err(e) => GenerationError::Request(e),
            };

            if retry >= MAX_RETRIES {
                return Err(err);
            }
            warn!(retry, error = %err, "sentence generation request failed, retrying");
            sleep(Duration::from_millis(BASE_BACKOFF_MS << retry)).await;
            retry += 1;
        }
    }
}

#[async_trait]
impl SentenceGenerator for LlmSentenceGenerator {
    async fn generate(
        &self,
        request: SentenceRequest<'_>,
        count: usize,
    ) -> Result<Vec<Sentence>, GenerationError> {
        let api_key = self
            .api_key()
            .ok_or(GenerationError::NotConfigured("VOCABFORGE_LLM_API_KEY"))?;

        let url = format!("{}/chat/completions", self.config.api_endpoint);
        let payload = self.payload(self.prompt.render(request, count));
        let response = self.post_with_retry(&url, api_key, &payload).await?;

        let content = response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or(GenerationError::Empty)?;
        parse_sentences(content)
    }
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "sentences": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "text": { "type": "string" } },
                    "required": ["text"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["sentences"],
        "additionalProperties": false
    })
}

fn parse_sentences(content: &str) -> Result<Vec<Sentence>, GenerationError> {
    let payload: SentencesPayload = serde_json::from_str(content)?;
    let sentences: Vec<Sentence> = payload
        .sentences
        .into_iter()
        .map(|s| Sentence {
            text: s.text.trim().to_string(),
        })
        .filter(|s| !s.text.is_empty())
        .collect();

    if sentences.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(sentences)
}

fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") || trimmed.contains("/v1/") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}
