mod llm;
mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use llm::{LlmConfig, LlmSentenceGenerator};
pub use prompt::PromptTemplate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
}

/// The word a batch of practice sentences is generated for.
#[derive(Debug, Clone, Copy)]
pub struct SentenceRequest<'a> {
    pub spelling: &'a str,
    pub definition: &'a str,
    pub lexical_category: &'a str,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("sentence generator not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
    #[error("JSON decode failed")]
    Json(#[from] serde_json::Error),
    #[error("empty response")]
    Empty,
}

#[async_trait]
pub trait SentenceGenerator: Send + Sync {
    async fn generate(
        &self,
        request: SentenceRequest<'_>,
        count: usize,
    ) -> Result<Vec<Sentence>, GenerationError>;
}
