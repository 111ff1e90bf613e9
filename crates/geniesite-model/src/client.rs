use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One increment of a model's streamed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPart {
    pub text: String,
    /// `true` for internal reasoning ("thought" annotations), `false` for output.
    pub is_reasoning: bool,
}

impl ModelPart {
    pub fn thought(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_reasoning: true,
        }
    }

    pub fn output(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_reasoning: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model API key is not configured")]
    MissingApiKey,
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model API error: {0}")]
    Api(String),
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

/// Stream of parts as produced by a [`PartSource`].
pub type PartStream = Box<dyn Stream<Item = Result<ModelPart, ModelError>> + Send + Unpin>;

/// A generative model that streams parts for a prompt.
#[async_trait]
pub trait PartSource: Send + Sync {
    /// Start a generation. Reasoning annotations are always requested.
    async fn stream_parts(&self, prompt: &str) -> Result<PartStream, ModelError>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "model"
    }
}
