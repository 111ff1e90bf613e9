use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use geniesite_protocol::FrameBuffer;
use serde::Deserialize;
use serde_json::Value;

use crate::client::{ModelError, ModelPart, PartSource, PartStream};

/// Default Gemini API base URL
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for website generation
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Gemini streaming client (`streamGenerateContent` with `alt=sse`).
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String, base_url: Option<String>) -> Self {
        // Ensure base_url doesn't end with a slash
        let base_url = base_url
            .unwrap_or_else(|| GEMINI_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let api_key = api_key.filter(|key| !key.trim().is_empty());

        Self {
            api_key,
            model,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    fn build_request(prompt: &str) -> Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "thinkingConfig": { "includeThoughts": true }
            }
        })
    }
}

#[async_trait]
impl PartSource for GeminiClient {
    async fn stream_parts(&self, prompt: &str) -> Result<PartStream, ModelError> {
        let api_key = self.api_key.as_deref().ok_or(ModelError::MissingApiKey)?;

        log::debug!("POST {} ({} prompt chars)", self.stream_url(), prompt.len());

        let response = self
            .client
            .post(self.stream_url())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&Self::build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut byte_stream = response.bytes_stream();

        let parts = stream! {
            let mut frames = FrameBuffer::new();

            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(ModelError::Transport(e));
                        return;
                    }
                };

                for payload in frames.push(&chunk) {
                    match parse_payload(&payload) {
                        Ok(parts) => {
                            for part in parts {
                                yield Ok(part);
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }

            // Last event may arrive without a trailing blank line
            if let Some(payload) = frames.finish() {
                match parse_payload(&payload) {
                    Ok(parts) => {
                        for part in parts {
                            yield Ok(part);
                        }
                    }
                    Err(e) => yield Err(e),
                }
            }
        };

        Ok(Box::new(Box::pin(parts)))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Turn one SSE payload into the parts of its first candidate.
///
/// Chunks without candidates or text (usage-only updates, safety metadata)
/// yield no parts rather than an error.
fn parse_payload(payload: &str) -> Result<Vec<ModelPart>, ModelError> {
    let payload = payload.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return Ok(Vec::new());
    }

    let chunk: StreamChunk = serde_json::from_str(payload)
        .map_err(|e| ModelError::MalformedResponse(format!("{}: {}", e, payload)))?;

    if let Some(error) = chunk.error {
        let message = error
            .message
            .or(error.status)
            .unwrap_or_else(|| "An error occurred during streaming".to_string());
        return Err(ModelError::Api(message));
    }

    let parts = chunk
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();

    Ok(parts
        .into_iter()
        .filter_map(|part| {
            let text = part.text?;
            Some(ModelPart {
                text,
                is_reasoning: part.thought,
            })
        })
        .collect())
}
