//! Stream relay: model parts in, protocol events out.
//!
//! [`GenerationRelay`] holds the per-request state (transcript, raw answer,
//! counters) and decides which events each part produces. [`relay_events`]
//! drives it from a [`PartSource`] and guarantees that the resulting sequence
//! ends with exactly one terminal event, whatever fails along the way.

use async_stream::stream;
use futures::{Stream, StreamExt};
use geniesite_model::{ModelError, ModelPart, PartSource};
use geniesite_protocol::ProtocolEvent;
use geniesite_sanitize::{sanitize, SanitizeError};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::RelayConfig;

pub const THINKING_MESSAGE: &str = "AI is thinking...";
pub const GENERATING_MESSAGE: &str = "Generating code...";

/// Summary carried by every `error` event the relay emits.
pub const FAILURE_SUMMARY: &str = "Stream processing failed";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Upstream(#[from] ModelError),
    #[error(transparent)]
    InvalidDocument(#[from] SanitizeError),
}

impl RelayError {
    pub fn to_event(&self) -> ProtocolEvent {
        ProtocolEvent::error(FAILURE_SUMMARY, Some(self.to_string()))
    }
}

/// Wrap the user's description in the fixed generation instructions.
pub fn instruction_prompt(prompt: &str) -> String {
    format!(
        "Create a complete HTML website based on: \"{}\".\n\n\
         Requirements:\n\
         - Single HTML file with embedded CSS and JavaScript\n\
         - Modern, responsive design that works on mobile and desktop\n\
         - Semantic HTML5 elements\n\
         - Navigation links must point to real section ids on the page (href=\"#section-id\")\n\
         - Start with <!DOCTYPE html> and end with </html>\n\
         - Output only the HTML document, no explanations or markdown",
        prompt
    )
}

/// Collapse line breaks in a reasoning fragment into single spaces.
fn normalize_thought(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Per-request relay state. Nothing here is shared between requests.
#[derive(Debug)]
pub struct GenerationRelay {
    id: Uuid,
    config: RelayConfig,
    transcript: String,
    raw_answer: String,
    thoughts_started: bool,
    answer_started: bool,
    output_parts: u32,
}

impl GenerationRelay {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            transcript: String::new(),
            raw_answer: String::new(),
            thoughts_started: false,
            answer_started: false,
            output_parts: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Events produced by one model part, in emission order.
    pub fn on_part(&mut self, part: &ModelPart) -> Vec<ProtocolEvent> {
        if part.text.is_empty() {
            return Vec::new();
        }

        let mut events = Vec::new();
        if part.is_reasoning {
            let fragment = normalize_thought(&part.text);
            if fragment.is_empty() {
                return events;
            }
            if !self.thoughts_started {
                self.thoughts_started = true;
                log::info!("[{}] 🧠 AI thinking process started", self.id);
                events.push(ProtocolEvent::ThoughtsStart {
                    message: THINKING_MESSAGE.to_string(),
                });
            }
            let content = format!("{} ", fragment);
            self.transcript.push_str(&content);
            log::trace!("[{}] thought: {}", self.id, fragment);
            events.push(ProtocolEvent::Thoughts { content });
        } else {
            if !self.answer_started {
                self.answer_started = true;
                log::info!("[{}] ⚙️  Code generation started", self.id);
                events.push(ProtocolEvent::AnswerStart {
                    message: GENERATING_MESSAGE.to_string(),
                });
            }
            self.raw_answer.push_str(&part.text);
            self.output_parts += 1;
            events.push(ProtocolEvent::Progress {
                message: GENERATING_MESSAGE.to_string(),
                progress: self.progress() as f32,
            });
        }
        events
    }

    /// Approximate progress: a fixed step per output part, capped below 100.
    pub fn progress(&self) -> u32 {
        self.output_parts
            .saturating_mul(self.config.progress_step)
            .min(self.config.progress_cap)
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn raw_answer(&self) -> &str {
        &self.raw_answer
    }

    /// Sanitize the accumulated answer into the `complete` event.
    pub fn finish(self) -> Result<ProtocolEvent, RelayError> {
        log::info!(
            "[{}] 🔧 Cleaning generated code ({} bytes)",
            self.id,
            self.raw_answer.len()
        );
        let code = sanitize(&self.raw_answer)?;
        log::info!("[{}] ✅ Website generated successfully", self.id);
        Ok(ProtocolEvent::Complete {
            code,
            thoughts: self.transcript.trim().to_string(),
        })
    }
}

/// Relay one generation as a stream of protocol events.
///
/// The stream always ends with exactly one `complete` or `error` event.
/// There is no timeout on the upstream: if the model stalls, so does this.
pub fn relay_events(
    source: Arc<dyn PartSource>,
    prompt: String,
    config: RelayConfig,
) -> impl Stream<Item = ProtocolEvent> + Send + 'static {
    stream! {
        let thought_delay = config.thought_delay;
        let mut relay = GenerationRelay::new(config);
        let id = relay.id();

        log::info!("[{}] 📝 Generating website with {} for prompt: {:?}", id, source.name(), prompt);

        let mut parts = match source.stream_parts(&instruction_prompt(&prompt)).await {
            Ok(parts) => parts,
            Err(e) => {
                let err = RelayError::from(e);
                log::error!("[{}] ❌ Could not start generation: {}", id, err);
                yield err.to_event();
                return;
            }
        };

        while let Some(part) = parts.next().await {
            let part = match part {
                Ok(part) => part,
                Err(e) => {
                    let err = RelayError::from(e);
                    log::error!("[{}] ❌ Streaming error: {}", id, err);
                    yield err.to_event();
                    return;
                }
            };

            let events = relay.on_part(&part);
            let paced = part.is_reasoning && !events.is_empty();
            for event in events {
                yield event;
            }
            if paced && !thought_delay.is_zero() {
                tokio::time::sleep(thought_delay).await;
            }
        }

        match relay.finish() {
            Ok(complete) => yield complete,
            Err(err) => {
                log::error!("[{}] ❌ {}", id, err);
                yield err.to_event();
            }
        }
    }
}
