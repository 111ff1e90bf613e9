use futures::{Stream, StreamExt};
use geniesite_protocol::{GenerationRequest, ProtocolEvent};
use serde::Deserialize;

use crate::error::ClientError;
use crate::reassembler::{reassemble, ReassembledFrame};
use crate::session::GenerationSession;

pub const GENERATE_ROUTE: &str = "/api/generate";

/// Older alias kept by the relay for existing frontends.
pub const LEGACY_GENERATE_ROUTE: &str = "/api/generate-website";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for a GenieSite relay.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    base_url: String,
    route: &'static str,
    client: reqwest::Client,
}

impl GenerationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            route: GENERATE_ROUTE,
            client: reqwest::Client::new(),
        }
    }

    /// Talk to the legacy route instead.
    pub fn legacy(mut self) -> Self {
        self.route = LEGACY_GENERATE_ROUTE;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.route)
    }

    /// Submit `prompt` and return the reassembled frames of the response.
    pub async fn open(
        &self,
        prompt: &str,
    ) -> Result<impl Stream<Item = Result<ReassembledFrame, reqwest::Error>>, ClientError> {
        log::debug!("POST {}", self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .header("Accept", "text/event-stream")
            .json(&GenerationRequest::new(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| {
                    if body.trim().is_empty() {
                        status.to_string()
                    } else {
                        body
                    }
                });
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(reassemble(response.bytes_stream()))
    }

    /// Drive one generation to its end, folding every event into `session`.
    ///
    /// `on_event` sees each applied event together with the updated session.
    /// The session always ends in a non-generating state, whatever the outcome.
    pub async fn run<F>(
        &self,
        session: &mut GenerationSession,
        prompt: &str,
        mut on_event: F,
    ) -> Result<(), ClientError>
    where
        F: FnMut(&GenerationSession, &ProtocolEvent),
    {
        let prompt = session.begin(prompt)?;

        let frames = match self.open(&prompt).await {
            Ok(frames) => frames,
            Err(ClientError::Rejected { status, message }) => {
                log::warn!("Request rejected ({}): {}", status, message);
                session.request_rejected(&message);
                return Err(ClientError::Rejected { status, message });
            }
            Err(e) => {
                log::error!("Could not reach relay: {}", e);
                session.transport_failed();
                return Err(e);
            }
        };
        let mut frames = Box::pin(frames);

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(ReassembledFrame::Event(event)) => {
                    if session.apply(&event) {
                        on_event(session, &event);
                    }
                }
                Ok(ReassembledFrame::Malformed { .. }) => session.note_malformed(),
                Err(e) if session.phase().is_terminal() => {
                    log::warn!("Stream read failed after final event: {}", e);
                    break;
                }
                Err(e) => {
                    log::error!("Stream read failed: {}", e);
                    session.transport_failed();
                    return Err(ClientError::Transport(e));
                }
            }
        }

        session.end_of_stream();
        Ok(())
    }
}
