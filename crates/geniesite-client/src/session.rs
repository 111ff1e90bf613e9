use geniesite_protocol::ProtocolEvent;
use serde::Serialize;

use crate::error::ClientError;

const GREETING: &str =
    "Hello! I'm here to help you build amazing websites. Just describe what you want!";
const CLEARED_GREETING: &str = "Chat cleared! What website would you like to create?";
const PROGRESS_PLACEHOLDER: &str = "Starting code generation...";
const SUCCESS_MESSAGE: &str = "✅ Website generated successfully!";
const TRANSPORT_FAILURE_MESSAGE: &str = "❌ Failed to generate website. Please try again.";
const DISCONNECTED_ERROR: &str = "Connection closed before generation completed";

/// Where a generation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Thinking,
    Answering,
    Done,
    Error,
}

impl Phase {
    /// `Done` and `Error` absorb every later event.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Ai,
}

/// One entry of the chat log a UI renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMessage {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub is_thought: bool,
}

/// UI-visible state of the current generation, changed only by
/// [`GenerationSession::apply`] and the lifecycle methods around it.
#[derive(Debug, Clone)]
pub struct GenerationSession {
    messages: Vec<SessionMessage>,
    next_id: u64,
    phase: Phase,
    generating: bool,
    typing: bool,
    transcript: String,
    thoughts_message: Option<u64>,
    progress_message: Option<u64>,
    progress: f32,
    progress_updates: usize,
    malformed_frames: usize,
    code: Option<String>,
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationSession {
    pub fn new() -> Self {
        Self::with_greeting(GREETING)
    }

    fn with_greeting(greeting: &str) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            next_id: 1,
            phase: Phase::Idle,
            generating: false,
            typing: false,
            transcript: String::new(),
            thoughts_message: None,
            progress_message: None,
            progress: 0.0,
            progress_updates: 0,
            malformed_frames: 0,
            code: None,
        };
        session.push_message(Role::Ai, greeting, false);
        session
    }

    /// Start a new generation for `prompt`.
    ///
    /// Only one generation may be in flight; a second submission is
    /// rejected rather than queued. Returns the trimmed prompt.
    pub fn begin(&mut self, prompt: &str) -> Result<String, ClientError> {
        if self.generating {
            return Err(ClientError::Busy);
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ClientError::EmptyPrompt);
        }

        self.push_message(Role::User, prompt, false);
        self.phase = Phase::Idle;
        self.generating = true;
        self.typing = true;
        self.transcript.clear();
        self.thoughts_message = None;
        self.progress_message = None;
        self.progress = 0.0;
        self.progress_updates = 0;
        self.malformed_frames = 0;
        self.code = None;

        Ok(prompt.to_string())
    }

    /// Apply one event. Returns `false` if it was ignored because the
    /// generation already reached a terminal state.
    pub fn apply(&mut self, event: &ProtocolEvent) -> bool {
        if self.phase.is_terminal() {
            log::debug!("Ignoring {} after terminal state", event.kind());
            return false;
        }

        match event {
            ProtocolEvent::ThoughtsStart { .. } => {
                self.typing = false;
                self.phase = Phase::Thinking;
            }
            ProtocolEvent::Thoughts { content } => {
                self.transcript.push_str(content);
                let transcript = self.transcript.clone();
                match self.thoughts_message {
                    Some(id) => self.update_message(id, transcript),
                    None => {
                        let id = self.push_message(Role::Ai, &transcript, true);
                        self.thoughts_message = Some(id);
                    }
                }
                if self.phase == Phase::Idle {
                    self.phase = Phase::Thinking;
                }
            }
            ProtocolEvent::AnswerStart { .. } => {
                if self.progress_message.is_none() {
                    let id = self.push_message(Role::Ai, PROGRESS_PLACEHOLDER, false);
                    self.progress_message = Some(id);
                }
                self.phase = Phase::Answering;
            }
            ProtocolEvent::Progress { message, progress } => {
                if let Some(id) = self.progress_message {
                    self.update_message(id, format!("{} ({}%)", message, progress.round()));
                }
                self.progress = *progress;
                self.progress_updates += 1;
                self.phase = Phase::Answering;
            }
            ProtocolEvent::Complete { code, .. } => {
                self.code = Some(code.clone());
                match self.progress_message {
                    Some(id) => self.update_message(id, SUCCESS_MESSAGE.to_string()),
                    None => {
                        let id = self.push_message(Role::Ai, SUCCESS_MESSAGE, false);
                        self.progress_message = Some(id);
                    }
                }
                self.progress = 100.0;
                self.typing = false;
                self.phase = Phase::Done;
            }
            ProtocolEvent::Error { error, .. } => {
                self.fail(&format!("❌ Error: {}", error));
            }
        }
        true
    }

    /// Count a frame the reassembler could not decode. State is unchanged.
    pub fn note_malformed(&mut self) {
        self.malformed_frames += 1;
    }

    /// The event sequence ended. Without a terminal event this is an
    /// implicit error (disconnect or timeout).
    pub fn end_of_stream(&mut self) {
        if self.generating && !self.phase.is_terminal() {
            log::warn!("Stream ended without a terminal event");
            self.fail(&format!("❌ Error: {}", DISCONNECTED_ERROR));
        }
        self.generating = false;
        self.typing = false;
    }

    /// The transport failed (read error, refused connection). Resets so the
    /// user can retry. A finished generation keeps its outcome.
    pub fn transport_failed(&mut self) {
        if self.phase.is_terminal() {
            log::debug!("Transport failure after terminal state ignored");
        } else {
            self.fail(TRANSPORT_FAILURE_MESSAGE);
        }
        self.generating = false;
        self.typing = false;
    }

    /// The server refused the request before any stream was opened.
    pub fn request_rejected(&mut self, message: &str) {
        self.fail(&format!("❌ Error: {}", message));
        self.generating = false;
    }

    /// Clear history and any finished result.
    pub fn clear(&mut self) {
        let generating = self.generating;
        *self = Self::with_greeting(CLEARED_GREETING);
        self.generating = generating;
    }

    fn fail(&mut self, message: &str) {
        self.push_message(Role::Ai, message, false);
        self.progress = 0.0;
        self.typing = false;
        self.phase = Phase::Error;
    }

    fn push_message(&mut self, role: Role, content: &str, is_thought: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(SessionMessage {
            id,
            role,
            content: content.to_string(),
            is_thought,
        });
        id
    }

    fn update_message(&mut self, id: u64, content: String) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            message.content = content;
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn messages(&self) -> &[SessionMessage] {
        &self.messages
    }

    /// Reasoning received so far, as displayed.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Number of progress events seen for the current generation.
    pub fn progress_updates(&self) -> usize {
        self.progress_updates
    }

    pub fn malformed_frames(&self) -> usize {
        self.malformed_frames
    }

    /// Final sanitized document, once `complete` arrived.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}
