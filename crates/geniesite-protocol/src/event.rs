use serde::{Deserialize, Serialize};

/// Body of a generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// `null` and a missing field both deserialize to `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
        }
    }

    /// The trimmed prompt, or `None` if there is nothing to generate from.
    pub fn validated_prompt(&self) -> Option<&str> {
        self.prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
    }
}

/// One event of a generation stream.
///
/// Serialized with an internal `type` tag, so `ThoughtsStart` goes over the
/// wire as `{"type":"thoughts_start","message":...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEvent {
    // Reasoning
    ThoughtsStart {
        message: String,
    },
    Thoughts {
        content: String,
    },

    // Answer
    AnswerStart {
        message: String,
    },
    Progress {
        message: String,
        progress: f32,
    },

    // Terminal events
    Complete {
        code: String,
        thoughts: String,
    },
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl ProtocolEvent {
    pub fn error(error: impl Into<String>, details: Option<String>) -> Self {
        Self::Error {
            error: error.into(),
            details,
        }
    }

    /// `complete` and `error` end a generation; nothing follows them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    /// The wire name of this event's `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ThoughtsStart { .. } => "thoughts_start",
            Self::Thoughts { .. } => "thoughts",
            Self::AnswerStart { .. } => "answer_start",
            Self::Progress { .. } => "progress",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }
}
