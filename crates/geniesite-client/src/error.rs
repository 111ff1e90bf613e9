use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("a generation is already in progress")]
    Busy,
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
