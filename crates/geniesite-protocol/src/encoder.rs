use serde::Serialize;

use crate::event::ProtocolEvent;

/// Marker that starts the data line of every frame.
pub const DATA_PREFIX: &str = "data: ";

/// A blank line ends a frame.
pub const FRAME_TERMINATOR: &str = "\n\n";

/// Used only if even the substitute error event cannot be serialized.
const FALLBACK_ERROR_JSON: &str = r#"{"type":"error","error":"JSON serialization failed"}"#;

/// Encode one protocol event as one transport frame.
pub fn encode_event(event: &ProtocolEvent) -> String {
    encode_frame(event)
}

/// Encode any serializable value as a `data:` frame.
///
/// This never fails: a value that cannot be serialized is replaced by an
/// `error` event describing the failure, so the stream stays well formed.
pub fn encode_frame<T: Serialize + ?Sized>(value: &T) -> String {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::error!("JSON serialization failed: {}", e);
            serialization_failure(&e)
        }
    };

    format!("{}{}{}", DATA_PREFIX, json, FRAME_TERMINATOR)
}

fn serialization_failure(err: &serde_json::Error) -> String {
    let substitute = ProtocolEvent::error("JSON serialization failed", Some(err.to_string()));
    serde_json::to_string(&substitute).unwrap_or_else(|_| FALLBACK_ERROR_JSON.to_string())
}
