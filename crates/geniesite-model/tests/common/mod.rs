use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MODEL: &str = "gemini-2.5-flash";

/// Mock Gemini endpoint for exercising the streaming client
pub struct GeminiMockServer {
    server: MockServer,
}

impl GeminiMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    fn stream_path() -> String {
        format!("/v1beta/models/{}:streamGenerateContent", TEST_MODEL)
    }

    /// Build an SSE body where each entry is one `(text, is_thought)` chunk
    pub fn sse_body(parts: &[(&str, bool)]) -> String {
        parts
            .iter()
            .map(|(text, thought)| {
                let chunk = json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [{ "text": text, "thought": thought }]
                        }
                    }]
                });
                format!("data: {}\r\n\r\n", chunk)
            })
            .collect()
    }

    /// Mock a successful stream; only matches well-formed requests
    pub async fn mock_stream(&self, body: String) {
        Mock::given(method("POST"))
            .and(path(Self::stream_path()))
            .and(query_param("alt", "sse"))
            .and(header("x-goog-api-key", TEST_API_KEY))
            .and(body_partial_json(json!({
                "generationConfig": { "thinkingConfig": { "includeThoughts": true } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&self.server)
            .await;
    }

    /// Mock an HTTP-level failure
    pub async fn mock_status(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path(Self::stream_path()))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": { "code": status, "message": message, "status": "INVALID_ARGUMENT" }
            })))
            .mount(&self.server)
            .await;
    }
}
