use geniesite_protocol::{encode_event, ProtocolEvent};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SITE: &str = "<!DOCTYPE html><html><body><h1>Bakery</h1></body></html>";

/// Mock relay serving canned event streams
pub struct RelayMockServer {
    server: MockServer,
}

impl RelayMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Concatenate encoded frames into one response body
    pub fn body(events: &[ProtocolEvent]) -> String {
        events.iter().map(encode_event).collect()
    }

    pub async fn mock_stream(&self, route: &str, prompt: &str, body: String) {
        Mock::given(method("POST"))
            .and(path(route))
            .and(body_partial_json(json!({ "prompt": prompt })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_rejection(&self, route: &str, status: u16, error: &str) {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({ "error": error, "status": status })),
            )
            .mount(&self.server)
            .await;
    }
}

pub fn happy_path() -> Vec<ProtocolEvent> {
    vec![
        ProtocolEvent::ThoughtsStart {
            message: "AI is thinking...".to_string(),
        },
        ProtocolEvent::Thoughts {
            content: "Warm palette. ".to_string(),
        },
        ProtocolEvent::Thoughts {
            content: "Menu section. ".to_string(),
        },
        ProtocolEvent::AnswerStart {
            message: "Generating code...".to_string(),
        },
        ProtocolEvent::Progress {
            message: "Generating code...".to_string(),
            progress: 2.0,
        },
        ProtocolEvent::Progress {
            message: "Generating code...".to_string(),
            progress: 4.0,
        },
        ProtocolEvent::Complete {
            code: SITE.to_string(),
            thoughts: "Warm palette. Menu section. ".to_string(),
        },
    ]
}

/// Raw relay that sends `body` as one chunk of a chunked response, then
/// closes the connection without the final zero-length chunk.
pub async fn spawn_truncated_relay(body: String) -> String {
    use tokio::io::AsyncWriteExt;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: text/event-stream\r\n\
             Transfer-Encoding: chunked\r\n\r\n\
             {:x}\r\n{}\r\n",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        // Let the client read the chunk before the connection drops.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        drop(socket);
    });

    format!("http://{}", addr)
}

/// Read headers and a `Content-Length` body.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    use tokio::io::AsyncReadExt;

    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            return;
        }
        request.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&request);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if request.len() >= end + 4 + length {
                return;
            }
        }
    }
}
