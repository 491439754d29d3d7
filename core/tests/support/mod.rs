//! Loopback mock storage backend for integration tests.
//!
//! A minimal HTTP/1.1 server on `127.0.0.1:0` that answers each request with
//! the next canned response and records everything it received, so tests can
//! assert on the exact wire shape (method, target, headers, body) the client
//! produces.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request as received on the wire.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Request target including the query string, e.g. `/list?path=docs`.
    pub target: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: u16,
    content_type: String,
    body: Vec<u8>,
}

#[derive(Default)]
struct State {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<VecDeque<CannedResponse>>,
}

/// Handle to a running mock backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<State>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(State::default());

        let accept_state = Arc::clone(&state);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let conn_state = Arc::clone(&accept_state);
                tokio::spawn(handle_connection(stream, conn_state));
            }
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue the response for the next request.
    pub fn enqueue(&self, status: u16, content_type: &str, body: impl Into<Vec<u8>>) {
        self.state
            .responses
            .lock()
            .unwrap()
            .push_back(CannedResponse {
                status,
                content_type: content_type.to_string(),
                body: body.into(),
            });
    }

    pub fn enqueue_json(&self, status: u16, body: &str) {
        self.enqueue(status, "application/json", body.as_bytes().to_vec());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

async fn handle_connection(mut stream: TcpStream, state: Arc<State>) {
    let mut buf: Vec<u8> = Vec::new();
    loop {
        // Read up to the end of the header block.
        let head_end = loop {
            if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
                break pos;
            }
            let mut chunk = [0u8; 4096];
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let mut lines = head.lines();
        let request_line = lines.next().unwrap_or_default().to_string();
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let target = parts.next().unwrap_or_default().to_string();

        let mut content_length = 0usize;
        let mut content_type = None;
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                let value = value.trim();
                match name.to_ascii_lowercase().as_str() {
                    "content-length" => content_length = value.parse().unwrap_or(0),
                    "content-type" => content_type = Some(value.to_string()),
                    _ => {}
                }
            }
        }

        let body_start = head_end + 4;
        while buf.len() < body_start + content_length {
            let mut chunk = [0u8; 4096];
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        let body = buf[body_start..body_start + content_length].to_vec();
        buf.drain(..body_start + content_length);

        state.requests.lock().unwrap().push(RecordedRequest {
            method,
            target,
            content_type,
            body,
        });

        let response = state
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CannedResponse {
                status: 500,
                content_type: "text/plain".to_string(),
                body: b"no canned response".to_vec(),
            });

        let reason = match response.status {
            200 => "OK",
            404 => "Not Found",
            409 => "Conflict",
            500 => "Internal Server Error",
            _ => "Unknown",
        };
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
            response.status,
            reason,
            response.content_type,
            response.body.len()
        );
        if stream.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        if stream.write_all(&response.body).await.is_err() {
            return;
        }
        if stream.flush().await.is_err() {
            return;
        }
    }
}
