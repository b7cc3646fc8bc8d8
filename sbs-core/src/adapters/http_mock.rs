//! Mock content API server for testing
//!
//! A small HTTP/1.1 server on a random local port that answers the routes the
//! HTTP transport uses:
//! - GET /api/Comment?Ids={id} returns [comment] or []
//! - PUT /api/Comment/{id} stores and echoes the body
//! - POST /api/Comment creates a comment from { parentId, content }
//! - GET /api/User?Ids={id},{id} returns generated users
//!
//! Writes require `Authorization: Bearer valid_*`.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::domain::{CommentDraft, RawComment, RawUser};

/// Mock content API server
pub struct MockApiServer {
    port: u16,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Configuration for the mock server
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Comments the server starts with
    pub comments: Vec<RawComment>,
    /// Answer every request with HTTP 500
    pub fail_all: bool,
}

type SharedComments = Arc<Mutex<Vec<RawComment>>>;

struct Request {
    method: String,
    path: String,
    headers: String,
    body: Vec<u8>,
}

impl MockApiServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let comments: SharedComments = Arc::new(Mutex::new(config.comments.clone()));

        // Non-blocking so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let comments = comments.clone();
                        let fail_all = config.fail_all;
                        thread::spawn(move || {
                            handle_connection(stream, &comments, fail_all);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// API root of this server, with trailing slash
    pub fn api_url(&self) -> String {
        format!("http://127.0.0.1:{}/api/", self.port)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    stream.set_nonblocking(false).ok()?;

    let mut data = Vec::new();
    let mut buffer = [0; 4096];
    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let mut parts = head.lines().next()?.split_whitespace();
    Some(Request {
        method: parts.next()?.to_string(),
        path: parts.next()?.to_string(),
        headers: head.to_lowercase(),
        body: data[header_end..].to_vec(),
    })
}

fn handle_connection(mut stream: TcpStream, comments: &SharedComments, fail_all: bool) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };

    if fail_all {
        send_response(&mut stream, 500, "Internal Server Error", r#"{"error":"boom"}"#);
        return;
    }

    let (path, query) = request
        .path
        .split_once('?')
        .unwrap_or((request.path.as_str(), ""));
    let ids: Vec<i64> = query
        .strip_prefix("Ids=")
        .unwrap_or("")
        .split(',')
        .filter_map(|id| id.parse().ok())
        .collect();
    let authorized = request.headers.contains("authorization: bearer valid_");

    match (request.method.as_str(), path) {
        ("GET", "/api/Comment") => {
            let store = comments.lock().unwrap();
            let found: Vec<&RawComment> = store.iter().filter(|c| ids.contains(&c.id)).collect();
            send_json(&mut stream, &found);
        }
        ("GET", "/api/User") => {
            let users: Vec<RawUser> = ids.iter().map(|&id| mock_user(id)).collect();
            send_json(&mut stream, &users);
        }
        ("PUT", _) | ("POST", _) if !authorized => {
            send_response(&mut stream, 401, "Unauthorized", r#"{"error":"bad token"}"#);
        }
        ("PUT", p) if p.starts_with("/api/Comment/") => {
            let id: i64 = p.trim_start_matches("/api/Comment/").parse().unwrap_or(0);
            let Ok(update) = serde_json::from_slice::<RawComment>(&request.body) else {
                send_response(&mut stream, 400, "Bad Request", r#"{"error":"bad body"}"#);
                return;
            };
            let mut store = comments.lock().unwrap();
            match store.iter_mut().find(|c| c.id == id) {
                Some(stored) => {
                    stored.content = update.content;
                    let echoed = stored.clone();
                    send_json(&mut stream, &echoed);
                }
                None => send_response(&mut stream, 404, "Not Found", r#"{"error":"missing"}"#),
            }
        }
        ("POST", "/api/Comment") => {
            let Ok(draft) = serde_json::from_slice::<CommentDraft>(&request.body) else {
                send_response(&mut stream, 400, "Bad Request", r#"{"error":"bad body"}"#);
                return;
            };
            let mut store = comments.lock().unwrap();
            let id = store.iter().map(|c| c.id).max().unwrap_or(0) + 1;
            let created = RawComment {
                parent_id: draft.parent_id,
                content: draft.content,
                create_date: "2024-05-01T12:00:00Z".to_string(),
                edit_date: "2024-05-01T12:00:00Z".to_string(),
                create_user_id: 1,
                edit_user_id: 1,
                deleted: false,
                id,
            };
            store.push(created.clone());
            send_json(&mut stream, &created);
        }
        _ => send_response(&mut stream, 404, "Not Found", r#"{"error":"no route"}"#),
    }
}

fn mock_user(id: i64) -> RawUser {
    RawUser {
        id,
        username: format!("user{}", id),
        avatar: Some(1000 + id),
        create_date: "2020-01-01T00:00:00Z".to_string(),
        special: None,
        banned: false,
        is_super: id == 1,
        registered: true,
    }
}

fn send_json<T: serde::Serialize>(stream: &mut TcpStream, value: &T) {
    let json = serde_json::to_string(value).unwrap();
    send_response(stream, 200, "OK", &json);
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_server_starts() {
        let server = MockApiServer::start(MockConfig::default()).unwrap();
        assert!(server.port() > 0);
        assert!(server.api_url().ends_with("/api/"));
    }
}
