//! A node served straight off a `TcpListener`.
//!
//! Speaks just enough HTTP/1.1 for the client's unary calls and counts the
//! sockets it accepts and sees closed. `RegisterEventListener` gets stream
//! headers and then silence.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pcore_client::Operation;
use pcore_client::testing::ok_envelope;
use pcore_config::constants::PROBE_REPLY;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct RawNode {
    endpoint: String,
    accepted: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl RawNode {
    /// Start a node answering `Ping` and issuing `session` on `Auth`.
    pub async fn start(session: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();
        let session = Arc::new(session.to_string());
        let accepted = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicUsize::new(0));

        let task = tokio::spawn({
            let accepted = Arc::clone(&accepted);
            let closed = Arc::clone(&closed);
            async move {
                while let Ok((socket, _)) = listener.accept().await {
                    accepted.fetch_add(1, Ordering::SeqCst);
                    let session = Arc::clone(&session);
                    let closed = Arc::clone(&closed);
                    tokio::spawn(async move {
                        serve(socket, &session).await;
                        closed.fetch_add(1, Ordering::SeqCst);
                    });
                }
            }
        });

        Self {
            endpoint,
            accepted,
            closed,
            task,
        }
    }

    pub fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Sockets accepted and not yet closed by the client.
    pub fn open_sockets(&self) -> usize {
        self.accepted() - self.closed()
    }

    /// Wait until `open_sockets() == expected`, giving up after `limit`.
    pub async fn settle(&self, expected: usize, limit: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + limit;
        while tokio::time::Instant::now() < deadline {
            if self.open_sockets() == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.open_sockets() == expected
    }
}

impl Drop for RawNode {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Serve requests on one keep-alive socket until the peer closes it.
async fn serve(mut socket: TcpStream, session: &str) {
    let mut buffer = Vec::new();
    loop {
        let Some(head_end) = read_head(&mut socket, &mut buffer).await else {
            return;
        };
        let head = String::from_utf8_lossy(&buffer[..head_end]).to_string();
        let body_end = head_end + 4 + content_length(&head);
        while buffer.len() < body_end {
            if !read_more(&mut socket, &mut buffer).await {
                return;
            }
        }
        buffer.drain(..body_end);

        let path = head.split_whitespace().nth(1).unwrap_or_default().to_string();
        let reply = if path == Operation::PING.path() {
            ok_envelope(PROBE_REPLY)
        } else if path == Operation::AUTH.path() {
            ok_envelope(session)
        } else if path == Operation::REGISTER_EVENT_LISTENER.path() {
            let headers = "HTTP/1.1 200 OK\r\ncontent-type: application/x-ndjson\r\ntransfer-encoding: chunked\r\n\r\n";
            if socket.write_all(headers.as_bytes()).await.is_err() {
                return;
            }
            while read_more(&mut socket, &mut buffer).await {}
            return;
        } else {
            let missing = "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\n\r\n";
            if socket.write_all(missing.as_bytes()).await.is_err() {
                return;
            }
            continue;
        };

        let body = reply.to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{body}",
            body.len()
        );
        if socket.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

async fn read_head(socket: &mut TcpStream, buffer: &mut Vec<u8>) -> Option<usize> {
    loop {
        if let Some(end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            return Some(end);
        }
        if !read_more(socket, buffer).await {
            return None;
        }
    }
}

/// Read one chunk into `buffer`. False once the peer has closed the socket.
async fn read_more(socket: &mut TcpStream, buffer: &mut Vec<u8>) -> bool {
    let mut chunk = [0u8; 4096];
    match socket.read(&mut chunk).await {
        Ok(0) | Err(_) => false,
        Ok(read) => {
            buffer.extend_from_slice(&chunk[..read]);
            true
        }
    }
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}
