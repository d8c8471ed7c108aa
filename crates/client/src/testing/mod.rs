//! Testing utilities for ParallelCore client tests.
//!
//! This module provides a [`MockNode`] that speaks the node's HTTP binding
//! on top of `wiremock`, envelope builders, static JSON fixtures, and
//! generators for event streams.
//! Available when running tests or when the `test-utils` feature is enabled.
//!
//! # Example
//! ```ignore
//! use pcore_client::testing::MockNode;
//! use pcore_client::rpc::Operation;
//!
//! let node = MockNode::start().await;
//! node.issue_token("alice", "abc123 1700000000").await;
//! node.reply(Operation::INVOKE, b"42").await;
//! let pool = node.endpoint();
//! ```

#[cfg(any(feature = "test-utils", test))]
pub mod generators;

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use pcore_config::constants::PROBE_REPLY;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::rpc::Operation;

/// Load a JSON fixture file from the fixtures directory.
///
/// # Panics
/// If the file is missing or is not valid JSON.
pub fn load_fixture(fixture_path: &str) -> Value {
    let full_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(fixture_path);
    let content = std::fs::read_to_string(&full_path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", full_path.display()));
    serde_json::from_str(&content).expect("Invalid JSON in fixture")
}

/// Envelope of a successful reply.
pub fn ok_envelope(payload: impl AsRef<[u8]>) -> Value {
    json!({ "payload": STANDARD.encode(payload), "error": "", "commitId": "" })
}

/// Envelope of a successful reply that committed a transaction.
pub fn committed_envelope(payload: impl AsRef<[u8]>, commit_id: &str) -> Value {
    json!({ "payload": STANDARD.encode(payload), "error": "", "commitId": commit_id })
}

/// Envelope of an application error.
pub fn error_envelope(message: &str) -> Value {
    json!({ "payload": "", "error": message, "commitId": "" })
}

/// Newline-delimited body of a server stream.
pub fn stream_body(envelopes: &[Value]) -> String {
    envelopes
        .iter()
        .map(|envelope| format!("{envelope}\n"))
        .collect()
}

/// Base64 form of `bytes`, as it appears in request bodies.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

/// A `host:port` that refuses connections.
///
/// # Panics
/// If no local port can be bound.
pub fn unreachable_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let address = listener.local_addr().expect("local address");
    drop(listener);
    address.to_string()
}

/// A mock ParallelCore node answering the liveness probe.
pub struct MockNode {
    server: MockServer,
}

impl MockNode {
    /// Start a healthy node: `Ping` answers `Pong`.
    pub async fn start() -> Self {
        let node = Self::start_bare().await;
        node.reply(Operation::PING, PROBE_REPLY).await;
        node
    }

    /// Start a node with no routes mounted.
    pub async fn start_bare() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// `host:port` of the node, for use in a pool spec.
    pub fn endpoint(&self) -> String {
        self.server.address().to_string()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Every request received so far.
    ///
    /// # Panics
    /// If request recording is disabled.
    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .expect("request recording enabled")
    }

    /// Requests received for `operation`.
    pub async fn received_for(&self, operation: Operation) -> Vec<wiremock::Request> {
        let path = operation.path();
        self.received()
            .await
            .into_iter()
            .filter(|request| request.url.path() == path)
            .collect()
    }

    /// Route for `operation`, to be completed with a responder.
    pub fn route(operation: Operation) -> wiremock::MockBuilder {
        Mock::given(method("POST")).and(path(operation.path()))
    }

    /// Answer every `operation` call with `payload`.
    pub async fn reply(&self, operation: Operation, payload: impl AsRef<[u8]>) {
        self.respond(operation, ResponseTemplate::new(200).set_body_json(ok_envelope(payload)))
            .await;
    }

    /// Answer every `operation` call with an application error.
    pub async fn reply_error(&self, operation: Operation, message: &str) {
        self.respond(
            operation,
            ResponseTemplate::new(200).set_body_json(error_envelope(message)),
        )
        .await;
    }

    /// Answer every `operation` call with `template`.
    pub async fn respond(&self, operation: Operation, template: ResponseTemplate) {
        Self::route(operation)
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// Answer `operation` with `payload` only for calls carrying `token`.
    pub async fn reply_for_token(&self, operation: Operation, token: &str, payload: impl AsRef<[u8]>) {
        Self::route(operation)
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(payload)))
            .mount(&self.server)
            .await;
    }

    /// Answer `Auth` for `client_id` with the session reply `session` (e.g. `"abc123 1700000000"`).
    pub async fn issue_token(&self, client_id: &str, session: &str) {
        Self::route(Operation::AUTH)
            .and(body_partial_json(json!({ "clientId": encode(client_id) })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(session)))
            .mount(&self.server)
            .await;
    }

    /// Answer `Renew` with the session reply `session`.
    pub async fn renew_to(&self, session: &str) {
        self.reply(Operation::RENEW, session).await;
    }

    /// Answer `RegisterEventListener` with a stream of `envelopes`.
    pub async fn stream(&self, envelopes: &[Value]) {
        self.respond(
            Operation::REGISTER_EVENT_LISTENER,
            ResponseTemplate::new(200)
                .set_body_raw(stream_body(envelopes), "application/x-ndjson"),
        )
        .await;
    }

    /// Forget every mounted route and recorded request.
    pub async fn reset(&self) {
        self.server.reset().await;
    }
}
