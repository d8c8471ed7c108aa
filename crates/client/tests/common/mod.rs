//! Common test utilities for integration tests.
//!
//! This module re-exports the mock node and envelope helpers from
//! `pcore_client::testing` and adds shortcuts for opening clients against
//! mock nodes. All integration tests should use these utilities to ensure
//! consistency.
//!
//! # Invariants
//! - Fixtures are loaded from the `fixtures/` directory relative to the crate root
//! - Clients opened here use plaintext transport and metrics disabled
//!
//! # What this does NOT handle
//! - Test-specific assertions or test logic

pub mod raw_node;

use std::time::Duration;

#[allow(unused_imports)]
pub use pcore_client::testing::{
    MockNode, committed_envelope, encode, error_envelope, load_fixture, ok_envelope,
    stream_body, unreachable_endpoint,
};
#[allow(unused_imports)]
pub use pcore_client::{
    Client, ClientError, ClientGroup, EndpointSelection, MetricsCollector, Operation,
    SessionToken, TransportSecurity,
};
#[allow(unused_imports)]
pub use secrecy::SecretString;
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

/// Client id used by every test that authenticates.
#[allow(dead_code)]
pub const CLIENT_ID: &str = "alice";

/// A future expiry, in epoch seconds.
#[allow(dead_code)]
pub const FAR_EXPIRY: i64 = 4_102_444_800;

#[allow(dead_code)]
pub fn secret(value: &str) -> SecretString {
    SecretString::new(value.into())
}

/// Builder preconfigured for mock nodes: plaintext, ordered selection, short deadlines.
#[allow(dead_code)]
pub fn builder(pool: &str) -> pcore_client::ClientBuilder {
    Client::builder()
        .endpoints(pool)
        .selection(EndpointSelection::Ordered)
        .security(TransportSecurity::Plaintext)
        .timeout(Duration::from_secs(5))
        .probe_timeout(Duration::from_secs(2))
        .connect_timeout(Duration::from_secs(2))
        .metrics(MetricsCollector::disabled())
}

/// A healthy node that issues `token` (expiring at [`FAR_EXPIRY`]) to [`CLIENT_ID`].
#[allow(dead_code)]
pub async fn node_issuing(token: &str) -> MockNode {
    let node = MockNode::start().await;
    node.issue_token(CLIENT_ID, &format!("{token} {FAR_EXPIRY}"))
        .await;
    node
}

/// Open a client on `node` with credentials.
#[allow(dead_code)]
pub async fn open_client(node: &MockNode) -> Client {
    open_client_on(&node.endpoint()).await
}

/// Open a client on `pool` with credentials.
#[allow(dead_code)]
pub async fn open_client_on(pool: &str) -> Client {
    builder(pool)
        .credentials(CLIENT_ID, secret("s3cret"))
        .open()
        .await
        .expect("client should open against a healthy node")
}

/// Space-separated pool spec of `endpoints`.
#[allow(dead_code)]
pub fn pool_of(endpoints: &[String]) -> String {
    endpoints.join(" ")
}

/// The bearer token carried by a recorded request, if any.
#[allow(dead_code)]
pub fn bearer_of(request: &wiremock::Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// The decoded `payload` field of a recorded request body.
#[allow(dead_code)]
pub fn request_payload(request: &wiremock::Request) -> Vec<u8> {
    use base64::Engine as _;
    let body: serde_json::Value =
        serde_json::from_slice(&request.body).expect("request body should be JSON");
    let payload = body["payload"].as_str().unwrap_or_default();
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .expect("payload should be base64")
}
