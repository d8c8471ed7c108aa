//! Smart contract event listener tests.
//!
//! # Invariants
//! - Registration fails unless the first envelope acknowledges it within the client timeout
//! - The listener ends after its first error
//! - Listener failures never close the client

mod common;

use std::time::Duration;

use common::raw_node::RawNode;
use common::*;
use futures::StreamExt;
use pcore_client::testing::generators::EventStreamGenerator;
use pcore_config::constants::EVENT_LISTENER_REGISTERED;

#[tokio::test]
async fn test_events_are_delivered_then_stream_closes() {
    let node = node_issuing("abc123").await;
    let transfer = load_fixture("events/transfer.json");
    node.stream(&[
        ok_envelope(EVENT_LISTENER_REGISTERED),
        ok_envelope(transfer.to_string()),
    ])
    .await;

    let client = open_client(&node).await;
    let mut listener = client
        .register_event_listener("token", "Transfer|Mint")
        .await
        .unwrap();
    assert_eq!(listener.sc_name(), "token");

    let event = listener.recv().await.unwrap().unwrap();
    assert_eq!(event.tx_id, "9f2c1e");
    assert_eq!(event.event_name, "Transfer");
    assert!(event.payload.contains("\"amount\":25"));

    assert!(matches!(
        listener.recv().await,
        Some(Err(ClientError::StreamClosed(_)))
    ));
    assert!(listener.recv().await.is_none());
    assert!(!client.is_closed());
}

#[tokio::test]
async fn test_registration_request_carries_contract_and_filter() {
    let node = node_issuing("abc123").await;
    node.stream(&[ok_envelope(EVENT_LISTENER_REGISTERED)]).await;

    let client = open_client(&node).await;
    let _listener = client.register_event_listener("escrow", "^Release$").await.unwrap();

    let requests = node.received_for(Operation::REGISTER_EVENT_LISTENER).await;
    assert_eq!(requests.len(), 1);
    assert_eq!(bearer_of(&requests[0]).as_deref(), Some("abc123"));
    let body: serde_json::Value = serde_json::from_slice(&request_payload(&requests[0])).unwrap();
    assert_eq!(body["scName"], "escrow");
    assert_eq!(body["eventFilter"], "^Release$");
}

#[tokio::test]
async fn test_listener_is_a_stream() {
    let node = node_issuing("abc123").await;
    let envelopes = EventStreamGenerator::seeded("token", 11).stream(5);
    node.stream(&envelopes).await;

    let client = open_client(&node).await;
    let listener = client.register_event_listener("token", ".*").await.unwrap();
    let items: Vec<_> = listener.collect().await;

    assert_eq!(items.len(), 6);
    assert!(items[..5].iter().all(|item| matches!(item, Ok(event) if event.sc_name == "token")));
    assert!(matches!(items[5], Err(ClientError::StreamClosed(_))));
}

#[tokio::test]
async fn test_error_envelope_ends_listener() {
    let node = node_issuing("abc123").await;
    let envelopes = EventStreamGenerator::seeded("token", 3)
        .with_trailing_error("listener evicted")
        .stream(1);
    node.stream(&envelopes).await;

    let client = open_client(&node).await;
    let mut listener = client.register_event_listener("token", ".*").await.unwrap();

    assert!(listener.recv().await.unwrap().is_ok());
    let err = listener.recv().await.unwrap().unwrap_err();
    assert!(err.to_string().contains("listener evicted"));
    assert!(listener.recv().await.is_none());
    assert!(!client.is_closed());
}

#[tokio::test]
async fn test_invalid_filter_is_rejected_locally() {
    let node = node_issuing("abc123").await;
    let client = open_client(&node).await;

    let err = client.register_event_listener("token", "(unclosed").await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidEventFilter(_)));
    assert!(node.received_for(Operation::REGISTER_EVENT_LISTENER).await.is_empty());
}

#[tokio::test]
async fn test_missing_acknowledgement_fails_registration() {
    let node = node_issuing("abc123").await;
    node.stream(&[ok_envelope("Registered?")]).await;

    let client = open_client(&node).await;
    let err = client.register_event_listener("token", ".*").await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_rejected_registration_is_application_error() {
    let node = node_issuing("abc123").await;
    node.stream(&[error_envelope("no such smart contract")]).await;

    let client = open_client(&node).await;
    let err = client.register_event_listener("ghost", ".*").await.unwrap_err();

    assert!(err.is_application_error());
}

#[tokio::test]
async fn test_empty_stream_fails_registration() {
    let node = node_issuing("abc123").await;
    node.stream(&[]).await;

    let client = open_client(&node).await;
    let err = client.register_event_listener("token", ".*").await.unwrap_err();

    assert!(matches!(err, ClientError::StreamClosed(_)));
}

#[tokio::test]
async fn test_closed_listener_stops_yielding() {
    let node = node_issuing("abc123").await;
    node.stream(&[ok_envelope(EVENT_LISTENER_REGISTERED)]).await;

    let client = open_client(&node).await;
    let mut listener = client.register_event_listener("token", ".*").await.unwrap();
    listener.close();

    // Only what was already buffered may remain, and the channel ends.
    while listener.recv().await.is_some() {}
    assert!(!client.is_closed());
}

#[tokio::test]
async fn test_silent_acknowledgement_times_out() {
    let node = RawNode::start(&format!("abc123 {FAR_EXPIRY}")).await;
    let client = builder(&node.endpoint())
        .timeout(Duration::from_secs(1))
        .credentials(CLIENT_ID, secret("s3cret"))
        .open()
        .await
        .unwrap();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client.register_event_listener("token", ".*"),
    )
    .await
    .expect("registration should give up within the client timeout");

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Timeout { operation: "RegisterEventListener", .. }
    ));
    assert!(!client.is_closed());
}
