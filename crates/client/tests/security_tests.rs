//! Transport security and secret handling tests.
//!
//! # Invariants
//! - Trust material problems are reported before any endpoint is contacted
//! - Tokens and credentials never appear in `Debug` or error output
//!
//! # Security
//! - Credentials travel only in the `Auth` body; tokens only in the bearer header

mod common;

use std::io::Write;
use std::path::PathBuf;

use common::*;
use serial_test::serial;

#[tokio::test]
async fn test_missing_trust_file_fails_before_connecting() {
    let node = node_issuing("abc123").await;

    let err = builder(&node.endpoint())
        .credentials(CLIENT_ID, secret("s3cret"))
        .security(TransportSecurity::CertificateFile(PathBuf::from(
            "/nonexistent/pcore-ca.pem",
        )))
        .open()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::TrustMaterial { .. }));
    assert!(err.is_configuration_error());
    assert!(node.received().await.is_empty());
}

#[tokio::test]
async fn test_non_pem_trust_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"definitely not a certificate").unwrap();
    let node = node_issuing("abc123").await;

    let err = builder(&node.endpoint())
        .credentials(CLIENT_ID, secret("s3cret"))
        .security(TransportSecurity::CertificateFile(file.path().to_path_buf()))
        .open_many()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::TrustMaterial { .. }));
    assert!(node.received().await.is_empty());
}

#[tokio::test]
async fn test_system_trust_cannot_reach_plaintext_node() {
    let node = node_issuing("abc123").await;

    let err = builder(&node.endpoint())
        .credentials(CLIENT_ID, secret("s3cret"))
        .security(TransportSecurity::SystemTrust)
        .open()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::PoolExhausted { .. }));
}

#[test]
#[serial]
fn test_cert_path_from_environment() {
    temp_env::with_var("PCORE_CERT_PATH", Some("/etc/pcore/ca.pem"), || {
        assert_eq!(
            TransportSecurity::from_env(),
            TransportSecurity::CertificateFile(PathBuf::from("/etc/pcore/ca.pem"))
        );
    });
    temp_env::with_var("PCORE_CERT_PATH", Some(""), || {
        assert_eq!(TransportSecurity::from_env(), TransportSecurity::SystemTrust);
    });
    temp_env::with_var_unset("PCORE_CERT_PATH", || {
        assert_eq!(TransportSecurity::from_env(), TransportSecurity::SystemTrust);
    });
}

#[tokio::test]
async fn test_errors_do_not_leak_credentials() {
    let node = MockNode::start().await;
    node.reply_error(Operation::AUTH, "invalid credential").await;

    let err = builder(&node.endpoint())
        .credentials(CLIENT_ID, secret("hunter2-very-secret"))
        .open()
        .await
        .unwrap_err();

    assert!(!err.to_string().contains("hunter2-very-secret"));
    assert!(!format!("{err:?}").contains("hunter2-very-secret"));
}

#[test]
fn test_token_debug_is_redacted() {
    let token = SessionToken::new("bearer-value-123", 1_700_000_000);
    let debug = format!("{token:?}");

    assert!(!debug.contains("bearer-value-123"));
    assert!(debug.contains("token_len"));
}

#[tokio::test]
async fn test_credential_only_sent_to_auth() {
    let node = node_issuing("abc123").await;
    node.reply(Operation::INVOKE, "ok").await;
    let client = open_client(&node).await;
    client.invoke("token-v1", b"").await.unwrap();

    let credential = encode("s3cret");
    for request in node.received().await {
        let body = String::from_utf8_lossy(&request.body);
        if request.url.path() != Operation::AUTH.path() {
            assert!(!body.contains(&credential), "credential leaked to {}", request.url.path());
        }
    }
}
