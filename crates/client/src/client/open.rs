//! Endpoint failover and session establishment.
//!
//! Opening with credentials takes two connections to the same endpoint: a
//! token-less one for the `Auth` exchange, closed right after, and the
//! long-lived one carrying the issued token.
//!
//! # Invariants
//! - Only per-endpoint failures (transport, status, probe, timeout while
//!   connecting) move on to the next candidate
//! - Once an endpoint has been reached, authentication and reopen failures
//!   end the whole operation

use secrecy::SecretString;
use tracing::{debug, warn};

use crate::client::ActiveSession;
use crate::connection::{Connection, ConnectionOptions, TrustMaterial};
use crate::endpoint::EndpointPool;
use crate::error::{ClientError, Result};
use crate::session::{self, SessionToken};

/// What a session is established with.
#[derive(Clone, Copy)]
pub(crate) enum SessionAuth<'a> {
    Credentials {
        client_id: &'a str,
        credential: &'a SecretString,
    },
    Token(&'a SessionToken),
}

/// Why one endpoint could not be opened.
pub(crate) enum OpenFailure {
    /// The endpoint could not be reached or failed its probe; try the next one.
    Endpoint(ClientError),
    /// The endpoint was reached but the session could not be established.
    Fatal(ClientError),
}

/// Open a session on one endpoint.
pub(crate) async fn connect_endpoint(
    endpoint: &str,
    trust: &TrustMaterial,
    auth: SessionAuth<'_>,
    options: &ConnectionOptions,
) -> std::result::Result<ActiveSession, OpenFailure> {
    let classify = |e: ClientError| {
        if e.is_endpoint_failure() {
            OpenFailure::Endpoint(e)
        } else {
            OpenFailure::Fatal(e)
        }
    };

    let token = match auth {
        SessionAuth::Token(token) => token.clone(),
        SessionAuth::Credentials {
            client_id,
            credential,
        } => {
            let auth_connection = Connection::open(endpoint, trust, None, options)
                .await
                .map_err(classify)?;
            let issued =
                session::authenticate(&auth_connection, client_id, credential, options.timeout)
                    .await;
            auth_connection.close();
            let token = issued.map_err(OpenFailure::Fatal)?;
            debug!(endpoint, expires_at = token.expires_at(), "Session token issued");

            let connection = Connection::open(endpoint, trust, Some(&token), options)
                .await
                .map_err(OpenFailure::Fatal)?;
            return Ok(ActiveSession {
                connection: connection.into(),
                token,
            });
        }
    };

    let connection = Connection::open(endpoint, trust, Some(&token), options)
        .await
        .map_err(classify)?;
    Ok(ActiveSession {
        connection: connection.into(),
        token,
    })
}

/// Try the candidates of `pool` until one yields a session.
///
/// # Errors
/// - [`ClientError::Session`] when an endpoint was reached but the session failed.
/// - [`ClientError::PoolExhausted`] when every endpoint failed, carrying the last failure.
pub(crate) async fn open_session(
    operation: &'static str,
    pool: &EndpointPool,
    trust: &TrustMaterial,
    auth: SessionAuth<'_>,
    options: &ConnectionOptions,
) -> Result<ActiveSession> {
    let mut last = None;
    for endpoint in pool.candidates() {
        match connect_endpoint(&endpoint, trust, auth, options).await {
            Ok(session) => return Ok(session),
            Err(OpenFailure::Endpoint(e)) => {
                warn!(operation, endpoint = %endpoint, error = %e, "Endpoint unavailable, trying next");
                options.metrics.record_failover(operation, &endpoint);
                last = Some(e);
            }
            Err(OpenFailure::Fatal(e)) => {
                options.metrics.record_client_error(operation, &endpoint, &e);
                return Err(ClientError::Session {
                    operation,
                    pool: pool.spec().to_string(),
                    source: Box::new(e),
                });
            }
        }
    }

    let last = last.unwrap_or_else(|| ClientError::EmptyEndpointPool {
        spec: pool.spec().to_string(),
    });
    Err(ClientError::PoolExhausted {
        operation,
        pool: pool.spec().to_string(),
        last: Box::new(last),
    })
}
