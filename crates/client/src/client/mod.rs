//! The long-lived ParallelCore client handle.
//!
//! This module provides [`Client`], which owns one live connection and the
//! session token it was opened with, and routes every remote call through a
//! single generic call path.
//!
//! # Submodules
//! - [`builder`]: Client construction and configuration
//! - `open`: Endpoint failover and session establishment (private module)
//! - `renew`: In-place token renewal (private module)
//! - `group`: One client per endpoint sharing a token
//! - `events`: Smart contract event listener
//! - `actions`, `users`, `access`, `domains`, `smart_contracts`, `chain`, `forget`:
//!   Typed helpers layered on [`Client::call`]
//!
//! # What this module does NOT handle:
//! - Transport details and the liveness probe (delegated to [`crate::connection`])
//! - Token parsing and the auth exchange (delegated to [`crate::session`])
//!
//! # Invariants
//! - Calls clone the current `(connection, token)` snapshot under a brief read
//!   lock and run entirely on it, so each call sees one consistent pair
//! - Renewal swaps the snapshot with a single write; the retired connection is
//!   never marked closed, so calls already running on it complete
//! - After [`Client::close`] every operation returns [`ClientError::Closed`]

mod access;
mod actions;
pub mod builder;
mod chain;
mod domains;
mod events;
mod forget;
mod group;
mod open;
mod renew;
mod smart_contracts;
mod users;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;
use uuid::Uuid;

use crate::connection::{Connection, ConnectionOptions, TransportSecurity};
use crate::endpoint::EndpointPool;
use crate::error::{ClientError, Result};
use crate::rpc::{Operation, Reply, RequestEnvelope};
use crate::session::SessionToken;

pub use builder::ClientBuilder;
pub use events::EventListener;
pub use group::{ClientGroup, EndpointFailure};

/// The connection a client currently uses and the token it was opened with.
pub(crate) struct ActiveSession {
    pub(crate) connection: Arc<Connection>,
    pub(crate) token: SessionToken,
}

/// Authenticated handle to a ParallelCore network.
///
/// # Creating a Client
///
/// ```rust,ignore
/// use pcore_client::{Client, TransportSecurity};
/// use secrecy::SecretString;
///
/// let client = Client::builder()
///     .endpoints("node-a:5000 node-b:5000")
///     .credentials("alice", SecretString::new("s3cret".into()))
///     .security(TransportSecurity::SystemTrust)
///     .open()
///     .await?;
/// let payload = client.invoke("token-v1", b"balance alice").await?;
/// client.close();
/// ```
///
/// All methods take `&self`; share a client across tasks with `Arc<Client>`.
pub struct Client {
    state: RwLock<Arc<ActiveSession>>,
    renewal: tokio::sync::Mutex<()>,
    closed: AtomicBool,
    pool: EndpointPool,
    security: TransportSecurity,
    options: ConnectionOptions,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Authenticate against any endpoint of `pool` and open a client on it.
    pub async fn open(
        pool: &str,
        client_id: &str,
        credential: SecretString,
        security: TransportSecurity,
    ) -> Result<Self> {
        ClientBuilder::new()
            .endpoints(pool)
            .credentials(client_id, credential)
            .security(security)
            .open()
            .await
    }

    /// Open a client on any endpoint of `pool` with an already issued token.
    pub async fn open_by_token(
        pool: &str,
        token: SessionToken,
        security: TransportSecurity,
    ) -> Result<Self> {
        ClientBuilder::new()
            .endpoints(pool)
            .token(token)
            .security(security)
            .open()
            .await
    }

    pub(crate) fn from_session(
        session: ActiveSession,
        pool: EndpointPool,
        security: TransportSecurity,
        options: ConnectionOptions,
    ) -> Self {
        info!(
            endpoint = %session.connection.endpoint(),
            connection_id = %session.connection.id(),
            expires_at = session.token.expires_at(),
            "Client opened"
        );
        Self {
            state: RwLock::new(Arc::new(session)),
            renewal: tokio::sync::Mutex::new(()),
            closed: AtomicBool::new(false),
            pool,
            security,
            options,
        }
    }

    /// The current snapshot, whether or not the client is closed.
    fn current(&self) -> Arc<ActiveSession> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// The current snapshot of an open client.
    pub(crate) fn snapshot(&self) -> Result<Arc<ActiveSession>> {
        if self.is_closed() {
            return Err(ClientError::Closed);
        }
        Ok(self.current())
    }

    /// Install `next` unless the client was closed meanwhile. Returns the retired session.
    pub(crate) fn install(&self, next: ActiveSession) -> Result<Arc<ActiveSession>> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if self.is_closed() {
            next.connection.close();
            return Err(ClientError::Closed);
        }
        Ok(std::mem::replace(&mut *state, Arc::new(next)))
    }

    /// The session token currently in use.
    pub fn token(&self) -> SessionToken {
        self.current().token.clone()
    }

    /// Expiry of the current token in epoch seconds, `-1` when not tracked.
    pub fn expires_at(&self) -> i64 {
        self.current().token.expires_at()
    }

    /// The endpoint the current connection is bound to.
    pub fn endpoint(&self) -> String {
        self.current().connection.endpoint().to_string()
    }

    /// Identity of the current connection. Changes on every renewal.
    pub fn connection_id(&self) -> Uuid {
        self.current().connection.id()
    }

    /// The pool this client was opened from and renews against.
    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    pub fn security(&self) -> &TransportSecurity {
        &self.security
    }

    /// Default deadline of unary calls.
    pub fn timeout(&self) -> Duration {
        self.options.timeout
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Close the client and release its transport.
    ///
    /// Idempotent; later operations return [`ClientError::Closed`]. Calls
    /// already running complete, after which the node's sockets are closed.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let session = self.current();
        session.connection.close();
        info!(endpoint = %session.connection.endpoint(), "Client closed");
    }

    /// Call a named remote operation and return its payload.
    ///
    /// # Errors
    /// A transport failure, or [`ClientError::Application`] carrying the
    /// server's message. Server-streaming operations are rejected.
    pub async fn call(&self, operation: Operation, payload: impl Into<Vec<u8>>) -> Result<Vec<u8>> {
        self.call_with_timeout(operation, payload, self.options.timeout)
            .await
    }

    /// [`Client::call`] with a deadline for this call only.
    pub async fn call_with_timeout(
        &self,
        operation: Operation,
        payload: impl Into<Vec<u8>>,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        Ok(self
            .call_reply(operation, payload.into(), timeout)
            .await?
            .payload)
    }

    /// Send `params` JSON-encoded and decode the reply payload as JSON.
    pub async fn call_json<P, R>(&self, operation: Operation, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let reply = self.call_encoded(operation, params).await?;
        decode_json(operation.name(), &reply)
    }

    /// Send `params` JSON-encoded and return the raw reply payload.
    pub(crate) async fn call_encoded<P>(&self, operation: Operation, params: &P) -> Result<Vec<u8>>
    where
        P: Serialize + ?Sized,
    {
        let payload = encode_json(operation.name(), params)?;
        self.call(operation, payload).await
    }

    pub(crate) async fn call_reply(
        &self,
        operation: Operation,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Reply> {
        if operation.is_streaming() {
            return Err(ClientError::Config(format!(
                "{operation} is a server-streaming operation"
            )));
        }
        let session = self.snapshot()?;
        session
            .connection
            .unary(operation, &RequestEnvelope::new(payload), timeout)
            .await
    }

    /// Invoke smart contract `target` (e.g. `"token-v1"`) with `args`.
    pub async fn invoke(&self, target: &str, args: &[u8]) -> Result<Vec<u8>> {
        self.call(Operation::INVOKE, invocation(target, args)).await
    }

    /// Like [`Client::invoke`], also returning the commit id of the transaction.
    ///
    /// The commit id is empty for read-only calls.
    pub async fn identified_invoke(&self, target: &str, args: &[u8]) -> Result<Reply> {
        self.call_reply(
            Operation::IDENTIFIED_INVOKE,
            invocation(target, args),
            self.options.timeout,
        )
        .await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.current();
        f.debug_struct("Client")
            .field("pool", &self.pool.spec())
            .field("connection", &*session.connection)
            .field("token", &session.token)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn invocation(target: &str, args: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(target.len() + 1 + args.len());
    payload.extend_from_slice(target.as_bytes());
    payload.push(b' ');
    payload.extend_from_slice(args);
    payload
}

pub(crate) fn encode_json<P>(operation: &'static str, params: &P) -> Result<Vec<u8>>
where
    P: Serialize + ?Sized,
{
    serde_json::to_vec(params).map_err(|source| ClientError::Encode { operation, source })
}

pub(crate) fn decode_json<R>(operation: &'static str, payload: &[u8]) -> Result<R>
where
    R: DeserializeOwned,
{
    serde_json::from_slice(payload).map_err(|source| ClientError::Decode { operation, source })
}

pub(crate) fn payload_text(operation: &'static str, payload: Vec<u8>) -> Result<String> {
    String::from_utf8(payload).map_err(|_| ClientError::InvalidResponse {
        operation,
        message: "payload is not valid UTF-8".to_string(),
    })
}
