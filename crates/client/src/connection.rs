//! Opening one connection to one endpoint.
//!
//! Responsibilities:
//! - Load trust material for a [`TransportSecurity`] mode.
//! - Build the HTTP transport, attaching the bearer token to every call when one is given.
//! - Probe the endpoint with `Ping` and require the exact reply `Pong`.
//! - Issue unary and streaming calls and apply the reply unwrap contract.
//!
//! Does NOT handle:
//! - Choosing which endpoint to open (see [`crate::endpoint`]).
//! - Token acquisition (see [`crate::session`]).
//!
//! Invariants:
//! - A `Connection` that exists has answered its liveness probe.
//! - The bearer header never changes for the lifetime of a connection.
//! - Calls on a closed connection fail with `ClientError::Closed` without touching the network.
//! - Closing drops the connection's transport; pooled sockets close once in-flight calls finish.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use pcore_config::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
    ENV_CERT_PATH, PROBE_REPLY,
};
use pcore_config::{ConnectionConfig, env_var_or_none};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::rpc::{Operation, Reply, RequestEnvelope, ResponseEnvelope};
use crate::session::SessionToken;
use crate::telemetry::inject_trace_context;

const PEM_CERTIFICATE_MARKER: &[u8] = b"-----BEGIN CERTIFICATE-----";

/// How the transport to a node is secured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransportSecurity {
    /// TLS verified against the platform trust store.
    #[default]
    SystemTrust,
    /// TLS verified against the PEM certificate(s) in this file.
    CertificateFile(PathBuf),
    /// No TLS. Local development nodes only.
    Plaintext,
}

impl TransportSecurity {
    /// An empty path selects the system trust store.
    pub fn from_cert_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            Self::SystemTrust
        } else {
            Self::CertificateFile(path.to_path_buf())
        }
    }

    /// Trust path from `PCORE_CERT_PATH`, or the system trust store when unset.
    pub fn from_env() -> Self {
        env_var_or_none(ENV_CERT_PATH)
            .map(Self::from_cert_path)
            .unwrap_or_default()
    }

    /// Read and validate the trust material once for a whole open operation.
    pub(crate) async fn load(&self) -> Result<TrustMaterial> {
        match self {
            Self::SystemTrust => Ok(TrustMaterial {
                scheme: "https",
                root: None,
            }),
            Self::Plaintext => {
                warn!("Plaintext transport selected; session tokens are sent unencrypted");
                Ok(TrustMaterial {
                    scheme: "http",
                    root: None,
                })
            }
            Self::CertificateFile(path) => {
                let trust_error = |message: String| ClientError::TrustMaterial {
                    path: path.clone(),
                    message,
                };
                let pem = tokio::fs::read(path)
                    .await
                    .map_err(|e| trust_error(e.to_string()))?;
                if !pem
                    .windows(PEM_CERTIFICATE_MARKER.len())
                    .any(|window| window == PEM_CERTIFICATE_MARKER)
                {
                    return Err(trust_error("no PEM certificate found".to_string()));
                }
                let root = reqwest::Certificate::from_pem(&pem)
                    .map_err(|e| trust_error(e.to_string()))?;
                Ok(TrustMaterial {
                    scheme: "https",
                    root: Some(root),
                })
            }
        }
    }
}

impl From<&ConnectionConfig> for TransportSecurity {
    fn from(config: &ConnectionConfig) -> Self {
        if config.plaintext {
            Self::Plaintext
        } else {
            config
                .cert_path
                .as_deref()
                .map(Self::from_cert_path)
                .unwrap_or_default()
        }
    }
}

/// Trust material loaded for one open operation.
#[derive(Clone)]
pub(crate) struct TrustMaterial {
    scheme: &'static str,
    root: Option<reqwest::Certificate>,
}

/// Timeouts and instrumentation shared by every connection a client opens.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Default deadline of each unary call.
    pub timeout: Duration,
    /// Deadline of the liveness probe.
    pub probe_timeout: Duration,
    /// TCP/TLS connect deadline.
    pub connect_timeout: Duration,
    pub metrics: MetricsCollector,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            metrics: MetricsCollector::disabled(),
        }
    }
}

/// A live, probed transport to one endpoint.
pub struct Connection {
    id: Uuid,
    endpoint: String,
    base_url: String,
    /// `None` once closed.
    http: Mutex<Option<reqwest::Client>>,
    authenticated: bool,
    timeout: Duration,
    metrics: MetricsCollector,
}

impl Connection {
    /// Connect to `endpoint` and probe it.
    ///
    /// With a token, every call carries `authorization: Bearer <token>`.
    pub(crate) async fn open(
        endpoint: &str,
        trust: &TrustMaterial,
        token: Option<&SessionToken>,
        options: &ConnectionOptions,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder().connect_timeout(options.connect_timeout);

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_token()))
                .map_err(|_| {
                    ClientError::MalformedSession(
                        "token contains characters not allowed in a header".to_string(),
                    )
                })?;
            value.set_sensitive(true);
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }
        if let Some(ref root) = trust.root {
            builder = builder.add_root_certificate(root.clone());
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build transport: {e}")))?;

        let connection = Self {
            id: Uuid::new_v4(),
            endpoint: endpoint.to_string(),
            base_url: format!("{}://{}", trust.scheme, endpoint),
            http: Mutex::new(Some(http)),
            authenticated: token.is_some(),
            timeout: options.timeout,
            metrics: options.metrics.clone(),
        };

        connection.probe(options.probe_timeout).await?;
        debug!(
            endpoint = %connection.endpoint,
            connection_id = %connection.id,
            authenticated = connection.authenticated,
            "Connection opened"
        );
        Ok(connection)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether calls carry a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Default deadline of unary calls on this connection.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_closed(&self) -> bool {
        self.http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Close the connection and release its transport. Idempotent.
    ///
    /// Calls already running hold their own handle to the transport and complete.
    pub fn close(&self) {
        let released = self
            .http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            debug!(endpoint = %self.endpoint, connection_id = %self.id, "Connection closed");
        }
    }

    /// Handle to the transport of an open connection.
    fn transport(&self) -> Result<reqwest::Client> {
        self.http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ClientError::Closed)
    }

    async fn probe(&self, timeout: Duration) -> Result<()> {
        match self
            .unary(Operation::PING, &RequestEnvelope::default(), timeout)
            .await
        {
            Ok(reply) if reply.payload == PROBE_REPLY.as_bytes() => Ok(()),
            Ok(reply) => Err(ClientError::ProbeFailed {
                endpoint: self.endpoint.clone(),
                reason: format!(
                    "expected {PROBE_REPLY:?}, got {:?}",
                    String::from_utf8_lossy(&reply.payload)
                ),
            }),
            Err(e) if e.is_endpoint_failure() => Err(e),
            Err(e) => Err(ClientError::ProbeFailed {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Issue one unary call and unwrap its reply envelope.
    pub(crate) async fn unary<B>(
        &self,
        operation: Operation,
        body: &B,
        timeout: Duration,
    ) -> Result<Reply>
    where
        B: Serialize + ?Sized,
    {
        let http = self.transport()?;

        debug!(operation = %operation, endpoint = %self.endpoint, "Calling node");
        let started = Instant::now();
        let result = self.exchange(&http, operation, body, timeout).await;
        self.metrics.record_call(
            operation.name(),
            &self.endpoint,
            started.elapsed(),
            result.as_ref().map(|_| ()),
        );
        result
    }

    async fn exchange<B>(
        &self,
        http: &reqwest::Client,
        operation: Operation,
        body: &B,
        timeout: Duration,
    ) -> Result<Reply>
    where
        B: Serialize + ?Sized,
    {
        let request = http
            .post(self.url_for(operation))
            .timeout(timeout)
            .json(body);
        let response = inject_trace_context(request)
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                operation: operation.name(),
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let envelope: ResponseEnvelope = response.json().await.map_err(|e| {
            if e.is_decode() {
                ClientError::InvalidResponse {
                    operation: operation.name(),
                    message: e.to_string(),
                }
            } else {
                self.transport_error(operation, e, timeout)
            }
        })?;
        envelope.into_reply(operation.name())
    }

    /// Start a server-streaming call. Only the wait for response headers is bounded.
    pub(crate) async fn open_stream<B>(
        &self,
        operation: Operation,
        body: &B,
    ) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let http = self.transport()?;

        debug!(operation = %operation, endpoint = %self.endpoint, "Opening stream");
        let request = inject_trace_context(http.post(self.url_for(operation)).json(body));
        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| ClientError::Timeout {
                operation: operation.name(),
                endpoint: self.endpoint.clone(),
                timeout: self.timeout,
            })?
            .map_err(|e| self.transport_error(operation, e, self.timeout))?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                operation: operation.name(),
                endpoint: self.endpoint.clone(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    fn url_for(&self, operation: Operation) -> String {
        format!("{}{}", self.base_url, operation.path())
    }

    pub(crate) fn transport_error(
        &self,
        operation: Operation,
        source: reqwest::Error,
        timeout: Duration,
    ) -> ClientError {
        if source.is_timeout() {
            ClientError::Timeout {
                operation: operation.name(),
                endpoint: self.endpoint.clone(),
                timeout,
            }
        } else {
            ClientError::Transport {
                operation: operation.name(),
                endpoint: self.endpoint.clone(),
                source,
            }
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("authenticated", &self.authenticated)
            .field("closed", &self.is_closed())
            .finish()
    }
}
