//! Client builder for opening [`Client`] and [`ClientGroup`] instances.
//!
//! This module is responsible for:
//! - Providing a fluent builder API for client configuration
//! - Validating required configuration (endpoint pool, authentication)
//! - Converting `pcore-config` settings into client settings
//! - Loading trust material once per open operation
//!
//! # What this module does NOT handle:
//! - Endpoint failover (handled by the `open` module)
//! - Renewal after opening (handled by [`Client::renew`])
//!
//! # Invariants
//! - The endpoint pool and one authentication method are required
//! - Configuration errors are reported before any network traffic

use std::time::Duration;

use pcore_config::{AuthStrategy, Config, EndpointSelection};
use secrecy::SecretString;
use tracing::warn;

use crate::client::group::{ClientGroup, EndpointFailure};
use crate::client::open::{self, OpenFailure, SessionAuth};
use crate::client::Client;
use crate::connection::{ConnectionOptions, TransportSecurity};
use crate::endpoint::EndpointPool;
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::session::SessionToken;

enum AuthMaterial {
    Credentials {
        client_id: String,
        credential: SecretString,
    },
    Token(SessionToken),
}

impl AuthMaterial {
    fn as_session_auth(&self) -> SessionAuth<'_> {
        match self {
            Self::Credentials {
                client_id,
                credential,
            } => SessionAuth::Credentials {
                client_id,
                credential,
            },
            Self::Token(token) => SessionAuth::Token(token),
        }
    }
}

/// Builder for opening a [`Client`] or a [`ClientGroup`].
///
/// # Example
///
/// ```rust,ignore
/// use pcore_client::{Client, MetricsCollector};
/// use pcore_config::ConfigLoader;
///
/// let config = ConfigLoader::new().load_dotenv()?.from_env()?.build()?;
/// let client = Client::builder()
///     .from_config(&config)
///     .metrics(MetricsCollector::new())
///     .open()
///     .await?;
/// ```
pub struct ClientBuilder {
    endpoints: Option<String>,
    selection: EndpointSelection,
    auth: Option<AuthMaterial>,
    security: TransportSecurity,
    options: ConnectionOptions,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            endpoints: None,
            selection: EndpointSelection::default(),
            auth: None,
            security: TransportSecurity::default(),
            options: ConnectionOptions::default(),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the whitespace-delimited `host:port` endpoint pool.
    pub fn endpoints(mut self, spec: impl Into<String>) -> Self {
        self.endpoints = Some(spec.into());
        self
    }

    /// Set how the next endpoint is chosen. Default is [`EndpointSelection::Random`].
    pub fn selection(mut self, selection: EndpointSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Authenticate with a client identity and credential.
    ///
    /// The credential is used once per open and not retained by the client.
    pub fn credentials(mut self, client_id: impl Into<String>, credential: SecretString) -> Self {
        self.auth = Some(AuthMaterial::Credentials {
            client_id: client_id.into(),
            credential,
        });
        self
    }

    /// Reuse an already issued session token instead of authenticating.
    pub fn token(mut self, token: SessionToken) -> Self {
        self.auth = Some(AuthMaterial::Token(token));
        self
    }

    pub fn security(mut self, security: TransportSecurity) -> Self {
        self.security = security;
        self
    }

    /// Set the default deadline of unary calls. Default is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set the deadline of the liveness probe. Default is 10 seconds.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.options.probe_timeout = timeout;
        self
    }

    /// Set the TCP/TLS connect deadline. Default is 10 seconds.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    /// Record call, failover and renewal metrics through `metrics`.
    pub fn metrics(mut self, metrics: MetricsCollector) -> Self {
        self.options.metrics = metrics;
        self
    }

    /// Take every setting from a loaded configuration.
    pub fn from_config(mut self, config: &Config) -> Self {
        let connection = &config.connection;
        self.endpoints = Some(connection.endpoints.clone());
        self.selection = connection.selection;
        self.security = TransportSecurity::from(connection);
        self.options.timeout = connection.timeout;
        self.options.probe_timeout = connection.probe_timeout;
        self.options.connect_timeout = connection.connect_timeout;
        self.auth = Some(match &config.auth.strategy {
            AuthStrategy::Credentials {
                client_id,
                credential,
            } => AuthMaterial::Credentials {
                client_id: client_id.clone(),
                credential: credential.clone(),
            },
            AuthStrategy::Token { token, expires_at } => {
                AuthMaterial::Token(SessionToken::from_secret(token.clone(), *expires_at))
            }
        });
        self
    }

    fn validate(&self) -> Result<(EndpointPool, &AuthMaterial)> {
        let spec = self.endpoints.as_deref().unwrap_or_default();
        let pool = EndpointPool::with_selection(spec, self.selection)?;
        let auth = self.auth.as_ref().ok_or(ClientError::MissingAuth)?;
        for (name, value) in [
            ("timeout", self.options.timeout),
            ("probe timeout", self.options.probe_timeout),
            ("connect timeout", self.options.connect_timeout),
        ] {
            if value.is_zero() {
                return Err(ClientError::Config(format!("{name} must be greater than zero")));
            }
        }
        Ok((pool, auth))
    }

    /// Open a client on the first endpoint of the pool that accepts a session.
    ///
    /// # Errors
    /// - Configuration errors ([`ClientError::is_configuration_error`]) before any connection.
    /// - [`ClientError::Session`] when an endpoint was reached but the
    ///   session could not be established (e.g. credentials rejected).
    /// - [`ClientError::PoolExhausted`] when no endpoint could be reached.
    pub async fn open(self) -> Result<Client> {
        let (pool, auth) = self.validate()?;
        let trust = self.security.load().await?;
        let session = open::open_session(
            "open",
            &pool,
            &trust,
            auth.as_session_auth(),
            &self.options,
        )
        .await?;
        Ok(Client::from_session(
            session,
            pool,
            self.security,
            self.options,
        ))
    }

    /// Open one client per endpoint, in pool order.
    ///
    /// With credentials, the first endpoint that opens authenticates and its
    /// token (and expiry) is reused for every other endpoint. Endpoints that
    /// cannot be reached are recorded in [`ClientGroup::failures`].
    ///
    /// # Errors
    /// - Configuration errors before any connection.
    /// - [`ClientError::Session`] when a reached endpoint rejects the session;
    ///   clients opened so far are closed.
    /// - [`ClientError::PoolExhausted`] when no endpoint opened.
    pub async fn open_many(self) -> Result<ClientGroup> {
        const OPERATION: &str = "open_many";

        let (pool, auth) = self.validate()?;
        let trust = self.security.load().await?;

        let mut shared_token = match auth {
            AuthMaterial::Token(token) => Some(token.clone()),
            AuthMaterial::Credentials { .. } => None,
        };
        let mut clients = Vec::with_capacity(pool.len());
        let mut failures = Vec::new();

        for endpoint in pool.endpoints() {
            let session_auth = match shared_token {
                Some(ref token) => SessionAuth::Token(token),
                None => auth.as_session_auth(),
            };
            match open::connect_endpoint(endpoint, &trust, session_auth, &self.options).await {
                Ok(session) => {
                    shared_token.get_or_insert_with(|| session.token.clone());
                    clients.push(Client::from_session(
                        session,
                        pool.clone(),
                        self.security.clone(),
                        self.options.clone(),
                    ));
                }
                Err(OpenFailure::Endpoint(error)) => {
                    warn!(endpoint = %endpoint, error = %error, "Endpoint of group failed to open");
                    self.options.metrics.record_failover(OPERATION, endpoint);
                    failures.push(EndpointFailure {
                        endpoint: endpoint.clone(),
                        error,
                    });
                }
                Err(OpenFailure::Fatal(error)) => {
                    clients.iter().for_each(Client::close);
                    return Err(ClientError::Session {
                        operation: OPERATION,
                        pool: pool.spec().to_string(),
                        source: Box::new(error),
                    });
                }
            }
        }

        if clients.is_empty() {
            let last = failures
                .pop()
                .map(|failure| failure.error)
                .unwrap_or_else(|| ClientError::EmptyEndpointPool {
                    spec: pool.spec().to_string(),
                });
            return Err(ClientError::PoolExhausted {
                operation: OPERATION,
                pool: pool.spec().to_string(),
                last: Box::new(last),
            });
        }

        Ok(ClientGroup::new(pool, clients, failures))
    }
}
