//! Connection configuration types for the ParallelCore SDK.
//!
//! Responsibilities:
//! - Define connection settings (endpoint pool, trust material, timeouts, selection policy).
//! - Define the main `Config` structure combining connection and auth.
//! - Provide serialization helpers for `Duration`.
//!
//! Does NOT handle:
//! - Configuration loading from env/files (see `loader` module).
//! - Actual network connections (see client crate).
//!
//! Invariants:
//! - All duration fields are serialized as seconds (integers).
//! - An empty `cert_path` is never stored; `None` means the system trust store.

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
    NO_TRACKED_EXPIRY,
};
use crate::types::auth::{AuthConfig, AuthStrategy};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Module for serializing Duration as seconds (integer).
mod duration_seconds {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// How the next endpoint is chosen from a pool when opening a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointSelection {
    /// Uniformly random among the endpoints not yet tried.
    #[default]
    Random,
    /// Start one endpoint further along the pool on every open.
    RoundRobin,
    /// Always try endpoints in the order they appear in the pool.
    Ordered,
}

impl EndpointSelection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::RoundRobin => "round-robin",
            Self::Ordered => "ordered",
        }
    }
}

impl fmt::Display for EndpointSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "round-robin" | "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "ordered" | "in-order" => Ok(Self::Ordered),
            other => Err(format!(
                "unknown endpoint selection '{other}' (expected random, round-robin or ordered)"
            )),
        }
    }
}

/// Connection configuration for a ParallelCore endpoint pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Whitespace-delimited `host:port` endpoints.
    pub endpoints: String,
    /// PEM trust anchor. `None` uses the system trust store.
    #[serde(default)]
    pub cert_path: Option<PathBuf>,
    /// Disable TLS (local development nodes only).
    #[serde(default)]
    pub plaintext: bool,
    /// Per-call timeout (serialized as seconds)
    #[serde(with = "duration_seconds")]
    pub timeout: Duration,
    /// Liveness probe timeout (serialized as seconds)
    #[serde(with = "duration_seconds", default = "default_probe_timeout")]
    pub probe_timeout: Duration,
    /// TCP/TLS connect timeout (serialized as seconds)
    #[serde(with = "duration_seconds", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    /// Endpoint selection policy.
    #[serde(default)]
    pub selection: EndpointSelection,
}

pub(crate) fn default_probe_timeout() -> Duration {
    Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS)
}

pub(crate) fn default_connect_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
}

impl ConnectionConfig {
    /// Connection settings for `endpoints` with every other field at its default.
    pub fn new(endpoints: impl Into<String>) -> Self {
        Self {
            endpoints: endpoints.into(),
            cert_path: None,
            plaintext: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            probe_timeout: default_probe_timeout(),
            connect_timeout: default_connect_timeout(),
            selection: EndpointSelection::default(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionConfig,
    /// Authentication settings
    pub auth: AuthConfig,
}

impl Config {
    /// Create a config that authenticates with a client id and credential.
    pub fn with_credentials(
        endpoints: impl Into<String>,
        client_id: impl Into<String>,
        credential: SecretString,
    ) -> Self {
        Self {
            connection: ConnectionConfig::new(endpoints),
            auth: AuthConfig {
                strategy: AuthStrategy::Credentials {
                    client_id: client_id.into(),
                    credential,
                },
            },
        }
    }

    /// Create a config that reuses an already issued session token.
    pub fn with_token(endpoints: impl Into<String>, token: SecretString, expires_at: i64) -> Self {
        Self {
            connection: ConnectionConfig::new(endpoints),
            auth: AuthConfig {
                strategy: AuthStrategy::Token { token, expires_at },
            },
        }
    }

    /// Create a token config whose expiry is not tracked.
    pub fn with_untracked_token(endpoints: impl Into<String>, token: SecretString) -> Self {
        Self::with_token(endpoints, token, NO_TRACKED_EXPIRY)
    }
}
