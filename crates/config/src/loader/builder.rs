//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for hierarchical configuration merging.
//! - Support loading from environment variables and direct builder methods.
//! - Build and validate the final `Config`.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//! - Opening connections (see the client crate).
//!
//! Invariants / Assumptions:
//! - Builder methods called after `from_env()` take precedence over environment variables.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.
//! - A pre-issued token takes precedence over a client id and credential.

use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

use super::env::apply_env;
use super::error::ConfigError;
use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
    MAX_TIMEOUT_SECS, NO_TRACKED_EXPIRY,
};
use crate::types::{AuthConfig, AuthStrategy, Config, ConnectionConfig, EndpointSelection};

/// Configuration loader that builds config from environment variables and overrides.
#[derive(Default)]
pub struct ConfigLoader {
    endpoints: Option<String>,
    client_id: Option<String>,
    credential: Option<SecretString>,
    token: Option<SecretString>,
    token_expiry: Option<i64>,
    cert_path: Option<PathBuf>,
    plaintext: Option<bool>,
    timeout: Option<Duration>,
    probe_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    selection: Option<EndpointSelection>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` environment variable is set to "true" or "1",
    /// the .env file will not be loaded (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The `.env` file exists but has invalid syntax (`ConfigError::DotenvParse`)
    /// - The `.env` file exists but cannot be read due to I/O errors (`ConfigError::DotenvIo`)
    ///
    /// Missing `.env` files are silently ignored (returns `Ok(self)`).
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "Loaded .env file");
                Ok(self)
            }
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Read configuration from `PCORE_*` environment variables.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    /// Set the whitespace-delimited endpoint pool.
    pub fn with_endpoints(mut self, endpoints: impl Into<String>) -> Self {
        self.endpoints = Some(endpoints.into());
        self
    }

    /// Set the client id.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the client credential.
    pub fn with_credential(mut self, credential: String) -> Self {
        self.credential = Some(SecretString::new(credential.into()));
        self
    }

    /// Set a pre-issued session token and its expiry (`-1` when untracked).
    pub fn with_token(mut self, token: String, expires_at: i64) -> Self {
        self.token = Some(SecretString::new(token.into()));
        self.token_expiry = Some(expires_at);
        self
    }

    /// Set the PEM trust anchor. An empty path selects the system trust store.
    pub fn with_cert_path(mut self, path: PathBuf) -> Self {
        self.cert_path = Some(path);
        self
    }

    /// Disable TLS for local development nodes.
    pub fn with_plaintext(mut self, plaintext: bool) -> Self {
        self.plaintext = Some(plaintext);
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the liveness probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// Set the TCP/TLS connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the endpoint selection policy.
    pub fn with_selection(mut self, selection: EndpointSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let endpoints = self
            .endpoints
            .filter(|spec| !spec.trim().is_empty())
            .ok_or(ConfigError::MissingEndpoints)?;

        let strategy = if let Some(token) = self.token {
            AuthStrategy::Token {
                token,
                expires_at: self.token_expiry.unwrap_or(NO_TRACKED_EXPIRY),
            }
        } else if let Some(client_id) = self.client_id {
            let credential = self
                .credential
                .ok_or_else(|| ConfigError::MissingCredential(client_id.clone()))?;
            AuthStrategy::Credentials {
                client_id,
                credential,
            }
        } else {
            return Err(ConfigError::MissingAuth);
        };

        let cert_path = self
            .cert_path
            .filter(|path| !path.as_os_str().is_empty());
        let plaintext = self.plaintext.unwrap_or(false);
        if plaintext && cert_path.is_some() {
            return Err(ConfigError::ConflictingTransportSecurity);
        }

        let connection = ConnectionConfig {
            endpoints,
            cert_path,
            plaintext,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            probe_timeout: self
                .probe_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS)),
            connect_timeout: self
                .connect_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)),
            selection: self.selection.unwrap_or_default(),
        };

        Self::validate_timeout_config(&connection)?;

        Ok(Config {
            connection,
            auth: AuthConfig { strategy },
        })
    }

    /// Validates timeout-related configuration values.
    ///
    /// Every timeout must be greater than 0 and not exceed MAX_TIMEOUT_SECS.
    fn validate_timeout_config(connection: &ConnectionConfig) -> Result<(), ConfigError> {
        for (name, value) in [
            ("timeout", connection.timeout),
            ("probe_timeout", connection.probe_timeout),
            ("connect_timeout", connection.connect_timeout),
        ] {
            let secs = value.as_secs();
            if secs == 0 {
                return Err(ConfigError::InvalidTimeout {
                    message: format!("{name} must be greater than 0 seconds"),
                });
            }
            if secs > MAX_TIMEOUT_SECS {
                return Err(ConfigError::InvalidTimeout {
                    message: format!(
                        "{name} exceeds maximum allowed value of {MAX_TIMEOUT_SECS} seconds"
                    ),
                });
            }
        }
        Ok(())
    }

    // Internal setters used by env.rs

    pub(crate) fn set_endpoints(&mut self, endpoints: Option<String>) {
        self.endpoints = endpoints;
    }

    pub(crate) fn set_client_id(&mut self, client_id: Option<String>) {
        self.client_id = client_id;
    }

    pub(crate) fn set_credential(&mut self, credential: Option<SecretString>) {
        self.credential = credential;
    }

    pub(crate) fn set_token(&mut self, token: Option<SecretString>) {
        self.token = token;
    }

    pub(crate) fn set_token_expiry(&mut self, expiry: Option<i64>) {
        self.token_expiry = expiry;
    }

    pub(crate) fn set_cert_path(&mut self, path: Option<PathBuf>) {
        self.cert_path = path;
    }

    pub(crate) fn set_plaintext(&mut self, plaintext: Option<bool>) {
        self.plaintext = plaintext;
    }

    pub(crate) fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub(crate) fn set_probe_timeout(&mut self, timeout: Option<Duration>) {
        self.probe_timeout = timeout;
    }

    pub(crate) fn set_selection(&mut self, selection: Option<EndpointSelection>) {
        self.selection = selection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    fn env_lock<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let defaults = [
            ("DOTENV_DISABLED", Some("1")),
            ("PCORE_ENDPOINTS", None),
            ("PCORE_CLIENT_ID", None),
            ("PCORE_CREDENTIAL", None),
            ("PCORE_TOKEN", None),
            ("PCORE_TOKEN_EXPIRY", None),
            ("PCORE_CERT_PATH", None),
            ("PCORE_PLAINTEXT", None),
            ("PCORE_TIMEOUT", None),
            ("PCORE_PROBE_TIMEOUT", None),
            ("PCORE_ENDPOINT_SELECTION", None),
        ];
        let mut all: Vec<(&str, Option<&str>)> = defaults
            .into_iter()
            .filter(|(key, _)| !vars.iter().any(|(k, _)| k == key))
            .collect();
        all.extend_from_slice(vars);
        temp_env::with_vars(all, f);
    }

    #[test]
    #[serial]
    fn test_from_env_with_credentials() {
        env_lock(
            &[
                ("PCORE_ENDPOINTS", Some("node-a:5000 node-b:5000")),
                ("PCORE_CLIENT_ID", Some("root")),
                ("PCORE_CREDENTIAL", Some("s3cret")),
                ("PCORE_ENDPOINT_SELECTION", Some("ordered")),
            ],
            || {
                let config = ConfigLoader::new()
                    .load_dotenv()
                    .unwrap()
                    .from_env()
                    .unwrap()
                    .build()
                    .unwrap();

                assert_eq!(config.connection.endpoints, "node-a:5000 node-b:5000");
                assert_eq!(config.connection.selection, EndpointSelection::Ordered);
                match config.auth.strategy {
                    AuthStrategy::Credentials {
                        client_id,
                        credential,
                    } => {
                        assert_eq!(client_id, "root");
                        assert_eq!(credential.expose_secret(), "s3cret");
                    }
                    other => panic!("unexpected strategy: {other:?}"),
                }
            },
        );
    }

    #[test]
    #[serial]
    fn test_token_takes_precedence_over_credentials() {
        env_lock(
            &[
                ("PCORE_ENDPOINTS", Some("node:5000")),
                ("PCORE_CLIENT_ID", Some("root")),
                ("PCORE_CREDENTIAL", Some("s3cret")),
                ("PCORE_TOKEN", Some("abc123")),
                ("PCORE_TOKEN_EXPIRY", Some("1700000000")),
            ],
            || {
                let config = ConfigLoader::new().from_env().unwrap().build().unwrap();
                match config.auth.strategy {
                    AuthStrategy::Token { token, expires_at } => {
                        assert_eq!(token.expose_secret(), "abc123");
                        assert_eq!(expires_at, 1_700_000_000);
                    }
                    other => panic!("unexpected strategy: {other:?}"),
                }
            },
        );
    }

    #[test]
    #[serial]
    fn test_token_without_expiry_is_untracked() {
        env_lock(
            &[
                ("PCORE_ENDPOINTS", Some("node:5000")),
                ("PCORE_TOKEN", Some("abc123")),
            ],
            || {
                let config = ConfigLoader::new().from_env().unwrap().build().unwrap();
                assert!(matches!(
                    config.auth.strategy,
                    AuthStrategy::Token {
                        expires_at: NO_TRACKED_EXPIRY,
                        ..
                    }
                ));
            },
        );
    }

    #[test]
    #[serial]
    fn test_builder_overrides_env() {
        env_lock(
            &[
                ("PCORE_ENDPOINTS", Some("env-node:5000")),
                ("PCORE_TOKEN", Some("abc123")),
                ("PCORE_TIMEOUT", Some("5")),
            ],
            || {
                let config = ConfigLoader::new()
                    .from_env()
                    .unwrap()
                    .with_endpoints("override:6000")
                    .with_timeout(Duration::from_secs(90))
                    .build()
                    .unwrap();
                assert_eq!(config.connection.endpoints, "override:6000");
                assert_eq!(config.connection.timeout, Duration::from_secs(90));
            },
        );
    }

    #[test]
    #[serial]
    fn test_missing_endpoints() {
        env_lock(&[("PCORE_TOKEN", Some("abc123"))], || {
            let err = ConfigLoader::new().from_env().unwrap().build().unwrap_err();
            assert!(matches!(err, ConfigError::MissingEndpoints));
        });
    }

    #[test]
    #[serial]
    fn test_missing_auth() {
        env_lock(&[("PCORE_ENDPOINTS", Some("node:5000"))], || {
            let err = ConfigLoader::new().from_env().unwrap().build().unwrap_err();
            assert!(matches!(err, ConfigError::MissingAuth));
        });
    }

    #[test]
    fn test_client_id_without_credential() {
        let err = ConfigLoader::new()
            .with_endpoints("node:5000")
            .with_client_id("root")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(id) if id == "root"));
    }

    #[test]
    fn test_empty_cert_path_means_system_trust() {
        let config = ConfigLoader::new()
            .with_endpoints("node:5000")
            .with_token("abc".to_string(), -1)
            .with_cert_path(PathBuf::new())
            .build()
            .unwrap();
        assert!(config.connection.cert_path.is_none());
    }

    #[test]
    fn test_plaintext_conflicts_with_cert_path() {
        let err = ConfigLoader::new()
            .with_endpoints("node:5000")
            .with_token("abc".to_string(), -1)
            .with_cert_path(PathBuf::from("/etc/pcore/ca.pem"))
            .with_plaintext(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingTransportSecurity));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ConfigLoader::new()
            .with_endpoints("node:5000")
            .with_token("abc".to_string(), -1)
            .with_probe_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { message } if message.contains("probe_timeout")));
    }

    #[test]
    fn test_timeout_over_maximum_rejected() {
        let err = ConfigLoader::new()
            .with_endpoints("node:5000")
            .with_token("abc".to_string(), -1)
            .with_timeout(Duration::from_secs(MAX_TIMEOUT_SECS + 1))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
    }

    #[test]
    #[serial]
    fn test_invalid_selection_env() {
        env_lock(&[("PCORE_ENDPOINT_SELECTION", Some("sticky"))], || {
            let err = ConfigLoader::new().from_env().err().unwrap();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "PCORE_ENDPOINT_SELECTION")
            );
        });
    }

    #[test]
    #[serial]
    fn test_dotenv_disabled_skips_loading() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "PCORE_ENDPOINTS=from-dotenv:5000\n").unwrap();
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        env_lock(&[], || {
            let loader = ConfigLoader::new().load_dotenv().unwrap();
            assert!(loader.endpoints.is_none());
            assert!(std::env::var("PCORE_ENDPOINTS").is_err());
        });

        std::env::set_current_dir(original).unwrap();
    }
}
