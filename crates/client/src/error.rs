//! Error types for the ParallelCore client.
//!
//! Every variant carries enough context (operation, endpoint, pool spec) to
//! diagnose a failure without re-tracing call sites.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during ParallelCore client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The endpoint pool spec contained no endpoints.
    #[error("endpoint pool is empty (spec: {spec:?})")]
    EmptyEndpointPool { spec: String },

    /// The trust material file could not be loaded.
    #[error("failed to load trust material from {}: {message}", .path.display())]
    TrustMaterial { path: PathBuf, message: String },

    /// An endpoint in the pool is not a valid `host:port` address.
    #[error("invalid endpoint {endpoint:?}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    /// Neither credentials nor a session token were supplied.
    #[error("authentication is required: supply a client id and credential, or a session token")]
    MissingAuth,

    /// Any other invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The transport failed before a reply was received.
    #[error("{operation} to {endpoint} failed: {source}")]
    Transport {
        operation: &'static str,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The node answered with a non-success HTTP status.
    #[error("{operation} to {endpoint} returned HTTP {status}")]
    Status {
        operation: &'static str,
        endpoint: String,
        status: u16,
    },

    /// The liveness probe got an unexpected reply.
    #[error("liveness probe of {endpoint} failed: {reason}")]
    ProbeFailed { endpoint: String, reason: String },

    /// The call did not complete within its deadline.
    #[error("{operation} to {endpoint} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        endpoint: String,
        timeout: Duration,
    },

    /// Every endpoint of the pool was tried and failed.
    #[error("{operation}({pool:?}): no endpoint could be opened; last error: {last}")]
    PoolExhausted {
        operation: &'static str,
        pool: String,
        #[source]
        last: Box<ClientError>,
    },

    /// Session establishment failed after an endpoint was reached.
    #[error("{operation}({pool:?}): {source}")]
    Session {
        operation: &'static str,
        pool: String,
        #[source]
        source: Box<ClientError>,
    },

    /// The server rejected the call; the message is passed through verbatim.
    #[error("{operation} rejected by server: {message}")]
    Application {
        operation: &'static str,
        message: String,
    },

    /// A token/expiry reply did not have the two-field shape.
    #[error("malformed session response: {0}")]
    MalformedSession(String),

    /// A reply could not be interpreted.
    #[error("invalid response from {operation}: {message}")]
    InvalidResponse {
        operation: &'static str,
        message: String,
    },

    /// A request could not be serialized.
    #[error("failed to encode {operation} request: {source}")]
    Encode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A reply payload could not be deserialized.
    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The event filter is not a valid regular expression.
    #[error("invalid event filter: {0}")]
    InvalidEventFilter(#[from] regex::Error),

    /// The client (or the connection it was using) has been closed.
    #[error("client is closed")]
    Closed,

    /// A server stream ended.
    #[error("event stream closed: {0}")]
    StreamClosed(String),

    /// Some endpoints of a group failed to open while others succeeded.
    #[error(
        "{} of {total} endpoints in pool {pool:?} failed to open ({}); last error: {last}",
        .failed_endpoints.len(),
        .failed_endpoints.join(", ")
    )]
    PartialOpen {
        pool: String,
        total: usize,
        failed_endpoints: Vec<String>,
        last: String,
    },
}

impl ClientError {
    /// Whether this failure is attributable to one endpoint, so the next
    /// endpoint of the pool should be tried.
    pub fn is_endpoint_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Status { .. }
                | Self::ProbeFailed { .. }
                | Self::Timeout { .. }
        )
    }

    /// Whether this is a configuration problem that no retry can fix.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyEndpointPool { .. }
                | Self::TrustMaterial { .. }
                | Self::InvalidEndpoint { .. }
                | Self::MissingAuth
                | Self::Config(_)
        )
    }

    /// Whether the server rejected the call with an application-level error.
    pub fn is_application_error(&self) -> bool {
        matches!(self.root_cause(), Self::Application { .. })
    }

    /// The innermost error, looking through pool and session wrappers.
    pub fn root_cause(&self) -> &ClientError {
        match self {
            Self::PoolExhausted { last, .. } => last.root_cause(),
            Self::Session { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_failures_are_classified() {
        let err = ClientError::Timeout {
            operation: "Ping",
            endpoint: "node-a:5000".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(err.is_endpoint_failure());
        assert!(!err.is_configuration_error());

        let err = ClientError::ProbeFailed {
            endpoint: "node-a:5000".to_string(),
            reason: "unexpected reply \"Pang\"".to_string(),
        };
        assert!(err.is_endpoint_failure());
    }

    #[test]
    fn test_configuration_errors_are_not_endpoint_failures() {
        let err = ClientError::EmptyEndpointPool {
            spec: "   ".to_string(),
        };
        assert!(err.is_configuration_error());
        assert!(!err.is_endpoint_failure());

        let err = ClientError::TrustMaterial {
            path: PathBuf::from("/missing/ca.pem"),
            message: "No such file or directory".to_string(),
        };
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("/missing/ca.pem"));
    }

    #[test]
    fn test_application_error_seen_through_wrappers() {
        let err = ClientError::Session {
            operation: "open",
            pool: "a:1 b:2".to_string(),
            source: Box::new(ClientError::Application {
                operation: "Auth",
                message: "invalid credential".to_string(),
            }),
        };
        assert!(err.is_application_error());
        assert!(!err.is_endpoint_failure());
        assert!(err.to_string().contains("a:1 b:2"));
        assert!(err.to_string().contains("invalid credential"));
    }

    #[test]
    fn test_pool_exhausted_message_names_pool_and_last_error() {
        let err = ClientError::PoolExhausted {
            operation: "open",
            pool: "A B C".to_string(),
            last: Box::new(ClientError::Status {
                operation: "Ping",
                endpoint: "C".to_string(),
                status: 503,
            }),
        };
        let message = err.to_string();
        assert!(message.contains("\"A B C\""));
        assert!(message.contains("HTTP 503"));
        assert!(matches!(err.root_cause(), ClientError::Status { status: 503, .. }));
    }

    #[test]
    fn test_malformed_session_is_not_application_error() {
        let err = ClientError::MalformedSession("expected 2 fields, got 1".to_string());
        assert!(!err.is_application_error());
        assert!(!err.is_endpoint_failure());
    }

    #[test]
    fn test_partial_open_lists_failed_endpoints() {
        let err = ClientError::PartialOpen {
            pool: "a:1 b:2 c:3".to_string(),
            total: 3,
            failed_endpoints: vec!["a:1".to_string(), "c:3".to_string()],
            last: "Ping to c:3 returned HTTP 503".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("2 of 3 endpoints"));
        assert!(message.contains("a:1, c:3"));
        assert!(message.contains("HTTP 503"));
    }
}
