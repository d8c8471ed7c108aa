//! Centralized constants for the ParallelCore SDK workspace.
//!
//! This module contains default values and protocol literals used across
//! crates to avoid magic number duplication.

// =============================================================================
// Connection & Timeout Defaults
// =============================================================================

/// Default per-call request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default timeout for the liveness probe issued right after connecting.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Default TCP/TLS connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default buffer before token expiry inside which a renewal is considered due.
pub const DEFAULT_EXPIRY_BUFFER_SECS: u64 = 60;

// =============================================================================
// Timeout Configuration Bounds
// =============================================================================

/// Maximum allowed request timeout in seconds (1 hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

// =============================================================================
// Protocol Literals
// =============================================================================

/// Expiry value meaning "the caller does not track when to renew".
pub const NO_TRACKED_EXPIRY: i64 = -1;

/// Exact payload a healthy node answers to a liveness probe.
pub const PROBE_REPLY: &str = "Pong";

/// Reply sent by a node once an event listener has been registered.
pub const EVENT_LISTENER_REGISTERED: &str = "Successfully registered event listener.";

/// Default domain name used by the network when none is given.
pub const DEFAULT_DOMAIN: &str = "default";

// =============================================================================
// Environment Variables
// =============================================================================

/// Whitespace-delimited endpoint pool, e.g. `"node-a:5000 node-b:5000"`.
pub const ENV_ENDPOINTS: &str = "PCORE_ENDPOINTS";

/// Client identity used for authentication.
pub const ENV_CLIENT_ID: &str = "PCORE_CLIENT_ID";

/// Client credential used for authentication.
pub const ENV_CREDENTIAL: &str = "PCORE_CREDENTIAL";

/// Pre-issued session token (skips authentication).
pub const ENV_TOKEN: &str = "PCORE_TOKEN";

/// Expiry of [`ENV_TOKEN`] in epoch seconds.
pub const ENV_TOKEN_EXPIRY: &str = "PCORE_TOKEN_EXPIRY";

/// Path to a PEM trust anchor; unset means the system trust store.
pub const ENV_CERT_PATH: &str = "PCORE_CERT_PATH";

/// Disable TLS entirely (local development nodes only).
pub const ENV_PLAINTEXT: &str = "PCORE_PLAINTEXT";

/// Per-call timeout in seconds.
pub const ENV_TIMEOUT: &str = "PCORE_TIMEOUT";

/// Liveness probe timeout in seconds.
pub const ENV_PROBE_TIMEOUT: &str = "PCORE_PROBE_TIMEOUT";

/// Endpoint selection policy: `random`, `round-robin` or `ordered`.
pub const ENV_ENDPOINT_SELECTION: &str = "PCORE_ENDPOINT_SELECTION";

/// OTLP collector endpoint for trace export.
pub const ENV_OTLP_ENDPOINT: &str = "PCORE_OTLP_ENDPOINT";
