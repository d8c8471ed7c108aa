//! Metrics collection for remote calls and the connection lifecycle.
//!
//! This module provides metrics collection for ParallelCore calls, including:
//! - Call latency histograms
//! - Call counters labelled by outcome
//! - Error categorization
//! - Failover and renewal counters
//!
//! # What this module does NOT handle:
//! - Metrics exposition/export (install a recorder such as a Prometheus exporter in the application)
//! - Persistent storage of metrics
//!
//! # Invariants
//! - All metrics use consistent label names: `operation`, `endpoint`, `outcome`, `error_category`
//! - Metric recording is infallible
//! - Zero-cost when no metrics recorder is installed

use crate::error::ClientError;
use std::time::Duration;

/// Metric name for call duration histogram.
pub const METRIC_CALL_DURATION: &str = "pcore_call_duration_seconds";

/// Metric name for total call counter.
pub const METRIC_CALLS_TOTAL: &str = "pcore_calls_total";

/// Metric name for error counter.
pub const METRIC_ERRORS_TOTAL: &str = "pcore_errors_total";

/// Metric name for endpoint failover counter.
pub const METRIC_FAILOVERS_TOTAL: &str = "pcore_endpoint_failovers_total";

/// Metric name for token renewal counter.
pub const METRIC_RENEWALS_TOTAL: &str = "pcore_token_renewals_total";

/// Metric name for received event counter.
pub const METRIC_EVENTS_TOTAL: &str = "pcore_events_received_total";

/// Error categories for metrics labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport-level errors (connection refused, DNS, TLS, etc.)
    Transport,
    /// Non-success HTTP status from the node
    Status,
    /// Call or probe timeout
    Timeout,
    /// Liveness probe returned the wrong reply
    Probe,
    /// Server-side application error
    Application,
    /// Malformed or undecodable reply
    Protocol,
    /// Client configuration problem
    Configuration,
    /// Operation on a closed client or stream
    Closed,
    /// Unknown/unclassified errors
    Unknown,
}

impl ErrorCategory {
    /// Returns the string label for this error category.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Status => "status",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Probe => "probe",
            ErrorCategory::Application => "application",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Closed => "closed",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl From<&ClientError> for ErrorCategory {
    fn from(error: &ClientError) -> Self {
        match error.root_cause() {
            ClientError::Transport { .. } => ErrorCategory::Transport,
            ClientError::Status { .. } => ErrorCategory::Status,
            ClientError::Timeout { .. } => ErrorCategory::Timeout,
            ClientError::ProbeFailed { .. } => ErrorCategory::Probe,
            ClientError::Application { .. } => ErrorCategory::Application,
            ClientError::MalformedSession(_)
            | ClientError::InvalidResponse { .. }
            | ClientError::Decode { .. } => ErrorCategory::Protocol,
            ClientError::Closed | ClientError::StreamClosed(_) => ErrorCategory::Closed,
            e if e.is_configuration_error() => ErrorCategory::Configuration,
            _ => ErrorCategory::Unknown,
        }
    }
}

/// Metrics collector for ParallelCore calls.
///
/// A lightweight wrapper around the `metrics` crate macros with consistent labels.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    enabled: bool,
}

impl MetricsCollector {
    /// Create an enabled metrics collector.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Create a collector that does not record anything.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record one finished unary call.
    ///
    /// # Arguments
    /// * `operation` - Wire name of the operation (e.g. "Invoke")
    /// * `endpoint` - The `host:port` the call went to
    /// * `duration` - Wall time of the call
    /// * `outcome` - `Ok(())` or the error the call produced
    pub fn record_call(
        &self,
        operation: &str,
        endpoint: &str,
        duration: Duration,
        outcome: Result<(), &ClientError>,
    ) {
        if !self.enabled {
            return;
        }

        let outcome_label = match outcome {
            Ok(()) => "ok",
            Err(_) => "error",
        };

        metrics::histogram!(METRIC_CALL_DURATION,
            "operation" => operation.to_string(),
            "endpoint" => endpoint.to_string(),
            "outcome" => outcome_label,
        )
        .record(duration.as_secs_f64());

        metrics::counter!(METRIC_CALLS_TOTAL,
            "operation" => operation.to_string(),
            "endpoint" => endpoint.to_string(),
            "outcome" => outcome_label,
        )
        .increment(1);

        if let Err(error) = outcome {
            self.record_client_error(operation, endpoint, error);
        }
    }

    /// Record an error with its category.
    pub fn record_error(&self, operation: &str, endpoint: &str, category: ErrorCategory) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_ERRORS_TOTAL,
            "operation" => operation.to_string(),
            "endpoint" => endpoint.to_string(),
            "error_category" => category.as_str(),
        )
        .increment(1);
    }

    /// Record an error from a ClientError.
    pub fn record_client_error(&self, operation: &str, endpoint: &str, error: &ClientError) {
        self.record_error(operation, endpoint, ErrorCategory::from(error));
    }

    /// Record that an endpoint failed and the next candidate will be tried.
    pub fn record_failover(&self, operation: &str, endpoint: &str) {
        if !self.enabled {
            return;
        }
        metrics::counter!(METRIC_FAILOVERS_TOTAL,
            "operation" => operation.to_string(),
            "endpoint" => endpoint.to_string(),
        )
        .increment(1);
    }

    /// Record a finished renewal attempt.
    pub fn record_renewal(&self, success: bool) {
        if !self.enabled {
            return;
        }
        metrics::counter!(METRIC_RENEWALS_TOTAL,
            "outcome" => if success { "ok" } else { "error" },
        )
        .increment(1);
    }

    /// Record one event delivered by an event listener.
    pub fn record_event(&self, sc_name: &str) {
        if !self.enabled {
            return;
        }
        metrics::counter!(METRIC_EVENTS_TOTAL, "sc_name" => sc_name.to_string()).increment(1);
    }
}
