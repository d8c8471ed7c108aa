//! Endpoint pool parsing and candidate selection.
//!
//! Responsibilities:
//! - Parse a whitespace-delimited pool spec into validated `host:port` endpoints.
//! - Yield candidates by pick-and-remove under an explicit [`EndpointSelection`].
//!
//! Does NOT handle:
//! - Connecting to endpoints (see [`crate::connection`]).
//!
//! Invariants:
//! - A parsed pool is never empty.
//! - Round-robin state lives in the pool value; clones share it, unrelated pools never do.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pcore_config::EndpointSelection;
use rand::Rng;

use crate::error::{ClientError, Result};

/// An ordered, non-empty set of endpoints parsed from one spec string.
#[derive(Clone)]
pub struct EndpointPool {
    spec: String,
    endpoints: Arc<[String]>,
    selection: EndpointSelection,
    next_start: Arc<AtomicUsize>,
}

impl EndpointPool {
    /// Parse a pool spec such as `"node-a:5000 node-b:5000"`.
    pub fn parse(spec: &str) -> Result<Self> {
        Self::with_selection(spec, EndpointSelection::default())
    }

    /// Parse a pool spec with an explicit selection policy.
    pub fn with_selection(spec: &str, selection: EndpointSelection) -> Result<Self> {
        let endpoints: Vec<String> = spec.split_whitespace().map(str::to_string).collect();
        if endpoints.is_empty() {
            return Err(ClientError::EmptyEndpointPool {
                spec: spec.to_string(),
            });
        }
        for endpoint in &endpoints {
            validate_endpoint(endpoint)?;
        }

        Ok(Self {
            spec: spec.to_string(),
            endpoints: endpoints.into(),
            selection,
            next_start: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The spec string this pool was parsed from.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Endpoints in pool order.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn selection(&self) -> EndpointSelection {
        self.selection
    }

    /// Start a new pick-and-remove pass over the pool.
    ///
    /// For [`EndpointSelection::RoundRobin`] every pass starts one endpoint
    /// further along than the previous pass over this pool.
    pub fn candidates(&self) -> Candidates {
        let mut remaining: Vec<String> = self.endpoints.to_vec();
        if self.selection == EndpointSelection::RoundRobin {
            let start = self.next_start.fetch_add(1, Ordering::Relaxed) % remaining.len();
            remaining.rotate_left(start);
        }
        Candidates {
            remaining,
            selection: self.selection,
        }
    }
}

impl fmt::Debug for EndpointPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointPool")
            .field("spec", &self.spec)
            .field("selection", &self.selection)
            .finish()
    }
}

impl fmt::Display for EndpointPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}

/// Remaining candidates of one selection pass.
#[derive(Debug)]
pub struct Candidates {
    remaining: Vec<String>,
    selection: EndpointSelection,
}

impl Candidates {
    /// Number of endpoints not yet handed out.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl Iterator for Candidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining.is_empty() {
            return None;
        }
        let index = match self.selection {
            EndpointSelection::Random => rand::rng().random_range(0..self.remaining.len()),
            EndpointSelection::RoundRobin | EndpointSelection::Ordered => 0,
        };
        Some(self.remaining.remove(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining.len(), Some(self.remaining.len()))
    }
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    let invalid = |message: &str| ClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        message: message.to_string(),
    };

    if endpoint.contains("://") || endpoint.contains('/') {
        return Err(invalid("expected host:port without scheme or path"));
    }
    let url = url::Url::parse(&format!("http://{endpoint}"))
        .map_err(|e| invalid(&format!("not a valid address ({e})")))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("host is required"));
    }
    if url.port().is_none() && !endpoint.ends_with(":80") {
        return Err(invalid("port is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_splits_on_any_whitespace() {
        let pool = EndpointPool::parse("  a:1\tb:2\n c:3 ").unwrap();
        assert_eq!(pool.endpoints(), ["a:1", "b:2", "c:3"]);
        assert_eq!(pool.spec(), "  a:1\tb:2\n c:3 ");
        assert_eq!(pool.selection(), EndpointSelection::Random);
    }

    #[test]
    fn test_empty_spec_is_rejected() {
        for spec in ["", "   ", "\n\t"] {
            let err = EndpointPool::parse(spec).unwrap_err();
            assert!(matches!(err, ClientError::EmptyEndpointPool { .. }));
        }
    }

    #[test]
    fn test_invalid_endpoints_are_rejected() {
        for spec in ["a:1 https://b:2", "node-without-port", "a:1 b:notaport", "a:1/path"] {
            let err = EndpointPool::parse(spec).unwrap_err();
            assert!(
                matches!(err, ClientError::InvalidEndpoint { .. }),
                "{spec} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_ipv6_endpoint_is_accepted() {
        let pool = EndpointPool::parse("[::1]:5000 127.0.0.1:5001").unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_ordered_candidates_follow_pool_order() {
        let pool = EndpointPool::with_selection("a:1 b:2 c:3", EndpointSelection::Ordered).unwrap();
        let order: Vec<String> = pool.candidates().collect();
        assert_eq!(order, ["a:1", "b:2", "c:3"]);
        let again: Vec<String> = pool.candidates().collect();
        assert_eq!(again, order);
    }

    #[test]
    fn test_random_candidates_visit_every_endpoint_once() {
        let pool = EndpointPool::parse("a:1 b:2 c:3 d:4 e:5").unwrap();
        for _ in 0..20 {
            let seen: Vec<String> = pool.candidates().collect();
            assert_eq!(seen.len(), 5);
            let unique: HashSet<&String> = seen.iter().collect();
            assert_eq!(unique.len(), 5);
        }
    }

    #[test]
    fn test_round_robin_advances_per_pass() {
        let pool =
            EndpointPool::with_selection("a:1 b:2 c:3", EndpointSelection::RoundRobin).unwrap();
        let firsts: Vec<String> = (0..4)
            .map(|_| pool.candidates().next().unwrap())
            .collect();
        assert_eq!(firsts, ["a:1", "b:2", "c:3", "a:1"]);

        let pass: Vec<String> = pool.candidates().collect();
        assert_eq!(pass, ["b:2", "c:3", "a:1"]);
    }

    #[test]
    fn test_round_robin_state_is_per_pool() {
        let first =
            EndpointPool::with_selection("a:1 b:2", EndpointSelection::RoundRobin).unwrap();
        let unrelated =
            EndpointPool::with_selection("a:1 b:2", EndpointSelection::RoundRobin).unwrap();
        let shared = first.clone();

        assert_eq!(first.candidates().next().unwrap(), "a:1");
        assert_eq!(shared.candidates().next().unwrap(), "b:2");
        assert_eq!(unrelated.candidates().next().unwrap(), "a:1");
    }

    #[test]
    fn test_candidates_size_hint_shrinks() {
        let pool = EndpointPool::parse("a:1 b:2").unwrap();
        let mut candidates = pool.candidates();
        assert_eq!(candidates.remaining(), 2);
        candidates.next();
        assert_eq!(candidates.size_hint(), (1, Some(1)));
    }
}
