//! Generators for smart contract event streams.
//!
//! Produces acknowledgement-first envelope sequences the way a node emits
//! them to a registered listener. Seeded generators are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};

use pcore_config::constants::EVENT_LISTENER_REGISTERED;

use super::{error_envelope, ok_envelope};

const EVENT_NAMES: &[&str] = &["Transfer", "Mint", "Burn", "Approval", "OwnerChanged"];

/// Builds event streams for one smart contract.
#[derive(Debug)]
pub struct EventStreamGenerator {
    sc_name: String,
    rng: StdRng,
    trailing_error: Option<String>,
}

impl EventStreamGenerator {
    pub fn new(sc_name: impl Into<String>) -> Self {
        Self {
            sc_name: sc_name.into(),
            rng: StdRng::from_os_rng(),
            trailing_error: None,
        }
    }

    /// Reproducible generator.
    pub fn seeded(sc_name: impl Into<String>, seed: u64) -> Self {
        Self {
            sc_name: sc_name.into(),
            rng: StdRng::seed_from_u64(seed),
            trailing_error: None,
        }
    }

    /// End the stream with an application error envelope instead of EOF.
    pub fn with_trailing_error(mut self, message: impl Into<String>) -> Self {
        self.trailing_error = Some(message.into());
        self
    }

    /// One event payload as the node encodes it.
    pub fn event(&mut self) -> Value {
        let name = EVENT_NAMES[self.rng.random_range(0..EVENT_NAMES.len())];
        let amount: u32 = self.rng.random_range(1..10_000);
        let tx_id = format!("{:032x}", self.rng.random::<u128>());
        json!({
            "txId": tx_id,
            "scName": self.sc_name,
            "eventName": name,
            "payload": format!("{{\"amount\":{amount}}}"),
        })
    }

    /// Acknowledgement followed by `count` event envelopes.
    pub fn stream(&mut self, count: usize) -> Vec<Value> {
        let mut envelopes = Vec::with_capacity(count + 2);
        envelopes.push(ok_envelope(EVENT_LISTENER_REGISTERED));
        for _ in 0..count {
            let event = self.event();
            envelopes.push(ok_envelope(event.to_string()));
        }
        if let Some(message) = &self.trailing_error {
            envelopes.push(error_envelope(message));
        }
        envelopes
    }
}
