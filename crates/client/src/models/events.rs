//! Smart contract event payloads.

use serde::{Deserialize, Serialize};

/// Body of `RegisterEventListener`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEventListenerRequest {
    pub sc_name: String,
    /// Regular expression matched against event names.
    pub event_filter: String,
}

/// An event emitted by a smart contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScEvent {
    pub tx_id: String,
    pub sc_name: String,
    pub event_name: String,
    #[serde(default)]
    pub payload: String,
}
