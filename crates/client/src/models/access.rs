//! Access control payloads.

use serde::{Deserialize, Serialize};

use crate::serde_helpers::base64_bytes;

/// Body of `GrantAccess` and `RevokeAccess`: which user may call which contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccessData {
    #[serde(rename = "clientId")]
    pub id: String,
    #[serde(rename = "scName")]
    pub sc_name: String,
    #[serde(rename = "domainName")]
    pub domain_name: String,
}

/// Body of `CheckApiAccess` and `ManageApiAccess`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAccessControlData {
    pub operation: String,
    #[serde(rename = "api")]
    pub api_name: String,
    /// Operation-specific options, JSON-encoded by the caller.
    #[serde(with = "base64_bytes", default)]
    pub options: Vec<u8>,
}
