//! Smart contract registration and task payloads.

use serde::{Deserialize, Serialize};

use crate::serde_helpers::base64_bytes;

/// Body of `RegisterSmartContract`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartContractData {
    #[serde(rename = "scName")]
    pub name: String,
    /// Compiled contract image.
    #[serde(rename = "file-content", with = "base64_bytes", default)]
    pub file_content: Vec<u8>,
    #[serde(rename = "domainName")]
    pub domain_name: String,
    #[serde(rename = "init-args")]
    pub init_args: String,
}

/// Argument of a smart contract invocation made through `call_smart_contract`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScTask {
    pub action: String,
    pub data: String,
}
