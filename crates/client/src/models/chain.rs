//! Chain query payloads.

use serde::{Deserialize, Serialize};

/// Identifies one block of one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockData {
    pub chain_id: String,
    pub block_id: String,
}
