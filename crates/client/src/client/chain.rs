//! Chain and transaction queries.
//!
//! Replies are JSON documents owned by the node and returned undecoded.

use crate::client::Client;
use crate::error::Result;
use crate::models::BlockData;
use crate::rpc::actions;

impl Client {
    /// Summary of every chain: sealed block count, last block and node identity.
    pub async fn blockchain_summary_json(&self) -> Result<Vec<u8>> {
        self.call_user_man_raw(actions::GET_BLOCKCHAIN_SUMMARY_JSON, Vec::new())
            .await
    }

    pub async fn block_details_json(&self, chain_id: &str, block_id: &str) -> Result<Vec<u8>> {
        self.call_user_man(actions::GET_BLOCK_DETAILS_JSON, &block(chain_id, block_id))
            .await
    }

    pub async fn calculate_block_hash(&self, chain_id: &str, block_id: &str) -> Result<Vec<u8>> {
        self.call_user_man(actions::CALCULATE_BLOCK_HASH, &block(chain_id, block_id))
            .await
    }

    pub async fn transaction_json(&self, tx_id: &str) -> Result<Vec<u8>> {
        self.call_user_man_raw(actions::GET_SMART_CONTRACT_TRANSACTION_JSON, tx_id)
            .await
    }

    pub async fn transaction_metadata_json(&self, tx_id: &str) -> Result<Vec<u8>> {
        self.call_user_man_raw(actions::GET_SMART_CONTRACT_TRANSACTION_METADATA_JSON, tx_id)
            .await
    }

    /// The `count` most recent transactions.
    pub async fn latest_transactions(&self, count: u32) -> Result<Vec<u8>> {
        self.call_user_man(actions::LIST_LATEST_TRANSACTIONS, &count)
            .await
    }
}

fn block(chain_id: &str, block_id: &str) -> BlockData {
    BlockData {
        chain_id: chain_id.to_string(),
        block_id: block_id.to_string(),
    }
}
