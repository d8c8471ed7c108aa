//! Access control methods.

use crate::client::Client;
use crate::error::Result;
use crate::models::{ApiAccessControlData, UserAccessData};
use crate::rpc::Operation;

impl Client {
    /// Allow a user to invoke a smart contract.
    pub async fn grant_access(&self, access: &UserAccessData) -> Result<Vec<u8>> {
        self.call_encoded(Operation::GRANT_ACCESS, access).await
    }

    /// Withdraw a user's permission to invoke a smart contract.
    pub async fn revoke_access(&self, access: &UserAccessData) -> Result<Vec<u8>> {
        self.call_encoded(Operation::REVOKE_ACCESS, access).await
    }

    pub async fn check_api_access(&self, request: &ApiAccessControlData) -> Result<Vec<u8>> {
        self.call_encoded(Operation::CHECK_API_ACCESS, request)
            .await
    }

    pub async fn manage_api_access(&self, request: &ApiAccessControlData) -> Result<Vec<u8>> {
        self.call_encoded(Operation::MANAGE_API_ACCESS, request)
            .await
    }
}
