//! Domain management methods.
//!
//! Payloads are passed through unchanged; their schema belongs to the node.

use crate::client::Client;
use crate::error::Result;
use crate::rpc::Operation;

impl Client {
    pub async fn create_domain(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.call(Operation::CREATE_DOMAIN, payload).await
    }

    pub async fn list_domain(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.call(Operation::LIST_DOMAIN, payload).await
    }

    /// Domains the calling user administers.
    pub async fn list_managed_domains(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.call(Operation::LIST_MANAGED_DOMAINS, payload).await
    }

    pub async fn grant_domain_admin(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.call(Operation::GRANT_DOMAIN_ADMIN, payload).await
    }

    pub async fn revoke_domain_admin(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.call(Operation::REVOKE_DOMAIN_ADMIN, payload).await
    }
}
