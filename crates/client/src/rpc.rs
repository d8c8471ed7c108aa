//! Remote operation descriptors and the request/reply envelopes.
//!
//! Every remote call is `POST {scheme}://{endpoint}/rpc/{operation}` with a
//! JSON [`RequestEnvelope`]; the node answers with a [`ResponseEnvelope`].
//! Streaming operations answer with newline-delimited envelopes.
//! Nodes that do not expose this binding cannot be reached by this client.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::serde_helpers::{base64_bytes, string_or_null};

/// A named remote operation. Descriptors are plain data; the call path is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    name: &'static str,
    streaming: bool,
}

impl Operation {
    const fn unary(name: &'static str) -> Self {
        Self {
            name,
            streaming: false,
        }
    }

    const fn server_stream(name: &'static str) -> Self {
        Self {
            name,
            streaming: true,
        }
    }

    pub const PING: Self = Self::unary("Ping");
    pub const AUTH: Self = Self::unary("Auth");
    pub const RENEW: Self = Self::unary("Renew");
    pub const INVOKE: Self = Self::unary("Invoke");
    pub const IDENTIFIED_INVOKE: Self = Self::unary("IdentifiedInvoke");
    pub const SYS_MAN: Self = Self::unary("SysMan");
    pub const USER_MAN: Self = Self::unary("UserMan");

    pub const CREATE_DOMAIN: Self = Self::unary("CreateDomain");
    pub const LIST_DOMAIN: Self = Self::unary("ListDomain");
    pub const LIST_MANAGED_DOMAINS: Self = Self::unary("ListManagedDomains");
    pub const GRANT_DOMAIN_ADMIN: Self = Self::unary("GrantDomainAdmin");
    pub const REVOKE_DOMAIN_ADMIN: Self = Self::unary("RevokeDomainAdmin");

    pub const CREATE_CLIENT: Self = Self::unary("CreateClient");
    pub const UPDATE_CLIENT: Self = Self::unary("UpdateClient");
    pub const LIST_CLIENT: Self = Self::unary("ListClient");
    pub const LIST_CLIENTS: Self = Self::unary("ListClients");
    pub const REMOVE_CLIENT: Self = Self::unary("RemoveClient");

    pub const GRANT_ACCESS: Self = Self::unary("GrantAccess");
    pub const REVOKE_ACCESS: Self = Self::unary("RevokeAccess");
    pub const CHECK_API_ACCESS: Self = Self::unary("CheckApiAccess");
    pub const MANAGE_API_ACCESS: Self = Self::unary("ManageApiAccess");

    pub const REGISTER_SMART_CONTRACT: Self = Self::unary("RegisterSmartContract");
    pub const LIST_SMART_CONTRACT: Self = Self::unary("ListSmartContract");
    pub const LIST_SMART_CONTRACTS: Self = Self::unary("ListSmartContracts");

    pub const REGISTER_EVENT_LISTENER: Self = Self::server_stream("RegisterEventListener");

    /// Every operation the node offers.
    pub const ALL: [Self; 25] = [
        Self::PING,
        Self::AUTH,
        Self::RENEW,
        Self::INVOKE,
        Self::IDENTIFIED_INVOKE,
        Self::SYS_MAN,
        Self::USER_MAN,
        Self::CREATE_DOMAIN,
        Self::LIST_DOMAIN,
        Self::LIST_MANAGED_DOMAINS,
        Self::GRANT_DOMAIN_ADMIN,
        Self::REVOKE_DOMAIN_ADMIN,
        Self::CREATE_CLIENT,
        Self::UPDATE_CLIENT,
        Self::LIST_CLIENT,
        Self::LIST_CLIENTS,
        Self::REMOVE_CLIENT,
        Self::GRANT_ACCESS,
        Self::REVOKE_ACCESS,
        Self::CHECK_API_ACCESS,
        Self::MANAGE_API_ACCESS,
        Self::REGISTER_SMART_CONTRACT,
        Self::LIST_SMART_CONTRACT,
        Self::LIST_SMART_CONTRACTS,
        Self::REGISTER_EVENT_LISTENER,
    ];

    /// Wire name of the operation.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the node answers with a stream of envelopes.
    pub const fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Request path relative to the endpoint root.
    pub fn path(&self) -> String {
        format!("/rpc/{}", self.name)
    }

    /// Look up an operation by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Action names carried inside `SysMan`/`UserMan` envelopes.
pub mod actions {
    pub const UPDATE_SELF_CREDENTIAL: &str = "updateSelfCredential";
    pub const LIST_INVOKABLE_SC: &str = "ListInvokableSC";
    pub const LIST_LATEST_TRANSACTIONS: &str = "ListLatestTransactions";
    pub const GET_BLOCKCHAIN_SUMMARY_JSON: &str = "GetBlockchainSummaryJson";
    pub const GET_BLOCK_DETAILS_JSON: &str = "GetBlockDetailsJson";
    pub const GET_SMART_CONTRACT_TRANSACTION_JSON: &str = "GetSmartContractTransactionJson";
    pub const GET_SMART_CONTRACT_TRANSACTION_METADATA_JSON: &str =
        "GetSmartContractTransactionMetadataJson";
    pub const CALCULATE_BLOCK_HASH: &str = "CalculateBlockHash";

    pub const REQUEST_FORGET: &str = "requestForget";
    pub const APPROVE_FORGET: &str = "approveForget";
    pub const COMMIT_FORGET: &str = "commitForget";
    pub const LIST_FORGET_GROUPS: &str = "listForgetGroups";
}

/// Body of every request except `Auth`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RequestEnvelope {
    #[serde(with = "base64_bytes", default)]
    pub payload: Vec<u8>,
}

impl RequestEnvelope {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

/// Body of the `Auth` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    #[serde(with = "base64_bytes")]
    pub client_id: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub credential: Vec<u8>,
}

/// Reply envelope. Exactly one of "error set" or "payload meaningful" holds.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(with = "base64_bytes", default)]
    pub payload: Vec<u8>,
    #[serde(deserialize_with = "string_or_null", default)]
    pub error: String,
    #[serde(deserialize_with = "string_or_null", default)]
    pub commit_id: String,
}

/// A successful reply: the payload and, for identified invokes, the commit id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub payload: Vec<u8>,
    pub commit_id: String,
}

impl ResponseEnvelope {
    /// Apply the unwrap contract: an application error discards the payload.
    pub fn into_reply(self, operation: &'static str) -> Result<Reply> {
        if !self.error.is_empty() {
            return Err(ClientError::Application {
                operation,
                message: self.error,
            });
        }
        Ok(Reply {
            payload: self.payload,
            commit_id: self.commit_id,
        })
    }
}

/// `{"action", "data"}` envelope for `SysMan` and `UserMan` requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub action: String,
    #[serde(with = "base64_bytes", default)]
    pub data: Vec<u8>,
}
