//! User management payloads.
//!
//! Roles and domains travel as comma-joined strings on the write path and
//! as lists on the read path.

use serde::{Deserialize, Serialize};

use crate::serde_helpers::vec_or_null;

/// Body of `CreateClient` and `UpdateClient`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(rename = "clientId")]
    pub id: String,
    #[serde(rename = "clientCredential")]
    pub credential: String,
    /// Comma-joined role names.
    #[serde(rename = "clientRoles")]
    pub roles: String,
    /// Comma-joined domain names; empty means the `default` domain.
    #[serde(rename = "clientDomainName")]
    pub domain_name: String,
}

impl UserData {
    pub fn new(id: &str, credential: &str, roles: &[&str], domains: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            credential: credential.to_string(),
            roles: roles.join(","),
            domain_name: domains.join(","),
        }
    }
}

/// Body of `RemoveClient`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDomainData {
    #[serde(rename = "clientId")]
    pub id: String,
    #[serde(rename = "clientDomainName")]
    pub domain_name: String,
}

/// User information returned by `ListClient`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFullData {
    #[serde(rename = "clientId", default)]
    pub id: String,
    #[serde(deserialize_with = "vec_or_null", default)]
    pub roles: Vec<String>,
    #[serde(deserialize_with = "vec_or_null", default)]
    pub access_list: Vec<String>,
    #[serde(deserialize_with = "vec_or_null", default)]
    pub domains: Vec<String>,
    #[serde(deserialize_with = "vec_or_null", default)]
    pub managed_domains: Vec<String>,
}

/// One element of the `ListClients` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFullDataWrapper {
    #[serde(rename = "clientId")]
    pub id: String,
    pub data: UserFullData,
}

/// Query of `ListClients`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoListData {
    pub all_domains: bool,
    pub domain_name: String,
}

/// Parameters of the `updateSelfCredential` action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientData {
    #[serde(rename = "clientId")]
    pub id: String,
    #[serde(rename = "clientCredential")]
    pub credential: String,
}
