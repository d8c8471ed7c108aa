//! Right-to-forget payloads.
//!
//! A forget request names transactions; once approved, a commit deletes every
//! transaction of the covering forget groups together.

use serde::{Deserialize, Serialize};

use crate::serde_helpers::{string_or_null, vec_or_null};

/// Transactions that can only be deleted together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgetGroup {
    #[serde(deserialize_with = "vec_or_null", default)]
    pub tx_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestForgetParams {
    pub tx_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveForgetParams {
    pub request_tx_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitForgetParams {
    pub request_tx_id: String,
    pub approval_tx_ids: Vec<String>,
}

/// Outcome of a committed forget request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgetReport {
    /// Deleted by this commit.
    #[serde(deserialize_with = "vec_or_null", default)]
    pub deleted: Vec<String>,
    /// Deleted before this commit.
    #[serde(deserialize_with = "vec_or_null", default)]
    pub already_deleted: Vec<String>,
    #[serde(deserialize_with = "vec_or_null", default)]
    pub not_found: Vec<String>,
    #[serde(deserialize_with = "string_or_null", default)]
    pub commit_tx_id: String,
}
