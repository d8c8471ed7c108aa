//! Right-to-forget methods. All of them require a super-admin.
//!
//! The flow is request, approve, commit: the request and each approval are
//! transactions whose ids feed the next step.

use crate::client::{Client, payload_text};
use crate::error::Result;
use crate::models::{
    ApproveForgetParams, CommitForgetParams, ForgetGroup, ForgetReport, RequestForgetParams,
};
use crate::rpc::{Operation, actions};

impl Client {
    /// Request deletion of `tx_ids` as one group. Returns the request transaction id.
    pub async fn request_forget(&self, tx_ids: &[String]) -> Result<String> {
        let params = RequestForgetParams {
            tx_ids: tx_ids.to_vec(),
        };
        let reply = self.call_sys_man(actions::REQUEST_FORGET, &params).await?;
        payload_text(Operation::SYS_MAN.name(), reply)
    }

    /// Approve a forget request. Returns the approval transaction id.
    pub async fn approve_forget(&self, request_tx_id: &str) -> Result<String> {
        let params = ApproveForgetParams {
            request_tx_id: request_tx_id.to_string(),
        };
        let reply = self.call_sys_man(actions::APPROVE_FORGET, &params).await?;
        payload_text(Operation::SYS_MAN.name(), reply)
    }

    /// Delete the transactions of an approved forget request.
    pub async fn commit_forget(
        &self,
        request_tx_id: &str,
        approval_tx_ids: &[String],
    ) -> Result<ForgetReport> {
        let params = CommitForgetParams {
            request_tx_id: request_tx_id.to_string(),
            approval_tx_ids: approval_tx_ids.to_vec(),
        };
        self.call_sys_man_json(actions::COMMIT_FORGET, &params)
            .await
    }

    /// Forget groups covering `tx_ids`.
    pub async fn list_forget_groups(&self, tx_ids: &[String]) -> Result<Vec<ForgetGroup>> {
        self.call_sys_man_json(actions::LIST_FORGET_GROUPS, tx_ids)
            .await
    }
}
