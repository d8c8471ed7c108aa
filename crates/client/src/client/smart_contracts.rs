//! Smart contract registration and task invocation.
//!
//! A task call invokes `<name>-v*` (the latest registered version) with an
//! [`ScTask`] whose `data` is a string: text is sent as-is, anything else as JSON.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::{Client, decode_json, encode_json, payload_text};
use crate::error::Result;
use crate::models::{ScTask, SmartContractData};
use crate::rpc::{Operation, actions};

const LATEST_VERSION_SUFFIX: &str = "-v*";

impl Client {
    pub async fn register_smart_contract(&self, contract: &SmartContractData) -> Result<Vec<u8>> {
        self.call_encoded(Operation::REGISTER_SMART_CONTRACT, contract)
            .await
    }

    pub async fn list_smart_contract(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.call(Operation::LIST_SMART_CONTRACT, payload).await
    }

    pub async fn list_smart_contracts(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.call(Operation::LIST_SMART_CONTRACTS, payload).await
    }

    /// Smart contracts the calling user may invoke.
    pub async fn list_invokable_smart_contracts(&self) -> Result<Vec<u8>> {
        self.call_user_man_raw(actions::LIST_INVOKABLE_SC, Vec::new())
            .await
    }

    /// Run `action` of the latest version of smart contract `name` with text `data`.
    pub async fn call_smart_contract(
        &self,
        name: &str,
        action: &str,
        data: &str,
    ) -> Result<Vec<u8>> {
        let task = ScTask {
            action: action.to_string(),
            data: data.to_string(),
        };
        let args = encode_json(Operation::INVOKE.name(), &task)?;
        self.invoke(&format!("{name}{LATEST_VERSION_SUFFIX}"), &args)
            .await
    }

    /// [`Client::call_smart_contract`] with JSON-encoded `params` and a JSON reply.
    pub async fn call_smart_contract_json<P, R>(
        &self,
        name: &str,
        action: &str,
        params: &P,
    ) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let data = encode_json(Operation::INVOKE.name(), params)?;
        let data = payload_text(Operation::INVOKE.name(), data)?;
        let reply = self.call_smart_contract(name, action, &data).await?;
        decode_json(Operation::INVOKE.name(), &reply)
    }

    /// [`Client::call_smart_contract`] returning the reply as text.
    pub async fn call_smart_contract_text(
        &self,
        name: &str,
        action: &str,
        data: &str,
    ) -> Result<String> {
        let reply = self.call_smart_contract(name, action, data).await?;
        payload_text(Operation::INVOKE.name(), reply)
    }
}
