//! `SysMan` and `UserMan` action calls.
//!
//! Both operations take an `{"action", "data"}` envelope whose `data` is the
//! JSON-encoded parameters of the named action.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::{Client, decode_json, encode_json};
use crate::error::Result;
use crate::rpc::{ActionEnvelope, Operation};

impl Client {
    async fn call_action(&self, operation: Operation, action: &str, data: Vec<u8>) -> Result<Vec<u8>> {
        let envelope = ActionEnvelope {
            action: action.to_string(),
            data,
        };
        let payload = encode_json(operation.name(), &envelope)?;
        self.call(operation, payload).await
    }

    /// Run a system management action with pre-encoded `data`.
    pub async fn call_sys_man_raw(&self, action: &str, data: impl Into<Vec<u8>>) -> Result<Vec<u8>> {
        self.call_action(Operation::SYS_MAN, action, data.into())
            .await
    }

    /// Run a system management action with JSON-encoded `params`.
    pub async fn call_sys_man<P>(&self, action: &str, params: &P) -> Result<Vec<u8>>
    where
        P: Serialize + ?Sized,
    {
        let data = encode_json(Operation::SYS_MAN.name(), params)?;
        self.call_action(Operation::SYS_MAN, action, data).await
    }

    /// [`Client::call_sys_man`], decoding the reply as JSON.
    pub async fn call_sys_man_json<P, R>(&self, action: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let reply = self.call_sys_man(action, params).await?;
        decode_json(Operation::SYS_MAN.name(), &reply)
    }

    /// Run a user management action with pre-encoded `data`.
    pub async fn call_user_man_raw(&self, action: &str, data: impl Into<Vec<u8>>) -> Result<Vec<u8>> {
        self.call_action(Operation::USER_MAN, action, data.into())
            .await
    }

    /// Run a user management action with JSON-encoded `params`.
    pub async fn call_user_man<P>(&self, action: &str, params: &P) -> Result<Vec<u8>>
    where
        P: Serialize + ?Sized,
    {
        let data = encode_json(Operation::USER_MAN.name(), params)?;
        self.call_action(Operation::USER_MAN, action, data).await
    }

    /// [`Client::call_user_man`], decoding the reply as JSON.
    pub async fn call_user_man_json<P, R>(&self, action: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let reply = self.call_user_man(action, params).await?;
        decode_json(Operation::USER_MAN.name(), &reply)
    }
}
