//! User management methods.

use crate::client::{Client, decode_json, payload_text};
use crate::error::Result;
use crate::models::{
    ClientData, InfoListData, UserData, UserDomainData, UserFullData, UserFullDataWrapper,
};
use crate::rpc::{Operation, actions};

impl Client {
    /// Register a new user. An empty `domains` places the user in the default domain.
    ///
    /// Only super-admins and domain-admins may create users; domain-admins
    /// only in domains they manage.
    pub async fn create_user(
        &self,
        client_id: &str,
        credential: &str,
        roles: &[&str],
        domains: &[&str],
    ) -> Result<String> {
        let user = UserData::new(client_id, credential, roles, domains);
        let reply = self.call_encoded(Operation::CREATE_CLIENT, &user).await?;
        payload_text(Operation::CREATE_CLIENT.name(), reply)
    }

    /// Replace the credential, roles and domains of an existing user.
    pub async fn update_user(
        &self,
        client_id: &str,
        credential: &str,
        roles: &[&str],
        domains: &[&str],
    ) -> Result<String> {
        let user = UserData::new(client_id, credential, roles, domains);
        let reply = self.call_encoded(Operation::UPDATE_CLIENT, &user).await?;
        payload_text(Operation::UPDATE_CLIENT.name(), reply)
    }

    /// Remove a user from the network. `domain_name` may be any domain the user belongs to.
    pub async fn delete_user(&self, client_id: &str, domain_name: &str) -> Result<String> {
        let target = UserDomainData {
            id: client_id.to_string(),
            domain_name: domain_name.to_string(),
        };
        let reply = self.call_encoded(Operation::REMOVE_CLIENT, &target).await?;
        payload_text(Operation::REMOVE_CLIENT.name(), reply)
    }

    /// Information about one user; an empty `client_id` means the calling user.
    pub async fn get_user_info(&self, client_id: &str) -> Result<UserFullData> {
        let reply = self.call(Operation::LIST_CLIENT, client_id).await?;
        decode_json(Operation::LIST_CLIENT.name(), &reply)
    }

    /// Information about every user, or every user of `domain_name`.
    pub async fn get_user_infos(
        &self,
        all_domains: bool,
        domain_name: &str,
    ) -> Result<Vec<UserFullDataWrapper>> {
        let query = InfoListData {
            all_domains,
            domain_name: domain_name.to_string(),
        };
        self.call_json(Operation::LIST_CLIENTS, &query).await
    }

    /// Change the calling user's own credential.
    pub async fn update_self_credential(&self, client_id: &str, credential: &str) -> Result<Vec<u8>> {
        let data = ClientData {
            id: client_id.to_string(),
            credential: credential.to_string(),
        };
        self.call_user_man(actions::UPDATE_SELF_CREDENTIAL, &data)
            .await
    }
}
