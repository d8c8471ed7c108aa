//! One client per endpoint of a pool, sharing one session token.

use secrecy::SecretString;
use tracing::info;

use crate::client::{Client, ClientBuilder};
use crate::connection::TransportSecurity;
use crate::endpoint::EndpointPool;
use crate::error::{ClientError, Result};
use crate::session::SessionToken;

/// An endpoint that could not be opened while building a group.
#[derive(Debug)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub error: ClientError,
}

/// Independently owned clients, one per reachable endpoint, in pool order.
#[derive(Debug)]
pub struct ClientGroup {
    pool: EndpointPool,
    clients: Vec<Client>,
    failures: Vec<EndpointFailure>,
}

impl ClientGroup {
    pub(crate) fn new(pool: EndpointPool, clients: Vec<Client>, failures: Vec<EndpointFailure>) -> Self {
        info!(
            pool = %pool,
            opened = clients.len(),
            failed = failures.len(),
            "Client group opened"
        );
        Self {
            pool,
            clients,
            failures,
        }
    }

    /// Authenticate once and open a client on every reachable endpoint of `pool`.
    pub async fn open_many(
        pool: &str,
        client_id: &str,
        credential: SecretString,
        security: TransportSecurity,
    ) -> Result<Self> {
        ClientBuilder::new()
            .endpoints(pool)
            .credentials(client_id, credential)
            .security(security)
            .open_many()
            .await
    }

    /// Open a client on every reachable endpoint of `pool` with an issued token.
    pub async fn open_many_by_token(
        pool: &str,
        token: SessionToken,
        security: TransportSecurity,
    ) -> Result<Self> {
        ClientBuilder::new()
            .endpoints(pool)
            .token(token)
            .security(security)
            .open_many()
            .await
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Client> {
        self.clients.iter()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// The client bound to `endpoint`, if that endpoint opened.
    pub fn get(&self, endpoint: &str) -> Option<&Client> {
        self.clients.iter().find(|client| client.endpoint() == endpoint)
    }

    /// The token every member was opened with.
    pub fn token(&self) -> Option<SessionToken> {
        self.clients.first().map(Client::token)
    }

    /// Endpoints that failed to open, in pool order.
    pub fn failures(&self) -> &[EndpointFailure] {
        &self.failures
    }

    /// Summary of the endpoints that failed, or `None` when every endpoint opened.
    pub fn partial_failure(&self) -> Option<ClientError> {
        let last = self.failures.last()?;
        Some(ClientError::PartialOpen {
            pool: self.pool.spec().to_string(),
            total: self.pool.len(),
            failed_endpoints: self
                .failures
                .iter()
                .map(|failure| failure.endpoint.clone())
                .collect(),
            last: last.error.to_string(),
        })
    }

    /// Close every member. Members closed earlier are skipped silently.
    pub fn close_all(&self) {
        for client in &self.clients {
            client.close();
        }
    }

    pub fn into_clients(self) -> Vec<Client> {
        self.clients
    }
}

impl<'a> IntoIterator for &'a ClientGroup {
    type Item = &'a Client;
    type IntoIter = std::slice::Iter<'a, Client>;

    fn into_iter(self) -> Self::IntoIter {
        self.clients.iter()
    }
}
