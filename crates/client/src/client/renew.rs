//! In-place token renewal.
//!
//! # What this module does NOT handle:
//! - Scheduling renewals; callers invoke [`Client::renew`] or
//!   [`Client::renew_if_expiring`] when they see fit
//!
//! # Invariants
//! - Renewals are serialized per client
//! - On failure the client keeps its previous connection and token
//! - The pool spec never changes

use std::time::Duration;

use pcore_config::constants::DEFAULT_EXPIRY_BUFFER_SECS;
use tracing::{debug, info};

use crate::client::Client;
use crate::client::open::{self, SessionAuth};
use crate::error::{ClientError, Result};
use crate::rpc::{Operation, RequestEnvelope};
use crate::session::SessionToken;

impl Client {
    /// Fetch a fresh token and move the client onto a new connection carrying it.
    ///
    /// The new connection may be on any endpoint of the pool. Calls already
    /// running on the old connection complete; later calls use the new one.
    ///
    /// # Errors
    /// Any failure of the `Renew` call, a malformed token, or failure to open
    /// a new connection. The client is unchanged in every case.
    pub async fn renew(&self) -> Result<()> {
        let _renewal = self.renewal.lock().await;
        self.renew_locked().await
    }

    /// Renew only if the token expires within `buffer`. Returns whether it renewed.
    ///
    /// Tokens without a tracked expiry are never renewed here.
    pub async fn renew_if_expiring(&self, buffer: Duration) -> Result<bool> {
        let _renewal = self.renewal.lock().await;
        if !self.snapshot()?.token.expires_within(buffer) {
            return Ok(false);
        }
        self.renew_locked().await.map(|()| true)
    }

    /// [`Client::renew_if_expiring`] with the default buffer of one minute.
    pub async fn renew_if_due(&self) -> Result<bool> {
        self.renew_if_expiring(Duration::from_secs(DEFAULT_EXPIRY_BUFFER_SECS))
            .await
    }

    async fn renew_locked(&self) -> Result<()> {
        let result = self.reconnect_with_fresh_token().await;
        self.options.metrics.record_renewal(result.is_ok());
        result
    }

    async fn reconnect_with_fresh_token(&self) -> Result<()> {
        let current = self.snapshot()?;
        debug!(endpoint = %current.connection.endpoint(), "Renewing session token");

        let reply = current
            .connection
            .unary(
                Operation::RENEW,
                &RequestEnvelope::default(),
                self.options.timeout,
            )
            .await?;
        let text = String::from_utf8(reply.payload).map_err(|_| {
            ClientError::MalformedSession("session response is not valid UTF-8".to_string())
        })?;
        let token = SessionToken::parse(&text)?;

        let trust = self.security.load().await?;
        let next = open::open_session(
            "renew",
            &self.pool,
            &trust,
            SessionAuth::Token(&token),
            &self.options,
        )
        .await?;
        let endpoint = next.connection.endpoint().to_string();
        let connection_id = next.connection.id();

        let retired = self.install(next)?;
        info!(
            endpoint = %endpoint,
            connection_id = %connection_id,
            retired_connection_id = %retired.connection.id(),
            expires_at = token.expires_at(),
            "Session renewed"
        );
        Ok(())
    }
}
