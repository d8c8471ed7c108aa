//! Session tokens and the authentication exchange.
//!
//! A node answers `Auth` and `Renew` with the text `"<token> <expiry>"`, where
//! expiry is epoch seconds. [`SessionToken`] is the parsed form.
//!
//! # What this module does NOT handle:
//! - Choosing an endpoint or reopening the client connection (see `client::open`)
//! - Deciding when to renew (see `Client::renew_if_expiring`)
//!
//! # Invariants
//! - A parsed token always carries an expiry; malformed replies are never defaulted
//! - `Debug` output never contains the bearer value

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pcore_config::constants::NO_TRACKED_EXPIRY;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::connection::Connection;
use crate::error::{ClientError, Result};
use crate::rpc::{AuthRequest, Operation};

/// Bearer token plus its expiry in epoch seconds (`-1` when not tracked).
#[derive(Clone)]
pub struct SessionToken {
    token: SecretString,
    expires_at: i64,
}

impl SessionToken {
    pub fn new(token: impl Into<String>, expires_at: i64) -> Self {
        Self {
            token: SecretString::new(token.into().into()),
            expires_at,
        }
    }

    /// A token whose expiry the caller does not track.
    pub fn untracked(token: impl Into<String>) -> Self {
        Self::new(token, NO_TRACKED_EXPIRY)
    }

    pub(crate) fn from_secret(token: SecretString, expires_at: i64) -> Self {
        Self { token, expires_at }
    }

    /// Parse the `"<token> <expiry>"` reply of `Auth` and `Renew`.
    ///
    /// # Errors
    /// [`ClientError::MalformedSession`] unless there are exactly two
    /// whitespace-separated fields and the second is a base-10 `i64`.
    pub fn parse(text: &str) -> Result<Self> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        let [token, expiry] = fields.as_slice() else {
            return Err(ClientError::MalformedSession(format!(
                "expected \"<token> <expiry>\", got {} field(s)",
                fields.len()
            )));
        };
        let expires_at = expiry.parse::<i64>().map_err(|e| {
            ClientError::MalformedSession(format!("expiry {expiry:?} is not an integer: {e}"))
        })?;
        Ok(Self::new(*token, expires_at))
    }

    /// The `"<token> <expiry>"` form accepted by [`SessionToken::parse`].
    pub fn to_wire(&self) -> String {
        format!("{} {}", self.token.expose_secret(), self.expires_at)
    }

    pub fn expose_token(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn secret(&self) -> &SecretString {
        &self.token
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn has_tracked_expiry(&self) -> bool {
        self.expires_at != NO_TRACKED_EXPIRY
    }

    /// Expiry as a UTC timestamp, if tracked and representable.
    pub fn expiry_time(&self) -> Option<DateTime<Utc>> {
        if !self.has_tracked_expiry() {
            return None;
        }
        DateTime::from_timestamp(self.expires_at, 0)
    }

    /// Whether the token expires within `buffer` from now. Never true when untracked.
    pub fn expires_within(&self, buffer: Duration) -> bool {
        if !self.has_tracked_expiry() {
            return false;
        }
        let buffer = i64::try_from(buffer.as_secs()).unwrap_or(i64::MAX);
        self.expires_at.saturating_sub(Utc::now().timestamp()) <= buffer
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expires_at == other.expires_at
            && self.token.expose_secret() == other.token.expose_secret()
    }
}

impl Eq for SessionToken {}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expiry = match self.expiry_time() {
            Some(at) => at.to_rfc3339(),
            None if self.has_tracked_expiry() => self.expires_at.to_string(),
            None => "untracked".to_string(),
        };
        f.debug_struct("SessionToken")
            .field("token_len", &self.token.expose_secret().len())
            .field("expires_at", &expiry)
            .finish()
    }
}

/// Exchange a client identity and credential for a session token.
///
/// `connection` must have been opened without a token. The caller closes it afterwards.
pub(crate) async fn authenticate(
    connection: &Connection,
    client_id: &str,
    credential: &SecretString,
    timeout: Duration,
) -> Result<SessionToken> {
    debug!(endpoint = %connection.endpoint(), client_id, "Authenticating");
    let request = AuthRequest {
        client_id: client_id.as_bytes().to_vec(),
        credential: credential.expose_secret().as_bytes().to_vec(),
    };
    let reply = connection.unary(Operation::AUTH, &request, timeout).await?;
    let text = String::from_utf8(reply.payload).map_err(|_| {
        ClientError::MalformedSession("session response is not valid UTF-8".to_string())
    })?;
    SessionToken::parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_and_expiry() {
        let token = SessionToken::parse("abc123 1700000000").unwrap();
        assert_eq!(token.expose_token(), "abc123");
        assert_eq!(token.expires_at(), 1_700_000_000);
    }

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        let token = SessionToken::parse("  abc123\t-1\n").unwrap();
        assert_eq!(token.expose_token(), "abc123");
        assert!(!token.has_tracked_expiry());
    }

    #[test]
    fn test_parse_rejects_malformed_replies() {
        for text in ["abc123", "", "abc 1 2", "abc123 tomorrow", "abc 1.5"] {
            let err = SessionToken::parse(text).unwrap_err();
            assert!(
                matches!(err, ClientError::MalformedSession(_)),
                "{text:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_wire_form_round_trips() {
        let token = SessionToken::new("abc123", 1_700_000_000);
        assert_eq!(token.to_wire(), "abc123 1700000000");
        assert_eq!(SessionToken::parse(&token.to_wire()).unwrap(), token);
    }

    #[test]
    fn test_debug_hides_bearer() {
        let token = SessionToken::new("very-secret-bearer", 1_700_000_000);
        let debug = format!("{token:?}");
        assert!(!debug.contains("very-secret-bearer"));
        assert!(debug.contains("token_len: 18"));
        assert!(debug.contains("2023-11-14T22:13:20+00:00"));
        assert!(format!("{:?}", SessionToken::untracked("x")).contains("untracked"));
    }

    #[test]
    fn test_expires_within() {
        let now = Utc::now().timestamp();
        assert!(SessionToken::new("t", now + 30).expires_within(Duration::from_secs(60)));
        assert!(!SessionToken::new("t", now + 3600).expires_within(Duration::from_secs(60)));
        assert!(SessionToken::new("t", now - 10).expires_within(Duration::ZERO));
        assert!(!SessionToken::untracked("t").expires_within(Duration::from_secs(u64::MAX)));
    }
}
