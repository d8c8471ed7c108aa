//! Authentication types for ParallelCore client configuration.
//!
//! Responsibilities:
//! - Define authentication strategies (credential pair, pre-issued token).
//! - Handle serialization of secret values.
//!
//! Does NOT handle:
//! - Actual authentication flow or token exchange (see client crate).
//!
//! Invariants:
//! - All secret values use `secrecy::SecretString` to prevent accidental logging.
//! - A pre-issued token always carries an expiry; `-1` means "not tracked".

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::constants::NO_TRACKED_EXPIRY;

/// Module for serializing SecretString as strings.
mod secret_string {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize as DeserializeTrait, Serialize as SerializeTrait};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        secret.expose_secret().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString::new(s.into()))
    }
}

fn default_expiry() -> i64 {
    NO_TRACKED_EXPIRY
}

/// Strategy for authenticating with a ParallelCore node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthStrategy {
    /// Client identity and credential, exchanged for a session token on open.
    #[serde(rename = "credentials")]
    Credentials {
        client_id: String,
        #[serde(with = "secret_string")]
        credential: SecretString,
    },
    /// A session token obtained earlier (e.g. handed over by another process).
    #[serde(rename = "token")]
    Token {
        #[serde(with = "secret_string")]
        token: SecretString,
        #[serde(default = "default_expiry")]
        expires_at: i64,
    },
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// The authentication strategy to use.
    #[serde(flatten)]
    pub strategy: AuthStrategy,
}
