//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse `PCORE_*` environment variables.
//! - Apply environment variable values to a ConfigLoader instance.
//! - Provide helper functions for reading env vars with empty/whitespace filtering.
//!
//! Does NOT handle:
//! - Building the final Config (see builder.rs).
//! - .env file loading (handled by ConfigLoader::load_dotenv).
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid numeric values return ConfigError::InvalidValue.

use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

use super::builder::ConfigLoader;
use super::error::ConfigError;
use crate::constants::{
    ENV_CERT_PATH, ENV_CLIENT_ID, ENV_CREDENTIAL, ENV_ENDPOINT_SELECTION, ENV_ENDPOINTS,
    ENV_PLAINTEXT, ENV_PROBE_TIMEOUT, ENV_TIMEOUT, ENV_TOKEN, ENV_TOKEN_EXPIRY,
};
use crate::types::EndpointSelection;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_seconds(var: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        message: "must be a number of seconds".to_string(),
    })?;
    Ok(Duration::from_secs(secs))
}

fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: "must be true or false".to_string(),
        }),
    }
}

/// Apply environment variable configuration to the loader.
pub fn apply_env(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    if let Some(endpoints) = env_var_or_none(ENV_ENDPOINTS) {
        loader.set_endpoints(Some(endpoints));
    }
    if let Some(client_id) = env_var_or_none(ENV_CLIENT_ID) {
        loader.set_client_id(Some(client_id));
    }
    if let Some(credential) = env_var_or_none(ENV_CREDENTIAL) {
        loader.set_credential(Some(SecretString::new(credential.into())));
    }
    if let Some(token) = env_var_or_none(ENV_TOKEN) {
        loader.set_token(Some(SecretString::new(token.into())));
    }
    if let Some(expiry) = env_var_or_none(ENV_TOKEN_EXPIRY) {
        loader.set_token_expiry(Some(expiry.parse().map_err(|_| {
            ConfigError::InvalidValue {
                var: ENV_TOKEN_EXPIRY.to_string(),
                message: "must be an integer number of epoch seconds".to_string(),
            }
        })?));
    }
    if let Some(path) = env_var_or_none(ENV_CERT_PATH) {
        loader.set_cert_path(Some(PathBuf::from(path)));
    }
    if let Some(plaintext) = env_var_or_none(ENV_PLAINTEXT) {
        loader.set_plaintext(Some(parse_flag(ENV_PLAINTEXT, &plaintext)?));
    }
    if let Some(timeout) = env_var_or_none(ENV_TIMEOUT) {
        loader.set_timeout(Some(parse_seconds(ENV_TIMEOUT, &timeout)?));
    }
    if let Some(timeout) = env_var_or_none(ENV_PROBE_TIMEOUT) {
        loader.set_probe_timeout(Some(parse_seconds(ENV_PROBE_TIMEOUT, &timeout)?));
    }
    if let Some(selection) = env_var_or_none(ENV_ENDPOINT_SELECTION) {
        let selection: EndpointSelection =
            selection
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    var: ENV_ENDPOINT_SELECTION.to_string(),
                    message,
                })?;
        loader.set_selection(Some(selection));
    }

    Ok(())
}
