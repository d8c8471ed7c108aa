//! Configuration management for the ParallelCore client SDK.
//!
//! This crate provides types and loaders for the settings a client needs to
//! reach a ParallelCore network: the endpoint pool, the transport security
//! mode, and either a credential pair or a pre-issued session token.

pub mod constants;
mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, env_var_or_none};
pub use types::{AuthConfig, AuthStrategy, Config, ConnectionConfig, EndpointSelection};
