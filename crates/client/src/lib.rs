//! ParallelCore blockchain client.
//!
//! This crate opens authenticated sessions against a pool of ParallelCore
//! nodes, fails over across the pool, renews session tokens in place, and
//! exposes the node's remote operations through one generic call path with
//! typed helpers layered on top.
//!
//! # Wire binding
//! Nodes are reached over HTTP/JSON: each operation is a `POST` to
//! `/rpc/{operation}` carrying a base64 payload envelope (see [`rpc`]). The
//! client only talks to nodes, or gateways in front of them, that expose this
//! binding; it does not speak the nodes' native gRPC interface.
//!
//! # Example
//! ```rust,ignore
//! use pcore_client::{Client, TransportSecurity};
//! use secrecy::SecretString;
//!
//! let client = Client::open(
//!     "node-a:5000 node-b:5000",
//!     "alice",
//!     SecretString::new("s3cret".into()),
//!     TransportSecurity::SystemTrust,
//! )
//! .await?;
//! let answer = client.invoke("token-v1", b"balance alice").await?;
//! client.renew_if_due().await?;
//! client.close();
//! ```

pub mod client;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod metrics;
pub mod models;
pub mod rpc;
mod serde_helpers;
pub mod session;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use client::{Client, ClientBuilder, ClientGroup, EndpointFailure, EventListener};
pub use connection::{ConnectionOptions, TransportSecurity};
pub use endpoint::EndpointPool;
pub use error::{ClientError, Result};
pub use metrics::{ErrorCategory, MetricsCollector};
pub use models::{
    ApiAccessControlData, BlockData, ForgetGroup, ForgetReport, ScEvent, SmartContractData,
    UserAccessData, UserData, UserFullData, UserFullDataWrapper,
};
pub use pcore_config::EndpointSelection;
pub use rpc::{Operation, Reply};
pub use session::SessionToken;
pub use telemetry::{TracingConfig, TracingGuard};
