//! Data models for ParallelCore request and response payloads.
//!
//! Types are organized by area in submodules and re-exported here
//! for convenient access. Field names follow the node's JSON spelling.

pub mod access;
pub mod chain;
pub mod events;
pub mod forget;
pub mod smart_contracts;
pub mod users;

pub use access::{ApiAccessControlData, UserAccessData};
pub use chain::BlockData;
pub use events::{RegisterEventListenerRequest, ScEvent};
pub use forget::{
    ApproveForgetParams, CommitForgetParams, ForgetGroup, ForgetReport, RequestForgetParams,
};
pub use smart_contracts::{ScTask, SmartContractData};
pub use users::{
    ClientData, InfoListData, UserData, UserDomainData, UserFullData, UserFullDataWrapper,
};
