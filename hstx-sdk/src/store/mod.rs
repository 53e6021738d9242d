//! The ledger store boundary.
//!
//! The ledger is an external collaborator reached through two operations,
//! `invoke` (durable write) and `query` (read-only lookup), both keyed by a
//! chaincode function name and a list of string arguments carrying JSON
//! records. [`MemoryLedger`](memory::MemoryLedger) is the in-process
//! implementation; a network-backed client implements the same trait.

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::lifecycle::LifecycleError;

/// Chaincode function names, shared between the service facade and every
/// store implementation.
pub mod functions {
    pub const CREATE_ADMIN: &str = "CreateAdmin";
    pub const UPDATE_ADMIN: &str = "UpdateAdmin";
    pub const CREATE_PROPOSAL: &str = "CreateProposal";
    pub const CREATE_APPROVAL: &str = "CreateApproval";
    pub const UPDATE_APPROVAL: &str = "UpdateApproval";
    pub const CREATE_COMMIT: &str = "CreateCommit";

    pub const GET_ALL_ADMIN: &str = "GetAllAdmin";
    pub const GET_ALL_PROPOSAL: &str = "GetAllProposal";
    pub const GET_ALL_APPROVAL: &str = "GetAllApproval";
    pub const GET_ALL_COMMIT: &str = "GetAllCommit";

    pub const GET_ADMIN_BY_ID: &str = "GetAdminByID";
    pub const GET_PROPOSAL_BY_ID: &str = "GetProposalByID";
    pub const GET_APPROVAL_BY_ID: &str = "GetApprovalByID";
    pub const GET_COMMIT_BY_ID: &str = "GetCommitByID";
    pub const GET_PENDING_PROPOSAL_BY_ADMIN_ID: &str = "GetPendingProposalByAdminID";
}

/// Failures at the store boundary.
///
/// Lifecycle rule violations travel through the store because the store is
/// where they are enforced atomically; they are passed to the caller
/// verbatim.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("unknown chaincode function: {0}")]
    UnknownFunction(String),

    #[error("bad arguments for {function}: expected {expected}")]
    BadArguments {
        function: String,
        expected: &'static str,
    },

    #[error("record codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// The two-operation ledger interface. Each call is a single atomic,
/// serializable operation against the store; resilience (retries, backoff)
/// belongs to the implementation, never to this core.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Durable write. Returns the resulting record as a JSON string.
    async fn invoke(&self, function: &str, args: &[String]) -> Result<String, StoreError>;

    /// Read-only lookup. Returns the record or record list as a JSON string.
    async fn query(&self, function: &str, args: &[String]) -> Result<String, StoreError>;
}
