//! HSTX SDK: multi-party approval of sensitive proposals, gated by
//! hardware-token authentication of a fixed admin set.
//!
//! A proposal starts `Pending`, accumulates signed approvals from distinct
//! admins, flips to `Approved` once the configured quorum of accepted
//! approvals is reached, and becomes `Committed` (terminal) on an explicit
//! commit. Admins are registered from U2F token registration data and
//! identified by their key handle.
//!
//! The ledger that stores the records is an external collaborator behind
//! the [`store::LedgerStore`] trait; [`store::memory::MemoryLedger`] is the
//! in-process implementation used in tests and single-node deployments.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod service;
pub mod store;

pub use config::HstxConfig;
pub use error::HstxError;
pub use lifecycle::{LedgerState, LifecycleError};
pub use service::{check_secret_key, ApprovalOutcome, ApprovalRequest, Hstx};
pub use store::{memory::MemoryLedger, LedgerStore, StoreError};
