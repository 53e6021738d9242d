//! Shared record types for the HSTX approval workflow.
//!
//! Every record persisted through the ledger boundary lives here, with the
//! field names pinned to the shapes the chaincode stores and queries.

pub mod records;
pub mod status;

pub use records::{Admin, Approval, Commit, Proposal};
pub use status::{AdminStatus, ApprovalStatus, ProposalStatus};
