//! In-memory ledger store.
//!
//! Holds the whole record set behind one async mutex; every `invoke` takes
//! the lock once and applies a single lifecycle transition inside it, which
//! is what makes the duplicate-approval check and the quorum evaluation
//! atomic under concurrent submissions.

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

use hstx_common::{Admin, Approval, Proposal};

use crate::lifecycle::LedgerState;
use crate::store::{functions, LedgerStore, StoreError};

pub struct MemoryLedger {
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new(quorum_threshold: usize) -> Self {
        Self {
            state: Mutex::new(LedgerState::new(quorum_threshold)),
        }
    }
}

fn one_arg<'a>(function: &str, args: &'a [String]) -> Result<&'a str, StoreError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(StoreError::BadArguments {
            function: function.to_string(),
            expected: "exactly one argument",
        }),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn invoke(&self, function: &str, args: &[String]) -> Result<String, StoreError> {
        debug!("memory ledger invoke: {function}");
        let mut state = self.state.lock().await;

        match function {
            functions::CREATE_ADMIN => {
                let admin: Admin = serde_json::from_str(one_arg(function, args)?)?;
                let stored = state.register_admin(admin)?;
                to_json(&stored)
            }
            functions::UPDATE_ADMIN => {
                let admin: Admin = serde_json::from_str(one_arg(function, args)?)?;
                let stored = state.update_admin(&admin.admin_id, admin.name, admin.status)?;
                to_json(&stored)
            }
            functions::CREATE_PROPOSAL => {
                let proposal: Proposal = serde_json::from_str(one_arg(function, args)?)?;
                let stored = state.create_proposal(proposal)?;
                to_json(&stored)
            }
            functions::CREATE_APPROVAL => {
                let approval: Approval = serde_json::from_str(one_arg(function, args)?)?;
                let (stored, proposal_status) = state.append_approval(approval)?;
                Ok(json!({
                    "Approval": stored,
                    "ProposalStatus": proposal_status,
                })
                .to_string())
            }
            functions::UPDATE_APPROVAL => {
                let approval: Approval = serde_json::from_str(one_arg(function, args)?)?;
                let stored =
                    state.update_approval_status(&approval.approval_id, approval.status)?;
                to_json(&stored)
            }
            functions::CREATE_COMMIT => {
                let proposal_id = one_arg(function, args)?;
                let commit = state.commit_proposal(proposal_id)?;
                to_json(&commit)
            }
            _ => Err(StoreError::UnknownFunction(function.to_string())),
        }
    }

    async fn query(&self, function: &str, args: &[String]) -> Result<String, StoreError> {
        debug!("memory ledger query: {function}");
        let state = self.state.lock().await;

        match function {
            functions::GET_ALL_ADMIN => to_json(&state.admins()),
            functions::GET_ALL_PROPOSAL => to_json(&state.proposals()),
            functions::GET_ALL_APPROVAL => to_json(&state.approvals()),
            functions::GET_ALL_COMMIT => to_json(&state.commits()),
            functions::GET_ADMIN_BY_ID => {
                let id = one_arg(function, args)?;
                let admin = state
                    .admin(id)
                    .ok_or_else(|| StoreError::NotFound(format!("admin {id}")))?;
                to_json(admin)
            }
            functions::GET_PROPOSAL_BY_ID => {
                let id = one_arg(function, args)?;
                let proposal = state
                    .proposal(id)
                    .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))?;
                to_json(proposal)
            }
            functions::GET_APPROVAL_BY_ID => {
                let id = one_arg(function, args)?;
                let approval = state
                    .approval(id)
                    .ok_or_else(|| StoreError::NotFound(format!("approval {id}")))?;
                to_json(approval)
            }
            functions::GET_COMMIT_BY_ID => {
                let id = one_arg(function, args)?;
                let commit = state
                    .commit(id)
                    .ok_or_else(|| StoreError::NotFound(format!("commit {id}")))?;
                to_json(commit)
            }
            functions::GET_PENDING_PROPOSAL_BY_ADMIN_ID => {
                let id = one_arg(function, args)?;
                to_json(&state.pending_proposals_for(id))
            }
            _ => Err(StoreError::UnknownFunction(function.to_string())),
        }
    }
}
