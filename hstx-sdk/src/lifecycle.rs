//! Proposal lifecycle state machine.
//!
//! Pure transitions over [`LedgerState`]; the store executes each one inside
//! a single critical section, so the duplicate-approval check, the append,
//! and the quorum evaluation happen atomically (a compare-and-append rather
//! than a racy read-then-write).

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use hstx_common::{
    Admin, AdminStatus, Approval, ApprovalStatus, Commit, Proposal, ProposalStatus,
};

/// Rule violations raised by lifecycle transitions. Surfaced to the caller
/// verbatim; never coerced into success.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("approver {approver_id} already approved proposal {proposal_id}")]
    DuplicateApproval {
        approver_id: String,
        proposal_id: String,
    },

    #[error("signature rejected for approver {0}")]
    SignatureRejected(String),

    #[error("proposal {0} has not reached quorum and cannot be committed")]
    NotReadyToCommit(String),

    #[error("proposal {0} is already committed")]
    AlreadyCommitted(String),

    #[error("proposal {proposal_id} is {status}, approvals are only accepted while Pending")]
    ProposalNotPending {
        proposal_id: String,
        status: ProposalStatus,
    },

    #[error("unknown proposal {0}")]
    UnknownProposal(String),

    #[error("unknown admin {0}")]
    UnknownAdmin(String),

    #[error("admin {0} is revoked")]
    AdminRevoked(String),

    #[error("admin {0} is already registered; public keys are immutable")]
    AdminAlreadyRegistered(String),

    #[error("proposal {0} already exists; proposals are never replaced")]
    ProposalAlreadyExists(String),

    #[error("approval {0} already exists; approvals are append-only")]
    ApprovalAlreadyExists(String),

    #[error("unknown approval {0}")]
    UnknownApproval(String),
}

/// The full record set the ledger owns, plus the configured quorum.
///
/// Keys: admins by AdminID, proposals by ProposalID, approvals by
/// ApprovalID, commits by CommitID.
#[derive(Debug)]
pub struct LedgerState {
    quorum_threshold: usize,
    admins: HashMap<String, Admin>,
    proposals: HashMap<String, Proposal>,
    approvals: HashMap<String, Approval>,
    commits: HashMap<String, Commit>,
}

impl LedgerState {
    /// `quorum_threshold` is the count of distinct accepted approvers
    /// required before a proposal may be committed.
    pub fn new(quorum_threshold: usize) -> Self {
        Self {
            quorum_threshold,
            admins: HashMap::new(),
            proposals: HashMap::new(),
            approvals: HashMap::new(),
            commits: HashMap::new(),
        }
    }

    pub fn quorum_threshold(&self) -> usize {
        self.quorum_threshold
    }

    /// Registers a new admin. Re-registration is rejected: the public key
    /// bound at registration never changes.
    pub fn register_admin(&mut self, admin: Admin) -> Result<Admin, LifecycleError> {
        if self.admins.contains_key(&admin.admin_id) {
            return Err(LifecycleError::AdminAlreadyRegistered(admin.admin_id));
        }
        self.admins.insert(admin.admin_id.clone(), admin.clone());
        Ok(admin)
    }

    /// Updates an admin's name and status. The stored public key is kept
    /// regardless of what the update carries.
    pub fn update_admin(
        &mut self,
        admin_id: &str,
        name: String,
        status: AdminStatus,
    ) -> Result<Admin, LifecycleError> {
        let admin = self
            .admins
            .get_mut(admin_id)
            .ok_or_else(|| LifecycleError::UnknownAdmin(admin_id.to_string()))?;
        admin.name = name;
        admin.status = status;
        Ok(admin.clone())
    }

    /// Stores a new proposal. Proposals always enter the ledger in
    /// `Pending` regardless of the status the boundary carried, and an
    /// existing ProposalID is never replaced: a re-create would let a
    /// Committed proposal re-enter the state machine.
    pub fn create_proposal(&mut self, mut proposal: Proposal) -> Result<Proposal, LifecycleError> {
        if self.proposals.contains_key(&proposal.proposal_id) {
            return Err(LifecycleError::ProposalAlreadyExists(proposal.proposal_id));
        }
        proposal.status = ProposalStatus::Pending;
        self.proposals
            .insert(proposal.proposal_id.clone(), proposal.clone());
        Ok(proposal)
    }

    /// Appends an approval if the proposal is still pending, the approver is
    /// active, and this approver has not approved it before. When the count
    /// of distinct accepted approvers reaches the quorum, the proposal flips
    /// to `Approved`.
    ///
    /// Returns the stored approval and the proposal status after the append.
    pub fn append_approval(
        &mut self,
        approval: Approval,
    ) -> Result<(Approval, ProposalStatus), LifecycleError> {
        let proposal_id = approval.proposal_id.clone();

        let status = self
            .proposals
            .get(&proposal_id)
            .ok_or_else(|| LifecycleError::UnknownProposal(proposal_id.clone()))?
            .status;
        if status != ProposalStatus::Pending {
            return Err(LifecycleError::ProposalNotPending {
                proposal_id,
                status,
            });
        }

        let admin = self
            .admins
            .get(&approval.approver_id)
            .ok_or_else(|| LifecycleError::UnknownAdmin(approval.approver_id.clone()))?;
        if admin.status == AdminStatus::Revoked {
            return Err(LifecycleError::AdminRevoked(approval.approver_id.clone()));
        }

        let duplicate = self.approvals.values().any(|a| {
            a.proposal_id == proposal_id && a.approver_id == approval.approver_id
        });
        if duplicate {
            return Err(LifecycleError::DuplicateApproval {
                approver_id: approval.approver_id.clone(),
                proposal_id,
            });
        }

        // Approvals are append-only: an ApprovalID collision must never
        // overwrite another approver's stored evidence.
        if self.approvals.contains_key(&approval.approval_id) {
            return Err(LifecycleError::ApprovalAlreadyExists(
                approval.approval_id.clone(),
            ));
        }

        self.approvals
            .insert(approval.approval_id.clone(), approval.clone());

        let accepted = self.accepted_approver_count(&proposal_id);
        let mut new_status = ProposalStatus::Pending;
        if accepted >= self.quorum_threshold {
            if let Some(proposal) = self.proposals.get_mut(&proposal_id) {
                proposal.status = ProposalStatus::Approved;
                proposal.updated_at = Utc::now();
                new_status = ProposalStatus::Approved;
            }
            info!(
                "proposal {proposal_id} reached quorum ({accepted}/{})",
                self.quorum_threshold
            );
        }

        Ok((approval, new_status))
    }

    /// Explicit status correction for a stored approval; no other field of
    /// an approval is ever mutated.
    pub fn update_approval_status(
        &mut self,
        approval_id: &str,
        status: ApprovalStatus,
    ) -> Result<Approval, LifecycleError> {
        let approval = self
            .approvals
            .get_mut(approval_id)
            .ok_or_else(|| LifecycleError::UnknownApproval(approval_id.to_string()))?;
        approval.status = status;
        Ok(approval.clone())
    }

    /// Commits an approved proposal. `Pending` proposals are not ready;
    /// committing twice is rejected rather than silently succeeding.
    pub fn commit_proposal(&mut self, proposal_id: &str) -> Result<Commit, LifecycleError> {
        let proposal = self
            .proposals
            .get_mut(proposal_id)
            .ok_or_else(|| LifecycleError::UnknownProposal(proposal_id.to_string()))?;

        match proposal.status {
            ProposalStatus::Pending => {
                Err(LifecycleError::NotReadyToCommit(proposal_id.to_string()))
            }
            ProposalStatus::Committed => {
                Err(LifecycleError::AlreadyCommitted(proposal_id.to_string()))
            }
            ProposalStatus::Approved => {
                proposal.status = ProposalStatus::Committed;
                proposal.updated_at = Utc::now();

                let commit = Commit {
                    commit_id: Uuid::new_v4().to_string(),
                    proposal_id: proposal_id.to_string(),
                    committed_at: Utc::now(),
                };
                self.commits.insert(commit.commit_id.clone(), commit.clone());
                info!("proposal {proposal_id} committed as {}", commit.commit_id);
                Ok(commit)
            }
        }
    }

    fn accepted_approver_count(&self, proposal_id: &str) -> usize {
        let mut approvers: Vec<&str> = self
            .approvals
            .values()
            .filter(|a| a.proposal_id == proposal_id && a.status == ApprovalStatus::Accepted)
            .map(|a| a.approver_id.as_str())
            .collect();
        approvers.sort_unstable();
        approvers.dedup();
        approvers.len()
    }

    // Read accessors, backing the query surface.

    pub fn admins(&self) -> Vec<Admin> {
        self.admins.values().cloned().collect()
    }

    pub fn admin(&self, admin_id: &str) -> Option<&Admin> {
        self.admins.get(admin_id)
    }

    pub fn proposals(&self) -> Vec<Proposal> {
        self.proposals.values().cloned().collect()
    }

    pub fn proposal(&self, proposal_id: &str) -> Option<&Proposal> {
        self.proposals.get(proposal_id)
    }

    pub fn approvals(&self) -> Vec<Approval> {
        self.approvals.values().cloned().collect()
    }

    pub fn approval(&self, approval_id: &str) -> Option<&Approval> {
        self.approvals.get(approval_id)
    }

    pub fn commits(&self) -> Vec<Commit> {
        self.commits.values().cloned().collect()
    }

    pub fn commit(&self, commit_id: &str) -> Option<&Commit> {
        self.commits.get(commit_id)
    }

    /// Pending proposals the given approver has not yet approved.
    pub fn pending_proposals_for(&self, approver_id: &str) -> Vec<Proposal> {
        self.proposals
            .values()
            .filter(|p| p.status == ProposalStatus::Pending)
            .filter(|p| {
                !self.approvals.values().any(|a| {
                    a.proposal_id == p.proposal_id && a.approver_id == approver_id
                })
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(id: &str) -> Admin {
        Admin {
            admin_id: id.to_string(),
            name: format!("admin {id}"),
            public_key: "pem".to_string(),
            status: AdminStatus::Active,
        }
    }

    fn proposal(id: &str) -> Proposal {
        Proposal {
            proposal_id: id.to_string(),
            message: "payload".to_string(),
            created_by: "creator".to_string(),
            status: ProposalStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn approval(id: &str, proposal_id: &str, approver_id: &str) -> Approval {
        Approval {
            approval_id: id.to_string(),
            proposal_id: proposal_id.to_string(),
            approver_id: approver_id.to_string(),
            challenge: "challenge".to_string(),
            signature: "c2ln".to_string(),
            message: "YmFzZQ==".to_string(),
            status: ApprovalStatus::Accepted,
            created_at: Utc::now(),
        }
    }

    fn state_with_two_admins() -> LedgerState {
        let mut state = LedgerState::new(2);
        state.register_admin(admin("a1")).unwrap();
        state.register_admin(admin("a2")).unwrap();
        state.create_proposal(proposal("p1")).unwrap();
        state
    }

    #[test]
    fn quorum_of_two_flips_on_second_distinct_approver() {
        let mut state = state_with_two_admins();

        let (_, status) = state.append_approval(approval("ap1", "p1", "a1")).unwrap();
        assert_eq!(status, ProposalStatus::Pending);
        assert_eq!(state.proposal("p1").unwrap().status, ProposalStatus::Pending);

        let (_, status) = state.append_approval(approval("ap2", "p1", "a2")).unwrap();
        assert_eq!(status, ProposalStatus::Approved);
        assert_eq!(state.proposal("p1").unwrap().status, ProposalStatus::Approved);
    }

    #[test]
    fn duplicate_approver_is_rejected() {
        let mut state = state_with_two_admins();
        state.append_approval(approval("ap1", "p1", "a1")).unwrap();

        let err = state
            .append_approval(approval("ap2", "p1", "a1"))
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::DuplicateApproval {
                approver_id: "a1".to_string(),
                proposal_id: "p1".to_string(),
            }
        );
        // The rejected approval was not stored.
        assert_eq!(state.approvals().len(), 1);
    }

    #[test]
    fn rejected_approvals_do_not_count_toward_quorum() {
        let mut state = state_with_two_admins();

        let mut rejected = approval("ap1", "p1", "a1");
        rejected.status = ApprovalStatus::Rejected;
        state.append_approval(rejected).unwrap();

        let (_, status) = state.append_approval(approval("ap2", "p1", "a2")).unwrap();
        assert_eq!(status, ProposalStatus::Pending);
    }

    #[test]
    fn commit_requires_approved() {
        let mut state = state_with_two_admins();

        assert_eq!(
            state.commit_proposal("p1").unwrap_err(),
            LifecycleError::NotReadyToCommit("p1".to_string())
        );

        state.append_approval(approval("ap1", "p1", "a1")).unwrap();
        state.append_approval(approval("ap2", "p1", "a2")).unwrap();

        let commit = state.commit_proposal("p1").unwrap();
        assert_eq!(commit.proposal_id, "p1");
        assert_eq!(
            state.proposal("p1").unwrap().status,
            ProposalStatus::Committed
        );

        assert_eq!(
            state.commit_proposal("p1").unwrap_err(),
            LifecycleError::AlreadyCommitted("p1".to_string())
        );
        assert_eq!(state.commits().len(), 1);
    }

    #[test]
    fn approvals_stop_once_proposal_leaves_pending() {
        let mut state = LedgerState::new(1);
        state.register_admin(admin("a1")).unwrap();
        state.register_admin(admin("a2")).unwrap();
        state.create_proposal(proposal("p1")).unwrap();

        state.append_approval(approval("ap1", "p1", "a1")).unwrap();
        let err = state
            .append_approval(approval("ap2", "p1", "a2"))
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::ProposalNotPending {
                proposal_id: "p1".to_string(),
                status: ProposalStatus::Approved,
            }
        );
    }

    #[test]
    fn revoked_admin_cannot_approve_but_past_approvals_stand() {
        let mut state = state_with_two_admins();
        state.append_approval(approval("ap1", "p1", "a1")).unwrap();

        state
            .update_admin("a1", "admin a1".to_string(), AdminStatus::Revoked)
            .unwrap();

        // Existing approval remains recorded evidence.
        assert_eq!(state.approvals().len(), 1);

        state.create_proposal(proposal("p2")).unwrap();
        assert_eq!(
            state.append_approval(approval("ap3", "p2", "a1")).unwrap_err(),
            LifecycleError::AdminRevoked("a1".to_string())
        );

        // Quorum on p1 still counts a1's earlier approval.
        let (_, status) = state.append_approval(approval("ap2", "p1", "a2")).unwrap();
        assert_eq!(status, ProposalStatus::Approved);
    }

    #[test]
    fn committed_proposal_cannot_be_recreated() {
        let mut state = state_with_two_admins();
        state.append_approval(approval("ap1", "p1", "a1")).unwrap();
        state.append_approval(approval("ap2", "p1", "a2")).unwrap();
        state.commit_proposal("p1").unwrap();

        // Re-creating the same ProposalID must not reset it to Pending.
        let err = state.create_proposal(proposal("p1")).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::ProposalAlreadyExists("p1".to_string())
        );
        assert_eq!(
            state.proposal("p1").unwrap().status,
            ProposalStatus::Committed
        );
        assert_eq!(
            state.commit_proposal("p1").unwrap_err(),
            LifecycleError::AlreadyCommitted("p1".to_string())
        );
    }

    #[test]
    fn proposals_always_enter_pending() {
        let mut state = LedgerState::new(1);
        let mut crafted = proposal("p1");
        crafted.status = ProposalStatus::Approved;

        let stored = state.create_proposal(crafted).unwrap();
        assert_eq!(stored.status, ProposalStatus::Pending);
        assert_eq!(
            state.commit_proposal("p1").unwrap_err(),
            LifecycleError::NotReadyToCommit("p1".to_string())
        );
    }

    #[test]
    fn approval_id_collision_never_overwrites_evidence() {
        let mut state = state_with_two_admins();
        state.append_approval(approval("ap1", "p1", "a1")).unwrap();

        // Same ApprovalID, different approver: passes the per-approver
        // duplicate check but must not replace a1's stored approval.
        let err = state
            .append_approval(approval("ap1", "p1", "a2"))
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::ApprovalAlreadyExists("ap1".to_string())
        );
        assert_eq!(state.approval("ap1").unwrap().approver_id, "a1");
        assert_eq!(state.approvals().len(), 1);
    }

    #[test]
    fn re_registration_is_rejected() {
        let mut state = LedgerState::new(1);
        state.register_admin(admin("a1")).unwrap();
        assert_eq!(
            state.register_admin(admin("a1")).unwrap_err(),
            LifecycleError::AdminAlreadyRegistered("a1".to_string())
        );
    }

    #[test]
    fn update_admin_never_touches_the_key() {
        let mut state = LedgerState::new(1);
        state.register_admin(admin("a1")).unwrap();

        let updated = state
            .update_admin("a1", "renamed".to_string(), AdminStatus::Revoked)
            .unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.status, AdminStatus::Revoked);
        assert_eq!(updated.public_key, "pem");
    }

    #[test]
    fn pending_proposals_for_skips_already_approved() {
        let mut state = state_with_two_admins();
        state.create_proposal(proposal("p2")).unwrap();
        state.append_approval(approval("ap1", "p1", "a1")).unwrap();

        let pending = state.pending_proposals_for("a1");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].proposal_id, "p2");

        assert_eq!(state.pending_proposals_for("a2").len(), 2);
    }
}
