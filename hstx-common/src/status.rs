use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a proposal. Transitions are monotonic:
/// `Pending -> Approved -> Committed`, with `Committed` terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Pending,
    Approved,
    Committed,
}

/// Registration state of an approver. Admins are never deleted, only revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminStatus {
    Active,
    Revoked,
}

/// Outcome recorded on an approval. Only `Accepted` approvals count toward
/// the quorum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Accepted,
    Rejected,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalStatus::Pending => write!(f, "Pending"),
            ProposalStatus::Approved => write!(f, "Approved"),
            ProposalStatus::Committed => write!(f, "Committed"),
        }
    }
}

impl fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminStatus::Active => write!(f, "Active"),
            AdminStatus::Revoked => write!(f, "Revoked"),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Accepted => write!(f, "Accepted"),
            ApprovalStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_serialize_as_variant_names() {
        assert_eq!(
            serde_json::to_string(&ProposalStatus::Pending).unwrap(),
            "\"Pending\""
        );
        assert_eq!(
            serde_json::to_string(&AdminStatus::Revoked).unwrap(),
            "\"Revoked\""
        );
        assert_eq!(
            serde_json::to_string(&ApprovalStatus::Accepted).unwrap(),
            "\"Accepted\""
        );
    }
}
