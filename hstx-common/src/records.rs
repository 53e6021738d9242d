use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{AdminStatus, ApprovalStatus, ProposalStatus};

/// An administrator authorized to approve proposals.
///
/// The identifier is derived from the key handle issued by the admin's
/// hardware token at registration (web-safe base64). The public key is the
/// SPKI PEM encoding of the token's P-256 point and is immutable once
/// registered; only name and status may change later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "AdminID")]
    pub admin_id: String,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "PublicKey")]
    pub public_key: String,

    #[serde(rename = "Status")]
    pub status: AdminStatus,
}

/// A proposal awaiting multi-party approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(rename = "ProposalID")]
    pub proposal_id: String,

    /// Opaque payload; the workflow never interprets it.
    #[serde(rename = "Message")]
    pub message: String,

    #[serde(rename = "CreatedBy")]
    pub created_by: String,

    #[serde(rename = "Status")]
    pub status: ProposalStatus,

    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A single admin's signed approval of a proposal.
///
/// `signature` is standard base64 of the raw DER signature bytes from the
/// token; `message` is standard base64 of the signature base the token
/// actually signed. At most one approval may exist per (proposal, approver)
/// pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    #[serde(rename = "ApprovalID")]
    pub approval_id: String,

    #[serde(rename = "ProposalID")]
    pub proposal_id: String,

    #[serde(rename = "ApproverID")]
    pub approver_id: String,

    #[serde(rename = "Challenge")]
    pub challenge: String,

    #[serde(rename = "Signature")]
    pub signature: String,

    #[serde(rename = "Message")]
    pub message: String,

    #[serde(rename = "Status")]
    pub status: ApprovalStatus,

    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
}

/// The terminal record marking a proposal as committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(rename = "CommitID")]
    pub commit_id: String,

    #[serde(rename = "ProposalID")]
    pub proposal_id: String,

    #[serde(rename = "CommittedAt")]
    pub committed_at: DateTime<Utc>,
}

impl Proposal {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Approval {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_uses_stable_field_names() {
        let admin = Admin {
            admin_id: "kh-1".into(),
            name: "alice".into(),
            public_key: "-----BEGIN PUBLIC KEY-----".into(),
            status: AdminStatus::Active,
        };

        let json: serde_json::Value = serde_json::to_value(&admin).unwrap();
        assert_eq!(json["AdminID"], "kh-1");
        assert_eq!(json["Name"], "alice");
        assert_eq!(json["Status"], "Active");
        assert!(json.get("admin_id").is_none());
    }

    #[test]
    fn approval_round_trips_through_json() {
        let approval = Approval {
            approval_id: "a-1".into(),
            proposal_id: "p-1".into(),
            approver_id: "kh-1".into(),
            challenge: "challenge".into(),
            signature: "c2ln".into(),
            message: "YmFzZQ==".into(),
            status: ApprovalStatus::Accepted,
            created_at: Utc::now(),
        };

        let json = approval.to_json().unwrap();
        assert!(json.contains("\"ApproverID\""));
        let back = Approval::from_json(&json).unwrap();
        assert_eq!(back, approval);
    }
}
