//! The HSTX service facade.
//!
//! One struct, [`Hstx`], exposes the whole operation surface the routing
//! layer consumes: admin registration from raw token registration data,
//! proposal creation, approval recording (with and without signature
//! verification), commits, and the read accessors. Every store call is
//! bounded by the configured timeout.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use serde::Deserialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use hstx_common::{
    Admin, AdminStatus, Approval, ApprovalStatus, Commit, Proposal, ProposalStatus,
};
use hstx_u2f::{
    from_websafe_base64, verify_signature_pem, AuthenticationResponse, DecodeError,
    RegistrationResponse,
};

use crate::config::HstxConfig;
use crate::error::HstxError;
use crate::store::{functions, LedgerStore, StoreError};

/// Inputs for recording an approval, as received from the routing layer.
/// `client_data` and `signature_data` are base64 (web-safe or standard).
#[derive(Debug, Clone)]
pub struct ApprovalRequest {
    pub proposal_id: String,
    pub challenge: String,
    pub approver_id: String,
    pub client_data: String,
    pub signature_data: String,
    pub app_id: String,
    pub status: ApprovalStatus,
}

/// Outcome of a conditional approval append: the stored record and the
/// proposal status after quorum evaluation.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalOutcome {
    #[serde(rename = "Approval")]
    pub approval: Approval,
    #[serde(rename = "ProposalStatus")]
    pub proposal_status: ProposalStatus,
}

pub struct Hstx {
    store: Arc<dyn LedgerStore>,
    config: HstxConfig,
}

impl Hstx {
    pub fn new(store: Arc<dyn LedgerStore>, config: HstxConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &HstxConfig {
        &self.config
    }

    async fn invoke(&self, function: &str, args: Vec<String>) -> Result<String, StoreError> {
        info!(
            "invoke {function} on {}@{} as {}.{}",
            self.config.chaincode_name,
            self.config.channel_name,
            self.config.org_name,
            self.config.user_name,
        );
        timeout(self.config.store_timeout, self.store.invoke(function, &args))
            .await
            .map_err(|_| StoreError::Timeout(self.config.store_timeout))?
    }

    async fn query(&self, function: &str, args: Vec<String>) -> Result<String, StoreError> {
        debug!(
            "query {function} on {}@{}",
            self.config.chaincode_name, self.config.channel_name,
        );
        timeout(self.config.store_timeout, self.store.query(function, &args))
            .await
            .map_err(|_| StoreError::Timeout(self.config.store_timeout))?
    }

    /// Registers an approver admin from a raw U2F registration response.
    ///
    /// The admin identifier is derived from the token's key handle; nothing
    /// is persisted if the registration data fails to decode.
    pub async fn register_admin(
        &self,
        name: &str,
        registration_data: &str,
    ) -> Result<Admin, HstxError> {
        let raw = from_websafe_base64(registration_data)?;
        let registration = RegistrationResponse::decode(&raw)?;

        let admin = Admin {
            admin_id: registration.approver_id.clone(),
            name: name.to_string(),
            public_key: registration.public_key_pem()?,
            status: AdminStatus::Active,
        };

        let payload = self
            .invoke(functions::CREATE_ADMIN, vec![serde_json::to_string(&admin)?])
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// Updates an admin's name and status. The registered public key is
    /// immutable and ignored by the store even if supplied.
    pub async fn update_admin(
        &self,
        admin_id: &str,
        name: &str,
        status: AdminStatus,
    ) -> Result<Admin, HstxError> {
        let admin = Admin {
            admin_id: admin_id.to_string(),
            name: name.to_string(),
            public_key: String::new(),
            status,
        };
        let payload = self
            .invoke(functions::UPDATE_ADMIN, vec![serde_json::to_string(&admin)?])
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }

    pub async fn create_proposal(
        &self,
        message: &str,
        created_by: &str,
    ) -> Result<Proposal, HstxError> {
        let now = Utc::now();
        let proposal = Proposal {
            proposal_id: Uuid::new_v4().to_string(),
            message: message.to_string(),
            created_by: created_by.to_string(),
            status: ProposalStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let payload = self
            .invoke(
                functions::CREATE_PROPOSAL,
                vec![serde_json::to_string(&proposal)?],
            )
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// Decodes the authentication data and stores the approval as-is.
    ///
    /// This is the pass-through boundary operation: it computes the
    /// signature base but performs no verification. Use
    /// [`record_approval`](Self::record_approval) for the verified path or
    /// [`verify_approval`](Self::verify_approval) to check a stored record.
    pub async fn create_approval(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalOutcome, HstxError> {
        let auth = self.decode_authentication(request)?;
        let approval = build_approval(request, &auth, request.status);
        self.append_approval(approval).await
    }

    /// The verified approval path: decodes the authentication data, checks
    /// the signature against the approver's registered key, and only then
    /// performs the conditional append. The store enforces the
    /// one-approval-per-approver rule atomically.
    pub async fn record_approval(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalOutcome, HstxError> {
        let auth = self.decode_authentication(request)?;

        let admin = self.get_admin_by_id(&request.approver_id).await?;
        let verified =
            verify_signature_pem(&auth.signature_base, &auth.signature, &admin.public_key)?;
        if !verified {
            warn!(
                "signature rejected for approver {} on proposal {}",
                request.approver_id, request.proposal_id
            );
            return Err(crate::lifecycle::LifecycleError::SignatureRejected(
                request.approver_id.clone(),
            )
            .into());
        }

        let approval = build_approval(request, &auth, ApprovalStatus::Accepted);
        self.append_approval(approval).await
    }

    /// Re-verifies a stored approval against its approver's registered key.
    pub async fn verify_approval(&self, approval: &Approval) -> Result<bool, HstxError> {
        let admin = self.get_admin_by_id(&approval.approver_id).await?;
        let signature = decode_standard_base64(&approval.signature)?;
        let signature_base = decode_standard_base64(&approval.message)?;
        Ok(verify_signature_pem(
            &signature_base,
            &signature,
            &admin.public_key,
        )?)
    }

    /// Explicit status correction for a stored approval.
    pub async fn update_approval(
        &self,
        approval_id: &str,
        status: ApprovalStatus,
    ) -> Result<Approval, HstxError> {
        let current = self.get_approval_by_id(approval_id).await?;
        let corrected = Approval { status, ..current };
        let payload = self
            .invoke(
                functions::UPDATE_APPROVAL,
                vec![serde_json::to_string(&corrected)?],
            )
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// Commits an approved proposal. Terminal: further approvals and
    /// repeated commits are rejected.
    pub async fn create_commit(&self, proposal_id: &str) -> Result<Commit, HstxError> {
        let payload = self
            .invoke(functions::CREATE_COMMIT, vec![proposal_id.to_string()])
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }

    pub async fn get_all_admins(&self) -> Result<Vec<Admin>, HstxError> {
        let payload = self.query(functions::GET_ALL_ADMIN, vec![]).await?;
        Ok(serde_json::from_str(&payload)?)
    }

    pub async fn get_all_proposals(&self) -> Result<Vec<Proposal>, HstxError> {
        let payload = self.query(functions::GET_ALL_PROPOSAL, vec![]).await?;
        Ok(serde_json::from_str(&payload)?)
    }

    pub async fn get_all_approvals(&self) -> Result<Vec<Approval>, HstxError> {
        let payload = self.query(functions::GET_ALL_APPROVAL, vec![]).await?;
        Ok(serde_json::from_str(&payload)?)
    }

    pub async fn get_all_commits(&self) -> Result<Vec<Commit>, HstxError> {
        let payload = self.query(functions::GET_ALL_COMMIT, vec![]).await?;
        Ok(serde_json::from_str(&payload)?)
    }

    pub async fn get_admin_by_id(&self, admin_id: &str) -> Result<Admin, HstxError> {
        let payload = self
            .query(functions::GET_ADMIN_BY_ID, vec![admin_id.to_string()])
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }

    pub async fn get_proposal_by_id(&self, proposal_id: &str) -> Result<Proposal, HstxError> {
        let payload = self
            .query(functions::GET_PROPOSAL_BY_ID, vec![proposal_id.to_string()])
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }

    pub async fn get_approval_by_id(&self, approval_id: &str) -> Result<Approval, HstxError> {
        let payload = self
            .query(functions::GET_APPROVAL_BY_ID, vec![approval_id.to_string()])
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }

    pub async fn get_commit_by_id(&self, commit_id: &str) -> Result<Commit, HstxError> {
        let payload = self
            .query(functions::GET_COMMIT_BY_ID, vec![commit_id.to_string()])
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// Pending proposals the given approver has not yet approved.
    pub async fn get_pending_proposals_by_admin(
        &self,
        admin_id: &str,
    ) -> Result<Vec<Proposal>, HstxError> {
        let payload = self
            .query(
                functions::GET_PENDING_PROPOSAL_BY_ADMIN_ID,
                vec![admin_id.to_string()],
            )
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }

    fn decode_authentication(
        &self,
        request: &ApprovalRequest,
    ) -> Result<AuthenticationResponse, HstxError> {
        let client_data = from_websafe_base64(&request.client_data)?;
        let signature_data = from_websafe_base64(&request.signature_data)?;
        Ok(AuthenticationResponse::decode(
            &signature_data,
            &request.app_id,
            &client_data,
        )?)
    }

    async fn append_approval(&self, approval: Approval) -> Result<ApprovalOutcome, HstxError> {
        let payload = self
            .invoke(
                functions::CREATE_APPROVAL,
                vec![serde_json::to_string(&approval)?],
            )
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }
}

fn build_approval(
    request: &ApprovalRequest,
    auth: &AuthenticationResponse,
    status: ApprovalStatus,
) -> Approval {
    Approval {
        approval_id: Uuid::new_v4().to_string(),
        proposal_id: request.proposal_id.clone(),
        approver_id: request.approver_id.clone(),
        challenge: request.challenge.clone(),
        signature: STANDARD.encode(&auth.signature),
        message: STANDARD.encode(&auth.signature_base),
        status,
        created_at: Utc::now(),
    }
}

fn decode_standard_base64(input: &str) -> Result<Vec<u8>, HstxError> {
    STANDARD
        .decode(input)
        .map_err(|_| DecodeError::MalformedBase64.into())
}

/// Shared-secret check for the routing boundary. The core never sees the
/// transport; callers pass the presented header value.
pub fn check_secret_key(presented: Option<&str>, expected: &str) -> Result<(), HstxError> {
    match presented {
        Some(value) if value == expected => Ok(()),
        _ => {
            warn!("secret key is invalid");
            Err(HstxError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_key_guard() {
        assert!(check_secret_key(Some("s3cret"), "s3cret").is_ok());
        assert!(matches!(
            check_secret_key(Some("wrong"), "s3cret"),
            Err(HstxError::Unauthorized)
        ));
        assert!(matches!(
            check_secret_key(None, "s3cret"),
            Err(HstxError::Unauthorized)
        ));
    }
}
