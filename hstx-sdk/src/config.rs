use std::time::Duration;

/// Connection and timeout settings for the service facade.
///
/// An immutable value passed at construction and cloned freely across
/// tasks; nothing here is process-global or mutable after startup. The
/// connection fields identify the peer set, channel, chaincode, organization
/// and user a network-backed store would target, and are attached to every
/// boundary log line.
#[derive(Debug, Clone)]
pub struct HstxConfig {
    pub peer_names: Vec<String>,
    pub channel_name: String,
    pub chaincode_name: String,
    pub org_name: String,
    pub user_name: String,

    /// Upper bound on any single store call; elapsing surfaces as
    /// `StoreError::Timeout`, never a silent retry.
    pub store_timeout: Duration,
}

impl HstxConfig {
    pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(
        channel_name: impl Into<String>,
        chaincode_name: impl Into<String>,
        org_name: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            peer_names: Vec::new(),
            channel_name: channel_name.into(),
            chaincode_name: chaincode_name.into(),
            org_name: org_name.into(),
            user_name: user_name.into(),
            store_timeout: Self::DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_peers(mut self, peer_names: Vec<String>) -> Self {
        self.peer_names = peer_names;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}
