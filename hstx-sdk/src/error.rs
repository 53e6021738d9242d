use thiserror::Error;

use crate::lifecycle::LifecycleError;
use crate::store::StoreError;
use hstx_u2f::DecodeError;

/// Top-level error for the service facade.
#[derive(Debug, Error)]
pub enum HstxError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("record codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("secret key is invalid")]
    Unauthorized,
}

impl HstxError {
    /// The lifecycle rule violation behind this error, if any; rule errors
    /// may arrive directly or wrapped in a store failure.
    pub fn lifecycle(&self) -> Option<&LifecycleError> {
        match self {
            HstxError::Lifecycle(e) => Some(e),
            HstxError::Store(StoreError::Lifecycle(e)) => Some(e),
            _ => None,
        }
    }
}
