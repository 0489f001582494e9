use thiserror::Error;

/// Errors that can occur while talking to the external media host.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The host refused the upload (bad payload, quota, policy).
    #[error("media host rejected the upload: {0}")]
    Rejected(String),

    /// Network or backend failure while reaching the host.
    #[error("media host unreachable: {0}")]
    Transport(String),

    /// A stored key does not parse as a valid storage key.
    #[error("invalid media key: {0}")]
    InvalidKey(String),
}
