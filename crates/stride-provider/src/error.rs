use thiserror::Error;

/// Errors from external provider reads.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The user has not granted read access to the provider.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The provider is temporarily unreachable.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Transient I/O failure while reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The provider returned data that cannot be decoded.
    #[error("malformed provider data: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other failure the caller must not paper over.
    #[error("provider failure: {0}")]
    Fatal(String),
}

impl ProviderError {
    /// Returns `true` for failures a merge may absorb as "no external data".
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_) | Self::Unavailable(_) | Self::Io(_)
        )
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
