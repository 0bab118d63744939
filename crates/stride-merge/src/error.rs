use stride_provider::ProviderError;
use stride_store::StoreError;
use thiserror::Error;

use crate::resolution::Removal;

/// Errors produced by merge engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    #[error("external provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("resolution did not reach a fixed point within {passes} passes")]
    PassLimitExceeded { passes: usize },

    #[error("conflict memory lock poisoned")]
    LockPoisoned,
}

pub type EngineResult<T> = Result<T, EngineError>;

/// A failed resolution.
///
/// Removals applied before the failure stay applied; `applied` lists them.
/// Callers should take a fresh merged view to see the current state.
#[derive(Debug, Error)]
#[error("resolution failed after {} removal(s)", .applied.len())]
pub struct ResolveError {
    pub applied: Vec<Removal>,
    #[source]
    pub cause: EngineError,
}
