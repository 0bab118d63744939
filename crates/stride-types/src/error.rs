use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("record id must not be empty")]
    EmptyId,

    #[error("invalid time window: start {start} is after end {end}")]
    InvalidWindow { start: i64, end: i64 },
}
