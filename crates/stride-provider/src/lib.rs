//! Read-only sources of externally imported exercise sessions.
//!
//! An [`ExternalProvider`] returns the sessions it knows about for a trailing
//! time window. Providers fail in two distinct ways: a *recoverable* failure
//! (permission denied, transient I/O) that callers may treat as "no data
//! right now", and a *fatal* failure that must be surfaced. See
//! [`ProviderError::is_recoverable`].
//!
//! [`ExternalBatch`] keeps "empty because there is nothing" apart from
//! "empty because the source was unavailable" so callers can report
//! availability without changing how they merge.

pub mod batch;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use batch::{Availability, ExternalBatch};
pub use error::{ProviderError, ProviderResult};
pub use file::{ImportedSession, JsonFileProvider};
pub use memory::{FailureMode, StaticProvider};
pub use traits::ExternalProvider;
