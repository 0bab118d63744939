//! Storage for locally authored exercise records.
//!
//! The merge engine treats the local log as an external collaborator reached
//! through the [`RecordStore`] trait. This crate defines that capability and
//! ships two backends:
//!
//! - [`InMemoryRecordStore`] -- `Vec`-based store for tests and embedding
//! - [`JsonFileRecordStore`] -- a single JSON document on disk, rewritten
//!   atomically on every mutation
//!
//! # Contract
//!
//! 1. `list_all` reflects every completed `insert` and `delete` (read-your-writes).
//! 2. `insert` replaces a record with the same id in place.
//! 3. `delete` of a missing record is a no-op that returns `false`.
//! 4. All I/O errors are propagated, never retried.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileRecordStore;
pub use memory::InMemoryRecordStore;
pub use traits::RecordStore;
