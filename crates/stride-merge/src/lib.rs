//! Merge engine for Stride.
//!
//! Reconciles the local exercise log with sessions imported from an external
//! provider into one timeline, reports same-activity sessions that overlap in
//! time as conflicts, and resolves a conflict by keeping one session and
//! removing every other session that overlaps it.
//!
//! # Components
//!
//! - [`detect_conflicts`] — pure pairwise conflict rule
//! - [`ConflictMemory`] — suppressed external ids and settled pairs
//! - [`MergeEngine`] — merged view, local authoring, and resolution
//!
//! # Conflict rule
//!
//! Two records conflict when their activity labels match after trimming and
//! case-folding, their time ranges overlap as open intervals, and at least
//! one of them is `LOCAL`. Two `EXTERNAL` records never conflict.
//!
//! # Resolution
//!
//! [`MergeEngine::resolve`] deletes (local) or suppresses (external) every
//! record overlapping the kept one, re-reading both sources after each pass
//! until a pass finds nothing left to remove. Each removal is recorded in
//! conflict memory so the settled pair never resurfaces.

pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod memory;
pub mod resolution;
pub mod view;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use detector::{detect_conflicts, is_conflict, ConflictPair};
pub use engine::MergeEngine;
pub use error::{EngineError, EngineResult, ResolveError};
pub use memory::{ConflictMemory, MemorySnapshot};
pub use resolution::{Removal, RemovalAction, ResolutionReport};
pub use view::{MergedView, TimelineEntry};
