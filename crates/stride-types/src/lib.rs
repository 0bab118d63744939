//! Foundation types for Stride.
//!
//! This crate provides the record, provenance, and temporal types shared by
//! every other Stride crate. Records from the local log and from an external
//! provider use the same [`ExerciseRecord`] shape and differ only by
//! [`Origin`].
//!
//! # Key Types
//!
//! - [`RecordId`] — Opaque record identifier (UUID v7 for local records)
//! - [`Origin`] — Provenance tag: `LOCAL` or `EXTERNAL`
//! - [`ExerciseRecord`] — One logged activity session
//! - [`NewRecord`] — Caller payload for authoring a local record
//! - [`TimeWindow`] — Inclusive millisecond range used for provider reads
//! - [`Clock`] — Source of the current instant

pub mod activity;
pub mod error;
pub mod record;
pub mod temporal;

pub use activity::{activity_code, activity_name, supported_activities, UNKNOWN_ACTIVITY};
pub use error::TypeError;
pub use record::{normalize_activity, ExerciseRecord, NewRecord, Origin, RecordId};
pub use temporal::{Clock, FixedClock, SystemClock, TimeWindow};
