//! Journal domain model.
//!
//! # Responsibility
//! - Define the canonical record shared by the activity, growth and waste
//!   journals.
//! - Keep validation next to the data it protects.
//!
//! # Invariants
//! - Every persisted record carries a non-blank `RecordId`.
//! - Deletion is permanent; there are no tombstones.

pub mod record;
