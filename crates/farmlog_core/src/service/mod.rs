//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into journal-level use cases.
//! - Keep CLI and presentation layers decoupled from file mechanics.

pub mod journal_service;
