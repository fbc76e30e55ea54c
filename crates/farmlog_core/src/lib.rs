//! Core journal logic for the farm advisory dashboards.
//! This crate is the single source of truth for journal invariants.

pub mod aggregate;
pub mod config;
pub mod export;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use aggregate::{JournalSummary, MonthlyTotal, Period};
pub use config::{ConfigError, JournalConfig, JournalKind};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::record::{NewRecord, Record, RecordId, RecordValidationError};
pub use service::journal_service::{
    EditOutcome, EntryQuery, EntryUpdate, JournalResult, JournalService, JournalServiceError,
};
pub use store::{
    JsonFileStore, JsonFormat, LoadReport, LoadWarning, RecordStore, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
