//! Journal configuration.
//!
//! # Responsibility
//! - Resolve where journal files live and how logging is set up.
//! - Map each journal kind to its own backing file.
//!
//! # Invariants
//! - Configuration is an explicit value; no global path state.
//! - Blank environment values are errors, not silent defaults.

use crate::logging::default_log_level;
use crate::store::{JsonFileStore, JsonFormat};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const DATA_DIR_ENV: &str = "FARMLOG_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "FARMLOG_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "FARMLOG_LOG_DIR";
const DEFAULT_DATA_DIR: &str = "farmlog-data";

/// Configuration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but empty after trimming.
    EmptyValue(&'static str),
    UnknownJournal(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue(name) => write!(f, "`{name}` is set but empty"),
            Self::UnknownJournal(value) => write!(
                f,
                "unknown journal `{value}`; expected activity|growth|waste"
            ),
        }
    }
}

impl Error for ConfigError {}

/// The journals kept by the dashboards, one file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JournalKind {
    /// Daily field activity log.
    Activity,
    /// Plant growth observations.
    Growth,
    /// Harvest and production waste log.
    Waste,
}

impl JournalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Growth => "growth",
            Self::Waste => "waste",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Activity => "activity_log.json",
            Self::Growth => "growth_log.json",
            Self::Waste => "waste_log.json",
        }
    }
}

impl FromStr for JournalKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "activity" | "aktivitas" => Ok(Self::Activity),
            "growth" | "pertumbuhan" => Ok(Self::Growth),
            "waste" | "limbah" => Ok(Self::Waste),
            other => Err(ConfigError::UnknownJournal(other.to_string())),
        }
    }
}

/// Resolved journal configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalConfig {
    /// Directory holding one file per journal kind.
    pub data_dir: PathBuf,
    pub json_format: JsonFormat,
    pub log_level: String,
    /// File logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl JournalConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            json_format: JsonFormat::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }

    /// Reads `FARMLOG_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(name) {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Err(ConfigError::EmptyValue(name)),
                Some(raw) => Ok(Some(raw.trim().to_string())),
            }
        };

        let data_dir = read(DATA_DIR_ENV)?.unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let mut config = Self::new(data_dir);
        if let Some(level) = read(LOG_LEVEL_ENV)? {
            config.log_level = level;
        }
        config.log_dir = read(LOG_DIR_ENV)?.map(PathBuf::from);
        Ok(config)
    }

    pub fn journal_path(&self, kind: JournalKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    /// Builds the store for `kind` using this configuration.
    pub fn open_store(&self, kind: JournalKind) -> JsonFileStore {
        JsonFileStore::new(self.journal_path(kind)).with_format(self.json_format)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, JournalConfig, JournalKind, DATA_DIR_ENV, LOG_DIR_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn from_lookup_uses_defaults_when_unset() {
        let config = JournalConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("farmlog-data"));
        assert!(config.log_dir.is_none());
        assert_eq!(
            config.journal_path(JournalKind::Waste),
            PathBuf::from("farmlog-data").join("waste_log.json")
        );
    }

    #[test]
    fn from_lookup_reads_and_trims_values() {
        let config = JournalConfig::from_lookup(lookup_from(&[
            (DATA_DIR_ENV, " /srv/farm "),
            (LOG_DIR_ENV, "/var/log/farmlog"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/farm"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/farmlog")));
    }

    #[test]
    fn from_lookup_rejects_blank_values() {
        let err = JournalConfig::from_lookup(lookup_from(&[(DATA_DIR_ENV, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::EmptyValue(DATA_DIR_ENV));
    }

    #[test]
    fn journal_kind_parses_english_and_legacy_names() {
        assert_eq!("Activity".parse::<JournalKind>(), Ok(JournalKind::Activity));
        assert_eq!("limbah".parse::<JournalKind>(), Ok(JournalKind::Waste));
        assert!(matches!(
            "harvest".parse::<JournalKind>(),
            Err(ConfigError::UnknownJournal(_))
        ));
    }
}
