//! Configuration for the todo application.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::persistence::DEFAULT_STORAGE_KEY;
use std::env;
use std::path::PathBuf;
use tasklist_runtime::store::DEFAULT_BROADCAST_CAPACITY;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the saved list (`TODO_DATA_DIR`, default `.todo`)
    pub data_dir: PathBuf,
    /// Key the list is saved under (`TODO_STORAGE_KEY`, default `todos`)
    pub storage_key: String,
    /// Change notification buffer (`TODO_BROADCAST_CAPACITY`, default 16)
    pub broadcast_capacity: usize,
    /// Log filter (`RUST_LOG`, default `info`)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".todo"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Unset, blank or unparsable values fall back to the defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            data_dir: var("TODO_DATA_DIR")
                .map_or(defaults.data_dir, PathBuf::from),
            storage_key: var("TODO_STORAGE_KEY").unwrap_or(defaults.storage_key),
            broadcast_capacity: var("TODO_BROADCAST_CAPACITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.broadcast_capacity),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.data_dir, PathBuf::from(".todo"));
        assert_eq!(config.storage_key, "todos");
        assert_eq!(config.broadcast_capacity, 16);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TODO_DATA_DIR", "/var/lib/todo"),
            ("TODO_STORAGE_KEY", "work"),
            ("TODO_BROADCAST_CAPACITY", "64"),
            ("RUST_LOG", "todo=debug"),
        ]));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/todo"));
        assert_eq!(config.storage_key, "work");
        assert_eq!(config.broadcast_capacity, 64);
        assert_eq!(config.log_level, "todo=debug");
    }

    #[test]
    fn test_invalid_or_blank_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("TODO_BROADCAST_CAPACITY", "lots"),
            ("TODO_STORAGE_KEY", "   "),
        ]));
        assert_eq!(config.broadcast_capacity, 16);
        assert_eq!(config.storage_key, "todos");
    }
}
