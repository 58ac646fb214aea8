//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{NavError, Result};
use crate::history::DEFAULT_ORIGIN;
use crate::logger::jsonl::JsonlConfig;
use crate::route::Route;

/// Full jnav configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub history: HistoryConfig,
    pub log: LogConfig,
    /// File this configuration was loaded from (or would have been).
    #[serde(skip)]
    pub config_file: PathBuf,
}

/// Where journal entries come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON array of entries. Commands taking `--entries` override this.
    pub entries_file: Option<PathBuf>,
}

/// Headless history settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Application origin; URLs are `<origin>/` or `<origin>/#<fragment>`.
    pub origin: String,
    /// Fragment the session starts on.
    pub initial_fragment: String,
}

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub enabled: bool,
    pub jsonl_path: PathBuf,
    pub fallback_path: Option<PathBuf>,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
    pub fsync_interval_secs: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            initial_fragment: String::new(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        let defaults = JsonlConfig::default();
        Self {
            enabled: false,
            jsonl_path: data_dir().join("activity.jsonl"),
            fallback_path: None,
            max_size_bytes: defaults.max_size_bytes,
            max_rotated_files: defaults.max_rotated_files,
            fsync_interval_secs: defaults.fsync_interval_secs,
        }
    }
}

impl LogConfig {
    /// Writer settings for this section.
    #[must_use]
    pub fn jsonl_config(&self) -> JsonlConfig {
        JsonlConfig {
            path: self.jsonl_path.clone(),
            fallback_path: self.fallback_path.clone(),
            max_size_bytes: self.max_size_bytes,
            max_rotated_files: self.max_rotated_files,
            fsync_interval_secs: self.fsync_interval_secs,
        }
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[JNAV-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

fn data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("jnav")
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        home_dir().join(".config").join("jnav").join("config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| NavError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(NavError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for the session-start log.
    ///
    /// Uses FNV-1a so the value is stable across processes and releases.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // store
        if let Some(raw) = lookup("JNAV_ENTRIES_FILE") {
            self.store.entries_file = Some(PathBuf::from(raw));
        }

        // history
        if let Some(raw) = lookup("JNAV_HISTORY_ORIGIN") {
            self.history.origin = raw;
        }
        if let Some(raw) = lookup("JNAV_INITIAL_FRAGMENT") {
            self.history.initial_fragment = raw;
        }

        // log
        if let Some(raw) = lookup("JNAV_LOG_ENABLED") {
            self.log.enabled = parse_env("JNAV_LOG_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("JNAV_LOG_JSONL_PATH") {
            self.log.jsonl_path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("JNAV_LOG_FALLBACK_PATH") {
            self.log.fallback_path = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("JNAV_LOG_MAX_SIZE_BYTES") {
            self.log.max_size_bytes = parse_env("JNAV_LOG_MAX_SIZE_BYTES", &raw)?;
        }
        if let Some(raw) = lookup("JNAV_LOG_MAX_ROTATED_FILES") {
            self.log.max_rotated_files = parse_env("JNAV_LOG_MAX_ROTATED_FILES", &raw)?;
        }

        Ok(())
    }

    /// Canonicalize values that have several equivalent spellings.
    fn normalize(&mut self) {
        let origin = self.history.origin.trim();
        self.history.origin = origin.strip_suffix('/').unwrap_or(origin).to_string();

        let fragment = self.history.initial_fragment.trim();
        self.history.initial_fragment = fragment.strip_prefix('#').unwrap_or(fragment).to_string();
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        let origin = &self.history.origin;
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(NavError::InvalidConfig {
                details: format!("history.origin must be an http(s) URL, got {origin:?}"),
            });
        }
        if origin.contains('#') {
            return Err(NavError::InvalidConfig {
                details: format!("history.origin must not carry a fragment, got {origin:?}"),
            });
        }

        if let Err(err) = Route::parse(&self.history.initial_fragment) {
            return Err(NavError::InvalidConfig {
                details: format!("history.initial_fragment: {err}"),
            });
        }

        if self
            .store
            .entries_file
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(NavError::InvalidConfig {
                details: "store.entries_file must not be empty".to_string(),
            });
        }

        if self.log.max_size_bytes == 0 {
            return Err(NavError::InvalidConfig {
                details: "log.max_size_bytes must be > 0".to_string(),
            });
        }
        if self.log.max_rotated_files == 0 {
            return Err(NavError::InvalidConfig {
                details: "log.max_rotated_files must be >= 1".to_string(),
            });
        }
        if self.log.enabled && self.log.jsonl_path.as_os_str().is_empty() {
            return Err(NavError::InvalidConfig {
                details: "log.jsonl_path must be set when logging is enabled".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| NavError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
