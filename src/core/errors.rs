//! JNAV-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, NavError>;

/// Top-level error type for the navigation engine.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("[JNAV-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[JNAV-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[JNAV-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[JNAV-2001] entry {index} not found (store holds {size} entries)")]
    NotFound { index: usize, size: usize },

    #[error("[JNAV-2002] malformed route fragment {fragment:?}")]
    MalformedRoute { fragment: String },

    #[error("[JNAV-2003] entry at position {position} has an empty {field}")]
    InvalidEntry {
        position: usize,
        field: &'static str,
    },

    #[error("[JNAV-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[JNAV-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[JNAV-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[JNAV-3100] host environment failure: {details}")]
    Host { details: String },
}

impl NavError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "JNAV-1001",
            Self::MissingConfig { .. } => "JNAV-1002",
            Self::ConfigParse { .. } => "JNAV-1003",
            Self::NotFound { .. } => "JNAV-2001",
            Self::MalformedRoute { .. } => "JNAV-2002",
            Self::InvalidEntry { .. } => "JNAV-2003",
            Self::Serialization { .. } => "JNAV-2101",
            Self::Io { .. } => "JNAV-3002",
            Self::ChannelClosed { .. } => "JNAV-3003",
            Self::Host { .. } => "JNAV-3100",
        }
    }

    /// Whether the engine recovers from this error by falling back to Home.
    ///
    /// Only route-level failures qualify; everything else is surfaced to the
    /// caller.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedRoute { .. } | Self::NotFound { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for a malformed fragment.
    #[must_use]
    pub fn malformed(fragment: impl Into<String>) -> Self {
        Self::MalformedRoute {
            fragment: fragment.into(),
        }
    }
}

impl From<serde_json::Error> for NavError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for NavError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
