//! Error types for the core layer.
//!
//! Disqualified gestures are not errors and never show up here; these only
//! cover misconfiguration, bad surface handles, and collection loading.

use std::path::PathBuf;

use thiserror::Error;

use super::surface::SurfaceId;

/// Invalid gesture tuning.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("threshold must be a positive, finite number (got {0})")]
    InvalidThreshold(f64),
    #[error("resistance must be in (0, 1] (got {0})")]
    InvalidResistance(f64),
}

/// Problems resolving a scroll surface on the host.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("no scroll surface registered with id {0}")]
    Unknown(SurfaceId),
}

/// Failure while reading the collection file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid entry for \"{bottle}\": {reason}")]
    InvalidEntry { bottle: String, reason: String },
}
