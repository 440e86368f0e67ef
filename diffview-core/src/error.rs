use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::DiffId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("page numbers start at 1")]
    Zero,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode TOML catalog")]
    Toml(#[from] toml::de::Error),
    #[error("failed to decode JSON catalog")]
    Json(#[from] serde_json::Error),
    #[error("unsupported catalog format for {0:?}; expected .toml or .json")]
    UnsupportedFormat(PathBuf),
    #[error("difference id {0} appears more than once")]
    DuplicateDifference(DiffId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("difference {0} is not in the catalog")]
    UnknownDifference(DiffId),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode config {path:?}")]
    Decode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unable to resolve platform config directory")]
    NoProjectDirs,
}
