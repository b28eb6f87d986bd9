//! Core error types for taskdav-core.
//!
//! Each layer owns a small thiserror enum. The reconciler folds them into
//! [`SyncError`](crate::sync::SyncError) at its boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to read a settings file
    #[error("Failed to load configuration from {}: {message}", .path.display())]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors raised while saving the state blob.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Writing or renaming the state file failed
    #[error("Failed to write state to {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State could not be serialized
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised by a task inventory.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Failed to read task inventory at {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse task inventory at {}: {source}", .path.display())]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Host-side inventory failure
    #[error("{0}")]
    Custom(String),
}
