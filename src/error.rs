// src/error.rs
//! Error types for the credential registry.
//!
//! Every public operation returns one of these as an explicit `Err`; nothing
//! in the library panics on caller input or storage faults.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the ordered-map storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("key of {size} bytes exceeds the {limit}-byte key limit")]
    KeyTooLarge { size: usize, limit: usize },

    #[error("value of {size} bytes exceeds the {limit}-byte value limit")]
    ValueTooLarge { size: usize, limit: usize },

    #[error("insert needs {requested} bytes but only {available} of {capacity} bytes remain")]
    CapacityExceeded {
        requested: usize,
        available: usize,
        capacity: usize,
    },

    #[error("no unused credential id after {attempts} attempts")]
    IdCollision { attempts: usize },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to encode table entry: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures reading the host clock.
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("current time is outside the representable nanosecond range")]
    OutOfRange,

    #[error("clock unavailable: {0}")]
    Unavailable(String),
}

/// Failures loading [`RegistryConfig`](crate::config::RegistryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Error returned by every registry operation.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// An id-keyed lookup found nothing.
    #[error("{0}")]
    NotFound(String),

    /// Malformed or empty identifier, rejected before any storage access.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The payload names an issuer that is not on the allow-list.
    #[error("{0}")]
    NotAuthorized(String),

    /// The payload failed a structural rule.
    #[error("Invalid credential payload: {0}")]
    Validation(String),

    #[error("{0}")]
    AlreadyRegistered(String),

    /// The durable map rejected a write. Never retried.
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to get current time: {0}")]
    Clock(#[from] ClockError),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
