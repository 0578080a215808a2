//! Error types for list configuration and item encoding.
//!
//! Routine "not found" conditions (removing an absent item, selecting past the
//! end of a list) are not errors anywhere in this crate; they are silent no-ops.
//! The variants below cover misconfiguration and codec failures only.

use thiserror::Error;

/// Errors produced by the core list machinery.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration is unusable as supplied.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An item could not be turned into its storable form.
    #[error("Failed to encode item '{item}' in list '{list}': {message}")]
    Encode {
        list: String,
        item: String,
        message: String,
    },

    /// A stored entry could not be turned back into an item.
    #[error("Failed to decode stored item: {0}")]
    Decode(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;
