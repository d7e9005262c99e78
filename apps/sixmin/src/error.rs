//! # Application Errors
//!
//! Everything that can go wrong around the core: configuration, the record
//! store, and local files. The core itself only contributes
//! [`ScheduleError`] for malformed dates.

use sixmin_core::{ItemId, ScheduleError};
use thiserror::Error;

/// Errors raised by the sixmin driver, store adapters and CLI.
#[derive(Debug, Error)]
pub enum SixminError {
    /// Missing or invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The config file is not valid TOML for [`crate::config::Config`].
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A date could not be parsed or computed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Cannot reach the record store.
    #[error("Cannot connect to record store at {0}")]
    Connection(String),

    /// 401 Unauthorized - invalid or missing token.
    #[error("Unauthorized: invalid or missing token")]
    Unauthorized,

    /// 429 Too Many Requests.
    #[error("Rate limited: too many requests")]
    RateLimited,

    /// The store answered with an error status.
    #[error("Store error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The HTTP layer failed while reading a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a body we cannot interpret.
    #[error("Unexpected store response: {0}")]
    Decode(String),

    /// The store's declared fields do not match what the driver writes.
    #[error("Schema mismatch: {}", .0.join("; "))]
    Schema(Vec<String>),

    /// No item with this id exists in the store.
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization or deserialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
