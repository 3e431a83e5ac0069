//! Error types for network parameter handling.

use thiserror::Error;

/// Errors raised by the network registry and network name parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Network {id} collides with registered network {existing}")]
    Conflict {
        id: String,
        existing: String,
    },

    #[error("Unknown network type: {0}")]
    UnknownNetwork(String),
}
