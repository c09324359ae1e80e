use thiserror::Error;

use crate::state::app_state::{ConnectionStatus, MetadataKind};

/// Application-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Reported by a `DataSource` implementation (transport, driver, SQL).
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Fetching {kind} failed: {message}")]
    Fetch { kind: MetadataKind, message: String },

    #[error("Query failed: {0}")]
    Execution(String),

    #[error("Server not found: {0}")]
    ServerNotFound(uuid::Uuid),

    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: ConnectionStatus, action: &'static str },

    #[error("Not connected")]
    NotConnected,

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn driver(message: impl Into<String>) -> Self {
        Error::Driver(message.into())
    }
}

/// Convenience Result type using our Error
pub type Result<T> = std::result::Result<T, Error>;
