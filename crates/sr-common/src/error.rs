//! Error types for the SR importer

use thiserror::Error;

/// Result type alias for SR operations
pub type Result<T> = std::result::Result<T, SrError>;

/// Main error type for SR operations
///
/// Every failure the update pipeline can surface maps onto one of these
/// variants. Nothing is retried inside the library.
#[derive(Error, Debug)]
pub enum SrError {
    /// Missing or malformed mapping document, or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport or HTTP failure while fetching an archive
    #[error("Network error: {0}")]
    Network(String),

    /// Corrupt or unreadable archive
    #[error("Archive error: {0}")]
    Archive(String),

    /// Attribute order does not fit a data row, or a value could not be assigned
    #[error("Mapping error for {entity}{}: {message}", line_suffix(.line))]
    Mapping {
        entity: String,
        line: Option<usize>,
        message: String,
    },

    /// Bulk-load, delete or count failure in the storage layer
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" at line {}", line),
        None => String::new(),
    }
}

impl SrError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Mapping error not tied to a specific data line
    pub fn mapping(entity: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Mapping {
            entity: entity.into(),
            line: None,
            message: msg.into(),
        }
    }

    /// Mapping error raised while assigning the given 1-based data line
    pub fn mapping_at(entity: impl Into<String>, line: usize, msg: impl Into<String>) -> Self {
        Self::Mapping {
            entity: entity.into(),
            line: Some(line),
            message: msg.into(),
        }
    }
}
