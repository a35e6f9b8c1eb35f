use std::time::Duration;

use thiserror::Error;

/// Errors reported by external directions and geocoding capabilities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Service could not be reached, or answered with an error
    #[error("network error: {0}")]
    Network(String),
    /// Service answered but had nothing for this query
    #[error("no result")]
    NoResult,
}

/// Errors that may rise in tracking, conversion and navigation
#[derive(Error, Debug)]
pub enum Error {
    /// Log, bookmark or catalog file access failure
    #[error("file i/o error: {0}")]
    FileIO(#[from] std::io::Error),
    /// Catalog or configuration (de)serialization failure
    #[error("json coding error: {0}")]
    JsonCoding(#[from] serde_json::Error),
    /// Track log line is not valid UTF-8
    #[error("text decoding error: {0}")]
    TextDecoding(#[from] std::string::FromUtf8Error),
    /// CSV record production failure
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Query attempted inside its cooldown window without force
    #[error("too soon, retry in {0:?}")]
    Throttled(Duration),
    /// Fetch was superseded by a newer one
    #[error("fetch cancelled")]
    Cancelled,
    /// Destination index does not exist in current set
    #[error("invalid destination index #{0}")]
    InvalidIndex(usize),
    /// Destination set is not part of this catalog
    #[error("unknown destination set")]
    UnknownSet,
    /// External capability failure
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
}

impl Error {
    /// Returns true if this is a "try later" condition
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled(_))
    }
}
