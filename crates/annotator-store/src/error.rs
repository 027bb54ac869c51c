//! Store error types

use std::path::PathBuf;

/// Failure to persist the record collection
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("existing history in {} could not be loaded: {source}", path.display())]
    HistoryUnavailable {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error("failed to serialize annotations: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reasons the backing file could not be loaded
///
/// Every variant degrades to an empty history in [`crate::load_all`]. A
/// [`crate::RecordStore`] refuses to write over an unreadable file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("backing file does not exist")]
    Missing,

    #[error("backing file is unreadable: {0}")]
    Unreadable(#[source] std::io::Error),

    #[error("backing file is not a valid annotation array: {0}")]
    Malformed(#[source] serde_json::Error),
}
