use std::path::PathBuf;

use garage_types::OwnerId;

/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An existing document could not be used. Never downgrade this to an
    /// empty collection: doing so would overwrite the owner's records on the
    /// next save.
    #[error("corrupt record document for {owner}: {reason}")]
    Corrupt { owner: String, reason: String },

    /// The collection breaks a record invariant and was not written.
    #[error("refusing to save invalid collection for {owner}: {reason}")]
    Invalid { owner: OwnerId, reason: String },

    /// Serialization failure while encoding a collection.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The staged document could not be moved into place.
    #[error("failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Storage backend is read-only or otherwise unavailable.
    #[error("store is read-only")]
    ReadOnly,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
