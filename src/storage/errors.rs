//! Storage error types
//!
//! Storage failures are the one truly fatal condition in the system:
//! they are never converted into constraint violations and always propagate
//! to the embedder.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open store at '{path}': {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read slot '{slot}': {source}")]
    ReadFailed {
        slot: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write slot '{slot}': {source}")]
    WriteFailed {
        slot: String,
        #[source]
        source: io::Error,
    },

    #[error("slot '{slot}' holds malformed JSON: {source}")]
    MalformedSlot {
        slot: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize collection for slot '{slot}': {source}")]
    EncodeFailed {
        slot: String,
        #[source]
        source: serde_json::Error,
    },
}
