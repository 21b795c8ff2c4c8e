/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Document written by an incompatible version
    #[error("Unsupported liked-songs document version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<StorageError> for encore_playback::PlaybackError {
    fn from(err: StorageError) -> Self {
        encore_playback::PlaybackError::persistence(err.to_string())
    }
}
