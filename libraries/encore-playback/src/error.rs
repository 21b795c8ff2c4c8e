//! Error types for playback management

use crate::types::{PlaybackStatus, TrackId};
use thiserror::Error;

/// Playback errors
///
/// `OutOfRange`, `InvalidTransition`, `UnknownDuration` and `NotReady` are
/// usage errors returned synchronously to the caller. `StreamUnavailable` and
/// `PersistenceFailure` come from external collaborators and are also
/// published as notifications.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Queue index is not valid
    #[error("Index out of range: {index} (queue length {len})")]
    OutOfRange { index: usize, len: usize },

    /// Intent is not allowed in the current status
    #[error("Cannot {intent} while {status}")]
    InvalidTransition {
        intent: &'static str,
        status: PlaybackStatus,
    },

    /// Seek on a track without known duration
    #[error("Track {0} has no known duration")]
    UnknownDuration(TrackId),

    /// Intent issued while the stream source is still resolving
    #[error("Cannot {intent}: waiting for the stream source of track {track_id}")]
    NotReady {
        intent: &'static str,
        track_id: TrackId,
    },

    /// Stream URL could not be resolved
    #[error("Stream unavailable for track {track_id}: {reason}")]
    StreamUnavailable { track_id: TrackId, reason: String },

    /// Liked songs could not be persisted (or loaded)
    #[error("Failed to persist liked songs: {0}")]
    PersistenceFailure(String),
}

impl PlaybackError {
    /// Create a stream unavailable error
    pub fn stream_unavailable(track_id: &TrackId, reason: impl Into<String>) -> Self {
        Self::StreamUnavailable {
            track_id: track_id.clone(),
            reason: reason.into(),
        }
    }

    /// Create a persistence failure
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::PersistenceFailure(msg.into())
    }

    /// Whether this error comes from an external collaborator rather than misuse
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::StreamUnavailable { .. } | Self::PersistenceFailure(_)
        )
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
