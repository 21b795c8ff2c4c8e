//! Playback Events
//!
//! Event-based communication for UI synchronization. Events are emitted at
//! key points:
//! - State changes (loading/play/pause/end/idle)
//! - Track changes (on every load)
//! - Position updates (once per whole second of progress)
//! - Queue, volume and liked-set changes
//! - Notices for collaborator failures and rejected intents

use crate::types::{PlaybackStatus, TrackId};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback status changed
    StateChanged {
        /// The new status
        status: PlaybackStatus,
    },

    /// A new track was loaded
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Track finished playing naturally (reached end)
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Position update
    PositionUpdate {
        /// Elapsed whole seconds
        position_secs: u64,
        /// Track duration, if known
        duration_secs: Option<u32>,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0.0-1.0)
        level: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Queue changed (tracks added/removed/reordered)
    QueueChanged {
        /// New queue length
        length: usize,
        /// New cursor
        cursor: Option<usize>,
    },

    /// A track was liked or unliked
    LikedChanged {
        track_id: TrackId,
        liked: bool,
    },

    /// Something the user should be told about
    Notice {
        kind: NoticeKind,
        message: String,
    },
}

/// Category of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    /// Stream URL could not be resolved; playback stopped
    StreamUnavailable,
    /// Liked songs were not saved; the change may not survive a reload
    PersistenceFailure,
    /// An intent from the run loop was rejected
    IntentRejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_variant_names() {
        let event = PlaybackEvent::LikedChanged {
            track_id: TrackId::new("t1"),
            liked: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("LikedChanged"));
        assert!(json.contains("\"t1\""));
    }

    #[test]
    fn notice_round_trip_keeps_kind() {
        let event = PlaybackEvent::Notice {
            kind: NoticeKind::PersistenceFailure,
            message: "disk full".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: PlaybackEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
