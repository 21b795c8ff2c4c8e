//! Immutable view of playback state for rendering surfaces

use crate::{
    engine::PlaybackEngine,
    format,
    liked::LikedStore,
    types::{Generation, PlaybackStatus, RepeatMode, Track, TrackId},
};
use std::sync::Arc;

/// Snapshot of everything a renderer needs
///
/// Published by the context after every mutation. Tracks are shared, so
/// building a snapshot never copies track metadata.
#[derive(Debug, Clone)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub generation: Generation,
    pub track: Option<Arc<Track>>,
    pub elapsed_secs: f64,
    pub duration_secs: Option<u32>,
    pub progress_percent: f64,
    /// Elapsed time as `M:SS`
    pub elapsed_display: String,
    /// Duration as `M:SS`, if known
    pub duration_display: Option<String>,
    pub volume: f32,
    pub muted: bool,
    pub repeat: RepeatMode,
    pub queue: Vec<Arc<Track>>,
    pub cursor: Option<usize>,
    pub liked: Arc<[TrackId]>,
    /// Whether the current track is liked
    pub current_liked: bool,
    pub stream_url: Option<String>,
}

impl PlaybackSnapshot {
    pub(crate) fn capture(engine: &PlaybackEngine, liked: &LikedStore) -> Self {
        let track = engine.current_track().cloned();
        let duration_secs = engine.duration_secs();
        let current_liked = track.as_ref().is_some_and(|t| liked.is_liked(&t.id));

        Self {
            status: engine.status(),
            generation: engine.generation(),
            elapsed_secs: engine.elapsed(),
            duration_secs,
            progress_percent: engine.progress_percent(),
            elapsed_display: format::format_elapsed(engine.elapsed()),
            duration_display: duration_secs.map(|d| format::format_time(u64::from(d))),
            volume: engine.volume().level(),
            muted: engine.volume().is_muted(),
            repeat: engine.repeat(),
            queue: engine.queue().tracks().to_vec(),
            cursor: engine.queue().cursor(),
            liked: liked.shared_ids(),
            current_liked,
            stream_url: engine.stream_url().map(str::to_string),
            track,
        }
    }

    /// `elapsed / duration` line, e.g. `1:05 / 3:00` (`1:05 / --:--` when unknown)
    pub fn progress_line(&self) -> String {
        format!(
            "{} / {}",
            self.elapsed_display,
            self.duration_display.as_deref().unwrap_or("--:--")
        )
    }

    pub fn is_liked(&self, id: &TrackId) -> bool {
        self.liked.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryLikedPersistence;

    #[test]
    fn capture_idle_engine() {
        let engine = PlaybackEngine::default();
        let liked = LikedStore::new(Arc::new(MemoryLikedPersistence::new()));

        let snapshot = PlaybackSnapshot::capture(&engine, &liked);
        assert_eq!(snapshot.status, PlaybackStatus::Idle);
        assert!(snapshot.track.is_none());
        assert_eq!(snapshot.progress_line(), "0:00 / --:--");
        assert!(!snapshot.current_liked);
    }

    #[test]
    fn capture_reflects_liked_current_track() {
        let mut engine = PlaybackEngine::default();
        engine.enqueue(Arc::new(Track::new("a", "A", "Artist").with_duration(125)));
        engine.play_index(0).unwrap();

        let mut liked = LikedStore::new(Arc::new(MemoryLikedPersistence::new()));
        liked.load_initial(vec![TrackId::new("a")]);

        let snapshot = PlaybackSnapshot::capture(&engine, &liked);
        assert_eq!(snapshot.status, PlaybackStatus::Loading);
        assert!(snapshot.current_liked);
        assert_eq!(snapshot.duration_display.as_deref(), Some("2:05"));
        assert_eq!(snapshot.cursor, Some(0));
        assert_eq!(snapshot.queue.len(), 1);
    }

    #[test]
    fn snapshots_share_liked_ids_until_they_change() {
        let engine = PlaybackEngine::default();
        let mut liked = LikedStore::new(Arc::new(MemoryLikedPersistence::new()));
        liked.load_initial(vec![TrackId::new("a"), TrackId::new("b")]);

        let first = PlaybackSnapshot::capture(&engine, &liked);
        let second = PlaybackSnapshot::capture(&engine, &liked);
        assert!(Arc::ptr_eq(&first.liked, &second.liked));

        liked.load_initial(vec![TrackId::new("c")]);
        let third = PlaybackSnapshot::capture(&engine, &liked);
        assert!(!Arc::ptr_eq(&second.liked, &third.liked));
        assert_eq!(&*third.liked, &[TrackId::new("c")]);
        assert!(third.is_liked(&TrackId::new("c")));
    }
}
