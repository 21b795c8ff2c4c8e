//! External collaborators
//!
//! The playback core does not know how stream URLs are obtained or where
//! liked songs are stored. Platforms supply both through these traits.

use crate::error::{PlaybackError, Result};
use crate::types::TrackId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Resolves a playable stream URL for a track
///
/// Implementations should report failures as `PlaybackError::StreamUnavailable`;
/// any other error is converted to it by the context.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Resolve the stream URL for `track_id`
    async fn resolve_stream_url(&self, track_id: &TrackId) -> Result<String>;
}

/// Loads and stores the liked-songs set
#[async_trait]
pub trait LikedPersistence: Send + Sync {
    /// Last persisted snapshot, in display order
    async fn load_liked(&self) -> Result<Vec<TrackId>>;

    /// Replace the persisted snapshot with `ids`
    async fn save_liked(&self, ids: &[TrackId]) -> Result<()>;
}

/// Stream resolver backed by a fixed id → URL map
#[derive(Debug, Default)]
pub struct MemoryStreamResolver {
    urls: HashMap<TrackId, String>,
}

impl MemoryStreamResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the URL for a track
    pub fn insert(&mut self, track_id: TrackId, url: impl Into<String>) {
        self.urls.insert(track_id, url.into());
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl FromIterator<(TrackId, String)> for MemoryStreamResolver {
    fn from_iter<I: IntoIterator<Item = (TrackId, String)>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl StreamResolver for MemoryStreamResolver {
    async fn resolve_stream_url(&self, track_id: &TrackId) -> Result<String> {
        self.urls
            .get(track_id)
            .cloned()
            .ok_or_else(|| PlaybackError::stream_unavailable(track_id, "no stream registered"))
    }
}

/// In-memory liked-songs persistence
///
/// Writes can be made to fail on demand, which is how tests and demos
/// exercise the non-fatal persistence failure path.
#[derive(Debug, Default)]
pub struct MemoryLikedPersistence {
    stored: Mutex<Vec<TrackId>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryLikedPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing snapshot
    pub fn with_ids(ids: Vec<TrackId>) -> Self {
        Self {
            stored: Mutex::new(ids),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current stored snapshot
    pub fn stored(&self) -> Vec<TrackId> {
        self.stored
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LikedPersistence for MemoryLikedPersistence {
    async fn load_liked(&self) -> Result<Vec<TrackId>> {
        self.stored
            .lock()
            .map(|ids| ids.clone())
            .map_err(|_| PlaybackError::persistence("liked store lock poisoned"))
    }

    async fn save_liked(&self, ids: &[TrackId]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PlaybackError::persistence("simulated write failure"));
        }

        let mut stored = self
            .stored
            .lock()
            .map_err(|_| PlaybackError::persistence("liked store lock poisoned"))?;
        *stored = ids.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
