//! Play queue with a current-position cursor
//!
//! The queue is an ordered list of shared tracks plus a cursor pointing at
//! the "current" entry. The cursor is either `None` or a valid index; every
//! mutation below preserves that.

use crate::error::{PlaybackError, Result};
use crate::types::{RepeatMode, Track};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

/// Ordered playback queue
///
/// Structure:
/// ```text
///   0  Track A
///   1  Track B   <- cursor (current)
///   2  Track C   upcoming
///   3  Track D   upcoming
/// ```
#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// Tracks in playback order
    tracks: Vec<Arc<Track>>,

    /// Index of the current track
    cursor: Option<usize>,

    /// What `advance` does on the last entry
    repeat: RepeatMode,
}

impl Queue {
    /// Create new empty queue
    pub fn new(repeat: RepeatMode) -> Self {
        Self {
            tracks: Vec::new(),
            cursor: None,
            repeat,
        }
    }

    /// Add track to the end; the cursor does not move
    pub fn append(&mut self, track: Arc<Track>) {
        self.tracks.push(track);
    }

    /// Add several tracks to the end
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Arc<Track>>) {
        self.tracks.extend(tracks);
    }

    /// Remove track at index
    ///
    /// Keeps the cursor on the same logical track when an earlier entry is
    /// removed. Removing the current entry leaves the cursor on the entry that
    /// slid into its slot, or `None` when there is no such entry.
    pub fn remove_at(&mut self, index: usize) -> Result<Arc<Track>> {
        self.check_index(index)?;
        let removed = self.tracks.remove(index);

        self.cursor = match self.cursor {
            Some(cursor) if index < cursor => Some(cursor - 1),
            Some(cursor) if index == cursor => {
                if cursor < self.tracks.len() {
                    Some(cursor)
                } else {
                    None
                }
            }
            other => other,
        };

        Ok(removed)
    }

    /// Move the entry at `from` to `to`
    ///
    /// The cursor keeps pointing at the track it pointed at before the move.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;

        if from == to {
            return Ok(());
        }

        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);

        if let Some(cursor) = self.cursor {
            self.cursor = Some(if cursor == from {
                to
            } else if from < cursor && to >= cursor {
                cursor - 1
            } else if from > cursor && to <= cursor {
                cursor + 1
            } else {
                cursor
            });
        }

        Ok(())
    }

    /// Clear entire queue
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
    }

    /// Make the entry at `index` current
    pub fn select(&mut self, index: usize) -> Result<&Arc<Track>> {
        self.check_index(index)?;
        self.cursor = Some(index);
        Ok(&self.tracks[index])
    }

    /// Move the cursor forward
    ///
    /// On the last entry the cursor wraps to 0 with `RepeatMode::All` and
    /// becomes `None` (queue exhausted) otherwise. From `None` the first entry
    /// becomes current.
    pub fn advance(&mut self) -> Option<&Arc<Track>> {
        if self.tracks.is_empty() {
            self.cursor = None;
            return None;
        }

        self.cursor = match self.cursor {
            None => Some(0),
            Some(cursor) if cursor + 1 < self.tracks.len() => Some(cursor + 1),
            Some(_) => match self.repeat {
                RepeatMode::All => Some(0),
                RepeatMode::Off => None,
            },
        };

        self.current()
    }

    /// Move the cursor back one entry, clamped at 0
    pub fn retreat(&mut self) -> Option<&Arc<Track>> {
        if let Some(cursor) = self.cursor {
            self.cursor = Some(cursor.saturating_sub(1));
        }
        self.current()
    }

    /// Randomly reorder the entries after the cursor
    pub fn shuffle_upcoming(&mut self) {
        self.shuffle_upcoming_with(&mut rand::thread_rng());
    }

    /// Shuffle upcoming entries with a caller-provided RNG
    pub fn shuffle_upcoming_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let start = self.cursor.map_or(0, |cursor| cursor + 1);
        if start < self.tracks.len() {
            self.tracks[start..].shuffle(rng);
        }
    }

    /// Track at the cursor
    pub fn current(&self) -> Option<&Arc<Track>> {
        self.cursor.and_then(|cursor| self.tracks.get(cursor))
    }

    /// Current cursor position
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Get track at index
    pub fn get(&self, index: usize) -> Option<&Arc<Track>> {
        self.tracks.get(index)
    }

    /// All tracks in playback order
    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    /// Entries after the cursor
    pub fn upcoming(&self) -> &[Arc<Track>] {
        let start = self.cursor.map_or(0, |cursor| cursor + 1);
        self.tracks.get(start..).unwrap_or(&[])
    }

    /// Total number of tracks in queue
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.repeat = repeat;
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.tracks.len() {
            Ok(())
        } else {
            Err(PlaybackError::OutOfRange {
                index,
                len: self.tracks.len(),
            })
        }
    }
}
