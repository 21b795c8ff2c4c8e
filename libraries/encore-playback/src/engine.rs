//! Playback engine - single active playback session
//!
//! Owns the play queue and the playback state machine:
//!
//! ```text
//! Idle ──load──▶ Loading ──source ready──▶ Playing ◀──▶ Paused
//!                   ▲                          │
//!                   │                        tick ≥ duration
//!                   │                          ▼
//!                   └──── queue advanced ──── Ended ── queue exhausted ──▶ Idle
//! ```
//!
//! The engine never resolves stream URLs itself. Entering `Loading` hands a
//! [`LoadRequest`] back to the caller, which resolves the source and reports
//! the outcome with the request's generation.

use crate::{
    error::{PlaybackError, Result},
    events::{NoticeKind, PlaybackEvent},
    format,
    queue::Queue,
    types::{Generation, PlaybackConfig, PlaybackStatus, RepeatMode, Track},
    volume::Volume,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A track that entered `Loading` and needs a stream source
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Generation the resolution must be reported with
    pub generation: Generation,
    /// Track to resolve
    pub track: Arc<Track>,
}

/// Result of a tick
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// Tick belonged to a superseded load and was discarded
    Stale,
    /// Engine is not playing; nothing changed
    Inactive,
    /// Elapsed time advanced
    Progressed,
    /// Track reached its end; carries the next load, if the queue had one
    Finished(Option<LoadRequest>),
}

/// Central playback state machine
pub struct PlaybackEngine {
    // State
    status: PlaybackStatus,
    current: Option<Arc<Track>>,
    elapsed: f64,
    generation: Generation,
    stream_url: Option<String>,

    // Set when the loaded track was removed from the queue. Holds the slot it
    // occupied; while the cursor is set it already points at the successor
    detached: Option<usize>,

    // Queue and settings
    queue: Queue,
    volume: Volume,
    restart_threshold: f64,

    // Last whole second reported through PositionUpdate
    reported_second: u64,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackEngine {
    /// Create new engine in `Idle`
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            status: PlaybackStatus::Idle,
            current: None,
            elapsed: 0.0,
            generation: Generation::default(),
            stream_url: None,
            detached: None,
            queue: Queue::new(config.repeat),
            volume: Volume::new(config.volume),
            restart_threshold: config.restart_threshold_secs,
            reported_second: 0,
            pending_events: Vec::new(),
        }
    }

    // ===== Loading =====

    /// Load a track: any state → `Loading`, elapsed reset, new generation
    pub fn load(&mut self, track: Arc<Track>) -> LoadRequest {
        let previous_track_id = self.current.as_ref().map(|t| t.id.clone());

        self.generation = self.generation.next();
        self.current = Some(Arc::clone(&track));
        self.elapsed = 0.0;
        self.reported_second = 0;
        self.stream_url = None;
        self.detached = None;

        info!(track_id = %track.id, generation = %self.generation, "Loading track");

        self.set_status(PlaybackStatus::Loading);
        self.pending_events.push(PlaybackEvent::TrackChanged {
            track_id: track.id.clone(),
            previous_track_id,
        });

        LoadRequest {
            generation: self.generation,
            track,
        }
    }

    /// Make queue entry `index` current and load it
    pub fn play_index(&mut self, index: usize) -> Result<LoadRequest> {
        let track = Arc::clone(self.queue.select(index)?);
        self.emit_queue_changed();
        Ok(self.load(track))
    }

    /// Stream source resolved: `Loading` → `Playing`
    ///
    /// Returns false when the resolution was stale and got ignored.
    pub fn on_source_ready(&mut self, generation: Generation, url: String) -> bool {
        if generation != self.generation || self.status != PlaybackStatus::Loading {
            debug!(%generation, current = %self.generation, "Ignoring stale source resolution");
            return false;
        }

        self.stream_url = Some(url);
        self.set_status(PlaybackStatus::Playing);
        true
    }

    /// Stream source failed: `Loading` → `Idle`
    ///
    /// Returns the failure as `StreamUnavailable`, or `None` when it was stale.
    pub fn on_source_failed(
        &mut self,
        generation: Generation,
        error: PlaybackError,
    ) -> Option<PlaybackError> {
        if generation != self.generation || self.status != PlaybackStatus::Loading {
            debug!(%generation, current = %self.generation, "Ignoring stale source failure");
            return None;
        }

        let track_id = self.current.as_ref()?.id.clone();
        let error = match error {
            e @ PlaybackError::StreamUnavailable { .. } => e,
            other => PlaybackError::stream_unavailable(&track_id, other.to_string()),
        };

        warn!(track_id = %track_id, error = %error, "Stream source unavailable");

        self.reset_to_idle();
        self.pending_events.push(PlaybackEvent::Notice {
            kind: NoticeKind::StreamUnavailable,
            message: error.to_string(),
        });

        Some(error)
    }

    // ===== Playback Control =====

    /// Resume playback: `Paused` → `Playing`
    pub fn play(&mut self) -> Result<()> {
        match self.status {
            PlaybackStatus::Paused => {
                self.set_status(PlaybackStatus::Playing);
                Ok(())
            }
            PlaybackStatus::Playing => Ok(()),
            PlaybackStatus::Loading => Err(self.not_ready("play")),
            PlaybackStatus::Idle | PlaybackStatus::Ended => Err(self.invalid("play")),
        }
    }

    /// Pause playback: `Playing` → `Paused`
    pub fn pause(&mut self) -> Result<()> {
        match self.status {
            PlaybackStatus::Playing => {
                self.set_status(PlaybackStatus::Paused);
                Ok(())
            }
            PlaybackStatus::Paused => Ok(()),
            PlaybackStatus::Loading => Err(self.not_ready("pause")),
            PlaybackStatus::Idle | PlaybackStatus::Ended => Err(self.invalid("pause")),
        }
    }

    /// Pause when playing, resume when paused
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.status == PlaybackStatus::Playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Seek within the current track
    ///
    /// The target is clamped to `[0, duration]`. Returns the new elapsed time.
    pub fn seek(&mut self, seconds: f64) -> Result<f64> {
        match self.status {
            PlaybackStatus::Playing | PlaybackStatus::Paused => {}
            PlaybackStatus::Loading => return Err(self.not_ready("seek")),
            PlaybackStatus::Idle | PlaybackStatus::Ended => return Err(self.invalid("seek")),
        }

        let Some(track) = self.current.as_ref() else {
            return Err(self.invalid("seek"));
        };
        let duration = track
            .duration_secs
            .ok_or_else(|| PlaybackError::UnknownDuration(track.id.clone()))?;

        let target = if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, f64::from(duration))
        };

        debug!(track_id = %track.id, requested = seconds, target, "Seek");
        self.elapsed = target;
        self.emit_position_update();
        Ok(target)
    }

    /// Stop playback
    ///
    /// Clears the current track (but not the queue) and invalidates any
    /// pending source resolution.
    pub fn stop(&mut self) {
        if self.status == PlaybackStatus::Idle {
            return;
        }
        self.generation = self.generation.next();
        self.reset_to_idle();
    }

    /// Skip to next queue entry
    ///
    /// Returns the load for the next track, or `None` when the queue is
    /// exhausted (engine stops).
    pub fn next(&mut self) -> Option<LoadRequest> {
        let next = self.next_entry();
        self.emit_queue_changed();

        if let Some(track) = next {
            Some(self.load(track))
        } else {
            self.stop();
            None
        }
    }

    /// Go to previous track
    ///
    /// Further into the track than the restart threshold, restarts the
    /// current track instead.
    pub fn previous(&mut self) -> Option<LoadRequest> {
        if matches!(
            self.status,
            PlaybackStatus::Playing | PlaybackStatus::Paused
        ) && self.elapsed > self.restart_threshold
        {
            self.elapsed = 0.0;
            self.emit_position_update();
            return None;
        }

        let previous = match self.detached {
            Some(slot) => {
                let before = self.queue.cursor().unwrap_or(slot).checked_sub(1);
                match before {
                    Some(index) => self.queue.select(index).ok().cloned(),
                    None => {
                        // Nothing precedes the removed entry: restart in place
                        self.elapsed = 0.0;
                        self.emit_position_update();
                        return None;
                    }
                }
            }
            None => self.queue.retreat().cloned(),
        };
        self.emit_queue_changed();

        previous.map(|track| self.load(track))
    }

    /// Advance elapsed time
    ///
    /// Only applies while `Playing` and for the current generation. Reaching
    /// the duration ends the track (elapsed clamped to the duration) and moves
    /// on to the next queue entry.
    pub fn tick(&mut self, generation: Generation, delta_secs: f64) -> TickOutcome {
        if generation != self.generation {
            return TickOutcome::Stale;
        }
        if self.status != PlaybackStatus::Playing || !delta_secs.is_finite() || delta_secs <= 0.0
        {
            return TickOutcome::Inactive;
        }

        self.elapsed += delta_secs;

        let duration = self.current.as_ref().and_then(|t| t.duration_secs);
        if let Some(duration) = duration {
            if self.elapsed >= f64::from(duration) {
                self.elapsed = f64::from(duration);
                return TickOutcome::Finished(self.finish_current());
            }
        }

        let second = self.elapsed.floor() as u64;
        if second != self.reported_second {
            self.emit_position_update();
        }

        TickOutcome::Progressed
    }

    /// `Playing` → `Ended`, then load the next entry or go `Idle`
    fn finish_current(&mut self) -> Option<LoadRequest> {
        let finished = self.current.as_ref().map(|t| t.id.clone())?;

        self.emit_position_update();
        self.set_status(PlaybackStatus::Ended);
        self.pending_events.push(PlaybackEvent::TrackFinished {
            track_id: finished.clone(),
        });

        let next = self.next_entry();
        self.emit_queue_changed();

        if let Some(track) = next {
            Some(self.load(track))
        } else {
            info!(track_id = %finished, "Queue exhausted");
            self.reset_to_idle();
            None
        }
    }

    fn next_entry(&mut self) -> Option<Arc<Track>> {
        match self.detached {
            Some(_) if self.queue.cursor().is_some() => self.queue.current().cloned(),
            // Entries appended after the removal land at the old slot
            Some(slot) => self.queue.select(slot).ok().cloned(),
            None => self.queue.advance().cloned(),
        }
    }

    fn reset_to_idle(&mut self) {
        self.current = None;
        self.elapsed = 0.0;
        self.reported_second = 0;
        self.stream_url = None;
        self.detached = None;
        self.set_status(PlaybackStatus::Idle);
    }

    // ===== Queue =====

    /// Append a track to the queue
    pub fn enqueue(&mut self, track: Arc<Track>) {
        self.queue.append(track);
        self.emit_queue_changed();
    }

    /// Append several tracks to the queue
    pub fn enqueue_all(&mut self, tracks: impl IntoIterator<Item = Arc<Track>>) {
        self.queue.extend(tracks);
        self.emit_queue_changed();
    }

    /// Remove queue entry at `index`
    ///
    /// Removing the entry that is playing does not interrupt it; when it
    /// finishes, the entry that took its place plays next. If it was the last
    /// entry, the next one enqueued takes its place.
    pub fn remove_from_queue(&mut self, index: usize) -> Result<Arc<Track>> {
        let removing_current = self.queue.cursor() == Some(index)
            && matches!(
                (self.queue.get(index), self.current.as_ref()),
                (Some(entry), Some(current)) if Arc::ptr_eq(entry, current)
            );

        let removed = self.queue.remove_at(index)?;
        if removing_current || self.detached.is_some() {
            self.detached = Some(self.queue.cursor().unwrap_or(self.queue.len()));
        }

        self.emit_queue_changed();
        Ok(removed)
    }

    /// Reorder queue
    pub fn move_in_queue(&mut self, from: usize, to: usize) -> Result<()> {
        self.queue.move_to(from, to)?;
        self.emit_queue_changed();
        Ok(())
    }

    /// Clear queue; the current track keeps playing to its end
    ///
    /// With no cursor left, the first entry enqueued afterwards plays next.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.detached = None;
        self.emit_queue_changed();
    }

    /// Randomly reorder entries after the current one
    pub fn shuffle_upcoming(&mut self) {
        self.queue.shuffle_upcoming();
        self.emit_queue_changed();
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.queue.set_repeat(repeat);
    }

    pub fn repeat(&self) -> RepeatMode {
        self.queue.repeat()
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    // ===== Volume =====

    /// Set volume (0.0-1.0)
    pub fn set_volume(&mut self, level: f32) {
        self.volume.set_level(level);
        self.emit_volume_changed();
    }

    pub fn mute(&mut self) {
        self.volume.mute();
        self.emit_volume_changed();
    }

    pub fn unmute(&mut self) {
        self.volume.unmute();
        self.emit_volume_changed();
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.emit_volume_changed();
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    // ===== State Queries =====

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn current_track(&self) -> Option<&Arc<Track>> {
        self.current.as_ref()
    }

    /// Elapsed seconds in the current track
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Duration of the current track, if known
    pub fn duration_secs(&self) -> Option<u32> {
        self.current.as_ref().and_then(|t| t.duration_secs)
    }

    /// Progress percentage (0 when duration is unknown or zero)
    pub fn progress_percent(&self) -> f64 {
        format::progress_percent(self.elapsed, self.duration_secs())
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Resolved stream URL of the current track
    pub fn stream_url(&self) -> Option<&str> {
        self.stream_url.as_deref()
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events that have been emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            debug!(from = %self.status, to = %status, "Playback status changed");
            self.status = status;
            self.pending_events
                .push(PlaybackEvent::StateChanged { status });
        }
    }

    fn not_ready(&self, intent: &'static str) -> PlaybackError {
        PlaybackError::NotReady {
            intent,
            track_id: self
                .current
                .as_ref()
                .map(|t| t.id.clone())
                .unwrap_or_else(|| "unknown".into()),
        }
    }

    fn invalid(&self, intent: &'static str) -> PlaybackError {
        PlaybackError::InvalidTransition {
            intent,
            status: self.status,
        }
    }

    fn emit_position_update(&mut self) {
        self.reported_second = self.elapsed.floor() as u64;
        self.pending_events.push(PlaybackEvent::PositionUpdate {
            position_secs: self.reported_second,
            duration_secs: self.duration_secs(),
        });
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
            cursor: self.queue.cursor(),
        });
    }

    fn emit_volume_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("status", &self.status)
            .field("current", &self.current.as_ref().map(|t| &t.id))
            .field("elapsed", &self.elapsed)
            .field("generation", &self.generation)
            .field("queue_len", &self.queue.len())
            .finish_non_exhaustive()
    }
}
