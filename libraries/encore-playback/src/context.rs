//! Playback context - composition root
//!
//! Wires the engine (with its queue), the liked-songs store and the external
//! collaborators into one state object owned by whatever owns the UI
//! lifetime. All mutations go through `&mut self`, so they are serialized on
//! the owner's event loop without locks.
//!
//! Stream resolution runs as a tokio task tagged with the load generation.
//! A newer load aborts the pending task, and any late result from an older
//! generation is dropped by the engine.

use crate::{
    engine::{LoadRequest, PlaybackEngine, TickOutcome},
    error::{PlaybackError, Result},
    events::{NoticeKind, PlaybackEvent},
    liked::LikedStore,
    snapshot::PlaybackSnapshot,
    source::{LikedPersistence, StreamResolver},
    types::{Generation, PlaybackConfig, PlaybackStatus, RepeatMode, Track, TrackId},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Outcome of an asynchronous stream resolution
#[derive(Debug)]
pub struct Resolution {
    pub generation: Generation,
    pub track_id: TrackId,
    pub result: Result<String>,
}

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receives published state
///
/// Closures taking `&Arc<PlaybackSnapshot>` implement this directly.
pub trait PlaybackObserver: Send {
    /// Called with every published snapshot
    fn on_snapshot(&mut self, snapshot: &Arc<PlaybackSnapshot>);

    /// Called for every event, before the snapshot that follows it
    fn on_event(&mut self, _event: &PlaybackEvent) {}
}

impl<F> PlaybackObserver for F
where
    F: FnMut(&Arc<PlaybackSnapshot>) + Send,
{
    fn on_snapshot(&mut self, snapshot: &Arc<PlaybackSnapshot>) {
        self(snapshot);
    }
}

/// Intents accepted by the run loop
#[derive(Debug, Clone)]
pub enum Intent {
    Play,
    Pause,
    TogglePlayPause,
    Seek(f64),
    Next,
    Previous,
    Stop,
    PlayIndex(usize),
    Enqueue(Track),
    RemoveAt(usize),
    Move { from: usize, to: usize },
    ClearQueue,
    ShuffleUpcoming,
    SetRepeat(RepeatMode),
    SetVolume(f32),
    ToggleMute,
    ToggleLike(TrackId),
    ToggleLikeCurrent,
    RetrySaveLiked,
    Shutdown,
}

/// Process-wide playback state
pub struct PlaybackContext {
    config: PlaybackConfig,
    engine: PlaybackEngine,
    liked: LikedStore,

    // Stream resolution
    resolver: Arc<dyn StreamResolver>,
    resolution_tx: mpsc::UnboundedSender<Resolution>,
    resolution_rx: mpsc::UnboundedReceiver<Resolution>,
    pending: Option<(Generation, JoinHandle<()>)>,

    // Subscribers
    observers: Vec<(SubscriptionId, Box<dyn PlaybackObserver>)>,
    next_subscription: u64,

    // Events raised outside the engine (liked store, rejected intents)
    pending_events: Vec<PlaybackEvent>,
    snapshot: Arc<PlaybackSnapshot>,
}

impl PlaybackContext {
    /// Create a context with an empty liked set
    pub fn new(
        config: PlaybackConfig,
        resolver: Arc<dyn StreamResolver>,
        persistence: Arc<dyn LikedPersistence>,
    ) -> Self {
        let engine = PlaybackEngine::new(&config);
        let liked = LikedStore::new(persistence);
        let snapshot = Arc::new(PlaybackSnapshot::capture(&engine, &liked));
        let (resolution_tx, resolution_rx) = mpsc::unbounded_channel();

        Self {
            config,
            engine,
            liked,
            resolver,
            resolution_tx,
            resolution_rx,
            pending: None,
            observers: Vec::new(),
            next_subscription: 0,
            pending_events: Vec::new(),
            snapshot,
        }
    }

    /// Create a context and load the persisted liked set
    pub async fn init(
        config: PlaybackConfig,
        resolver: Arc<dyn StreamResolver>,
        persistence: Arc<dyn LikedPersistence>,
    ) -> Result<Self> {
        let mut context = Self::new(config, resolver, persistence);
        let count = context.liked.load_from_persistence().await?;
        context.snapshot = Arc::new(PlaybackSnapshot::capture(&context.engine, &context.liked));
        info!(liked = count, "Playback context initialized");
        Ok(context)
    }

    /// Tear down: cancel pending work, stop playback, drop every subscription
    pub fn dispose(mut self) {
        self.cancel_pending();
        self.engine.stop();
        let dropped = self.observers.len();
        self.observers.clear();
        info!(subscriptions = dropped, "Playback context disposed");
    }

    // ===== Subscriptions =====

    /// Register an observer; it immediately receives the current snapshot
    pub fn subscribe(&mut self, observer: impl PlaybackObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        let mut observer: Box<dyn PlaybackObserver> = Box::new(observer);
        observer.on_snapshot(&self.snapshot);
        self.observers.push((id, observer));
        id
    }

    /// Remove an observer; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<PlaybackSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn liked(&self) -> &LikedStore {
        &self.liked
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // ===== Queue Intents =====

    pub fn enqueue(&mut self, track: impl Into<Arc<Track>>) {
        self.engine.enqueue(track.into());
        self.publish();
    }

    pub fn enqueue_all(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.engine.enqueue_all(tracks.into_iter().map(Arc::new));
        self.publish();
    }

    pub fn remove_from_queue(&mut self, index: usize) -> Result<Arc<Track>> {
        let removed = self.engine.remove_from_queue(index)?;
        self.publish();
        Ok(removed)
    }

    pub fn move_in_queue(&mut self, from: usize, to: usize) -> Result<()> {
        self.engine.move_in_queue(from, to)?;
        self.publish();
        Ok(())
    }

    pub fn clear_queue(&mut self) {
        self.engine.clear_queue();
        self.publish();
    }

    pub fn shuffle_upcoming(&mut self) {
        self.engine.shuffle_upcoming();
        self.publish();
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.engine.set_repeat(repeat);
        self.publish();
    }

    // ===== Playback Intents =====

    /// Load queue entry `index` and start resolving its stream
    pub fn play_index(&mut self, index: usize) -> Result<()> {
        let request = self.engine.play_index(index)?;
        self.begin_resolution(request);
        self.publish();
        Ok(())
    }

    pub fn play(&mut self) -> Result<()> {
        self.engine.play()?;
        self.publish();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.engine.pause()?;
        self.publish();
        Ok(())
    }

    pub fn toggle_play_pause(&mut self) -> Result<()> {
        self.engine.toggle_play_pause()?;
        self.publish();
        Ok(())
    }

    pub fn seek(&mut self, seconds: f64) -> Result<f64> {
        let position = self.engine.seek(seconds)?;
        self.publish();
        Ok(position)
    }

    pub fn stop(&mut self) {
        self.cancel_pending();
        self.engine.stop();
        self.publish();
    }

    pub fn next(&mut self) {
        match self.engine.next() {
            Some(request) => self.begin_resolution(request),
            None => self.cancel_pending(),
        }
        self.publish();
    }

    pub fn previous(&mut self) {
        if let Some(request) = self.engine.previous() {
            self.begin_resolution(request);
        }
        self.publish();
    }

    pub fn set_volume(&mut self, level: f32) {
        self.engine.set_volume(level);
        self.publish();
    }

    pub fn mute(&mut self) {
        self.engine.mute();
        self.publish();
    }

    pub fn unmute(&mut self) {
        self.engine.unmute();
        self.publish();
    }

    pub fn toggle_mute(&mut self) {
        self.engine.toggle_mute();
        self.publish();
    }

    /// Advance playback by `delta_secs` for the current generation
    pub fn tick(&mut self, delta_secs: f64) -> TickOutcome {
        let generation = self.engine.generation();
        self.tick_generation(generation, delta_secs)
    }

    /// Advance playback for a tick issued under `generation`
    pub fn tick_generation(&mut self, generation: Generation, delta_secs: f64) -> TickOutcome {
        let outcome = self.engine.tick(generation, delta_secs);
        match &outcome {
            TickOutcome::Stale => {
                debug!(%generation, "Dropped stale tick");
            }
            TickOutcome::Inactive => {}
            TickOutcome::Progressed => self.publish(),
            TickOutcome::Finished(request) => {
                if let Some(request) = request {
                    self.begin_resolution(request.clone());
                }
                self.publish();
            }
        }
        outcome
    }

    // ===== Liked Songs =====

    pub fn is_liked(&self, id: &TrackId) -> bool {
        self.liked.is_liked(id)
    }

    /// Toggle `id` in the liked set and persist it
    ///
    /// A `PersistenceFailure` is returned (and published as a notice) but the
    /// in-memory change stands.
    pub async fn toggle_like(&mut self, id: &TrackId) -> Result<bool> {
        let result = self.liked.toggle(id).await;

        self.pending_events.push(PlaybackEvent::LikedChanged {
            track_id: id.clone(),
            liked: self.liked.is_liked(id),
        });
        if let Err(e) = &result {
            self.push_notice(NoticeKind::PersistenceFailure, e.to_string());
        }

        self.publish();
        result
    }

    /// Toggle the current track in the liked set
    pub async fn toggle_like_current(&mut self) -> Result<bool> {
        let Some(id) = self.engine.current_track().map(|t| t.id.clone()) else {
            return Err(PlaybackError::InvalidTransition {
                intent: "like",
                status: self.engine.status(),
            });
        };
        self.toggle_like(&id).await
    }

    /// Persist the liked set again after a failure
    pub async fn retry_save_liked(&mut self) -> Result<()> {
        let result = self.liked.retry_save().await;
        if let Err(e) = &result {
            self.push_notice(NoticeKind::PersistenceFailure, e.to_string());
            self.publish();
        }
        result
    }

    // ===== Stream Resolution =====

    fn begin_resolution(&mut self, request: LoadRequest) {
        self.cancel_pending();

        let resolver = Arc::clone(&self.resolver);
        let tx = self.resolution_tx.clone();
        let generation = request.generation;
        let track_id = request.track.id.clone();

        debug!(track_id = %track_id, %generation, "Resolving stream source");

        let handle = tokio::spawn(async move {
            let result = resolver.resolve_stream_url(&track_id).await;
            // Receiver lives as long as the context
            let _ = tx.send(Resolution {
                generation,
                track_id,
                result,
            });
        });

        self.pending = Some((generation, handle));
    }

    fn cancel_pending(&mut self) {
        if let Some((generation, handle)) = self.pending.take() {
            if !handle.is_finished() {
                handle.abort();
                debug!(%generation, "Cancelled pending stream resolution");
            }
        }
    }

    /// Wait for the next resolution result
    pub async fn next_resolution(&mut self) -> Option<Resolution> {
        self.resolution_rx.recv().await
    }

    /// Apply a resolution result to the engine
    ///
    /// Returns `Ok(true)` when playback started, `Ok(false)` when the result
    /// was stale, and `StreamUnavailable` when the current load failed.
    pub fn apply_resolution(&mut self, resolution: Resolution) -> Result<bool> {
        let Resolution {
            generation,
            track_id,
            result,
        } = resolution;

        if self
            .pending
            .as_ref()
            .is_some_and(|(pending, _)| *pending == generation)
        {
            self.pending = None;
        }

        match result {
            Ok(url) => {
                let applied = self.engine.on_source_ready(generation, url);
                if applied {
                    info!(track_id = %track_id, "Stream source ready");
                    self.publish();
                }
                Ok(applied)
            }
            Err(e) => match self.engine.on_source_failed(generation, e) {
                Some(error) => {
                    self.publish();
                    Err(error)
                }
                None => Ok(false),
            },
        }
    }

    /// Wait until the current load resolves (or fails)
    ///
    /// Returns `Ok(false)` immediately when nothing is loading.
    pub async fn await_source(&mut self) -> Result<bool> {
        while self.engine.status() == PlaybackStatus::Loading {
            let Some(resolution) = self.resolution_rx.recv().await else {
                break;
            };
            if resolution.generation != self.engine.generation() {
                debug!(generation = %resolution.generation, "Dropped stale resolution");
                continue;
            }
            return self.apply_resolution(resolution);
        }
        Ok(false)
    }

    // ===== Run Loop =====

    /// Drive the context until `Intent::Shutdown` or the intent channel closes
    ///
    /// Serializes intents, stream resolutions and ticks onto one loop.
    pub async fn run(&mut self, mut intents: mpsc::Receiver<Intent>) {
        let period = Duration::from_millis(self.config.tick_interval_ms.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        info!(tick_ms = self.config.tick_interval_ms, "Playback loop started");

        loop {
            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(Intent::Shutdown) | None => break,
                    Some(intent) => self.handle_intent(intent).await,
                },
                Some(resolution) = self.resolution_rx.recv() => {
                    if let Err(e) = self.apply_resolution(resolution) {
                        debug!(error = %e, "Stream resolution failed");
                    }
                }
                now = ticker.tick() => {
                    let delta = now.duration_since(last_tick).as_secs_f64();
                    last_tick = now;
                    self.tick(delta);
                }
            }
        }

        info!("Playback loop stopped");
    }

    async fn handle_intent(&mut self, intent: Intent) {
        debug!(?intent, "Handling intent");

        let result = match intent {
            Intent::Play => self.play(),
            Intent::Pause => self.pause(),
            Intent::TogglePlayPause => self.toggle_play_pause(),
            Intent::Seek(seconds) => self.seek(seconds).map(|_| ()),
            Intent::Next => {
                self.next();
                Ok(())
            }
            Intent::Previous => {
                self.previous();
                Ok(())
            }
            Intent::Stop => {
                self.stop();
                Ok(())
            }
            Intent::PlayIndex(index) => self.play_index(index),
            Intent::Enqueue(track) => {
                self.enqueue(track);
                Ok(())
            }
            Intent::RemoveAt(index) => self.remove_from_queue(index).map(|_| ()),
            Intent::Move { from, to } => self.move_in_queue(from, to),
            Intent::ClearQueue => {
                self.clear_queue();
                Ok(())
            }
            Intent::ShuffleUpcoming => {
                self.shuffle_upcoming();
                Ok(())
            }
            Intent::SetRepeat(repeat) => {
                self.set_repeat(repeat);
                Ok(())
            }
            Intent::SetVolume(level) => {
                self.set_volume(level);
                Ok(())
            }
            Intent::ToggleMute => {
                self.toggle_mute();
                Ok(())
            }
            Intent::ToggleLike(id) => self.toggle_like(&id).await.map(|_| ()),
            Intent::ToggleLikeCurrent => self.toggle_like_current().await.map(|_| ()),
            Intent::RetrySaveLiked => self.retry_save_liked().await,
            Intent::Shutdown => Ok(()),
        };

        // Collaborator failures were already published as notices
        if let Err(e) = result {
            if !e.is_external() {
                warn!(error = %e, "Intent rejected");
                self.push_notice(NoticeKind::IntentRejected, e.to_string());
                self.publish();
            }
        }
    }

    // ===== Publishing =====

    fn push_notice(&mut self, kind: NoticeKind, message: String) {
        self.pending_events
            .push(PlaybackEvent::Notice { kind, message });
    }

    fn publish(&mut self) {
        let mut events = self.engine.drain_events();
        events.append(&mut self.pending_events);

        for event in &events {
            for (_, observer) in &mut self.observers {
                observer.on_event(event);
            }
        }

        self.snapshot = Arc::new(PlaybackSnapshot::capture(&self.engine, &self.liked));
        for (_, observer) in &mut self.observers {
            observer.on_snapshot(&self.snapshot);
        }
    }
}

impl Drop for PlaybackContext {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl std::fmt::Debug for PlaybackContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackContext")
            .field("engine", &self.engine)
            .field("liked", &self.liked)
            .field("subscribers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
