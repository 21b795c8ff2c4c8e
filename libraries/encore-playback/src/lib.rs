//! Encore - Playback Core
//!
//! Client-side playback state for Encore.
//!
//! This crate provides:
//! - Playback state machine (Idle, Loading, Playing, Paused, Ended)
//! - Play queue with a cursor, repeat and upcoming-only shuffle
//! - Liked-songs store with write-through persistence
//! - Tick-driven elapsed time with end-of-track auto-advance
//! - Time formatting for progress display
//! - Playback context that publishes snapshots to subscribers
//!
//! # Architecture
//!
//! `encore-playback` decodes no audio and performs no I/O of its own:
//! - Stream URLs come from a [`StreamResolver`]
//! - Liked songs are stored through a [`LikedPersistence`]
//! - Rendering surfaces subscribe to [`PlaybackSnapshot`]s
//!
//! Every load is tagged with a [`Generation`]. Ticks and stream resolutions
//! carrying an older generation are dropped.
//!
//! # Example: Driving the Engine
//!
//! ```rust
//! use encore_playback::{PlaybackEngine, PlaybackStatus, TickOutcome, Track};
//! use std::sync::Arc;
//!
//! let mut engine = PlaybackEngine::default();
//! engine.enqueue(Arc::new(Track::new("a", "Intro", "Artist").with_duration(180)));
//!
//! // Entering Loading hands back a request for the stream source
//! let request = engine.play_index(0).unwrap();
//! assert_eq!(engine.status(), PlaybackStatus::Loading);
//!
//! // Platform resolved the stream URL
//! engine.on_source_ready(request.generation, "https://cdn.example/a".into());
//! assert_eq!(engine.status(), PlaybackStatus::Playing);
//!
//! // Advance time
//! let outcome = engine.tick(request.generation, 1.5);
//! assert!(matches!(outcome, TickOutcome::Progressed));
//! assert_eq!(encore_playback::format_elapsed(engine.elapsed()), "0:01");
//! ```
//!
//! # Example: Playback Context
//!
//! ```rust,no_run
//! use encore_playback::{
//!     MemoryLikedPersistence, MemoryStreamResolver, PlaybackConfig, PlaybackContext, Track,
//!     TrackId,
//! };
//! use std::sync::Arc;
//!
//! # async fn demo() -> encore_playback::Result<()> {
//! let resolver: MemoryStreamResolver = [(TrackId::new("a"), "https://cdn.example/a".to_string())]
//!     .into_iter()
//!     .collect();
//!
//! let mut context = PlaybackContext::init(
//!     PlaybackConfig::default(),
//!     Arc::new(resolver),
//!     Arc::new(MemoryLikedPersistence::new()),
//! )
//! .await?;
//!
//! context.subscribe(|snapshot: &Arc<encore_playback::PlaybackSnapshot>| {
//!     println!("{} {}", snapshot.status, snapshot.progress_line());
//! });
//!
//! context.enqueue(Track::new("a", "Intro", "Artist").with_duration(180));
//! context.play_index(0)?;
//! context.await_source().await?;
//! context.tick(1.0);
//! # Ok(())
//! # }
//! ```

mod context;
mod engine;
mod error;
mod events;
pub mod format;
mod liked;
mod queue;
mod snapshot;
mod source;
pub mod types;
mod volume;

// Public exports
pub use context::{Intent, PlaybackContext, PlaybackObserver, Resolution, SubscriptionId};
pub use engine::{LoadRequest, PlaybackEngine, TickOutcome};
pub use error::{PlaybackError, Result};
pub use events::{NoticeKind, PlaybackEvent};
pub use format::{format_elapsed, format_time, parse_time, progress_percent};
pub use liked::LikedStore;
pub use queue::Queue;
pub use snapshot::PlaybackSnapshot;
pub use source::{LikedPersistence, MemoryLikedPersistence, MemoryStreamResolver, StreamResolver};
pub use types::{Generation, PlaybackConfig, PlaybackStatus, RepeatMode, Track, TrackId};
pub use volume::Volume;
