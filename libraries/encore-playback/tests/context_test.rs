//! Integration tests for the playback context
//!
//! Drive the context the way a rendering surface does: intents in,
//! snapshots and events out.

use encore_playback::{
    Intent, MemoryLikedPersistence, MemoryStreamResolver, NoticeKind, PlaybackConfig,
    PlaybackContext, PlaybackError, PlaybackEvent, PlaybackObserver, PlaybackSnapshot,
    PlaybackStatus, Resolution, TickOutcome, Track, TrackId,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// ===== Test Helpers =====

fn track_a() -> Track {
    Track::new("a", "Opening", "First Artist").with_duration(180)
}

fn track_b() -> Track {
    Track::new("b", "Second", "Second Artist").with_duration(200)
}

fn resolver_for(ids: &[&str]) -> Arc<MemoryStreamResolver> {
    Arc::new(
        ids.iter()
            .map(|id| (TrackId::new(*id), format!("https://cdn.example/{id}")))
            .collect(),
    )
}

fn context_with(ids: &[&str], persistence: Arc<MemoryLikedPersistence>) -> PlaybackContext {
    PlaybackContext::new(PlaybackConfig::default(), resolver_for(ids), persistence)
}

/// Observer recording everything it receives
#[derive(Clone, Default)]
struct Recorder {
    snapshots: Arc<Mutex<Vec<Arc<PlaybackSnapshot>>>>,
    events: Arc<Mutex<Vec<PlaybackEvent>>>,
}

impl Recorder {
    fn snapshot_count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    fn last_snapshot(&self) -> Arc<PlaybackSnapshot> {
        Arc::clone(self.snapshots.lock().unwrap().last().unwrap())
    }

    fn events(&self) -> Vec<PlaybackEvent> {
        self.events.lock().unwrap().clone()
    }

    fn notices(&self, kind: NoticeKind) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, PlaybackEvent::Notice { kind: k, .. } if *k == kind))
            .count()
    }
}

impl PlaybackObserver for Recorder {
    fn on_snapshot(&mut self, snapshot: &Arc<PlaybackSnapshot>) {
        self.snapshots.lock().unwrap().push(Arc::clone(snapshot));
    }

    fn on_event(&mut self, event: &PlaybackEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ===== Lifecycle =====

#[tokio::test]
async fn init_loads_persisted_liked_songs() {
    let persistence = Arc::new(MemoryLikedPersistence::with_ids(vec![
        TrackId::new("a"),
        TrackId::new("c"),
    ]));

    let context = PlaybackContext::init(
        PlaybackConfig::default(),
        resolver_for(&["a"]),
        persistence.clone(),
    )
    .await
    .unwrap();

    assert!(context.is_liked(&TrackId::new("a")));
    assert!(!context.is_liked(&TrackId::new("b")));
    assert_eq!(context.snapshot().liked.len(), 2);
    assert_eq!(context.snapshot().status, PlaybackStatus::Idle);
    // Loading never writes back
    assert_eq!(persistence.write_count(), 0);
}

#[tokio::test]
async fn dispose_with_pending_resolution() {
    let mut context = context_with(&["a"], Arc::new(MemoryLikedPersistence::new()));
    let recorder = Recorder::default();
    context.subscribe(recorder.clone());

    context.enqueue(track_a());
    context.play_index(0).unwrap();
    assert_eq!(context.engine().status(), PlaybackStatus::Loading);

    let delivered = recorder.snapshot_count();
    context.dispose();

    // Disposing publishes nothing further
    assert_eq!(recorder.snapshot_count(), delivered);
}

// ===== Subscriptions =====

#[tokio::test]
async fn subscribe_delivers_current_snapshot_immediately() {
    let mut context = context_with(&[], Arc::new(MemoryLikedPersistence::new()));
    let recorder = Recorder::default();

    context.subscribe(recorder.clone());

    assert_eq!(recorder.snapshot_count(), 1);
    assert_eq!(recorder.last_snapshot().status, PlaybackStatus::Idle);
}

#[tokio::test]
async fn unsubscribe_stops_delivery() {
    let mut context = context_with(&[], Arc::new(MemoryLikedPersistence::new()));
    let recorder = Recorder::default();

    let id = context.subscribe(recorder.clone());
    context.enqueue(track_a());
    assert_eq!(recorder.snapshot_count(), 2);

    assert!(context.unsubscribe(id));
    assert!(!context.unsubscribe(id));
    assert_eq!(context.subscriber_count(), 0);

    context.enqueue(track_b());
    assert_eq!(recorder.snapshot_count(), 2);
}

#[tokio::test]
async fn closures_can_subscribe() {
    let mut context = context_with(&[], Arc::new(MemoryLikedPersistence::new()));
    let lengths = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&lengths);
    context.subscribe(move |snapshot: &Arc<PlaybackSnapshot>| {
        sink.lock().unwrap().push(snapshot.queue.len());
    });

    context.enqueue_all(vec![track_a(), track_b()]);

    assert_eq!(*lengths.lock().unwrap(), vec![0, 2]);
}

#[tokio::test]
async fn events_arrive_before_their_snapshot() {
    let mut context = context_with(&["a"], Arc::new(MemoryLikedPersistence::new()));
    let recorder = Recorder::default();
    context.subscribe(recorder.clone());

    context.enqueue(track_a());
    context.play_index(0).unwrap();

    let events = recorder.events();
    assert!(events.iter().any(|event| matches!(
        event,
        PlaybackEvent::TrackChanged { track_id, previous_track_id: None } if track_id.as_str() == "a"
    )));
    assert!(events.contains(&PlaybackEvent::StateChanged {
        status: PlaybackStatus::Loading
    }));
    assert_eq!(recorder.last_snapshot().status, PlaybackStatus::Loading);
}

// ===== Playback Scenarios =====

#[tokio::test]
async fn track_end_advances_to_next_entry() {
    let mut context = context_with(&["a", "b"], Arc::new(MemoryLikedPersistence::new()));
    let recorder = Recorder::default();
    context.subscribe(recorder.clone());

    context.enqueue_all(vec![track_a(), track_b()]);
    context.play_index(0).unwrap();
    assert!(context.await_source().await.unwrap());
    assert_eq!(context.engine().status(), PlaybackStatus::Playing);

    context.seek(179.0).unwrap();
    let outcome = context.tick(2.0);

    let TickOutcome::Finished(Some(request)) = outcome else {
        panic!("expected the queue to advance to the next entry");
    };
    assert_eq!(request.track.id.as_str(), "b");
    assert!(recorder.events().contains(&PlaybackEvent::TrackFinished {
        track_id: TrackId::new("a")
    }));
    assert!(recorder.events().contains(&PlaybackEvent::StateChanged {
        status: PlaybackStatus::Ended
    }));

    let snapshot = context.snapshot();
    assert_eq!(snapshot.status, PlaybackStatus::Loading);
    assert_eq!(snapshot.cursor, Some(1));
    assert_eq!(snapshot.elapsed_secs, 0.0);

    assert!(context.await_source().await.unwrap());
    assert_eq!(context.snapshot().stream_url.as_deref(), Some("https://cdn.example/b"));
}

#[tokio::test]
async fn seek_clamps_to_duration() {
    let mut context = context_with(&["b"], Arc::new(MemoryLikedPersistence::new()));
    context.enqueue(track_b());
    context.play_index(0).unwrap();
    context.await_source().await.unwrap();

    assert_eq!(context.seek(500.0).unwrap(), 200.0);
    assert_eq!(context.snapshot().elapsed_display, "3:20");
    assert_eq!(context.snapshot().progress_percent, 100.0);
}

#[tokio::test]
async fn pause_while_idle_is_rejected() {
    let mut context = context_with(&[], Arc::new(MemoryLikedPersistence::new()));
    let recorder = Recorder::default();
    context.subscribe(recorder.clone());

    let result = context.pause();

    assert!(matches!(
        result,
        Err(PlaybackError::InvalidTransition { intent: "pause", .. })
    ));
    assert_eq!(context.engine().status(), PlaybackStatus::Idle);
    assert_eq!(recorder.snapshot_count(), 1);
}

#[tokio::test]
async fn intents_during_loading_are_not_ready() {
    let mut context = context_with(&["a"], Arc::new(MemoryLikedPersistence::new()));
    context.enqueue(track_a());
    context.play_index(0).unwrap();

    assert!(matches!(context.play(), Err(PlaybackError::NotReady { .. })));
    assert!(matches!(context.pause(), Err(PlaybackError::NotReady { .. })));
    assert!(matches!(context.seek(10.0), Err(PlaybackError::NotReady { .. })));
    assert_eq!(context.engine().status(), PlaybackStatus::Loading);
}

#[tokio::test]
async fn removing_playing_entry_keeps_playing() {
    let mut context = context_with(&["a", "b"], Arc::new(MemoryLikedPersistence::new()));
    context.enqueue_all(vec![track_a(), track_b()]);
    context.play_index(0).unwrap();
    context.await_source().await.unwrap();

    let removed = context.remove_from_queue(0).unwrap();
    assert_eq!(removed.id.as_str(), "a");
    assert_eq!(context.engine().status(), PlaybackStatus::Playing);
    assert_eq!(context.snapshot().track.as_ref().unwrap().id.as_str(), "a");

    context.seek(180.0).unwrap();
    context.tick(0.5);

    // The entry that slid into the cursor slot plays next
    let snapshot = context.snapshot();
    assert_eq!(snapshot.status, PlaybackStatus::Loading);
    assert_eq!(snapshot.track.as_ref().unwrap().id.as_str(), "b");
    assert_eq!(snapshot.cursor, Some(0));
}

#[tokio::test]
async fn next_past_last_entry_stops() {
    let mut context = context_with(&["a"], Arc::new(MemoryLikedPersistence::new()));
    context.enqueue(track_a());
    context.play_index(0).unwrap();
    context.await_source().await.unwrap();

    context.next();

    let snapshot = context.snapshot();
    assert_eq!(snapshot.status, PlaybackStatus::Idle);
    assert!(snapshot.track.is_none());
    assert_eq!(snapshot.cursor, None);
}

// ===== Stream Resolution =====

#[tokio::test]
async fn unavailable_stream_goes_idle_with_notice() {
    let mut context = context_with(&[], Arc::new(MemoryLikedPersistence::new()));
    let recorder = Recorder::default();
    context.subscribe(recorder.clone());

    context.enqueue(track_a());
    context.play_index(0).unwrap();
    let result = context.await_source().await;

    assert!(matches!(result, Err(PlaybackError::StreamUnavailable { .. })));
    assert_eq!(context.engine().status(), PlaybackStatus::Idle);
    assert_eq!(recorder.notices(NoticeKind::StreamUnavailable), 1);

    // Queue survives the failure
    assert_eq!(context.snapshot().queue.len(), 1);
}

#[tokio::test]
async fn stale_resolution_is_ignored() {
    let mut context = context_with(&["a", "b"], Arc::new(MemoryLikedPersistence::new()));
    context.enqueue_all(vec![track_a(), track_b()]);

    context.play_index(0).unwrap();
    let superseded = context.engine().generation();
    context.play_index(1).unwrap();

    let applied = context
        .apply_resolution(Resolution {
            generation: superseded,
            track_id: TrackId::new("a"),
            result: Ok("https://cdn.example/a".to_string()),
        })
        .unwrap();
    assert!(!applied);
    assert_eq!(context.engine().status(), PlaybackStatus::Loading);

    assert!(context.await_source().await.unwrap());
    assert_eq!(context.engine().stream_url(), Some("https://cdn.example/b"));
}

#[tokio::test]
async fn stale_failure_is_ignored() {
    let mut context = context_with(&["b"], Arc::new(MemoryLikedPersistence::new()));
    context.enqueue_all(vec![track_a(), track_b()]);

    context.play_index(0).unwrap();
    let superseded = context.engine().generation();
    context.play_index(1).unwrap();

    let applied = context.apply_resolution(Resolution {
        generation: superseded,
        track_id: TrackId::new("a"),
        result: Err(PlaybackError::stream_unavailable(&TrackId::new("a"), "gone")),
    });
    assert!(matches!(applied, Ok(false)));
    assert_eq!(context.engine().status(), PlaybackStatus::Loading);
}

#[tokio::test]
async fn await_source_when_nothing_is_loading() {
    let mut context = context_with(&[], Arc::new(MemoryLikedPersistence::new()));
    assert!(!context.await_source().await.unwrap());
}

// ===== Liked Songs =====

#[tokio::test]
async fn double_toggle_restores_membership() {
    let persistence = Arc::new(MemoryLikedPersistence::new());
    let mut context = context_with(&[], Arc::clone(&persistence));
    let id = TrackId::new("x");

    assert!(context.toggle_like(&id).await.unwrap());
    assert!(!context.toggle_like(&id).await.unwrap());

    assert!(!context.is_liked(&id));
    assert!(persistence.stored().is_empty());
    assert_eq!(persistence.write_count(), 2);
}

#[tokio::test]
async fn persistence_failure_keeps_like() {
    let persistence = Arc::new(MemoryLikedPersistence::new());
    persistence.set_fail_writes(true);
    let mut context = context_with(&[], Arc::clone(&persistence));
    let recorder = Recorder::default();
    context.subscribe(recorder.clone());
    let id = TrackId::new("x");

    let result = context.toggle_like(&id).await;

    assert!(matches!(result, Err(PlaybackError::PersistenceFailure(_))));
    assert!(context.is_liked(&id));
    assert!(recorder.last_snapshot().is_liked(&id));
    assert_eq!(recorder.notices(NoticeKind::PersistenceFailure), 1);
    assert!(recorder.events().contains(&PlaybackEvent::LikedChanged {
        track_id: id.clone(),
        liked: true
    }));

    // Retry once the store recovers
    persistence.set_fail_writes(false);
    context.retry_save_liked().await.unwrap();
    assert_eq!(persistence.stored(), vec![id]);
}

#[tokio::test]
async fn like_current_requires_a_track() {
    let mut context = context_with(&["a"], Arc::new(MemoryLikedPersistence::new()));

    assert!(matches!(
        context.toggle_like_current().await,
        Err(PlaybackError::InvalidTransition { intent: "like", .. })
    ));

    context.enqueue(track_a());
    context.play_index(0).unwrap();
    assert!(context.toggle_like_current().await.unwrap());
    assert!(context.snapshot().current_liked);
}

#[tokio::test]
async fn queue_and_liked_are_independent() {
    let mut context = context_with(&["a"], Arc::new(MemoryLikedPersistence::new()));
    context.enqueue(track_a());
    context.toggle_like(&TrackId::new("a")).await.unwrap();

    context.remove_from_queue(0).unwrap();
    assert!(context.is_liked(&TrackId::new("a")));

    context.toggle_like(&TrackId::new("a")).await.unwrap();
    context.enqueue(track_a());
    assert_eq!(context.snapshot().queue.len(), 1);
}

// ===== Run Loop =====

#[tokio::test(start_paused = true)]
async fn run_loop_plays_and_ticks() {
    let mut context = context_with(&["a"], Arc::new(MemoryLikedPersistence::new()));
    let recorder = Recorder::default();
    context.subscribe(recorder.clone());

    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(async move {
        context.run(rx).await;
        context
    });

    tx.send(Intent::Enqueue(track_a())).await.unwrap();
    tx.send(Intent::PlayIndex(0)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    tx.send(Intent::Shutdown).await.unwrap();

    let context = handle.await.unwrap();
    assert_eq!(context.engine().status(), PlaybackStatus::Playing);
    assert!(context.engine().elapsed() > 1.0);
    assert!(context.engine().elapsed() < 3.0);
    assert!(recorder
        .events()
        .iter()
        .any(|event| matches!(event, PlaybackEvent::PositionUpdate { .. })));
}

#[tokio::test(start_paused = true)]
async fn run_loop_reports_rejected_intents() {
    let mut context = context_with(&[], Arc::new(MemoryLikedPersistence::new()));
    let recorder = Recorder::default();
    context.subscribe(recorder.clone());

    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(async move {
        context.run(rx).await;
        context
    });

    tx.send(Intent::Pause).await.unwrap();
    tx.send(Intent::PlayIndex(3)).await.unwrap();
    drop(tx);

    let context = handle.await.unwrap();
    assert_eq!(context.engine().status(), PlaybackStatus::Idle);
    assert_eq!(recorder.notices(NoticeKind::IntentRejected), 2);
}
