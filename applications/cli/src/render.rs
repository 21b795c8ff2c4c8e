//! Terminal rendering of playback state through tracing

use encore_playback::{
    format_time, Generation, PlaybackEvent, PlaybackObserver, PlaybackSnapshot, PlaybackStatus,
};
use std::fmt::Write;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Observer that logs playback progress and keeps the latest snapshot
/// available to the input loop
pub struct TracingRenderer {
    latest: watch::Sender<Arc<PlaybackSnapshot>>,
    announced: Option<Generation>,
}

impl TracingRenderer {
    pub fn new(latest: watch::Sender<Arc<PlaybackSnapshot>>) -> Self {
        Self {
            latest,
            announced: None,
        }
    }
}

impl PlaybackObserver for TracingRenderer {
    fn on_snapshot(&mut self, snapshot: &Arc<PlaybackSnapshot>) {
        // Announce each load once it starts playing
        if snapshot.status == PlaybackStatus::Playing && self.announced != Some(snapshot.generation)
        {
            if let Some(track) = &snapshot.track {
                info!(
                    track_id = %track.id,
                    duration = snapshot.duration_display.as_deref().unwrap_or("--:--"),
                    liked = snapshot.current_liked,
                    "Now playing: {} - {}",
                    track.title,
                    track.artist_line()
                );
            }
            self.announced = Some(snapshot.generation);
        }

        self.latest.send_replace(Arc::clone(snapshot));
    }

    fn on_event(&mut self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::PositionUpdate {
                position_secs,
                duration_secs,
            } => {
                let duration = duration_secs
                    .map(|d| format_time(u64::from(d)))
                    .unwrap_or_else(|| "--:--".to_string());
                info!("{} / {}", format_time(*position_secs), duration);
            }
            PlaybackEvent::StateChanged { status } => debug!(%status, "Status changed"),
            PlaybackEvent::TrackChanged { track_id, .. } => {
                debug!(track_id = %track_id, "Loading track");
            }
            PlaybackEvent::TrackFinished { track_id } => {
                info!(track_id = %track_id, "Track finished");
            }
            PlaybackEvent::VolumeChanged { level, is_muted } => {
                info!(volume = level, muted = is_muted, "Volume changed");
            }
            PlaybackEvent::QueueChanged { length, cursor } => {
                debug!(length, cursor = ?cursor, "Queue changed");
            }
            PlaybackEvent::LikedChanged { track_id, liked } => {
                info!(track_id = %track_id, liked, "Liked songs updated");
            }
            PlaybackEvent::Notice { kind, message } => {
                warn!(kind = ?kind, "{}", message);
            }
        }
    }
}

/// Multi-line description of a snapshot for the `status` command
pub fn status_report(snapshot: &PlaybackSnapshot) -> String {
    let mut report = String::new();

    match &snapshot.track {
        Some(track) => {
            let _ = writeln!(
                report,
                "{} {} - {}{}",
                snapshot.status,
                track.title,
                track.artist_line(),
                if snapshot.current_liked { " [liked]" } else { "" }
            );
            let _ = writeln!(
                report,
                "  {} ({:.0}%)",
                snapshot.progress_line(),
                snapshot.progress_percent
            );
        }
        None => {
            let _ = writeln!(report, "{}", snapshot.status);
        }
    }

    let volume = if snapshot.muted {
        "muted".to_string()
    } else {
        format!("{:.0}%", snapshot.volume * 100.0)
    };
    let _ = writeln!(report, "  volume {volume}, repeat {:?}", snapshot.repeat);

    for (index, track) in snapshot.queue.iter().enumerate() {
        let marker = if snapshot.cursor == Some(index) { '>' } else { ' ' };
        let _ = writeln!(report, "  {marker} {:>2}. {}", index + 1, track.title);
    }

    report
}
