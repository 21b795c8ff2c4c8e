//! Playlist files
//!
//! A playlist is a JSON document listing tracks, optionally with a direct
//! stream URL per track:
//!
//! ```json
//! {
//!   "name": "Evening",
//!   "tracks": [
//!     { "id": "t1", "title": "Intro", "artists": ["Someone"], "duration_secs": 95,
//!       "stream_url": "https://cdn.example/t1.mp3" }
//!   ]
//! }
//! ```
//!
//! A bare array of tracks is accepted too.

use crate::error::{CliError, Result};
use encore_playback::{MemoryStreamResolver, Track};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistEntry {
    #[serde(flatten)]
    pub track: Track,

    /// Direct stream URL, used when no streaming API is configured
    #[serde(default)]
    pub stream_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    pub name: Option<String>,
    pub entries: Vec<PlaylistEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlaylistDocument {
    Named {
        #[serde(default)]
        name: Option<String>,
        tracks: Vec<PlaylistEntry>,
    },
    Bare(Vec<PlaylistEntry>),
}

impl Playlist {
    /// Parse a playlist document
    pub fn parse(json: &str) -> Result<Self> {
        let playlist = match serde_json::from_str(json)? {
            PlaylistDocument::Named { name, tracks } => Self {
                name,
                entries: tracks,
            },
            PlaylistDocument::Bare(entries) => Self {
                name: None,
                entries,
            },
        };

        if playlist.entries.is_empty() {
            return Err(CliError::Playlist("playlist has no tracks".to_string()));
        }

        Ok(playlist)
    }

    /// Read and parse a playlist file
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        let playlist = Self::parse(&json)?;
        debug!(
            path = %path.display(),
            tracks = playlist.entries.len(),
            "Loaded playlist"
        );
        Ok(playlist)
    }

    pub fn tracks(&self) -> impl Iterator<Item = Track> + '_ {
        self.entries.iter().map(|entry| entry.track.clone())
    }

    /// Resolver serving the stream URLs listed in the file
    pub fn stream_resolver(&self) -> MemoryStreamResolver {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry
                    .stream_url
                    .as_ref()
                    .map(|url| (entry.track.id.clone(), url.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
