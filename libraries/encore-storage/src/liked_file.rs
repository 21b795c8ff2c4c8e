//! Liked songs stored as a JSON document on disk

use crate::error::{Result, StorageError};
use async_trait::async_trait;
use encore_playback::{LikedPersistence, TrackId};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Current document version
pub const DOCUMENT_VERSION: u32 = 1;

/// On-disk layout
#[derive(Debug, Serialize, Deserialize)]
struct LikedDocument {
    version: u32,
    track_ids: Vec<TrackId>,
}

/// Liked-songs persistence backed by a single JSON file
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous snapshot intact. A missing file
/// reads as an empty set.
#[derive(Debug, Clone)]
pub struct JsonFileLikedPersistence {
    path: PathBuf,
}

impl JsonFileLikedPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored IDs
    pub async fn read(&self) -> Result<Vec<TrackId>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No liked songs file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let document: LikedDocument = serde_json::from_slice(&bytes)?;
        if document.version != DOCUMENT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: document.version,
                supported: DOCUMENT_VERSION,
            });
        }

        debug!(
            path = %self.path.display(),
            count = document.track_ids.len(),
            "Read liked songs"
        );
        Ok(document.track_ids)
    }

    /// Replace the stored IDs atomically
    pub async fn write(&self, ids: &[TrackId]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let document = LikedDocument {
            version: DOCUMENT_VERSION,
            track_ids: ids.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&document)?;

        let temp_path = self.temp_path();
        if let Err(e) = write_synced(&temp_path, &bytes).await {
            discard(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            discard(&temp_path).await;
            return Err(e.into());
        }

        debug!(path = %self.path.display(), count = ids.len(), "Wrote liked songs");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("liked"), ToOwned::to_owned);
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

#[async_trait]
impl LikedPersistence for JsonFileLikedPersistence {
    async fn load_liked(&self) -> encore_playback::Result<Vec<TrackId>> {
        Ok(self.read().await?)
    }

    async fn save_liked(&self, ids: &[TrackId]) -> encore_playback::Result<()> {
        Ok(self.write(ids).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_a_sibling() {
        let store = JsonFileLikedPersistence::new("/data/encore/liked.json");
        assert_eq!(
            store.temp_path(),
            PathBuf::from("/data/encore/liked.json.tmp")
        );
    }

    #[test]
    fn document_layout() {
        let document = LikedDocument {
            version: DOCUMENT_VERSION,
            track_ids: vec![TrackId::new("a")],
        };
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json, serde_json::json!({ "version": 1, "track_ids": ["a"] }));
    }
}
