//! Liked-songs store
//!
//! Membership set of favorite track IDs, written through to an external
//! persistence collaborator on every mutation.

use crate::error::Result;
use crate::source::LikedPersistence;
use crate::types::TrackId;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Favorites set with write-through persistence
///
/// Membership is the invariant; `ids()` keeps insertion order for display.
/// Writes are serialized by the `&mut self` receiver of `toggle`: a second
/// write cannot start while the first is still awaiting the collaborator.
pub struct LikedStore {
    /// Liked IDs in insertion order
    order: Vec<TrackId>,

    /// Membership index over `order`
    members: HashSet<TrackId>,

    /// Copy of `order` handed out to snapshots, rebuilt on mutation
    shared: Arc<[TrackId]>,

    persistence: Arc<dyn LikedPersistence>,
}

impl LikedStore {
    /// Create an empty store
    pub fn new(persistence: Arc<dyn LikedPersistence>) -> Self {
        Self {
            order: Vec::new(),
            members: HashSet::new(),
            shared: Arc::from(Vec::new()),
            persistence,
        }
    }

    /// Replace contents with a persisted snapshot
    ///
    /// Duplicates are dropped. Nothing is written back.
    pub fn load_initial(&mut self, ids: impl IntoIterator<Item = TrackId>) {
        self.order.clear();
        self.members.clear();
        for id in ids {
            if self.members.insert(id.clone()) {
                self.order.push(id);
            }
        }
        self.shared = Arc::from(self.order.as_slice());
    }

    /// Fetch the last persisted snapshot and load it
    pub async fn load_from_persistence(&mut self) -> Result<usize> {
        let ids = self.persistence.load_liked().await?;
        self.load_initial(ids);
        debug!(count = self.order.len(), "Loaded liked songs");
        Ok(self.order.len())
    }

    pub fn is_liked(&self, id: &TrackId) -> bool {
        self.members.contains(id)
    }

    /// Add `id` if absent, remove it if present, then persist the full set
    ///
    /// Returns the new membership of `id`. On a failed write the in-memory
    /// change is kept and `PersistenceFailure` is returned; `retry_save`
    /// can be used later.
    pub async fn toggle(&mut self, id: &TrackId) -> Result<bool> {
        let liked = if self.members.remove(id) {
            self.order.retain(|existing| existing != id);
            false
        } else {
            self.members.insert(id.clone());
            self.order.push(id.clone());
            true
        };
        self.shared = Arc::from(self.order.as_slice());

        debug!(track_id = %id, liked, "Toggled liked song");

        if let Err(e) = self.persistence.save_liked(&self.order).await {
            warn!(track_id = %id, error = %e, "Liked songs not persisted");
            return Err(e);
        }

        Ok(liked)
    }

    /// Write the current set again (after a reported failure)
    pub async fn retry_save(&self) -> Result<()> {
        self.persistence.save_liked(&self.order).await
    }

    /// Liked IDs in insertion order
    pub fn ids(&self) -> &[TrackId] {
        &self.order
    }

    /// Liked IDs in insertion order, shared without copying
    pub fn shared_ids(&self) -> Arc<[TrackId]> {
        Arc::clone(&self.shared)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for LikedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LikedStore")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}
