//! Encore Storage
//!
//! File-backed persistence for the liked-songs set.
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_storage::JsonFileLikedPersistence;
//! use encore_playback::TrackId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JsonFileLikedPersistence::new("liked.json");
//! store.write(&[TrackId::new("track-1")]).await?;
//!
//! let ids = store.read().await?;
//! assert_eq!(ids.len(), 1);
//! # Ok(())
//! # }
//! ```

mod error;
mod liked_file;

pub use error::{Result, StorageError};
pub use liked_file::{JsonFileLikedPersistence, DOCUMENT_VERSION};
