//! Encore API Client
//!
//! HTTP client for the Encore streaming API, plus a [`StreamResolver`]
//! implementation that plugs it into the playback context.
//!
//! [`StreamResolver`]: encore_playback::StreamResolver
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_api_client::{ApiConfig, EncoreApiClient, HttpStreamResolver};
//! use encore_playback::{StreamResolver, TrackId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EncoreApiClient::new(ApiConfig::with_token(
//!     "https://api.encore.example",
//!     "access-token",
//! ))?;
//! let resolver = HttpStreamResolver::new(client);
//!
//! let url = resolver.resolve_stream_url(&TrackId::new("track-1")).await?;
//! println!("{url}");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod resolver;
mod types;

pub use client::EncoreApiClient;
pub use error::{ApiClientError, Result};
pub use resolver::HttpStreamResolver;
pub use types::{ApiConfig, StreamUrlResponse, DEFAULT_TIMEOUT_SECS};
