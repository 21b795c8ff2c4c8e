//! Stream resolver backed by the Encore API

use crate::client::EncoreApiClient;
use async_trait::async_trait;
use encore_playback::{PlaybackError, StreamResolver, TrackId};
use tracing::warn;

/// Resolves stream URLs through `GET /api/tracks/{id}/stream`
///
/// Every client failure is reported as `StreamUnavailable` carrying the
/// client error message.
#[derive(Debug, Clone)]
pub struct HttpStreamResolver {
    client: EncoreApiClient,
}

impl HttpStreamResolver {
    pub fn new(client: EncoreApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &EncoreApiClient {
        &self.client
    }
}

#[async_trait]
impl StreamResolver for HttpStreamResolver {
    async fn resolve_stream_url(&self, track_id: &TrackId) -> encore_playback::Result<String> {
        match self.client.get_stream_url(track_id).await {
            Ok(stream) => Ok(stream.url),
            Err(e) => {
                warn!(track_id = %track_id, error = %e, "Stream URL request failed");
                Err(PlaybackError::stream_unavailable(track_id, e.to_string()))
            }
        }
    }
}
