//! Encore API client.

use crate::error::{ApiClientError, Result};
use crate::types::{ApiConfig, StreamUrlResponse};
use encore_playback::TrackId;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Client for the Encore streaming API.
///
/// # Example
///
/// ```ignore
/// use encore_api_client::{ApiConfig, EncoreApiClient};
///
/// let client = EncoreApiClient::new(ApiConfig::with_token("https://api.encore.example", "token"))?;
/// let stream = client.get_stream_url(&"track-1".into()).await?;
/// println!("Streaming from {} ({}s)", stream.url, stream.expires_in);
/// ```
#[derive(Debug, Clone)]
pub struct EncoreApiClient {
    http: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl EncoreApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(ApiClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url =
            Url::parse(config.url.trim()).map_err(|e| ApiClientError::InvalidUrl(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Encore/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            access_token: config.access_token.filter(|token| !token.is_empty()),
        })
    }

    /// Base URL requests are made against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check if the client has an access token.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Get a streaming URL for a track.
    pub async fn get_stream_url(&self, track_id: &TrackId) -> Result<StreamUrlResponse> {
        let url = self.endpoint(&["api", "tracks", track_id.as_str(), "stream"])?;
        debug!(url = %url, track_id = %track_id, "Getting stream URL");

        let mut request = self.http.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ApiClientError::ServerUnreachable(e.to_string())
            } else {
                ApiClientError::Request(e)
            }
        })?;

        let status = response.status();

        if status.is_success() {
            let stream_info: StreamUrlResponse = response.json().await.map_err(|e| {
                ApiClientError::ParseError(format!("Failed to parse stream response: {}", e))
            })?;

            debug!(track_id = %track_id, expires_in = stream_info.expires_in, "Stream URL issued");
            Ok(stream_info)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ApiClientError::AuthRequired)
        } else if status == StatusCode::NOT_FOUND {
            Err(ApiClientError::TrackNotFound(track_id.to_string()))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ApiClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
