use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{RequestBuilder, Response, StatusCode};
use tokio::sync::Mutex;

use crate::spotify_rs::auth::{RefreshTokenError, refresh_access_token};
use crate::spotify_rs::types::{
    AddTracksRequest, PlaylistTracksPage, RemoveTracksRequest, SearchTracksResponse,
    SpotifyTrack, TrackUri,
};

pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const SPOTIFY_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Spotify rejects playlist mutations with more items than this
const MAX_TRACKS_PER_REQUEST: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Refresh this long before Spotify says the token expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SpotifyApiError {
    #[error("Failed to refresh access token: {0}")]
    Auth(#[from] RefreshTokenError),
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Invalid status code {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
    #[error("Could not find track: {0}")]
    TrackNotFound(String),
}

#[derive(Debug)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Spotify Web API client authenticated with a long-lived refresh token.
///
/// Clones share the cached access token.
#[derive(Clone)]
pub struct SpotifyClient {
    api_url: String,
    accounts_url: String,
    market: String,
    credentials: SpotifyCredentials,
    client: reqwest::Client,
    token: Arc<Mutex<Option<AccessToken>>>,
}

impl SpotifyClient {
    pub fn new(credentials: SpotifyCredentials, market: impl Into<String>) -> Self {
        Self::with_base_urls(SPOTIFY_API_URL, SPOTIFY_ACCOUNTS_URL, credentials, market)
    }

    pub fn with_base_urls(
        api_url: impl Into<String>,
        accounts_url: impl Into<String>,
        credentials: SpotifyCredentials,
        market: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            accounts_url: accounts_url.into(),
            market: market.into(),
            credentials,
            client: reqwest::Client::new(),
            token: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the cached access token, refreshing it first if it is missing
    /// or about to expire.
    async fn access_token(&self) -> Result<String, SpotifyApiError> {
        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref() {
            if Instant::now() < current.expires_at {
                return Ok(current.value.clone());
            }
        }

        let response = refresh_access_token(
            &self.client,
            &format!("{}/api/token", self.accounts_url),
            &self.credentials.client_id,
            &self.credentials.client_secret,
            &self.credentials.refresh_token,
        )
        .await?;

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *token = Some(AccessToken {
            value: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }

    async fn invalidate_token(&self) {
        self.token.lock().await.take();
    }

    /// Sends an authorized request. A 401 drops the cached token and the
    /// request is retried once with a freshly refreshed one.
    async fn send<F>(&self, build: F) -> Result<Response, SpotifyApiError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let mut retried = false;
        loop {
            let token = self.access_token().await?;
            let response = build(&self.client)
                .bearer_auth(&token)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await
                .map_err(SpotifyApiError::FailedToSendRequest)?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !retried {
                log::debug!("Spotify rejected access token, refreshing");
                self.invalidate_token().await;
                retried = true;
                continue;
            }

            if !status.is_success() {
                return Err(SpotifyApiError::Status {
                    status,
                    body: response
                        .text()
                        .await
                        .unwrap_or("Failed to get error text".to_string()),
                });
            }

            return Ok(response);
        }
    }

    /// Search for the best matching track for a song title and its artists
    pub async fn search_track(
        &self,
        name: &str,
        artists: &[String],
    ) -> Result<SpotifyTrack, SpotifyApiError> {
        let query = format!("{} {}", name, artists.join(", "));
        let response = self
            .send(|client| {
                client.get(format!("{}/search", self.api_url)).query(&[
                    ("q", query.as_str()),
                    ("type", "track"),
                    ("market", self.market.as_str()),
                    ("limit", "1"),
                ])
            })
            .await?;

        let search: SearchTracksResponse = response
            .json()
            .await
            .map_err(SpotifyApiError::FailedToParseResponse)?;

        search
            .tracks
            .items
            .into_iter()
            .next()
            .ok_or(SpotifyApiError::TrackNotFound(query))
    }

    /// Get all tracks in a playlist, in playlist order
    pub async fn get_playlist_tracks(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<SpotifyTrack>, SpotifyApiError> {
        let mut all_tracks = Vec::new();
        let mut next_url = Some(format!(
            "{}/playlists/{}/tracks?fields=items(track(uri,name)),next&limit=100",
            self.api_url, playlist_id
        ));

        while let Some(url) = next_url {
            let response = self.send(|client| client.get(&url)).await?;
            let page: PlaylistTracksPage = response
                .json()
                .await
                .map_err(SpotifyApiError::FailedToParseResponse)?;

            all_tracks.extend(page.items.into_iter().filter_map(|item| item.track));
            next_url = page.next;
        }

        Ok(all_tracks)
    }

    /// Append tracks to the end of a playlist, keeping their order
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyApiError> {
        let url = format!("{}/playlists/{}/tracks", self.api_url, playlist_id);
        for chunk in uris.chunks(MAX_TRACKS_PER_REQUEST) {
            let body = AddTracksRequest { uris: chunk };
            self.send(|client| client.post(&url).json(&body)).await?;
        }
        Ok(())
    }

    /// Remove every occurrence of the given tracks from a playlist
    pub async fn remove_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyApiError> {
        let url = format!("{}/playlists/{}/tracks", self.api_url, playlist_id);
        for chunk in uris.chunks(MAX_TRACKS_PER_REQUEST) {
            let body = RemoveTracksRequest {
                tracks: chunk.iter().map(|uri| TrackUri { uri }).collect(),
            };
            self.send(|client| client.delete(&url).json(&body)).await?;
        }
        Ok(())
    }
}
