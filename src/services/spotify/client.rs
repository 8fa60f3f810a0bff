use color_eyre::eyre::{Result, WrapErr};
use tokio_util::sync::CancellationToken;

use crate::ports::spotify::{PlaylistStore, PlaylistTrack, SongResolver};
use crate::services::cancellable;
use crate::spotify_rs::client::SpotifyClient;
use crate::spotify_rs::types::SpotifyTrack;

/// Adapts the Spotify Web API client to the resolver and playlist ports.
///
/// Cheap to clone; clones share one access token.
#[derive(Clone)]
pub struct SpotifyHttpAdapter {
    client: SpotifyClient,
}

impl SpotifyHttpAdapter {
    pub fn new(client: SpotifyClient) -> Self {
        Self { client }
    }
}

impl From<SpotifyTrack> for PlaylistTrack {
    fn from(track: SpotifyTrack) -> Self {
        Self {
            uri: track.uri,
            name: track.name,
        }
    }
}

#[async_trait::async_trait]
impl SongResolver for SpotifyHttpAdapter {
    #[tracing::instrument(skip(self, cancel))]
    async fn resolve(
        &self,
        title: &str,
        artists: &[String],
        cancel: &CancellationToken,
    ) -> Result<PlaylistTrack> {
        log::debug!("Looking up song: {} by {}", title, artists.join(", "));
        let track = cancellable(cancel, self.client.search_track(title, artists))
            .await
            .wrap_err_with(|| format!("Failed to look up '{}' on Spotify", title))?;
        Ok(track.into())
    }
}

#[async_trait::async_trait]
impl PlaylistStore for SpotifyHttpAdapter {
    #[tracing::instrument(skip(self, cancel))]
    async fn get_tracks(
        &self,
        playlist_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<PlaylistTrack>> {
        let tracks = cancellable(cancel, self.client.get_playlist_tracks(playlist_id))
            .await
            .wrap_err("Failed to fetch current Spotify playlist")?;
        Ok(tracks.into_iter().map(PlaylistTrack::from).collect())
    }

    #[tracing::instrument(skip(self, cancel), fields(count = uris.len()))]
    async fn append(
        &self,
        playlist_id: &str,
        uris: &[String],
        cancel: &CancellationToken,
    ) -> Result<()> {
        if uris.is_empty() {
            return Ok(());
        }
        cancellable(cancel, self.client.add_tracks(playlist_id, uris))
            .await
            .wrap_err("Failed to add songs to playlist")
    }

    #[tracing::instrument(skip(self, tracks, cancel), fields(count = tracks.len()))]
    async fn remove(
        &self,
        playlist_id: &str,
        tracks: &[PlaylistTrack],
        cancel: &CancellationToken,
    ) -> Result<()> {
        if tracks.is_empty() {
            return Ok(());
        }
        let uris: Vec<String> = tracks.iter().map(|track| track.uri.clone()).collect();
        cancellable(cancel, self.client.remove_tracks(playlist_id, &uris))
            .await
            .wrap_err("Failed to remove songs from playlist")
    }
}
