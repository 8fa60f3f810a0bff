use serde::{Deserialize, Serialize};

/// Spotify OAuth token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Spotify track, trimmed to the fields the playlist sync needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTracksResponse {
    pub tracks: SearchTracks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTracks {
    pub items: Vec<SpotifyTrack>,
}

/// One page of `GET /playlists/{id}/tracks`
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracksPage {
    pub items: Vec<PlaylistTrackObject>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTrackObject {
    /// Null for tracks that are no longer available
    pub track: Option<SpotifyTrack>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddTracksRequest<'a> {
    pub uris: &'a [String],
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveTracksRequest<'a> {
    pub tracks: Vec<TrackUri<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackUri<'a> {
    pub uri: &'a str,
}
