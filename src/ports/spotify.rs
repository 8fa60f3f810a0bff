use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;

/// A track as it sits in the remote playlist. The `uri` is its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistTrack {
    pub uri: String,
    pub name: Option<String>,
}

impl PlaylistTrack {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: None,
        }
    }
}

/// Port trait for looking up a platform track from a song title and artists.
///
/// A miss is reported as an error. Lookups must be safe to repeat.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SongResolver: Send + Sync {
    async fn resolve(
        &self,
        title: &str,
        artists: &[String],
        cancel: &CancellationToken,
    ) -> Result<PlaylistTrack>;
}

/// Port trait wrapping the playlist operations used by the reconciler.
///
/// Implementations live in `services::spotify` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Current playlist contents, oldest first.
    async fn get_tracks(
        &self,
        playlist_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<PlaylistTrack>>;

    /// Appends `uris` in the given order. Empty input is a no-op.
    async fn append(
        &self,
        playlist_id: &str,
        uris: &[String],
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Removes every listed track by uri. Empty input is a no-op.
    async fn remove(
        &self,
        playlist_id: &str,
        tracks: &[PlaylistTrack],
        cancel: &CancellationToken,
    ) -> Result<()>;
}
