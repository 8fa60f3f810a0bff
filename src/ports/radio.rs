use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;

/// A single entry in a radio station's recently-played feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioPlay {
    /// Station-side identity of the recording. Consecutive duplicate
    /// broadcasts of the same play share this value.
    pub station_song_id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub played_time: Option<DateTime<Utc>>,
}

/// Port trait for the radio station's play history.
///
/// Implementations live in `services::radio` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecentPlaysSource: Send + Sync {
    /// Returns at most `limit` plays, newest first.
    async fn fetch(&self, limit: usize, cancel: &CancellationToken) -> Result<Vec<RadioPlay>>;
}
