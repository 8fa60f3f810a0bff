use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::ports::radio::{RadioPlay, RecentPlaysSource};
use crate::ports::spotify::{PlaylistStore, PlaylistTrack, SongResolver};

/// The playlist call that failed during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    GetTracks,
    Append,
    Remove,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOperation::GetTracks => write!(f, "fetch playlist tracks"),
            StoreOperation::Append => write!(f, "append tracks"),
            StoreOperation::Remove => write!(f, "remove tracks"),
        }
    }
}

/// Errors that abort a synchronization pass.
///
/// A `Store` error raised by `Append` means the removal already committed.
/// Nothing is rolled back; the next pass picks up from whatever the remote
/// playlist holds.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Playlist size must be at least 1")]
    InvalidPlaylistSize,
    #[error("Failed to fetch recent plays: {0:#}")]
    Source(color_eyre::Report),
    #[error("Recent plays feed returned no songs")]
    EmptySource,
    #[error("Could not resolve most recent play '{title}': {error:#}")]
    Resolution {
        title: String,
        error: color_eyre::Report,
    },
    #[error("Failed to {operation}: {error:#}")]
    Store {
        operation: StoreOperation,
        error: color_eyre::Report,
    },
    #[error("Synchronization pass was cancelled")]
    Cancelled,
}

/// What a successful pass did to the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    UpToDate,
    Updated {
        added: Vec<String>,
        removed: Vec<PlaylistTrack>,
    },
}

/// Keeps a playlist in line with a station's recent plays, bounded to a
/// fixed number of tracks. Holds no state between passes.
pub struct Reconciler<S, R, P> {
    source: S,
    resolver: R,
    store: P,
}

impl<S, R, P> Reconciler<S, R, P>
where
    S: RecentPlaysSource,
    R: SongResolver,
    P: PlaylistStore,
{
    pub fn new(source: S, resolver: R, store: P) -> Self {
        Self {
            source,
            resolver,
            store,
        }
    }

    /// Runs one pass: fetch, resolve, diff, then remove followed by append.
    ///
    /// The token is checked before every external call and handed to each
    /// port unchanged.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn synchronize(
        &self,
        playlist_size: usize,
        playlist_id: &str,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome, SyncError> {
        if playlist_size == 0 {
            return Err(SyncError::InvalidPlaylistSize);
        }

        ensure_active(cancel)?;
        let mut recent_plays = self
            .source
            .fetch(playlist_size, cancel)
            .await
            .map_err(|error| interrupted_or(cancel, SyncError::Source(error)))?;
        recent_plays.truncate(playlist_size);
        log::info!("Retrieved {} recent plays from station", recent_plays.len());

        let Some(latest_play) = recent_plays.first() else {
            return Err(SyncError::EmptySource);
        };

        ensure_active(cancel)?;
        let current_tracks = self
            .store
            .get_tracks(playlist_id, cancel)
            .await
            .map_err(|error| {
                interrupted_or(
                    cancel,
                    SyncError::Store {
                        operation: StoreOperation::GetTracks,
                        error,
                    },
                )
            })?;
        log::info!(
            "Found {} tracks in playlist {}",
            current_tracks.len(),
            playlist_id
        );

        ensure_active(cancel)?;
        let latest = self.resolve_latest(latest_play, cancel).await?;

        if current_tracks
            .last()
            .is_some_and(|newest| newest.uri == latest.uri)
        {
            log::info!("Playlist is already up to date with the station");
            return Ok(SyncOutcome::UpToDate);
        }
        log::info!("Diff found between playlist and station, updating playlist");

        let added = self
            .build_append_list(&recent_plays, latest.uri, &current_tracks, cancel)
            .await?;
        let removed = removal_set(&current_tracks, added.len(), playlist_size);

        // Removal matches by uri, so it has to land before a replayed
        // song is appended again.
        if !removed.is_empty() {
            ensure_active(cancel)?;
            log::info!("Removing {} songs from playlist", removed.len());
            self.store
                .remove(playlist_id, &removed, cancel)
                .await
                .map_err(|error| {
                    interrupted_or(
                        cancel,
                        SyncError::Store {
                            operation: StoreOperation::Remove,
                            error,
                        },
                    )
                })?;
        }

        if !added.is_empty() {
            ensure_active(cancel)?;
            log::info!("Adding {} songs to playlist", added.len());
            self.store
                .append(playlist_id, &added, cancel)
                .await
                .map_err(|error| {
                    interrupted_or(
                        cancel,
                        SyncError::Store {
                            operation: StoreOperation::Append,
                            error,
                        },
                    )
                })?;
        }

        Ok(SyncOutcome::Updated { added, removed })
    }

    /// Runs a pass every `period` until `cancel` fires. Passes never
    /// overlap; a failed pass is logged and the next tick tries again.
    pub async fn run_every(
        &self,
        period: Duration,
        playlist_size: usize,
        playlist_id: &str,
        cancel: &CancellationToken,
    ) -> u64 {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut passes = 0;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            passes += 1;
            match self.synchronize(playlist_size, playlist_id, cancel).await {
                Ok(outcome) => log_outcome(&outcome),
                Err(SyncError::Cancelled) => break,
                Err(e) => log::error!("Sync pass failed, retrying next run: {}", e),
            }
        }

        log::info!("Stopped after {} sync passes", passes);
        passes
    }

    async fn resolve_latest(
        &self,
        play: &RadioPlay,
        cancel: &CancellationToken,
    ) -> Result<PlaylistTrack, SyncError> {
        log::debug!(
            "Looking up most recent play: {} (played {:?})",
            play.title,
            play.played_time
        );
        let track = self
            .resolver
            .resolve(&play.title, &play.artists, cancel)
            .await
            .map_err(|error| {
                interrupted_or(
                    cancel,
                    SyncError::Resolution {
                        title: play.title.clone(),
                        error,
                    },
                )
            })?;

        if track.uri.is_empty() {
            return Err(SyncError::Resolution {
                title: play.title.clone(),
                error: color_eyre::eyre::eyre!("lookup returned an empty uri"),
            });
        }
        Ok(track)
    }

    /// Walks the plays after the latest one, newest to oldest, stopping at
    /// the first song the playlist already ends with. The result is ordered
    /// oldest first so the latest play lands at the end of the playlist.
    async fn build_append_list(
        &self,
        recent_plays: &[RadioPlay],
        latest_uri: String,
        current_tracks: &[PlaylistTrack],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, SyncError> {
        let newest_existing = current_tracks.last().map(|track| track.uri.as_str());
        let mut additions = VecDeque::from([latest_uri]);

        for (previous, play) in recent_plays.iter().zip(recent_plays.iter().skip(1)) {
            if play.station_song_id == previous.station_song_id {
                log::debug!("Skipping duplicate broadcast of '{}'", play.title);
                continue;
            }

            ensure_active(cancel)?;
            log::debug!("Looking up: {}", play.title);
            let track = match self
                .resolver
                .resolve(&play.title, &play.artists, cancel)
                .await
            {
                Ok(track) => track,
                Err(e) => {
                    log::warn!("Skipping '{}', lookup failed: {:#}", play.title, e);
                    continue;
                }
            };

            if newest_existing == Some(track.uri.as_str()) {
                log::debug!("Reached songs already in playlist at '{}'", play.title);
                break;
            }

            if track.uri.is_empty() || additions.front() == Some(&track.uri) {
                continue;
            }
            additions.push_front(track.uri);
        }

        Ok(additions.into())
    }
}

pub fn log_outcome(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::UpToDate => log::info!("Nothing to do, playlist already current"),
        SyncOutcome::Updated { added, removed } => log::info!(
            "Playlist updated: {} added, {} removed",
            added.len(),
            removed.len()
        ),
    }
}

/// Oldest tracks that must go so `additions` more fit in `playlist_size`.
fn removal_set(
    current_tracks: &[PlaylistTrack],
    additions: usize,
    playlist_size: usize,
) -> Vec<PlaylistTrack> {
    let overflow = (additions + current_tracks.len())
        .saturating_sub(playlist_size)
        .min(current_tracks.len());

    current_tracks[..overflow]
        .iter()
        .filter(|track| !track.uri.is_empty())
        .cloned()
        .collect()
}

/// Port failures caused by the token firing surface as `Cancelled`.
fn interrupted_or(cancel: &CancellationToken, error: SyncError) -> SyncError {
    if cancel.is_cancelled() {
        SyncError::Cancelled
    } else {
        error
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), SyncError> {
    if cancel.is_cancelled() {
        return Err(SyncError::Cancelled);
    }
    Ok(())
}
