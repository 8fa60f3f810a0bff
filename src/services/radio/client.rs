use color_eyre::eyre::{Result, WrapErr};
use tokio_util::sync::CancellationToken;

use crate::ports::radio::{RadioPlay, RecentPlaysSource};
use crate::services::cancellable;
use crate::triplej_rs::client::TriplejClient;

pub struct TriplejHttpAdapter {
    client: TriplejClient,
}

impl TriplejHttpAdapter {
    pub fn new(client: TriplejClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl RecentPlaysSource for TriplejHttpAdapter {
    #[tracing::instrument(skip(self, cancel))]
    async fn fetch(&self, limit: usize, cancel: &CancellationToken) -> Result<Vec<RadioPlay>> {
        cancellable(cancel, self.client.recent_plays(limit))
            .await
            .wrap_err_with(|| format!("Failed to fetch songs from {}", self.client.station()))
    }
}
