use std::time::Duration;

use crate::ports::radio::RadioPlay;
use crate::triplej_rs::types::PlaysResponse;

pub const ABC_MUSIC_API_URL: &str = "https://music.abcradio.net.au";

#[derive(Debug, thiserror::Error)]
pub enum RadioApiError {
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Received non-success response code: {0}")]
    Status(reqwest::StatusCode),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// Client for the ABC radio play history API
pub struct TriplejClient {
    base_url: String,
    station: String,
    client: reqwest::Client,
}

impl TriplejClient {
    pub fn new(station: impl Into<String>) -> Self {
        Self::with_base_url(ABC_MUSIC_API_URL, station)
    }

    pub fn with_base_url(base_url: impl Into<String>, station: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            station: station.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    /// Fetch the `limit` most recent plays, newest first
    pub async fn recent_plays(&self, limit: usize) -> Result<Vec<RadioPlay>, RadioApiError> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(format!("{}/api/v1/plays/search.json", self.base_url))
            .query(&[
                ("station", self.station.as_str()),
                ("limit", limit.as_str()),
                ("order", "desc"),
            ])
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(RadioApiError::FailedToSendRequest)?;

        if !response.status().is_success() {
            return Err(RadioApiError::Status(response.status()));
        }

        let page: PlaysResponse = response
            .json()
            .await
            .map_err(RadioApiError::FailedToParseResponse)?;

        let mut plays = Vec::with_capacity(page.items.len());
        for item in page.items {
            let recording = item.recording;
            if recording.artists.is_empty() {
                log::warn!("No artist information for '{}', skipping", recording.title);
                continue;
            }
            let artists: Vec<String> = recording.artists.into_iter().map(|a| a.name).collect();
            // Older plays occasionally lack an arid
            let station_song_id = if recording.arid.is_empty() {
                format!("{} - {}", recording.title, artists.join(", "))
            } else {
                recording.arid
            };
            plays.push(RadioPlay {
                station_song_id,
                title: recording.title,
                artists,
                played_time: item.played_time,
            });
        }

        log::info!("Retrieved {} songs from {}", plays.len(), self.station);
        Ok(plays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn plays_json() -> serde_json::Value {
        json!({
            "total": 3,
            "offset": 0,
            "items": [
                {
                    "played_time": "2024-03-02T10:15:00+00:00",
                    "recording": {
                        "arid": "mn2",
                        "title": "latest song",
                        "artists": [{ "name": "artist 0" }, { "name": "artist 1" }]
                    }
                },
                {
                    "played_time": "2024-03-02T10:11:00+00:00",
                    "recording": {
                        "arid": "mn1",
                        "title": "no artists",
                        "artists": []
                    }
                },
                {
                    "played_time": null,
                    "recording": {
                        "title": "oldest song",
                        "artists": [{ "name": "only artist" }]
                    }
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_recent_plays() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/plays/search.json"))
            .and(query_param("station", "triplej"))
            .and(query_param("limit", "3"))
            .and(query_param("order", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(plays_json()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TriplejClient::with_base_url(mock_server.uri(), "triplej");
        let plays = client.recent_plays(3).await.unwrap();

        assert_eq!(plays.len(), 2);
        assert_eq!(plays[0].station_song_id, "mn2");
        assert_eq!(plays[0].title, "latest song");
        assert_eq!(plays[0].artists, vec!["artist 0", "artist 1"]);
        assert!(plays[0].played_time.is_some());
        assert_eq!(plays[1].title, "oldest song");
        assert_eq!(plays[1].station_song_id, "oldest song - only artist");
        assert!(plays[1].played_time.is_none());
    }

    #[tokio::test]
    async fn test_recent_plays_non_success_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = TriplejClient::with_base_url(mock_server.uri(), "doublej");
        let result = client.recent_plays(10).await;

        assert!(matches!(result, Err(RadioApiError::Status(status)) if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn test_recent_plays_empty_feed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&mock_server)
            .await;

        let client = TriplejClient::with_base_url(mock_server.uri(), "triplej");
        let plays = client.recent_plays(10).await.unwrap();

        assert!(plays.is_empty());
    }
}
