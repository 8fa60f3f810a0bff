use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response of the ABC plays search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct PlaysResponse {
    #[serde(default)]
    pub items: Vec<PlayItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayItem {
    pub played_time: Option<DateTime<Utc>>,
    pub recording: Recording,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub arid: String,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub name: String,
}
