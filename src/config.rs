use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::spotify_rs::client::SpotifyCredentials;

const DEFAULT_PLAYLIST_SIZE: usize = 30;
const DEFAULT_STATION: &str = "triplej";
const DEFAULT_MARKET: &str = "AU";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Empty Spotify playlist id")]
    EmptyPlaylistId,
    #[error("Playlist size was smaller than 1")]
    PlaylistSizeTooSmall,
    #[error("Empty Spotify client id")]
    EmptyClientId,
    #[error("Empty Spotify client secret")]
    EmptyClientSecret,
    #[error("Empty Spotify refresh token")]
    EmptyRefreshToken,
    #[error("Empty radio station name")]
    EmptyStation,
    #[error("PLAYLIST_SIZE was not a number: {0}")]
    InvalidPlaylistSize(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_playlist_size")]
    pub playlist_size: usize,
    #[serde(default = "default_station")]
    pub station: String,
    pub spotify: SpotifyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub playlist_id: String,
    #[serde(default = "default_market")]
    pub market: String,
}

fn default_playlist_size() -> usize {
    DEFAULT_PLAYLIST_SIZE
}

fn default_station() -> String {
    DEFAULT_STATION.to_string()
}

fn default_market() -> String {
    DEFAULT_MARKET.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            playlist_size: DEFAULT_PLAYLIST_SIZE,
            station: default_station(),
            spotify: SpotifyConfig {
                client_id: String::new(),
                client_secret: String::new(),
                refresh_token: String::new(),
                playlist_id: String::new(),
                market: default_market(),
            },
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Build config from `SPOTIFY_*`, `PLAYLIST_SIZE`, `RADIO_STATION` style
    /// variables, as read through `lookup`.
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        let playlist_size = match lookup("PLAYLIST_SIZE") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPlaylistSize(raw.clone()))?,
            None => DEFAULT_PLAYLIST_SIZE,
        };

        let config = Config {
            playlist_size,
            station: lookup("RADIO_STATION").unwrap_or_else(default_station),
            spotify: SpotifyConfig {
                client_id: var("SPOTIFY_CLIENT_ID"),
                client_secret: var("SPOTIFY_CLIENT_SECRET"),
                refresh_token: var("SPOTIFY_REFRESH_TOKEN"),
                playlist_id: var("SPOTIFY_PLAYLIST_ID"),
                market: lookup("SPOTIFY_MARKET").unwrap_or_else(default_market),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("radio-playlist-sync").join("config.toml"))
    }

    /// Load the default config file if it exists, otherwise fall back to the
    /// environment
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                log::debug!("No config file found, reading configuration from environment");
                Self::from_env().wrap_err("Failed to load config from environment")
            }
        }
    }

    /// Write a config file with placeholder credentials, if it doesn't exist
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| color_eyre::eyre::eyre!("No config directory on this platform"))?;
        if path.exists() {
            log::info!("Config file already exists at {}", path.display());
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(&Config::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spotify.playlist_id.is_empty() {
            return Err(ConfigError::EmptyPlaylistId);
        }
        if self.playlist_size < 1 {
            return Err(ConfigError::PlaylistSizeTooSmall);
        }
        if self.spotify.client_id.is_empty() {
            return Err(ConfigError::EmptyClientId);
        }
        if self.spotify.client_secret.is_empty() {
            return Err(ConfigError::EmptyClientSecret);
        }
        if self.spotify.refresh_token.is_empty() {
            return Err(ConfigError::EmptyRefreshToken);
        }
        if self.station.is_empty() {
            return Err(ConfigError::EmptyStation);
        }
        Ok(())
    }

    pub fn spotify_credentials(&self) -> SpotifyCredentials {
        SpotifyCredentials {
            client_id: self.spotify.client_id.clone(),
            client_secret: self.spotify.client_secret.clone(),
            refresh_token: self.spotify.refresh_token.clone(),
        }
    }
}
