use crate::modules::playback::media_session::MediaMetadata;
use crate::modules::quran::catalog::{
    DEFAULT_PRAYER_API_URL, DEFAULT_QURAN_API_URL, RADIO_ARTIST, RADIO_STREAM_URL, RADIO_TITLE,
};
use crate::utils::app_config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// User-editable settings read from `config.toml`.
///
/// Every field has a default, so a partial file (or none at all) is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub quran_api_url: String,
    pub prayer_api_url: String,
    /// Timeout for REST calls. Audio downloads use no timeout.
    pub http_timeout_secs: u64,
    /// `tracing` filter directive; `RUST_LOG` wins when set
    pub log_level: String,
    pub radio: RadioConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    pub stream_url: String,
    pub title: String,
    pub artist: String,
    pub artwork: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quran_api_url: DEFAULT_QURAN_API_URL.to_string(),
            prayer_api_url: DEFAULT_PRAYER_API_URL.to_string(),
            http_timeout_secs: 15,
            log_level: "info".to_string(),
            radio: RadioConfig::default(),
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            stream_url: RADIO_STREAM_URL.to_string(),
            title: RADIO_TITLE.to_string(),
            artist: RADIO_ARTIST.to_string(),
            artwork: None,
        }
    }
}

impl AppConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }
}

impl RadioConfig {
    pub fn metadata(&self) -> MediaMetadata {
        MediaMetadata {
            title: self.title.clone(),
            artist: self.artist.clone(),
            artwork: self.artwork.clone(),
        }
    }
}

/// `<config dir>/hifz/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    app_config_dir().ok().map(|dir| dir.join("config.toml"))
}

/// Read config from `path`, falling back to defaults when the file is
/// missing or invalid.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded config");
            data
        }
        Err(err) => {
            debug!(path = %path.display(), "Using default config: {err}");
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&contents) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(&dir.path().join("config.toml"));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.radio.stream_url, RADIO_STREAM_URL);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "log_level = \"debug\"\n\n[radio]\nstream_url = \"https://radio.example/live\"\n",
        )
        .unwrap();

        let config = load_config(&path);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.radio.stream_url, "https://radio.example/live");
        assert_eq!(config.radio.title, RADIO_TITLE);
        assert_eq!(config.quran_api_url, DEFAULT_QURAN_API_URL);
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "http_timeout_secs = \"soon\"").unwrap();
        assert_eq!(load_config(&path), AppConfig::default());
    }

    #[test]
    fn zero_timeout_is_raised_to_one_second() {
        let config = AppConfig {
            http_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.http_timeout(), Duration::from_secs(1));
    }
}
