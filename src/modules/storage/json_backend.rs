use crate::application::state::AppState;
use crate::core::traits::StorageBackend;
use crate::utils::app_config_dir;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Persists selection and preferences to `db.json` in the app's config directory.
pub struct JsonStorageBackend {
    file_path: PathBuf,
}

impl JsonStorageBackend {
    pub fn new() -> Result<Self> {
        let mut path = app_config_dir()?;
        fs::create_dir_all(&path)
            .with_context(|| format!("Could not create {}", path.display()))?;

        path.push("db.json");
        Ok(Self { file_path: path })
    }

    /// Store state at an explicit location instead of the config directory.
    pub fn with_path(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }
}

impl StorageBackend for JsonStorageBackend {
    fn load(&self) -> Result<AppState> {
        if !self.file_path.exists() {
            debug!(path = %self.file_path.display(), "No saved state; using defaults");
            return Ok(AppState::default());
        }
        let content = fs::read_to_string(&self.file_path)
            .with_context(|| format!("Could not read {}", self.file_path.display()))?;
        let state: AppState = serde_json::from_str(&content)
            .with_context(|| format!("Could not parse {}", self.file_path.display()))?;
        Ok(state)
    }

    fn save(&self, state: &AppState) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.file_path, content)
            .with_context(|| format!("Could not write {}", self.file_path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Ayah, Location};
    use crate::core::traits::VersePlayer;
    use tempfile::tempdir;

    struct Silent;

    impl VersePlayer for Silent {
        fn is_verse_busy(&self) -> bool {
            false
        }

        fn play_verse(&mut self, _ayah: &Ayah) -> bool {
            false
        }
    }

    fn ayah(number: u32) -> Ayah {
        Ayah {
            number,
            number_in_surah: number,
            text: String::new(),
            translation_text: None,
            audio: None,
            juz: 1,
            page: 1,
        }
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let storage = JsonStorageBackend::with_path(dir.path().join("db.json"));
        let state = storage.load().unwrap();
        assert_eq!(state.selection.surah, 1);
        assert_eq!(state.preferences.location, Location::default());
    }

    #[test]
    fn preferences_survive_a_round_trip_but_counts_do_not() {
        let dir = tempdir().unwrap();
        let storage = JsonStorageBackend::with_path(dir.path().join("db.json"));

        let mut state = AppState::default();
        state.selection.surah = 36;
        state.selection.reciter = "ar.husary".into();
        state.preferences.location = Location {
            city: "Cairo".into(),
            country: "Egypt".into(),
        };
        state.preferences.playback_rate = 0.75;
        state.memorization.press_action(&ayah(5), &mut Silent);
        assert_eq!(state.memorization.count(5), 1);
        storage.save(&state).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.selection.surah, 36);
        assert_eq!(loaded.selection.reciter, "ar.husary");
        assert_eq!(loaded.preferences.location.city, "Cairo");
        assert_eq!(loaded.preferences.playback_rate, 0.75);
        assert_eq!(loaded.memorization.count(5), 0);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{ not json").unwrap();
        let storage = JsonStorageBackend::with_path(&path);
        let err = storage.load().unwrap_err();
        assert!(format!("{:#}", err).contains("Could not parse"));
    }
}
