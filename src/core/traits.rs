use crate::application::state::AppState;
use crate::core::error::{ApiResult, PlaybackError};
use crate::core::events::UiEvent;
use crate::core::models::{
    Ayah, AyahId, Location, PrayerTimes, Reciter, SurahData, SurahInfo, Tafsir, Translation,
};
use anyhow::Result;

/// What an audio output reports back after a request settles.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputSignal {
    /// Sound is coming out
    Started,
    /// The source played to its end
    Ended,
    /// The request failed (or was superseded)
    Failed(PlaybackError),
}

/// Abstraction for one audio output device handle
///
/// Requests are asynchronous: `play` returns immediately and the outcome
/// arrives later through `poll_signal`.
pub trait AudioOutput: Send {
    /// Request playback of `url`. When `restart` is false and `url` is the
    /// paused source, resume in place.
    fn play(&mut self, url: &str, restart: bool);

    /// Stop playback immediately, cancelling any request still loading
    fn pause(&mut self);

    /// Next settled signal, if any
    fn poll_signal(&mut self) -> Option<OutputSignal>;

    /// Set volume (0.0 - 1.0)
    fn set_volume(&mut self, volume: f32);

    /// Set playback speed (1.0 = normal)
    fn set_speed(&mut self, speed: f32);
}

/// The slice of the playback coordinator the memorization ritual needs
pub trait VersePlayer {
    /// True from the play request until the audio stops, including while it loads
    fn is_verse_busy(&self) -> bool;

    /// Request verse audio from time zero. Returns false when the ayah has no audio.
    fn play_verse(&mut self, ayah: &Ayah) -> bool;
}

/// Read access to the Quran text/audio API
pub trait QuranSource: Send + Sync {
    fn surahs(&self) -> ApiResult<Vec<SurahInfo>>;

    fn surah(&self, number: u32, reciter: &str, translation: &str) -> ApiResult<SurahData>;

    fn tafsir(&self, ayah: AyahId, translation: &str) -> ApiResult<Tafsir>;

    /// Verse-by-verse Arabic reciters; falls back to a built-in list
    fn reciters(&self) -> Vec<Reciter>;

    /// Translation editions; falls back to a built-in list
    fn translations(&self) -> Vec<Translation>;
}

/// Read access to the prayer-times API
pub trait PrayerTimesSource: Send + Sync {
    /// `Ok(None)` when the location is incomplete
    fn prayer_times(&self, location: &Location) -> ApiResult<Option<PrayerTimes>>;
}

/// Abstraction for persistent storage
pub trait StorageBackend: Send {
    /// Load application state
    fn load(&self) -> Result<AppState>;

    /// Save application state
    fn save(&self, state: &AppState) -> Result<()>;
}

/// Abstraction for UI rendering
pub trait UiRenderer: Send {
    /// Initialize the UI (setup terminal, etc.)
    fn init(&mut self) -> Result<()>;

    /// Cleanup the UI (restore terminal, etc.)
    fn cleanup(&mut self) -> Result<()>;

    /// Render current state
    fn render(&mut self, state: &AppState) -> Result<()>;

    /// Poll for user input (non-blocking)
    /// Returns events generated from user input
    fn poll_input(&mut self) -> Result<Vec<UiEvent>>;
}
