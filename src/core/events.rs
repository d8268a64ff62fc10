use crate::core::models::{AyahId, Location, PrayerTimes, Reciter, SurahData, SurahInfo, Tafsir, Translation};
use crate::modules::playback::media_session::MediaAction;

/// All events that can occur in the application
#[derive(Debug, Clone)]
pub enum AppEvent {
    // Playback events
    Playback(PlaybackEvent),

    // Quran data events
    Quran(QuranEvent),

    // UI events
    Ui(UiEvent),

    // Application lifecycle
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    /// Verse audio confirmed audible
    VerseStarted,

    /// Verse audio stopped (natural end or pause)
    VerseStopped,

    /// Verse audio reached its natural end
    VerseFinished { ayah: AyahId },

    /// Radio stream confirmed audible
    RadioStarted,

    /// Radio stream stopped
    RadioStopped,

    /// Volume changed (0.0 - 1.0)
    VolumeChanged { volume: f32 },

    /// Verse playback rate changed
    RateChanged { rate: f32 },
}

/// Identifies one chapter fetch so late responses for an old selection can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurahRequest {
    pub surah: u32,
    pub reciter: String,
    pub translation: String,
}

#[derive(Debug, Clone)]
pub enum QuranEvent {
    /// Chapter list fetched
    SurahsLoaded { surahs: Vec<SurahInfo> },

    /// Chapter list could not be fetched
    SurahsFailed { message: String },

    /// Reciter and translation catalogues fetched (or defaulted)
    EditionsLoaded {
        reciters: Vec<Reciter>,
        translations: Vec<Translation>,
    },

    /// Fetch the chapter for the current selection
    SurahRequested,

    /// Fetch started for this selection
    SurahLoading { request: SurahRequest },

    /// Chapter fetched
    SurahLoaded { request: SurahRequest, surah: SurahData },

    /// Chapter fetch failed
    SurahFailed { request: SurahRequest, message: String },

    /// Commentary fetched for an ayah
    TafsirLoaded { ayah: AyahId, tafsir: Tafsir },

    /// Commentary fetch failed
    TafsirFailed { ayah: AyahId, message: String },

    /// Fetch prayer times for the stored location
    PrayerTimesRequested,

    /// Prayer times fetched (None when location is incomplete)
    PrayerTimesLoaded {
        location: Location,
        times: Option<PrayerTimes>,
    },

    /// Prayer times fetch failed
    PrayerTimesFailed { location: Location, message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// User picked an ayah in the list (focus toggles)
    AyahClicked { ayah: AyahId },

    /// Main action button (start / again / relisten)
    ActionRequested,

    /// Count a self-reading repetition without audio
    SelfReadRequested,

    /// Press on the memorization card itself
    CardPressed,

    /// Open or close the memorization card
    CardToggled { open: bool },

    /// Focus the next ayah
    NextAyahRequested,

    /// Focus the previous ayah
    PreviousAyahRequested,

    /// Stop verse audio
    StopRequested,

    /// Chapter changed
    SurahSelected { number: u32 },

    /// Reciter changed
    ReciterSelected { identifier: String },

    /// Translation changed
    TranslationSelected { identifier: String },

    /// Toggle the live radio stream
    RadioToggled,

    /// Play/pause request from OS or terminal media controls
    Media { action: MediaAction },

    /// Open commentary for an ayah
    TafsirRequested { ayah: AyahId },

    /// Close commentary
    TafsirClosed,

    /// Open or close prayer times
    PrayerTimesToggled { open: bool },

    /// Prayer location changed
    LocationChanged { location: Location },

    /// User requested volume change (0-100)
    VolumeChangeRequested { volume: u8 },

    /// User requested a verse playback rate
    RateChangeRequested { rate: f32 },

    /// User requested quit
    QuitRequested,

    /// Display message to user
    ShowMessage { message: String },

    /// Display error to user
    ShowError { message: String },
}

/// Type alias for event sender
pub type EventSender = crossbeam_channel::Sender<AppEvent>;

/// Type alias for event receiver
pub type EventReceiver = crossbeam_channel::Receiver<AppEvent>;
