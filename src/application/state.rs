use crate::core::events::*;
use crate::core::models::{
    Ayah, AyahId, Location, PrayerTimes, Reciter, SurahData, SurahInfo, Tafsir, Translation,
};
use crate::modules::memorization::session::MemorizationSession;
use crate::modules::quran::catalog::{DEFAULT_RECITER, DEFAULT_TRANSLATION};
use serde::{Deserialize, Serialize};

/// Complete application state (single source of truth)
///
/// Only the selection and preferences reach `db.json`; memorization counts
/// live for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub selection: SelectionState,
    pub preferences: PreferencesState,

    #[serde(skip)]
    pub quran: QuranState,

    #[serde(skip)]
    pub playback: PlaybackState,

    #[serde(skip)]
    pub memorization: MemorizationSession,

    #[serde(skip)]
    pub tafsir: TafsirState,

    #[serde(skip)]
    pub prayer: PrayerState,

    #[serde(skip)]
    pub ui: UiState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionState {
    pub surah: u32,
    pub reciter: String,
    pub translation: String,

    #[serde(skip)]
    pub focused: Option<AyahId>,

    /// Ayah (number within the chapter) to focus once the chapter arrives
    #[serde(skip)]
    pub pending_focus: Option<u32>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            surah: 1,
            reciter: DEFAULT_RECITER.to_string(),
            translation: DEFAULT_TRANSLATION.to_string(),
            focused: None,
            pending_focus: None,
        }
    }
}

impl SelectionState {
    pub fn request(&self) -> SurahRequest {
        SurahRequest {
            surah: self.surah,
            reciter: self.reciter.clone(),
            translation: self.translation.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesState {
    pub location: Location,
    /// Amplitude multiplier (0.0 - 1.0)
    pub volume: f32,
    pub playback_rate: f32,
}

impl Default for PreferencesState {
    fn default() -> Self {
        Self {
            location: Location::default(),
            volume: 1.0,
            playback_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuranState {
    pub surahs: Vec<SurahInfo>,
    pub reciters: Vec<Reciter>,
    pub translations: Vec<Translation>,
    pub surah: Option<SurahData>,
    /// Selection the displayed chapter was fetched for
    pub loaded: Option<SurahRequest>,
    /// Fetch in flight; responses for anything else are stale
    pub pending: Option<SurahRequest>,
}

impl QuranState {
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether `request` is already displayed or on its way
    pub fn covers(&self, request: &SurahRequest) -> bool {
        self.pending.as_ref() == Some(request) || self.loaded.as_ref() == Some(request)
    }

    pub fn surah_info(&self, number: u32) -> Option<&SurahInfo> {
        self.surahs.iter().find(|s| s.number == number)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    pub verse_playing: bool,
    pub radio_playing: bool,
    /// Verse audio requested and still loading
    pub verse_loading: bool,
    /// Radio stream requested and still connecting
    pub radio_connecting: bool,
}

impl PlaybackState {
    /// Requested or confirmed verse audio; the ritual and navigation wait on this
    pub fn verse_busy(&self) -> bool {
        self.verse_playing || self.verse_loading
    }
}

#[derive(Debug, Clone, Default)]
pub struct TafsirState {
    pub ayah: Option<AyahId>,
    pub content: Option<Tafsir>,
    pub loading: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PrayerState {
    pub open: bool,
    pub loading: bool,
    pub times: Option<PrayerTimes>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub status_message: String,
    pub error_message: Option<String>,
    pub card_open: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status_message: "Welcome".to_string(),
            error_message: None,
            card_open: false,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            selection: SelectionState::default(),
            preferences: PreferencesState::default(),
            quran: QuranState::default(),
            playback: PlaybackState::default(),
            memorization: MemorizationSession::default(),
            tafsir: TafsirState::default(),
            prayer: PrayerState::default(),
            ui: UiState::default(),
        }
    }
}

impl AppState {
    /// The focused ayah, if it belongs to the loaded chapter
    pub fn focused_ayah(&self) -> Option<&Ayah> {
        let id = self.selection.focused?;
        self.quran.surah.as_ref()?.ayah(id)
    }

    /// Move focus one ayah forward or back. Refused while verse audio plays or
    /// loads and at either end of the chapter. Returns whether focus moved.
    pub fn step_focus(&mut self, forward: bool) -> bool {
        if self.playback.verse_busy() {
            return false;
        }
        let (Some(surah), Some(id)) = (&self.quran.surah, self.selection.focused) else {
            return false;
        };
        let Some(index) = surah.position_of(id) else {
            return false;
        };

        let target = if forward {
            index + 1
        } else {
            match index.checked_sub(1) {
                Some(i) => i,
                None => return false,
            }
        };

        match surah.ayahs.get(target) {
            Some(ayah) => {
                self.selection.focused = Some(ayah.number);
                true
            }
            None => false,
        }
    }

    fn change_selection(&mut self, apply: impl FnOnce(&mut SelectionState)) {
        let before = self.selection.request();
        apply(&mut self.selection);
        if self.selection.request() != before {
            self.selection.focused = None;
        }
    }

    /// Update state based on an event
    pub fn apply_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Playback(pe) => match pe {
                PlaybackEvent::VerseStarted => {
                    self.playback.verse_playing = true;
                    self.playback.verse_loading = false;
                    self.ui.error_message = None;
                }
                PlaybackEvent::VerseStopped => {
                    self.playback.verse_playing = false;
                }
                PlaybackEvent::RadioStarted => {
                    self.playback.radio_playing = true;
                    self.playback.radio_connecting = false;
                    self.ui.status_message = "Quran radio on".to_string();
                }
                PlaybackEvent::RadioStopped => {
                    self.playback.radio_playing = false;
                    self.ui.status_message = "Quran radio off".to_string();
                }
                PlaybackEvent::VolumeChanged { volume } => {
                    self.preferences.volume = *volume;
                }
                PlaybackEvent::RateChanged { rate } => {
                    self.preferences.playback_rate = *rate;
                }
                // The player stays open after a completion.
                PlaybackEvent::VerseFinished { .. } => {}
            },

            AppEvent::Quran(qe) => match qe {
                QuranEvent::SurahsLoaded { surahs } => {
                    self.quran.surahs = surahs.clone();
                }
                QuranEvent::SurahsFailed { message } => {
                    self.ui.error_message =
                        Some(format!("Failed to load the surah list. {}", message));
                }
                QuranEvent::EditionsLoaded {
                    reciters,
                    translations,
                } => {
                    self.quran.reciters = reciters.clone();
                    self.quran.translations = translations.clone();
                }
                QuranEvent::SurahRequested => {}
                QuranEvent::SurahLoading { request } => {
                    self.quran.pending = Some(request.clone());
                    self.quran.surah = None;
                    self.quran.loaded = None;
                    self.ui.error_message = None;
                    self.ui.status_message = "Loading...".to_string();
                }
                QuranEvent::SurahLoaded { request, surah } => {
                    if self.quran.pending.as_ref() != Some(request) {
                        return;
                    }
                    self.quran.pending = None;
                    self.quran.loaded = Some(request.clone());
                    self.ui.status_message =
                        format!("{} ({} ayahs)", surah.english_name, surah.ayahs.len());
                    if let Some(n) = self.selection.pending_focus.take() {
                        self.selection.focused = surah.ayah_in_surah(n).map(|a| a.number);
                    }
                    self.quran.surah = Some(surah.clone());
                }
                QuranEvent::SurahFailed { request, message } => {
                    if self.quran.pending.as_ref() != Some(request) {
                        return;
                    }
                    self.quran.pending = None;
                    self.ui.error_message = Some(format!("Failed to load surah. {}", message));
                }
                QuranEvent::TafsirLoaded { ayah, tafsir } => {
                    if self.tafsir.ayah == Some(*ayah) {
                        self.tafsir.content = Some(tafsir.clone());
                        self.tafsir.loading = false;
                    }
                }
                QuranEvent::TafsirFailed { ayah, .. } => {
                    if self.tafsir.ayah == Some(*ayah) {
                        self.tafsir.content = Some(Tafsir::unavailable());
                        self.tafsir.loading = false;
                    }
                }
                QuranEvent::PrayerTimesRequested => {
                    self.prayer.loading = true;
                    self.prayer.error = None;
                }
                QuranEvent::PrayerTimesLoaded { location, times } => {
                    if *location == self.preferences.location {
                        self.prayer.times = times.clone();
                        self.prayer.loading = false;
                    }
                }
                QuranEvent::PrayerTimesFailed { location, message } => {
                    if *location == self.preferences.location {
                        self.prayer.times = None;
                        self.prayer.error = Some(message.clone());
                        self.prayer.loading = false;
                    }
                }
            },

            AppEvent::Ui(ue) => match ue {
                UiEvent::AyahClicked { ayah } => {
                    self.selection.focused = if self.selection.focused == Some(*ayah) {
                        None
                    } else {
                        Some(*ayah)
                    };
                }
                UiEvent::NextAyahRequested => {
                    self.step_focus(true);
                }
                UiEvent::PreviousAyahRequested => {
                    self.step_focus(false);
                }
                UiEvent::SurahSelected { number } => {
                    self.change_selection(|s| s.surah = *number);
                }
                UiEvent::ReciterSelected { identifier } => {
                    self.change_selection(|s| s.reciter = identifier.clone());
                }
                UiEvent::TranslationSelected { identifier } => {
                    self.change_selection(|s| s.translation = identifier.clone());
                }
                UiEvent::CardToggled { open } => {
                    // The card stays up until its audio is done.
                    if *open || !self.playback.verse_busy() {
                        self.ui.card_open = *open;
                    }
                }
                UiEvent::TafsirRequested { ayah } => {
                    self.tafsir.ayah = Some(*ayah);
                    self.tafsir.content = None;
                    self.tafsir.loading = true;
                }
                UiEvent::TafsirClosed => {
                    self.tafsir = TafsirState::default();
                }
                UiEvent::PrayerTimesToggled { open } => {
                    self.prayer.open = *open;
                }
                UiEvent::LocationChanged { location } => {
                    if self.preferences.location != *location {
                        self.preferences.location = location.clone();
                        self.prayer.times = None;
                    }
                }
                UiEvent::ShowMessage { message } => {
                    self.ui.status_message = message.clone();
                    self.ui.error_message = None;
                }
                UiEvent::ShowError { message } => {
                    self.ui.error_message = Some(message.clone());
                }
                _ => {}
            },

            AppEvent::Shutdown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ayah(number: AyahId, in_surah: u32) -> Ayah {
        Ayah {
            number,
            number_in_surah: in_surah,
            text: format!("ayah {}", in_surah),
            translation_text: None,
            audio: None,
            juz: 1,
            page: 1,
        }
    }

    fn surah(number: u32, first: AyahId, len: u32) -> SurahData {
        SurahData {
            number,
            name: String::new(),
            english_name: format!("Surah {}", number),
            revelation_type: "Meccan".to_string(),
            ayahs: (0..len).map(|i| ayah(first + i, i + 1)).collect(),
        }
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::default();
        let request = state.selection.request();
        state.apply_event(&AppEvent::Quran(QuranEvent::SurahLoading {
            request: request.clone(),
        }));
        state.apply_event(&AppEvent::Quran(QuranEvent::SurahLoaded {
            request,
            surah: surah(1, 1, 7),
        }));
        state
    }

    fn ui(event: UiEvent) -> AppEvent {
        AppEvent::Ui(event)
    }

    #[test]
    fn clicking_focused_ayah_unfocuses_it() {
        let mut state = loaded_state();
        state.apply_event(&ui(UiEvent::AyahClicked { ayah: 3 }));
        assert_eq!(state.selection.focused, Some(3));
        state.apply_event(&ui(UiEvent::AyahClicked { ayah: 3 }));
        assert_eq!(state.selection.focused, None);
    }

    #[test]
    fn navigation_is_bounded_without_wrap() {
        let mut state = loaded_state();
        state.apply_event(&ui(UiEvent::AyahClicked { ayah: 7 }));
        state.apply_event(&ui(UiEvent::NextAyahRequested));
        assert_eq!(state.selection.focused, Some(7));

        state.apply_event(&ui(UiEvent::AyahClicked { ayah: 7 }));
        state.apply_event(&ui(UiEvent::AyahClicked { ayah: 1 }));
        state.apply_event(&ui(UiEvent::PreviousAyahRequested));
        assert_eq!(state.selection.focused, Some(1));
        state.apply_event(&ui(UiEvent::NextAyahRequested));
        assert_eq!(state.selection.focused, Some(2));
    }

    #[test]
    fn navigation_refused_while_verse_plays() {
        let mut state = loaded_state();
        state.apply_event(&ui(UiEvent::AyahClicked { ayah: 2 }));
        state.apply_event(&AppEvent::Playback(PlaybackEvent::VerseStarted));
        state.apply_event(&ui(UiEvent::NextAyahRequested));
        assert_eq!(state.selection.focused, Some(2));

        state.apply_event(&AppEvent::Playback(PlaybackEvent::VerseStopped));
        state.apply_event(&ui(UiEvent::NextAyahRequested));
        assert_eq!(state.selection.focused, Some(3));
    }

    #[test]
    fn navigation_refused_while_verse_loads() {
        let mut state = loaded_state();
        state.apply_event(&ui(UiEvent::AyahClicked { ayah: 2 }));
        state.playback.verse_loading = true;
        state.apply_event(&ui(UiEvent::NextAyahRequested));
        assert_eq!(state.selection.focused, Some(2));

        state.apply_event(&AppEvent::Playback(PlaybackEvent::VerseStarted));
        assert!(!state.playback.verse_loading);
        assert!(state.playback.verse_busy());
    }

    #[test]
    fn card_cannot_close_while_verse_audio_is_busy() {
        let mut state = loaded_state();
        state.apply_event(&ui(UiEvent::CardToggled { open: true }));
        state.playback.verse_loading = true;
        state.apply_event(&ui(UiEvent::CardToggled { open: false }));
        assert!(state.ui.card_open);

        state.playback.verse_loading = false;
        state.apply_event(&ui(UiEvent::CardToggled { open: false }));
        assert!(!state.ui.card_open);
    }

    #[test]
    fn switching_chapter_clears_focus_but_keeps_counts() {
        let mut state = loaded_state();
        state.apply_event(&ui(UiEvent::AyahClicked { ayah: 2 }));
        state.memorization = {
            let mut session = MemorizationSession::new();
            struct Silent;
            impl crate::core::traits::VersePlayer for Silent {
                fn is_verse_busy(&self) -> bool {
                    false
                }
                fn play_verse(&mut self, _: &Ayah) -> bool {
                    true
                }
            }
            let a = ayah(2, 2);
            session.press_action(&a, &mut Silent);
            session.press_action(&a, &mut Silent);
            session
        };

        state.apply_event(&ui(UiEvent::SurahSelected { number: 112 }));
        assert_eq!(state.selection.surah, 112);
        assert_eq!(state.selection.focused, None);
        assert_eq!(state.memorization.count(2), 2);
    }

    #[test]
    fn reselecting_same_chapter_keeps_focus() {
        let mut state = loaded_state();
        state.apply_event(&ui(UiEvent::AyahClicked { ayah: 4 }));
        state.apply_event(&ui(UiEvent::SurahSelected { number: 1 }));
        assert_eq!(state.selection.focused, Some(4));
    }

    #[test]
    fn stale_chapter_response_is_discarded() {
        let mut state = AppState::default();
        let old = state.selection.request();
        state.apply_event(&AppEvent::Quran(QuranEvent::SurahLoading { request: old.clone() }));

        state.apply_event(&ui(UiEvent::SurahSelected { number: 2 }));
        let current = state.selection.request();
        state.apply_event(&AppEvent::Quran(QuranEvent::SurahLoading {
            request: current.clone(),
        }));

        state.apply_event(&AppEvent::Quran(QuranEvent::SurahLoaded {
            request: old,
            surah: surah(1, 1, 7),
        }));
        assert!(state.quran.surah.is_none());
        assert!(state.quran.is_loading());

        state.apply_event(&AppEvent::Quran(QuranEvent::SurahLoaded {
            request: current.clone(),
            surah: surah(2, 8, 286),
        }));
        assert_eq!(state.quran.surah.as_ref().map(|s| s.number), Some(2));
        assert!(state.quran.covers(&current));
    }

    #[test]
    fn pending_focus_applies_when_chapter_arrives() {
        let mut state = AppState::default();
        state.selection.surah = 2;
        state.selection.pending_focus = Some(3);
        let request = state.selection.request();
        state.apply_event(&AppEvent::Quran(QuranEvent::SurahLoading {
            request: request.clone(),
        }));
        state.apply_event(&AppEvent::Quran(QuranEvent::SurahLoaded {
            request,
            surah: surah(2, 8, 286),
        }));
        assert_eq!(state.selection.focused, Some(10));
        assert_eq!(state.selection.pending_focus, None);
    }

    #[test]
    fn failed_tafsir_shows_unavailable_text() {
        let mut state = AppState::default();
        state.apply_event(&ui(UiEvent::TafsirRequested { ayah: 5 }));
        assert!(state.tafsir.loading);
        state.apply_event(&AppEvent::Quran(QuranEvent::TafsirFailed {
            ayah: 5,
            message: "failed to fetch any tafsir data".into(),
        }));
        assert_eq!(state.tafsir.content, Some(Tafsir::unavailable()));
        assert!(!state.tafsir.loading);
    }

    #[test]
    fn prayer_times_for_old_location_are_ignored() {
        let mut state = AppState::default();
        let old = state.preferences.location.clone();
        let cairo = Location {
            city: "Cairo".into(),
            country: "Egypt".into(),
        };
        state.apply_event(&ui(UiEvent::LocationChanged { location: cairo }));
        state.apply_event(&AppEvent::Quran(QuranEvent::PrayerTimesFailed {
            location: old,
            message: "late".into(),
        }));
        assert!(state.prayer.error.is_none());
    }

    #[test]
    fn only_selection_and_preferences_are_serialized() {
        let mut state = loaded_state();
        state.apply_event(&ui(UiEvent::AyahClicked { ayah: 3 }));
        let json = serde_json::to_value(&state).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["preferences", "selection"]);
        assert!(json["selection"].get("focused").is_none());
    }
}
