use crate::application::handlers::playback_handler::PlaybackHandler;
use crate::application::handlers::quran_handler::QuranHandler;
use crate::application::handlers::ui_handler::UiHandler;
use crate::application::handlers::{lock, HandlerContext};
use crate::application::state::AppState;
use crate::config::AppConfig;
use crate::core::events::*;
use crate::core::traits::*;
use crate::modules::playback::coordinator::{PlaybackCoordinator, PlaybackSignal};
use anyhow::Result;
use crossbeam_channel::{bounded, TrySendError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const FRAME: Duration = Duration::from_millis(16);

/// Main application orchestrator
pub struct Application {
    state: Arc<Mutex<AppState>>,
    event_tx: EventSender,
    event_rx: EventReceiver,
    config: AppConfig,

    // Module references
    coordinator: Option<PlaybackCoordinator>,
    storage_backend: Option<Box<dyn StorageBackend>>,
    ui_renderer: Option<Box<dyn UiRenderer>>,
    quran_source: Option<Arc<dyn QuranSource>>,
    prayer_source: Option<Arc<dyn PrayerTimesSource>>,

    // Event handlers
    playback_handler: PlaybackHandler,
    quran_handler: QuranHandler,
    ui_handler: UiHandler,

    running: bool,
}

impl Application {
    pub fn new() -> Self {
        let (tx, rx) = bounded(100);

        Self {
            state: Arc::new(Mutex::new(AppState::default())),
            event_tx: tx,
            event_rx: rx,
            config: AppConfig::default(),
            coordinator: None,
            storage_backend: None,
            ui_renderer: None,
            quran_source: None,
            prayer_source: None,
            playback_handler: PlaybackHandler,
            quran_handler: QuranHandler,
            ui_handler: UiHandler,
            running: false,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the playback coordinator (verse + radio channels)
    pub fn with_coordinator(mut self, coordinator: PlaybackCoordinator) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Set the storage backend
    pub fn with_storage_backend(mut self, backend: Box<dyn StorageBackend>) -> Self {
        self.storage_backend = Some(backend);
        self
    }

    /// Set the UI renderer
    pub fn with_ui_renderer(mut self, renderer: Box<dyn UiRenderer>) -> Self {
        self.ui_renderer = Some(renderer);
        self
    }

    pub fn with_quran_source(mut self, source: Arc<dyn QuranSource>) -> Self {
        self.quran_source = Some(source);
        self
    }

    pub fn with_prayer_source(mut self, source: Arc<dyn PrayerTimesSource>) -> Self {
        self.prayer_source = Some(source);
        self
    }

    /// Get event sender (for modules to emit events)
    pub fn event_sender(&self) -> EventSender {
        self.event_tx.clone()
    }

    /// Get current state (read-only)
    pub fn state(&self) -> AppState {
        lock(&self.state).clone()
    }

    /// Apply a change to state before `init` fetches anything (e.g. a verse to focus).
    pub fn update_state(&self, update: impl FnOnce(&mut AppState)) {
        update(&mut lock(&self.state));
    }

    /// Initialize the application
    pub fn init(&mut self) -> Result<()> {
        // Load state from storage
        if let Some(storage) = &self.storage_backend {
            match storage.load() {
                Ok(loaded) => {
                    let mut state = lock(&self.state);
                    state.selection.surah = loaded.selection.surah;
                    state.selection.reciter = loaded.selection.reciter;
                    state.selection.translation = loaded.selection.translation;
                    state.preferences = loaded.preferences;
                }
                Err(e) => {
                    warn!("Could not load state: {:#}", e);
                }
            }
        }

        let (volume, rate) = {
            let state = lock(&self.state);
            (state.preferences.volume, state.preferences.playback_rate)
        };

        if let Some(coordinator) = &mut self.coordinator {
            coordinator.set_volume(volume);
            coordinator.set_playback_rate(rate);

            let tx = self.event_tx.clone();
            coordinator.on_playback_finished(move |ayah| {
                let event = AppEvent::Playback(PlaybackEvent::VerseFinished { ayah: ayah.number });
                // Never block inside the poll that drives this callback.
                if let Err(TrySendError::Full(_)) = tx.try_send(event) {
                    warn!(ayah = ayah.number, "Event bus full; completion dropped");
                }
            });
        }

        if self.quran_source.is_some() {
            QuranHandler::load_catalogues(&self.context());
            self.event_tx.send(AppEvent::Quran(QuranEvent::SurahRequested))?;
        }
        if self.prayer_source.is_some() {
            self.event_tx
                .send(AppEvent::Quran(QuranEvent::PrayerTimesRequested))?;
        }

        // Initialize UI
        if let Some(ui) = &mut self.ui_renderer {
            ui.init()?;
        }

        info!("Application initialized");
        Ok(())
    }

    /// Run the main event loop
    pub fn run(&mut self) -> Result<()> {
        self.running = true;

        while self.running {
            // Process all pending events
            self.process_events()?;

            // Poll UI for input
            if let Some(ui) = &mut self.ui_renderer {
                for event in ui.poll_input()? {
                    self.event_tx.send(AppEvent::Ui(event))?;
                }
            }

            self.poll_playback()?;

            // Render UI with current state
            if let Some(ui) = &mut self.ui_renderer {
                let state = lock(&self.state);
                ui.render(&state)?;
            }

            // Small sleep to prevent CPU spinning
            std::thread::sleep(FRAME); // ~60 FPS
        }

        Ok(())
    }

    /// Process events once without entering the main loop (useful for one-off commands)
    pub fn run_once(&mut self) -> Result<()> {
        self.process_events()?;
        Ok(())
    }

    /// Drive events and playback without a renderer until `done` holds or `timeout` passes.
    ///
    /// Returns whether `done` was reached.
    pub fn run_until<F>(&mut self, timeout: Duration, done: F) -> Result<bool>
    where
        F: Fn(&AppState) -> bool,
    {
        let deadline = Instant::now() + timeout;
        self.running = true;

        while self.running && Instant::now() < deadline {
            self.process_events()?;
            self.poll_playback()?;
            if done(&lock(&self.state)) {
                return Ok(true);
            }
            std::thread::sleep(FRAME);
        }

        Ok(false)
    }

    /// Process all pending events in the queue
    fn process_events(&mut self) -> Result<()> {
        // Drain all events currently in queue
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event)?;
        }
        Ok(())
    }

    /// Turn channel transitions into bus events.
    fn poll_playback(&mut self) -> Result<()> {
        let Some(coordinator) = &mut self.coordinator else {
            return Ok(());
        };

        for signal in coordinator.poll() {
            let event = match signal {
                PlaybackSignal::VerseStarted => PlaybackEvent::VerseStarted,
                PlaybackSignal::VerseStopped => PlaybackEvent::VerseStopped,
                PlaybackSignal::RadioStarted => PlaybackEvent::RadioStarted,
                PlaybackSignal::RadioStopped => PlaybackEvent::RadioStopped,
            };
            self.event_tx.send(AppEvent::Playback(event))?;
        }
        sync_pending_audio(Some(coordinator), &mut lock(&self.state));

        Ok(())
    }

    fn context(&mut self) -> HandlerContext<'_> {
        HandlerContext {
            state: &self.state,
            event_tx: &self.event_tx,
            config: &self.config,
            coordinator: &mut self.coordinator,
            storage: &self.storage_backend,
            quran: &self.quran_source,
            prayer: &self.prayer_source,
        }
    }

    /// Handle a single event
    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        debug!(?event, "Handling event");

        // Update state based on event
        {
            let mut state = lock(&self.state);
            sync_pending_audio(self.coordinator.as_ref(), &mut state);
            state.apply_event(&event);
        }

        let playback_handler = &self.playback_handler;
        let quran_handler = &self.quran_handler;
        let ui_handler = &self.ui_handler;
        let mut ctx = HandlerContext {
            state: &self.state,
            event_tx: &self.event_tx,
            config: &self.config,
            coordinator: &mut self.coordinator,
            storage: &self.storage_backend,
            quran: &self.quran_source,
            prayer: &self.prayer_source,
        };

        // Route event to appropriate handler
        match &event {
            AppEvent::Playback(pe) => playback_handler.handle(pe, &mut ctx)?,
            AppEvent::Quran(qe) => quran_handler.handle(qe, &mut ctx)?,
            AppEvent::Ui(ue) => ui_handler.handle(ue, &mut ctx)?,
            AppEvent::Shutdown => {
                self.running = false;
            }
        }

        Ok(())
    }

    /// Cleanup resources
    pub fn cleanup(&mut self) -> Result<()> {
        if let Some(coordinator) = &mut self.coordinator {
            coordinator.pause_verse();
            coordinator.pause_radio();
        }

        // Save state
        if let Some(storage) = &self.storage_backend {
            let state = lock(&self.state);
            storage.save(&state)?;
        }

        // Cleanup UI
        if let Some(ui) = &mut self.ui_renderer {
            ui.cleanup()?;
        }

        Ok(())
    }
}

/// Mirror play requests the coordinator has issued but state has not yet seen start.
fn sync_pending_audio(coordinator: Option<&PlaybackCoordinator>, state: &mut AppState) {
    let Some(coordinator) = coordinator else {
        return;
    };
    state.playback.verse_loading =
        coordinator.is_verse_busy() && !state.playback.verse_playing;
    state.playback.radio_connecting =
        coordinator.is_radio_busy() && !coordinator.is_radio_playing();
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ApiError, ApiResult, PlaybackError};
    use crate::core::models::{
        Ayah, AyahId, Location, PrayerTimes, Reciter, SurahData, SurahInfo, Tafsir, Timings,
        Translation,
    };
    use crate::core::traits::OutputSignal;
    use crate::modules::playback::channel::tests::{Call, FakeOutput};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeQuran {
        surah_calls: AtomicUsize,
    }

    fn ayah(number: AyahId, in_surah: u32) -> Ayah {
        Ayah {
            number,
            number_in_surah: in_surah,
            text: format!("ayah {}", in_surah),
            translation_text: Some(format!("translation {}", in_surah)),
            audio: Some(format!("https://cdn.example/{}.mp3", number)),
            juz: 1,
            page: 1,
        }
    }

    impl QuranSource for FakeQuran {
        fn surahs(&self) -> ApiResult<Vec<SurahInfo>> {
            Ok(vec![SurahInfo {
                number: 1,
                name: "الفاتحة".into(),
                english_name: "Al-Faatiha".into(),
                english_name_translation: "The Opening".into(),
                number_of_ayahs: 3,
                revelation_type: "Meccan".into(),
            }])
        }

        fn surah(&self, number: u32, _reciter: &str, _translation: &str) -> ApiResult<SurahData> {
            self.surah_calls.fetch_add(1, Ordering::SeqCst);
            if number != 1 {
                return Err(ApiError::Api("no such surah".into()));
            }
            Ok(SurahData {
                number,
                name: "الفاتحة".into(),
                english_name: "Al-Faatiha".into(),
                revelation_type: "Meccan".into(),
                ayahs: (1..=3).map(|n| ayah(n, n)).collect(),
            })
        }

        fn tafsir(&self, _ayah: AyahId, _translation: &str) -> ApiResult<Tafsir> {
            Err(ApiError::NoTafsir)
        }

        fn reciters(&self) -> Vec<Reciter> {
            Vec::new()
        }

        fn translations(&self) -> Vec<Translation> {
            Vec::new()
        }
    }

    struct FakePrayer;

    impl PrayerTimesSource for FakePrayer {
        fn prayer_times(&self, _location: &Location) -> ApiResult<Option<PrayerTimes>> {
            Ok(Some(PrayerTimes {
                timings: Timings {
                    fajr: "04:10".into(),
                    sunrise: "05:30".into(),
                    dhuhr: "12:01".into(),
                    asr: "15:20".into(),
                    maghrib: "18:31".into(),
                    isha: "20:01".into(),
                },
            }))
        }
    }

    fn app() -> (Application, FakeOutput, FakeOutput, Arc<FakeQuran>) {
        let verse = FakeOutput::new();
        let radio = FakeOutput::new();
        let quran = Arc::new(FakeQuran::default());
        let coordinator =
            PlaybackCoordinator::new(Box::new(verse.clone()), Box::new(radio.clone()));
        let app = Application::new()
            .with_coordinator(coordinator)
            .with_quran_source(quran.clone())
            .with_prayer_source(Arc::new(FakePrayer));
        (app, verse, radio, quran)
    }

    fn send(app: &Application, event: UiEvent) {
        app.event_sender().send(AppEvent::Ui(event)).unwrap();
    }

    fn loaded(app: &mut Application) {
        app.init().unwrap();
        let ready = app
            .run_until(Duration::from_secs(5), |s| {
                s.quran.surah.is_some() && s.prayer.times.is_some() && !s.quran.surahs.is_empty()
            })
            .unwrap();
        assert!(ready, "fake sources should load within the timeout");
    }

    #[test]
    fn init_loads_chapter_list_and_prayer_times() {
        let (mut app, _, _, quran) = app();
        loaded(&mut app);
        let state = app.state();
        assert_eq!(state.quran.surahs.len(), 1);
        assert_eq!(state.quran.surah.as_ref().map(|s| s.ayahs.len()), Some(3));
        assert_eq!(quran.surah_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reselecting_loaded_chapter_does_not_refetch() {
        let (mut app, _, _, quran) = app();
        loaded(&mut app);
        send(&app, UiEvent::SurahSelected { number: 1 });
        app.run_once().unwrap();
        assert_eq!(quran.surah_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn first_action_press_counts_and_plays_focused_ayah() {
        let (mut app, verse, _, _) = app();
        loaded(&mut app);
        send(&app, UiEvent::AyahClicked { ayah: 2 });
        send(&app, UiEvent::ActionRequested);
        app.run_once().unwrap();

        let state = app.state();
        assert_eq!(state.memorization.count(2), 1);
        assert_eq!(
            verse.play_calls(),
            vec![Call::Play { url: "https://cdn.example/2.mp3".into(), restart: true }]
        );
        assert_eq!(state.ui.status_message, "Listening 1 of 7");
    }

    #[test]
    fn natural_end_reports_completion() {
        let (mut app, verse, _, _) = app();
        loaded(&mut app);
        send(&app, UiEvent::AyahClicked { ayah: 1 });
        send(&app, UiEvent::ActionRequested);
        app.run_once().unwrap();

        verse.push(OutputSignal::Started);
        app.run_until(Duration::from_secs(1), |s| s.playback.verse_playing).unwrap();
        verse.push(OutputSignal::Ended);
        app.run_until(Duration::from_secs(1), |s| s.ui.status_message == "Listen 1 of 7 done")
            .unwrap();

        let state = app.state();
        assert!(!state.playback.verse_playing);
        assert_eq!(state.ui.status_message, "Listen 1 of 7 done");
    }

    #[test]
    fn navigation_is_refused_while_verse_plays() {
        let (mut app, verse, _, _) = app();
        loaded(&mut app);
        send(&app, UiEvent::AyahClicked { ayah: 1 });
        send(&app, UiEvent::ActionRequested);
        app.run_once().unwrap();
        verse.push(OutputSignal::Started);
        app.run_until(Duration::from_secs(1), |s| s.playback.verse_playing).unwrap();

        send(&app, UiEvent::NextAyahRequested);
        app.run_once().unwrap();
        assert_eq!(app.state().selection.focused, Some(1));
    }

    #[test]
    fn repeated_presses_while_audio_loads_count_once() {
        let (mut app, verse, _, _) = app();
        loaded(&mut app);
        send(&app, UiEvent::AyahClicked { ayah: 2 });
        send(&app, UiEvent::ActionRequested);
        app.run_once().unwrap();
        send(&app, UiEvent::ActionRequested);
        send(&app, UiEvent::ActionRequested);
        send(&app, UiEvent::NextAyahRequested);
        app.run_once().unwrap();

        let state = app.state();
        assert_eq!(state.memorization.count(2), 1);
        assert_eq!(verse.play_calls().len(), 1);
        assert_eq!(state.selection.focused, Some(2));
        assert!(state.playback.verse_loading);
    }

    #[test]
    fn failed_load_releases_the_ritual() {
        let (mut app, verse, _, _) = app();
        loaded(&mut app);
        send(&app, UiEvent::AyahClicked { ayah: 1 });
        send(&app, UiEvent::ActionRequested);
        app.run_once().unwrap();

        verse.push(OutputSignal::Failed(PlaybackError::Fetch {
            url: "https://cdn.example/1.mp3".into(),
            message: "404".into(),
        }));
        app.run_until(Duration::from_secs(1), |s| !s.playback.verse_loading).unwrap();
        send(&app, UiEvent::ActionRequested);
        app.run_once().unwrap();

        assert_eq!(app.state().memorization.count(1), 2);
        assert_eq!(verse.play_calls().len(), 2);
    }

    #[test]
    fn radio_toggle_uses_configured_stream() {
        let (mut app, _, radio, _) = app();
        loaded(&mut app);
        send(&app, UiEvent::RadioToggled);
        app.run_once().unwrap();
        assert_eq!(
            radio.play_calls(),
            vec![Call::Play { url: app.config.radio.stream_url.clone(), restart: false }]
        );
    }

    #[test]
    fn unsupported_rate_is_rejected() {
        let (mut app, _, _, _) = app();
        loaded(&mut app);
        send(&app, UiEvent::RateChangeRequested { rate: 3.0 });
        app.run_once().unwrap();
        let state = app.state();
        assert_eq!(state.preferences.playback_rate, 1.0);
        assert!(state.ui.error_message.is_some());
    }

    #[test]
    fn quit_stops_the_loop() {
        let (mut app, _, _, _) = app();
        app.init().unwrap();
        send(&app, UiEvent::QuitRequested);
        let done = app.run_until(Duration::from_secs(1), |_| false).unwrap();
        assert!(!done);
        assert!(!app.running);
    }
}
