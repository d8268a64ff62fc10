use crate::application::app::Application;
use crate::cli_handlers::{open_player, quran_client, CliCommand};
use crate::config::AppConfig;
use crate::core::events::{AppEvent, UiEvent};
use crate::core::traits::{QuranSource, StorageBackend};
use crate::modules::playback::coordinator::PlaybackSignal;
use crate::modules::storage::json_backend::JsonStorageBackend;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use anyhow::{Context, Result};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct PlayCommand {
    pub config: AppConfig,
    pub surah: u32,
    pub ayah: u32,
}

impl CliCommand for PlayCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let state = JsonStorageBackend::new()?.load()?;
        let ui = TerminalRenderer::new();

        let client = quran_client(&self.config)?;
        let surah = client
            .surah(self.surah, &state.selection.reciter, &state.selection.translation)
            .with_context(|| format!("Could not load surah {}", self.surah))?;
        let ayah = surah
            .ayah_in_surah(self.ayah)
            .with_context(|| format!("{} has no ayah {}", surah.english_name, self.ayah))?;

        ui.print_ayah(ayah);

        let (_device, mut coordinator) = open_player(&self.config)?;
        coordinator.set_volume(state.preferences.volume);
        coordinator.set_playback_rate(state.preferences.playback_rate);

        if !coordinator.play_verse(ayah) {
            ui.print_error("This reciter has no audio for that ayah");
            return Ok(());
        }

        ui.print_message("Press Ctrl+C to stop");

        // Loading has the HTTP timeout plus decode time to produce sound.
        let start_deadline = Instant::now() + self.config.http_timeout() * 2;
        loop {
            if coordinator.poll().contains(&PlaybackSignal::VerseStopped) {
                ui.print_message("✓ Playback finished");
                return Ok(());
            }
            // A failed load settles without ever starting.
            let timed_out = !coordinator.is_verse_playing() && Instant::now() > start_deadline;
            if !coordinator.is_verse_busy() || timed_out {
                ui.print_error("Audio did not start. See the log for details.");
                return Ok(());
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

pub struct RadioCommand {
    pub config: AppConfig,
}

impl CliCommand for RadioCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let storage = JsonStorageBackend::new()?;
        let (_device, coordinator) = open_player(&self.config)?;

        let ui = TerminalRenderer::new();
        ui.print_message(&format!(
            "{} ({})",
            self.config.radio.title, self.config.radio.artist
        ));

        let mut app = Application::new()
            .with_coordinator(coordinator)
            .with_storage_backend(Box::new(storage))
            .with_ui_renderer(Box::new(TerminalRenderer::new()))
            .with_config(self.config);

        app.init()?;
        app.event_sender().send(AppEvent::Ui(UiEvent::RadioToggled))?;

        let result = app.run();
        app.cleanup()?;
        result
    }
}
