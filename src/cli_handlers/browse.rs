use crate::application::app::Application;
use crate::cli_handlers::{open_player, prayer_client, quran_client, CliCommand};
use crate::config::AppConfig;
use crate::core::events::{AppEvent, UiEvent};
use crate::modules::storage::json_backend::JsonStorageBackend;
use crate::modules::ui::tui::renderer::TuiRenderer;
use anyhow::Result;
use tracing::info;

pub struct BrowseCommand {
    pub config: AppConfig,
}

impl CliCommand for BrowseCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        run_reader(self.config, None)
    }
}

/// The reader opened on one surah, optionally on one ayah with the card showing.
pub struct MemorizeCommand {
    pub config: AppConfig,
    pub surah: u32,
    pub ayah: Option<u32>,
}

impl CliCommand for MemorizeCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        run_reader(self.config, Some((self.surah, self.ayah)))
    }
}

fn run_reader(config: AppConfig, target: Option<(u32, Option<u32>)>) -> Result<()> {
    let storage = JsonStorageBackend::new()?;
    let (_device, coordinator) = open_player(&config)?;

    let mut app = Application::new()
        .with_quran_source(quran_client(&config)?)
        .with_prayer_source(prayer_client(&config)?)
        .with_coordinator(coordinator)
        .with_storage_backend(Box::new(storage))
        .with_ui_renderer(Box::new(TuiRenderer::new()))
        .with_config(config);

    app.init()?;

    if let Some((surah, ayah)) = target {
        info!(surah, ?ayah, "Opening reader for memorization");
        app.update_state(|state| state.selection.pending_focus = ayah);
        app.event_sender()
            .send(AppEvent::Ui(UiEvent::SurahSelected { number: surah }))?;
        if ayah.is_some() {
            app.event_sender()
                .send(AppEvent::Ui(UiEvent::CardToggled { open: true }))?;
        }
    }

    let result = app.run();
    app.cleanup()?;
    result
}
