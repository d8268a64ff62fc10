use crate::application::app::Application;
use crate::cli_handlers::{quran_client, CliCommand};
use crate::config::AppConfig;
use crate::core::events::{AppEvent, UiEvent};
use crate::core::traits::{QuranSource, StorageBackend};
use crate::modules::playback::coordinator::PLAYBACK_RATES;
use crate::modules::storage::json_backend::JsonStorageBackend;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use crate::utils::{amplitude_to_volume, APP_NAME};
use anyhow::Result;

/// Send one UI event through a headless app so it is applied and persisted
/// exactly as the reader would.
fn apply(event: UiEvent) -> Result<()> {
    let mut app = Application::new()
        .with_storage_backend(Box::new(JsonStorageBackend::new()?));
    app.init()?;
    app.event_sender().send(AppEvent::Ui(event))?;
    app.run_once()?;
    app.cleanup()?;
    Ok(())
}

// ── Reciter ───────────────────────────────────────────────────────────────────
pub struct ReciterCommand {
    pub config: AppConfig,
    pub id: Option<String>,
}

impl CliCommand for ReciterCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let state = JsonStorageBackend::new()?.load()?;
        let ui = TerminalRenderer::new();
        let reciters = quran_client(&self.config)?.reciters();

        match self.id {
            Some(id) => {
                let Some(reciter) = reciters.iter().find(|r| r.identifier == id) else {
                    ui.print_error(&format!(
                        "Unknown reciter '{}'. Run '{} reciter' to list them.",
                        id, APP_NAME
                    ));
                    return Ok(());
                };
                apply(UiEvent::ReciterSelected {
                    identifier: reciter.identifier.clone(),
                })?;
                ui.print_message(&format!("Reciter set to: {}", reciter.name));
            }
            None => {
                for reciter in &reciters {
                    let marker = if reciter.identifier == state.selection.reciter { "*" } else { " " };
                    ui.print_message(&format!("{} {:<24} {}", marker, reciter.identifier, reciter.name));
                }
            }
        }

        Ok(())
    }
}

// ── Translation ───────────────────────────────────────────────────────────────
pub struct TranslationCommand {
    pub config: AppConfig,
    pub id: Option<String>,
}

impl CliCommand for TranslationCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let state = JsonStorageBackend::new()?.load()?;
        let ui = TerminalRenderer::new();
        let translations = quran_client(&self.config)?.translations();

        match self.id {
            Some(id) => {
                let Some(translation) = translations.iter().find(|t| t.identifier == id) else {
                    ui.print_error(&format!(
                        "Unknown translation '{}'. Run '{} translation' to list them.",
                        id, APP_NAME
                    ));
                    return Ok(());
                };
                apply(UiEvent::TranslationSelected {
                    identifier: translation.identifier.clone(),
                })?;
                ui.print_message(&format!(
                    "Translation set to: {} ({})",
                    translation.translator, translation.language
                ));
            }
            None => {
                for t in &translations {
                    let marker = if t.identifier == state.selection.translation { "*" } else { " " };
                    ui.print_message(&format!(
                        "{} {:<24} {} ({})",
                        marker, t.identifier, t.translator, t.language
                    ));
                }
            }
        }

        Ok(())
    }
}

// ── Volume ────────────────────────────────────────────────────────────────────
pub struct VolumeCommand {
    pub volume: Option<u8>,
}

impl CliCommand for VolumeCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let ui = TerminalRenderer::new();

        match self.volume {
            Some(vol) => {
                apply(UiEvent::VolumeChangeRequested { volume: vol })?;
                ui.print_message(&format!("Volume set to: {}%", vol));
            }
            None => {
                let state = JsonStorageBackend::new()?.load()?;
                let current_percent = amplitude_to_volume(state.preferences.volume);
                ui.print_message(&format!("Current volume: {}%", current_percent));
            }
        }

        Ok(())
    }
}

// ── Rate ──────────────────────────────────────────────────────────────────────
pub struct RateCommand {
    pub rate: Option<f32>,
}

impl CliCommand for RateCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let ui = TerminalRenderer::new();

        match self.rate {
            Some(rate) if PLAYBACK_RATES.contains(&rate) => {
                apply(UiEvent::RateChangeRequested { rate })?;
                ui.print_message(&format!("Playback rate set to: {}x", rate));
            }
            Some(rate) => {
                ui.print_error(&format!(
                    "Unsupported playback rate {}. Choose one of: {}",
                    rate,
                    rate_list()
                ));
            }
            None => {
                let state = JsonStorageBackend::new()?.load()?;
                ui.print_message(&format!(
                    "Current playback rate: {}x (available: {})",
                    state.preferences.playback_rate,
                    rate_list()
                ));
            }
        }

        Ok(())
    }
}

fn rate_list() -> String {
    PLAYBACK_RATES
        .iter()
        .map(|r| format!("{}x", r))
        .collect::<Vec<_>>()
        .join(", ")
}
