use crate::application::app::Application;
use crate::cli_handlers::{prayer_client, CliCommand};
use crate::config::AppConfig;
use crate::core::events::{AppEvent, UiEvent};
use crate::core::models::Location;
use crate::core::traits::{PrayerTimesSource, StorageBackend};
use crate::modules::quran::catalog;
use crate::modules::storage::json_backend::JsonStorageBackend;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use anyhow::Result;

pub struct PrayerCommand {
    pub config: AppConfig,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl CliCommand for PrayerCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let state = JsonStorageBackend::new()?.load()?;
        let ui = TerminalRenderer::new();

        let saved = state.preferences.location;
        let location = match (self.city, self.country) {
            (Some(city), Some(country)) => Location { city, country },
            (Some(city), None) => Location {
                city,
                country: saved.country,
            },
            // A new country without a city starts at that country's first city.
            (None, Some(country)) => Location {
                city: catalog::first_city(&country).to_string(),
                country,
            },
            (None, None) => saved,
        };

        match prayer_client(&self.config)?.prayer_times(&location) {
            Ok(Some(times)) => ui.print_prayer_times(&location, &times),
            Ok(None) => ui.print_error("Choose both a city and a country"),
            Err(e) => ui.print_error(&format!("Could not fetch prayer times: {}", e)),
        }

        Ok(())
    }
}

pub struct LocationCommand {
    pub city: String,
    pub country: String,
}

impl CliCommand for LocationCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let location = Location {
            city: self.city.trim().to_string(),
            country: self.country.trim().to_string(),
        };

        let mut app = Application::new()
            .with_storage_backend(Box::new(JsonStorageBackend::new()?));
        app.init()?;
        app.event_sender().send(AppEvent::Ui(UiEvent::LocationChanged {
            location: location.clone(),
        }))?;
        app.run_once()?;
        app.cleanup()?;

        let ui = TerminalRenderer::new();
        ui.print_message(&format!("Prayer location set to: {}", location));
        if catalog::cities(&location.country).is_empty() {
            ui.print_message("(country not in the built-in list; it is sent to the API as typed)");
        }

        Ok(())
    }
}
