mod browse;
mod play;
mod prayer;
mod read;
mod settings;

pub use browse::{BrowseCommand, MemorizeCommand};
pub use play::{PlayCommand, RadioCommand};
pub use prayer::{LocationCommand, PrayerCommand};
pub use read::{ReadCommand, SurahsCommand, TafsirCommand};
pub use settings::{RateCommand, ReciterCommand, TranslationCommand, VolumeCommand};

use crate::cli::Commands;
use crate::config::AppConfig;
use crate::modules::http::build_client;
use crate::modules::playback::coordinator::PlaybackCoordinator;
use crate::modules::playback::media_session::TerminalMediaSession;
use crate::modules::playback::rodio_backend::{AudioDevice, SourceKind};
use crate::modules::quran::client::AlQuranClient;
use crate::modules::quran::prayer_times::AladhanClient;
use crate::utils::APP_NAME;
use anyhow::Result;
use std::sync::Arc;

/// Every CLI command implements this trait.
///
/// Commands own their arguments and are consumed on execution: they run exactly once.
pub trait CliCommand {
    fn execute(self: Box<Self>) -> Result<()>;
}

/// Converts a parsed [`Commands`] variant into a boxed [`CliCommand`] ready to execute.
///
/// Keeping this in one place means `main.rs` never needs to know about concrete command types.
pub fn from_cli(cmd: Commands, config: AppConfig) -> Box<dyn CliCommand> {
    match cmd {
        Commands::Browse => Box::new(BrowseCommand { config }),
        Commands::Surahs { query } => Box::new(SurahsCommand { config, query }),
        Commands::Read { surah, from } => Box::new(ReadCommand { config, surah, from }),
        Commands::Play { surah, ayah } => Box::new(PlayCommand { config, surah, ayah }),
        Commands::Memorize { surah, ayah } => Box::new(MemorizeCommand { config, surah, ayah }),
        Commands::Tafsir { surah, ayah } => Box::new(TafsirCommand { config, surah, ayah }),
        Commands::Prayer { city, country } => Box::new(PrayerCommand { config, city, country }),
        Commands::Radio => Box::new(RadioCommand { config }),
        Commands::Reciter { id } => Box::new(ReciterCommand { config, id }),
        Commands::Translation { id } => Box::new(TranslationCommand { config, id }),
        Commands::Location { city, country } => Box::new(LocationCommand { city, country }),
        Commands::Volume { volume } => Box::new(VolumeCommand { volume }),
        Commands::Rate { rate } => Box::new(RateCommand { rate }),
    }
}

fn quran_client(config: &AppConfig) -> Result<Arc<AlQuranClient>> {
    let http = build_client(Some(config.http_timeout()))?;
    Ok(Arc::new(AlQuranClient::new(&config.quran_api_url, http)))
}

fn prayer_client(config: &AppConfig) -> Result<Arc<AladhanClient>> {
    let http = build_client(Some(config.http_timeout()))?;
    Ok(Arc::new(AladhanClient::new(&config.prayer_api_url, http)))
}

/// Open the audio device and wire both channels to it.
///
/// The device must outlive the coordinator; dropping it silences every output.
fn open_player(config: &AppConfig) -> Result<(AudioDevice, PlaybackCoordinator)> {
    let device = AudioDevice::open()?;
    // Downloads and the live stream run without an overall timeout.
    let http = build_client(None)?;
    let coordinator = PlaybackCoordinator::new(
        Box::new(device.output(SourceKind::Clip, http.clone())),
        Box::new(device.output(SourceKind::Live, http)),
    )
    .with_media_session(
        Box::new(TerminalMediaSession::new(APP_NAME)),
        config.radio.metadata(),
    );
    Ok((device, coordinator))
}
