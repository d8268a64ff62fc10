use crate::cli_handlers::{quran_client, CliCommand};
use crate::config::AppConfig;
use crate::core::traits::{QuranSource, StorageBackend};
use crate::modules::quran::search_engine::SearchEngine;
use crate::modules::storage::json_backend::JsonStorageBackend;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use anyhow::{Context, Result};

pub struct SurahsCommand {
    pub config: AppConfig,
    pub query: Option<String>,
}

impl CliCommand for SurahsCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let ui = TerminalRenderer::new();
        let surahs = quran_client(&self.config)?
            .surahs()
            .context("Could not load the surah list")?;

        match self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => {
                let results: Vec<_> = SearchEngine::new()
                    .search(&surahs, query)
                    .into_iter()
                    .map(|r| r.surah)
                    .collect();
                ui.print_search_results(query, &results);
            }
            None => ui.print_surah_list(&surahs),
        }

        Ok(())
    }
}

pub struct ReadCommand {
    pub config: AppConfig,
    pub surah: u32,
    pub from: u32,
}

impl CliCommand for ReadCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let state = JsonStorageBackend::new()?.load()?;
        let ui = TerminalRenderer::new();

        let surah = quran_client(&self.config)?
            .surah(self.surah, &state.selection.reciter, &state.selection.translation)
            .with_context(|| format!("Could not load surah {}", self.surah))?;

        if self.from as usize > surah.ayahs.len() {
            ui.print_error(&format!(
                "{} has only {} ayahs",
                surah.english_name,
                surah.ayahs.len()
            ));
            return Ok(());
        }

        ui.print_surah(&surah, self.from);
        Ok(())
    }
}

pub struct TafsirCommand {
    pub config: AppConfig,
    pub surah: u32,
    pub ayah: u32,
}

impl CliCommand for TafsirCommand {
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
        match client.tafsir(ayah.number, &state.selection.translation) {
            Ok(tafsir) => ui.print_tafsir(&tafsir),
            Err(e) => ui.print_error(&format!("Could not load the tafsir: {}", e)),
        }

        Ok(())
    }
}
