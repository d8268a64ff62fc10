use crate::application::state::AppState;
use crate::core::events::UiEvent;
use crate::core::models::{Ayah, Location, PrayerTimes, SurahData, SurahInfo, Tafsir};
use crate::core::traits::UiRenderer;
use crate::modules::playback::media_session::MediaAction;
use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MediaKeyCode},
    terminal::{self, ClearType},
    ExecutableCommand,
};
use std::io::{stdout, Write};
use std::time::Duration;

/// Line-mode output for one-shot commands, plus a single status line in raw
/// mode for long-running ones such as the radio.
pub struct TerminalRenderer {
    initialized: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self { initialized: false }
    }

    pub fn print_message(&self, message: &str) {
        println!("{}", message);
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    pub fn print_surah_list(&self, surahs: &[SurahInfo]) {
        for surah in surahs {
            println!("{}", surah);
        }
    }

    pub fn print_search_results(&self, query: &str, results: &[&SurahInfo]) {
        if results.is_empty() {
            println!("No surahs found matching: '{}'", query);
        } else {
            println!("Found {} matches:", results.len());
            for surah in results {
                println!("{}", surah);
            }
        }
    }

    pub fn print_surah(&self, surah: &SurahData, from: u32) {
        println!("{} - {} ({})", surah.english_name, surah.name, surah.revelation_type);
        println!();
        for ayah in surah.ayahs.iter().filter(|a| a.number_in_surah >= from) {
            self.print_ayah(ayah);
        }
    }

    pub fn print_ayah(&self, ayah: &Ayah) {
        println!("{}", ayah);
        if let Some(translation) = &ayah.translation_text {
            println!("    {}", translation);
        }
        println!();
    }

    pub fn print_tafsir(&self, tafsir: &Tafsir) {
        if let Some(arabic) = &tafsir.arabic {
            println!("التفسير الميسر");
            println!("{}", arabic);
            println!();
        }
        if let Some(translation) = &tafsir.translation {
            println!("{} ({})", translation.name, translation.lang);
            println!(
                "{}",
                translation.text.as_deref().unwrap_or("Not available in this language.")
            );
        }
    }

    pub fn print_prayer_times(&self, location: &Location, times: &PrayerTimes) {
        println!("Prayer times for {}", location);
        for (name, time) in times.timings.entries() {
            println!("  {:<8} {}", name, time);
        }
    }

    fn status_line(state: &AppState) -> String {
        let mut line = state.ui.status_message.clone();
        if state.playback.radio_playing {
            line.push_str(" | ON AIR");
        } else if state.playback.radio_connecting {
            line.push_str(" | CONNECTING");
        } else if state.playback.verse_playing {
            line.push_str(" | PLAYING");
        }
        if let Some(error) = &state.ui.error_message {
            line.push_str(&format!(" | ERROR: {}", error));
        }
        line.push_str(" | [Space: Radio on/off | Q: Quit]");
        line
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl UiRenderer for TerminalRenderer {
    fn init(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.initialized = true;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.initialized {
            terminal::disable_raw_mode()?;
            self.initialized = false;
            println!();
        }
        Ok(())
    }

    fn render(&mut self, state: &AppState) -> Result<()> {
        let mut stdout = stdout();

        stdout.execute(cursor::MoveToColumn(0))?;
        stdout.execute(terminal::Clear(ClearType::CurrentLine))?;
        print!("{}", Self::status_line(state));

        stdout.flush()?;
        Ok(())
    }

    fn poll_input(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        if event::poll(Duration::from_millis(0))? {
            if let Event::Key(KeyEvent { code, modifiers, .. }) = event::read()? {
                match code {
                    KeyCode::Char(' ') | KeyCode::Char('r') | KeyCode::Char('R') => {
                        events.push(UiEvent::RadioToggled);
                    }
                    KeyCode::Media(MediaKeyCode::PlayPause) => {
                        events.push(UiEvent::Media { action: MediaAction::Toggle });
                    }
                    KeyCode::Media(MediaKeyCode::Play) => {
                        events.push(UiEvent::Media { action: MediaAction::Play });
                    }
                    KeyCode::Media(MediaKeyCode::Pause) | KeyCode::Media(MediaKeyCode::Stop) => {
                        events.push(UiEvent::Media { action: MediaAction::Pause });
                    }
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        events.push(UiEvent::QuitRequested);
                    }
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        events.push(UiEvent::QuitRequested);
                    }
                    _ => {}
                }
            }
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_shows_radio_and_error() {
        let mut state = AppState::default();
        state.ui.status_message = "Quran radio on".into();
        state.playback.radio_playing = true;
        state.ui.error_message = Some("stream dropped".into());

        let line = TerminalRenderer::status_line(&state);
        assert!(line.starts_with("Quran radio on | ON AIR"));
        assert!(line.contains("ERROR: stream dropped"));
    }

    #[test]
    fn status_line_shows_stream_connecting() {
        let mut state = AppState::default();
        state.playback.radio_connecting = true;
        let line = TerminalRenderer::status_line(&state);
        assert!(line.contains("| CONNECTING"));
        assert!(!line.contains("ON AIR"));
    }

    #[test]
    fn status_line_is_quiet_when_idle() {
        let state = AppState::default();
        let line = TerminalRenderer::status_line(&state);
        assert!(!line.contains("ON AIR"));
        assert!(!line.contains("PLAYING"));
    }
}
