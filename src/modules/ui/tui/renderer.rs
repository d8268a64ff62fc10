use crate::application::state::AppState;
use crate::core::events::UiEvent;
use crate::core::models::{Ayah, AyahId, Location, Reciter, SurahInfo, Translation};
use crate::core::traits::UiRenderer;
use crate::modules::memorization::action::{shade, ColorTag, Shade, LISTENING_REPETITIONS};
use crate::modules::playback::coordinator::PLAYBACK_RATES;
use crate::modules::playback::media_session::MediaAction;
use crate::modules::quran::catalog;
use crate::modules::quran::search_engine::SearchEngine;
use crate::modules::ui::tui::modals::{self, step, LocationPicker, SettingsField, SettingsView};
use crate::utils::{amplitude_to_volume, APP_NAME};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MediaKeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::cell::RefCell;
use std::io::{stdout, Stdout};
use std::time::Duration;

/// Colours cycled through once an ayah is in the self-reading phase.
const SELF_READING_COLORS: [Color; 5] = [
    Color::Green,
    Color::LightGreen,
    Color::Yellow,
    Color::LightYellow,
    Color::LightMagenta,
];

/// What the key handler needs from the last rendered state.
#[derive(Debug, Clone, Default)]
struct View {
    ayahs: Vec<AyahId>,
    focused: Option<AyahId>,
    verse_busy: bool,
    card_open: bool,
    tafsir_open: bool,
    prayer_open: bool,
    surahs: Vec<SurahInfo>,
    reciters: Vec<Reciter>,
    translations: Vec<Translation>,
    reciter: String,
    translation: String,
    location: Location,
    volume: u8,
    rate: f32,
}

pub struct TuiRenderer {
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
    list_state: RefCell<ListState>,
    view: View,
    search_engine: SearchEngine,

    // Settings modal state (UI-only)
    show_settings: bool,
    settings_selected: SettingsField,
    editing_field: bool,
    temp_reciter: usize,
    temp_translation: usize,
    temp_volume: u8,
    temp_rate: usize,

    // Surah search (UI-only)
    search_active: bool,
    search_query: String,
    search_results: Vec<usize>,
    search_state: RefCell<ListState>,

    // Prayer location picker (UI-only)
    countries: Vec<&'static str>,
    picker: LocationPicker,

    tafsir_scroll: u16,
}

impl TuiRenderer {
    pub fn new() -> Self {
        Self {
            terminal: None,
            list_state: RefCell::new(ListState::default()),
            view: View::default(),
            search_engine: SearchEngine::new(),
            show_settings: false,
            settings_selected: SettingsField::Surah,
            editing_field: false,
            temp_reciter: 0,
            temp_translation: 0,
            temp_volume: 100,
            temp_rate: rate_index(1.0),
            search_active: false,
            search_query: String::new(),
            search_results: Vec::new(),
            search_state: RefCell::new(ListState::default()),
            countries: catalog::countries().collect(),
            picker: LocationPicker::default(),
            tafsir_scroll: 0,
        }
    }

    /// Copy what input handling needs out of the shared state.
    fn sync(&mut self, state: &AppState) {
        let ids: Vec<AyahId> = state
            .quran
            .surah
            .as_ref()
            .map(|s| s.ayahs.iter().map(|a| a.number).collect())
            .unwrap_or_default();
        if ids != self.view.ayahs {
            let first = if ids.is_empty() { None } else { Some(0) };
            self.view.ayahs = ids;
            self.list_state.borrow_mut().select(first);
        }

        if state.selection.focused != self.view.focused {
            self.view.focused = state.selection.focused;
            if let Some(pos) = self.focused_position() {
                self.list_state.borrow_mut().select(Some(pos));
            }
        }

        self.view.verse_busy = state.playback.verse_busy();
        self.view.card_open = state.ui.card_open;
        self.view.prayer_open = state.prayer.open;
        let tafsir_open = state.tafsir.ayah.is_some();
        if !tafsir_open {
            self.tafsir_scroll = 0;
        }
        self.view.tafsir_open = tafsir_open;

        if state.quran.surahs.len() != self.view.surahs.len() {
            self.view.surahs = state.quran.surahs.clone();
        }
        if state.quran.reciters != self.view.reciters {
            self.view.reciters = state.quran.reciters.clone();
        }
        if state.quran.translations != self.view.translations {
            self.view.translations = state.quran.translations.clone();
        }

        self.view.reciter = state.selection.reciter.clone();
        self.view.translation = state.selection.translation.clone();
        self.view.volume = amplitude_to_volume(state.preferences.volume);
        self.view.rate = state.preferences.playback_rate;

        if state.preferences.location != self.view.location || !self.picker.editing {
            self.view.location = state.preferences.location.clone();
            self.picker = LocationPicker::for_location(&self.countries, &self.view.location);
        }

        if !self.editing_field {
            self.temp_volume = self.view.volume;
            self.temp_rate = rate_index(self.view.rate);
            self.temp_reciter = self
                .view
                .reciters
                .iter()
                .position(|r| r.identifier == self.view.reciter)
                .unwrap_or(0);
            self.temp_translation = self
                .view
                .translations
                .iter()
                .position(|t| t.identifier == self.view.translation)
                .unwrap_or(0);
        }
    }

    fn focused_position(&self) -> Option<usize> {
        let id = self.view.focused?;
        self.view.ayahs.iter().position(|a| *a == id)
    }

    fn cursor_ayah(&self) -> Option<AyahId> {
        let index = self.list_state.borrow().selected()?;
        self.view.ayahs.get(index).copied()
    }

    fn draw_ui(&self, f: &mut Frame, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Verse list
                Constraint::Length(6), // Player bar
                Constraint::Length(3), // Controls
            ])
            .split(f.area());

        self.draw_header(f, chunks[0], state);
        self.draw_verse_list(f, chunks[1], state);
        self.draw_player_bar(f, chunks[2], state);
        self.draw_controls(f, chunks[3]);

        if state.ui.card_open {
            modals::draw_card(f, state);
        }
        if state.tafsir.ayah.is_some() {
            modals::draw_tafsir(f, state, self.tafsir_scroll);
        }
        if state.prayer.open {
            modals::draw_prayer(f, state, &self.countries, &self.picker);
        }
        if self.show_settings {
            modals::draw_settings(f, &self.settings_view(state));
        }
        if self.search_active {
            let results: Vec<&SurahInfo> = self
                .search_results
                .iter()
                .filter_map(|i| self.view.surahs.get(*i))
                .collect();
            modals::draw_search(
                f,
                &self.search_query,
                &results,
                &mut *self.search_state.borrow_mut(),
            );
        }
    }

    fn draw_header(&self, f: &mut Frame, area: Rect, state: &AppState) {
        let chapter = match state.quran.surah_info(state.selection.surah) {
            Some(info) => format!("{}. {} - {}", info.number, info.english_name, info.name),
            None => format!("Surah {}", state.selection.surah),
        };

        let mut spans = vec![
            Span::styled(
                format!("{} ", APP_NAME),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(chapter),
            Span::styled(
                format!("  ·  {}  ·  {}", state.selection.reciter, state.selection.translation),
                Style::default().fg(Color::Gray),
            ),
        ];
        if state.playback.radio_playing {
            spans.push(Span::styled(
                "  ◉ ON AIR",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        } else if state.playback.radio_connecting {
            spans.push(Span::styled("  ○ connecting...", Style::default().fg(Color::Yellow)));
        }

        let title = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn draw_verse_list(&self, f: &mut Frame, area: Rect, state: &AppState) {
        let block = Block::default().borders(Borders::ALL);

        let Some(surah) = &state.quran.surah else {
            let message = if state.quran.is_loading() {
                "Loading..."
            } else {
                "No surah loaded. Press 's' to choose one."
            };
            f.render_widget(
                Paragraph::new(message)
                    .style(Style::default().fg(Color::Gray))
                    .block(block.title(" Ayahs ")),
                area,
            );
            return;
        };

        let items: Vec<ListItem> = surah
            .ayahs
            .iter()
            .map(|ayah| {
                let count = state.memorization.count(ayah.number);
                let focused = state.selection.focused == Some(ayah.number);
                ayah_item(ayah, count, focused)
            })
            .collect();

        let list = List::new(items)
            .block(block.title(format!(
                " {} ({} ayahs)  ·  {} practised this session ",
                surah.english_name,
                surah.ayahs.len(),
                state.memorization.counter().tracked()
            )))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("▶ ");

        f.render_stateful_widget(list, area, &mut *self.list_state.borrow_mut());
    }

    fn draw_player_bar(&self, f: &mut Frame, area: Rect, state: &AppState) {
        let mut lines = Vec::new();

        match (state.focused_ayah(), &state.quran.surah) {
            (Some(ayah), Some(surah)) => {
                let count = state.memorization.count(ayah.number);
                let action = state
                    .memorization
                    .action_state(ayah.number, state.playback.verse_busy());

                let playing = if state.playback.verse_playing {
                    Span::styled("▶ PLAYING  ", Style::default().fg(Color::Green))
                } else if state.playback.verse_loading {
                    Span::styled("… LOADING  ", Style::default().fg(Color::Yellow))
                } else {
                    Span::raw("")
                };
                lines.push(Line::from(vec![
                    playing,
                    Span::raw(format!(
                        "Ayah {} of {}  ·  Juz {}  ·  Page {}",
                        ayah.number_in_surah,
                        surah.ayahs.len(),
                        ayah.juz,
                        ayah.page
                    )),
                    Span::styled(
                        nav_hint(surah.is_first(ayah.number), surah.is_last(ayah.number)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]));
                lines.push(counter_line(count));

                let color = match action.color {
                    ColorTag::Primary => Color::Green,
                    ColorTag::Secondary => Color::Yellow,
                };
                let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
                if !action.enabled {
                    style = Style::default().fg(Color::DarkGray);
                }
                let mut spans = vec![
                    Span::styled(format!("[Space] {}", action.label()), style),
                    Span::styled(
                        format!("  {}", action.description()),
                        Style::default().fg(Color::Gray),
                    ),
                ];
                if action.self_read_available {
                    spans.push(Span::styled(
                        "  [r] Count a self-reading",
                        Style::default().fg(Color::Cyan),
                    ));
                }
                lines.push(Line::from(spans));
            }
            _ => {
                lines.push(Line::from("Press Enter on an ayah to start memorizing it."));
            }
        }

        match &state.ui.error_message {
            Some(error) => lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ))),
            None => lines.push(Line::from(Span::styled(
                state.ui.status_message.clone(),
                Style::default().fg(Color::Gray),
            ))),
        }

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Memorize "),
        );
        f.render_widget(paragraph, area);
    }

    fn draw_controls(&self, f: &mut Frame, area: Rect) {
        let controls = Paragraph::new(vec![Line::from(vec![
            Span::raw("↑/↓: Browse • "),
            Span::raw("Enter: Focus • "),
            Span::raw("←/→: Prev/Next • "),
            Span::styled("Space: Listen • ", Style::default().fg(Color::Green)),
            Span::raw("r: Self-read • "),
            Span::raw("c: Card • "),
            Span::raw("x: Stop • "),
            Span::raw("t: Tafsir • "),
            Span::raw("p: Prayer • "),
            Span::styled("o: Radio • ", Style::default().fg(Color::Red)),
            Span::styled("/: Surah • ", Style::default().fg(Color::Yellow)),
            Span::raw("s: Settings • "),
            Span::raw("q: Quit"),
        ])])
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title(" Controls "));
        f.render_widget(controls, area);
    }

    fn settings_view(&self, state: &AppState) -> SettingsView {
        let surah = match state.quran.surah_info(state.selection.surah) {
            Some(info) => format!("{}. {}", info.number, info.english_name),
            None => state.selection.surah.to_string(),
        };
        let reciter = self
            .view
            .reciters
            .get(self.temp_reciter)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| self.view.reciter.clone());
        let translation = self
            .view
            .translations
            .get(self.temp_translation)
            .map(|t| format!("{} ({})", t.translator, t.language))
            .unwrap_or_else(|| self.view.translation.clone());

        SettingsView {
            selected: self.settings_selected,
            editing: self.editing_field,
            surah,
            reciter,
            translation,
            volume: self.temp_volume,
            rate: PLAYBACK_RATES[self.temp_rate],
        }
    }

    fn move_cursor(&mut self, forward: bool) {
        let len = self.view.ayahs.len();
        if len == 0 {
            return;
        }
        let mut state = self.list_state.borrow_mut();
        let next = match state.selected() {
            Some(i) if forward => (i + 1).min(len - 1),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        state.select(Some(next));
    }

    fn refresh_search(&mut self) {
        self.search_results = self
            .search_engine
            .search(&self.view.surahs, &self.search_query)
            .into_iter()
            .map(|r| r.index)
            .collect();
        let first = if self.search_results.is_empty() { None } else { Some(0) };
        self.search_state.borrow_mut().select(first);
    }

    fn open_search(&mut self) {
        self.search_active = true;
        self.search_query.clear();
        self.search_results = (0..self.view.surahs.len()).collect();
        let first = if self.search_results.is_empty() { None } else { Some(0) };
        self.search_state.borrow_mut().select(first);
    }

    /// Translate one key press into events, updating UI-only state as needed.
    fn handle_key(&mut self, key: KeyEvent) -> Vec<UiEvent> {
        let mut events = Vec::new();

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            events.push(UiEvent::QuitRequested);
            return events;
        }
        if let Some(action) = media_action(key.code) {
            events.push(UiEvent::Media { action });
            return events;
        }

        if self.search_active {
            self.handle_search_key(key, &mut events);
        } else if self.show_settings {
            self.handle_settings_key(key, &mut events);
        } else if self.view.tafsir_open {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.tafsir_scroll = self.tafsir_scroll.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.tafsir_scroll = self.tafsir_scroll.saturating_add(1);
                }
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('t') | KeyCode::Char('q') => {
                    events.push(UiEvent::TafsirClosed);
                }
                _ => {}
            }
        } else if self.view.card_open && self.view.focused.is_some() {
            match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => events.push(UiEvent::CardPressed),
                KeyCode::Char('r') => events.push(UiEvent::SelfReadRequested),
                KeyCode::Char('x') => events.push(UiEvent::StopRequested),
                KeyCode::Right | KeyCode::Char('n') => events.push(UiEvent::NextAyahRequested),
                KeyCode::Left | KeyCode::Char('b') => events.push(UiEvent::PreviousAyahRequested),
                KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('q') if !self.view.verse_busy => {
                    events.push(UiEvent::CardToggled { open: false });
                }
                _ => {}
            }
        } else if self.view.prayer_open {
            self.handle_prayer_key(key, &mut events);
        } else {
            self.handle_main_key(key, &mut events);
        }

        events
    }

    fn handle_main_key(&mut self, key: KeyEvent, events: &mut Vec<UiEvent>) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => events.push(UiEvent::QuitRequested),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(true),
            KeyCode::Enter => {
                if let Some(ayah) = self.cursor_ayah() {
                    events.push(UiEvent::AyahClicked { ayah });
                }
            }
            KeyCode::Right | KeyCode::Char('n') => events.push(UiEvent::NextAyahRequested),
            KeyCode::Left | KeyCode::Char('b') => events.push(UiEvent::PreviousAyahRequested),
            KeyCode::Char(' ') | KeyCode::Char('a') => events.push(UiEvent::ActionRequested),
            KeyCode::Char('r') => events.push(UiEvent::SelfReadRequested),
            KeyCode::Char('x') => events.push(UiEvent::StopRequested),
            KeyCode::Char('c') => {
                if self.view.focused.is_some() {
                    events.push(UiEvent::CardToggled { open: true });
                }
            }
            KeyCode::Char('t') => {
                if let Some(ayah) = self.view.focused.or_else(|| self.cursor_ayah()) {
                    events.push(UiEvent::TafsirRequested { ayah });
                }
            }
            KeyCode::Char('p') => events.push(UiEvent::PrayerTimesToggled { open: true }),
            KeyCode::Char('o') => events.push(UiEvent::RadioToggled),
            KeyCode::Char('/') => self.open_search(),
            KeyCode::Char('s') => {
                self.show_settings = true;
                self.editing_field = false;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                events.push(UiEvent::VolumeChangeRequested {
                    volume: self.view.volume.saturating_add(5).min(100),
                });
            }
            KeyCode::Char('-') => {
                events.push(UiEvent::VolumeChangeRequested {
                    volume: self.view.volume.saturating_sub(5),
                });
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent, events: &mut Vec<UiEvent>) {
        match key.code {
            KeyCode::Esc => {
                self.search_active = false;
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search_query.clear();
                self.open_search();
            }
            KeyCode::Backspace => {
                self.search_query.pop();
                if self.search_query.is_empty() {
                    self.open_search();
                } else {
                    self.refresh_search();
                }
            }
            KeyCode::Up => {
                let mut state = self.search_state.borrow_mut();
                let next = state.selected().map_or(0, |i| i.saturating_sub(1));
                state.select(Some(next));
            }
            KeyCode::Down => {
                let len = self.search_results.len();
                if len > 0 {
                    let mut state = self.search_state.borrow_mut();
                    let next = state.selected().map_or(0, |i| (i + 1).min(len - 1));
                    state.select(Some(next));
                }
            }
            KeyCode::Enter => {
                let picked = self
                    .search_state
                    .borrow()
                    .selected()
                    .and_then(|i| self.search_results.get(i))
                    .and_then(|index| self.view.surahs.get(*index))
                    .map(|s| s.number);
                if let Some(number) = picked {
                    events.push(UiEvent::SurahSelected { number });
                    self.search_active = false;
                    self.show_settings = false;
                }
            }
            KeyCode::Char(c) => {
                self.search_query.push(c);
                self.refresh_search();
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent, events: &mut Vec<UiEvent>) {
        if self.editing_field {
            match key.code {
                KeyCode::Enter => {
                    self.editing_field = false;
                    if let Some(event) = self.settings_event() {
                        events.push(event);
                    }
                }
                KeyCode::Esc => {
                    self.editing_field = false;
                }
                KeyCode::Left => self.adjust_setting(false),
                KeyCode::Right => self.adjust_setting(true),
                KeyCode::Char(c) if self.settings_selected == SettingsField::Volume => {
                    if let Some(digit) = c.to_digit(10) {
                        let new_val = (self.temp_volume as u32 % 10) * 10 + digit;
                        if new_val <= 100 {
                            self.temp_volume = new_val as u8;
                        }
                    }
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('s') | KeyCode::Esc | KeyCode::Char('q') => {
                self.show_settings = false;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.settings_selected = self.settings_selected.previous();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.settings_selected = self.settings_selected.next();
            }
            KeyCode::Enter => {
                if self.settings_selected == SettingsField::Surah {
                    self.open_search();
                } else {
                    self.editing_field = true;
                }
            }
            _ => {}
        }
    }

    fn adjust_setting(&mut self, forward: bool) {
        match self.settings_selected {
            SettingsField::Surah => {}
            SettingsField::Reciter => {
                self.temp_reciter = step(self.temp_reciter, self.view.reciters.len(), forward);
            }
            SettingsField::Translation => {
                self.temp_translation =
                    step(self.temp_translation, self.view.translations.len(), forward);
            }
            SettingsField::Volume => {
                self.temp_volume = if forward {
                    self.temp_volume.saturating_add(5).min(100)
                } else {
                    self.temp_volume.saturating_sub(5)
                };
            }
            SettingsField::Rate => {
                self.temp_rate = if forward {
                    (self.temp_rate + 1).min(PLAYBACK_RATES.len() - 1)
                } else {
                    self.temp_rate.saturating_sub(1)
                };
            }
        }
    }

    fn settings_event(&self) -> Option<UiEvent> {
        match self.settings_selected {
            SettingsField::Surah => None,
            SettingsField::Reciter => self.view.reciters.get(self.temp_reciter).map(|r| {
                UiEvent::ReciterSelected {
                    identifier: r.identifier.clone(),
                }
            }),
            SettingsField::Translation => {
                self.view.translations.get(self.temp_translation).map(|t| {
                    UiEvent::TranslationSelected {
                        identifier: t.identifier.clone(),
                    }
                })
            }
            SettingsField::Volume => Some(UiEvent::VolumeChangeRequested {
                volume: self.temp_volume,
            }),
            SettingsField::Rate => Some(UiEvent::RateChangeRequested {
                rate: PLAYBACK_RATES[self.temp_rate],
            }),
        }
    }

    fn handle_prayer_key(&mut self, key: KeyEvent, events: &mut Vec<UiEvent>) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('q') => {
                self.picker.editing = false;
                events.push(UiEvent::PrayerTimesToggled { open: false });
            }
            KeyCode::Left => self.picker.step_country(&self.countries, false),
            KeyCode::Right => self.picker.step_country(&self.countries, true),
            KeyCode::Up | KeyCode::Char('k') => self.picker.step_city(&self.countries, false),
            KeyCode::Down | KeyCode::Char('j') => self.picker.step_city(&self.countries, true),
            KeyCode::Enter => {
                if let Some(location) = self.picker.location(&self.countries) {
                    self.picker.editing = false;
                    if location != self.view.location {
                        events.push(UiEvent::LocationChanged { location });
                    }
                }
            }
            _ => {}
        }
    }
}

impl Default for TuiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl UiRenderer for TuiRenderer {
    fn init(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        self.terminal = Some(Terminal::new(backend)?);
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        if let Some(mut terminal) = self.terminal.take() {
            execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
            terminal.show_cursor()?;
        }
        Ok(())
    }

    fn render(&mut self, state: &AppState) -> Result<()> {
        self.sync(state);

        let mut terminal = match self.terminal.take() {
            Some(t) => t,
            None => return Ok(()),
        };

        let result = terminal.draw(|f| self.draw_ui(f, state)).map(|_| ());
        self.terminal = Some(terminal);
        result?;
        Ok(())
    }

    fn poll_input(&mut self) -> Result<Vec<UiEvent>> {
        if event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    return Ok(self.handle_key(key));
                }
            }
        }

        Ok(Vec::new())
    }
}

/// Which of ←/→ can still move focus
fn nav_hint(first: bool, last: bool) -> &'static str {
    match (first, last) {
        (true, true) => "",
        (true, false) => "  →",
        (false, true) => "  ←",
        (false, false) => "  ← →",
    }
}

fn media_action(code: KeyCode) -> Option<MediaAction> {
    match code {
        KeyCode::Media(MediaKeyCode::PlayPause) => Some(MediaAction::Toggle),
        KeyCode::Media(MediaKeyCode::Play) => Some(MediaAction::Play),
        KeyCode::Media(MediaKeyCode::Pause) | KeyCode::Media(MediaKeyCode::Stop) => {
            Some(MediaAction::Pause)
        }
        _ => None,
    }
}

fn rate_index(rate: f32) -> usize {
    PLAYBACK_RATES
        .iter()
        .position(|r| (*r - rate).abs() < f32::EPSILON)
        .unwrap_or(2)
}

/// Progress dots for the listening phase, a colour swatch afterwards.
fn shade_span(count: u32) -> Span<'static> {
    match shade(count) {
        Shade::Listening(0) => Span::raw("        "),
        Shade::Listening(n) => {
            let filled = "●".repeat(n as usize);
            let empty = "○".repeat((LISTENING_REPETITIONS - n) as usize);
            Span::styled(format!("{}{} ", filled, empty), Style::default().fg(Color::Cyan))
        }
        Shade::SelfReading(phase) => Span::styled(
            "■■■■■■■ ".to_string(),
            Style::default().fg(SELF_READING_COLORS[phase as usize % SELF_READING_COLORS.len()]),
        ),
    }
}

fn counter_line(count: u32) -> Line<'static> {
    if count <= LISTENING_REPETITIONS {
        Line::from(vec![
            Span::raw("Listens: "),
            shade_span(count),
            Span::raw(format!("{}/{}", count, LISTENING_REPETITIONS)),
        ])
    } else {
        Line::from(vec![
            Span::raw("Listening done  ·  Self-readings: "),
            shade_span(count),
            Span::raw((count - LISTENING_REPETITIONS).to_string()),
        ])
    }
}

fn ayah_item(ayah: &Ayah, count: u32, focused: bool) -> ListItem<'static> {
    let mut text_style = Style::default().fg(Color::White);
    if focused {
        text_style = text_style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }

    let mut lines = vec![Line::from(vec![
        shade_span(count),
        Span::styled(format!("{:>3}. ", ayah.number_in_surah), Style::default().fg(Color::Gray)),
        Span::styled(ayah.text.clone(), text_style),
    ])];
    if let Some(translation) = &ayah.translation_text {
        lines.push(Line::from(Span::styled(
            format!("             {}", translation),
            Style::default().fg(Color::DarkGray),
        )));
    }

    ListItem::new(Text::from(lines))
}
