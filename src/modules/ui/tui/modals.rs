use crate::application::state::AppState;
use crate::core::models::{Location, SurahInfo};
use crate::modules::memorization::action::LISTENING_REPETITIONS;
use crate::modules::quran::catalog;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Surah,
    Reciter,
    Translation,
    Volume,
    Rate,
}

impl SettingsField {
    const ALL: [SettingsField; 5] = [
        SettingsField::Surah,
        SettingsField::Reciter,
        SettingsField::Translation,
        SettingsField::Volume,
        SettingsField::Rate,
    ];

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[step(self.position(), Self::ALL.len(), true)]
    }

    pub fn previous(self) -> Self {
        Self::ALL[step(self.position(), Self::ALL.len(), false)]
    }
}

/// Values shown in the settings modal
pub struct SettingsView {
    pub selected: SettingsField,
    pub editing: bool,
    pub surah: String,
    pub reciter: String,
    pub translation: String,
    pub volume: u8,
    pub rate: f32,
}

/// Country/city choice in the prayer-times modal, as indexes into the built-in table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationPicker {
    pub country: usize,
    pub city: usize,
    pub editing: bool,
}

impl LocationPicker {
    pub fn for_location(countries: &[&'static str], location: &Location) -> Self {
        let Some(country) = countries.iter().position(|c| *c == location.country) else {
            return Self::default();
        };
        let city = catalog::cities(countries[country])
            .iter()
            .position(|c| *c == location.city)
            .unwrap_or(0);
        Self {
            country,
            city,
            editing: false,
        }
    }

    /// Changing country selects its first city.
    pub fn step_country(&mut self, countries: &[&'static str], forward: bool) {
        self.country = step(self.country, countries.len(), forward);
        self.city = 0;
        self.editing = true;
    }

    pub fn step_city(&mut self, countries: &[&'static str], forward: bool) {
        let Some(country) = countries.get(self.country) else {
            return;
        };
        self.city = step(self.city, catalog::cities(country).len(), forward);
        self.editing = true;
    }

    pub fn location(&self, countries: &[&'static str]) -> Option<Location> {
        let country = countries.get(self.country)?;
        let city = catalog::cities(country).get(self.city)?;
        Some(Location {
            city: city.to_string(),
            country: country.to_string(),
        })
    }
}

/// Wrapping step through a list of `len` entries.
pub fn step(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

fn modal_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn hint(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
}

/// Split a modal into a body and a one-line footer.
fn body_and_footer(area: Rect) -> (Rect, Rect) {
    let inner = Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(2),
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);
    (chunks[0], chunks[1])
}

pub fn draw_card(f: &mut Frame, state: &AppState) {
    let Some(ayah) = state.focused_ayah() else {
        return;
    };
    let area = centered_rect(80, 60, f.area());
    f.render_widget(Clear, area);
    f.render_widget(modal_block(" Memorization card ", Color::Cyan), area);
    let (body, footer) = body_and_footer(area);

    let count = state.memorization.count(ayah.number);
    let action = state
        .memorization
        .action_state(ayah.number, state.playback.verse_busy());

    let press = if count < LISTENING_REPETITIONS {
        format!("Press to listen ({}/{})", count, LISTENING_REPETITIONS)
    } else {
        format!(
            "Recite from memory, then press to count ({} so far)",
            count - LISTENING_REPETITIONS
        )
    };
    let press_style = if action.enabled {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Ayah {}", ayah.number_in_surah),
            Style::default().fg(Color::Gray),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            ayah.text.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
    ];
    if let Some(translation) = &ayah.translation_text {
        lines.push(Line::raw(translation.clone()));
        lines.push(Line::raw(""));
    }
    lines.push(Line::from(Span::styled(press, press_style)));
    if state.playback.verse_playing {
        lines.push(Line::from(Span::styled(
            "▶ Listening...",
            Style::default().fg(Color::Green),
        )));
    } else if state.playback.verse_loading {
        lines.push(Line::from(Span::styled(
            "Loading audio...",
            Style::default().fg(Color::Yellow),
        )));
    }

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        body,
    );
    f.render_widget(
        hint("Space/Enter: Press • r: Self-read • ←/→: Prev/Next • x: Stop • Esc: Close"),
        footer,
    );
}

pub fn draw_tafsir(f: &mut Frame, state: &AppState, scroll: u16) {
    let area = centered_rect(80, 70, f.area());
    f.render_widget(Clear, area);
    f.render_widget(modal_block(" Tafsir ", Color::Magenta), area);
    let (body, footer) = body_and_footer(area);

    let mut lines = Vec::new();
    if let Some(ayah) = state.tafsir.ayah {
        let label = state
            .quran
            .surah
            .as_ref()
            .and_then(|s| s.ayah(ayah))
            .map_or(ayah, |a| a.number_in_surah);
        lines.push(Line::from(Span::styled(
            format!("Ayah {}", label),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::raw(""));
    }

    match &state.tafsir.content {
        None if state.tafsir.loading => lines.push(Line::raw("Loading tafsir...")),
        None => lines.push(Line::raw("No tafsir loaded.")),
        Some(tafsir) => {
            if let Some(arabic) = &tafsir.arabic {
                lines.push(Line::from(Span::styled(
                    "التفسير الميسر",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::raw(arabic.clone()));
                lines.push(Line::raw(""));
            }
            if let Some(translation) = &tafsir.translation {
                lines.push(Line::from(Span::styled(
                    format!("{} ({})", translation.name, translation.lang),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::raw(
                    translation
                        .text
                        .clone()
                        .unwrap_or_else(|| "Not available in this language.".to_string()),
                ));
            }
        }
    }

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .scroll((scroll, 0)),
        body,
    );
    f.render_widget(hint("↑/↓: Scroll • Esc: Close"), footer);
}

pub fn draw_prayer(
    f: &mut Frame,
    state: &AppState,
    countries: &[&'static str],
    picker: &LocationPicker,
) {
    let area = centered_rect(50, 50, f.area());
    f.render_widget(Clear, area);
    f.render_widget(modal_block(" Prayer times ", Color::Green), area);
    let (body, footer) = body_and_footer(area);

    let mut lines = vec![Line::from(vec![
        Span::raw("Location: "),
        Span::styled(
            state.preferences.location.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])];

    if let Some(candidate) = picker.location(countries) {
        let style = if picker.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(
            format!("◀ {} ▶   ▲ {} ▼", candidate.country, candidate.city),
            style,
        )));
    }
    lines.push(Line::raw(""));

    if state.prayer.loading {
        lines.push(Line::raw("Loading prayer times..."));
    } else if let Some(error) = &state.prayer.error {
        lines.push(Line::from(Span::styled(
            format!("Could not fetch prayer times: {}", error),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(times) = &state.prayer.times {
        for (name, time) in times.timings.entries() {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", name), Style::default().fg(Color::Cyan)),
                Span::raw(time.to_string()),
            ]));
        }
    } else {
        lines.push(Line::raw("Choose a city and country."));
    }

    f.render_widget(Paragraph::new(lines), body);
    f.render_widget(hint("←/→: Country • ↑/↓: City • Enter: Apply • Esc: Close"), footer);
}

pub fn draw_settings(f: &mut Frame, view: &SettingsView) {
    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);
    f.render_widget(modal_block(" Settings ", Color::Yellow), area);
    let (body, footer) = body_and_footer(area);

    let rows = [
        (SettingsField::Surah, format!("Surah: {}", view.surah)),
        (SettingsField::Reciter, format!("Reciter: {}", view.reciter)),
        (SettingsField::Translation, format!("Translation: {}", view.translation)),
        (SettingsField::Volume, format!("Volume: {}%", view.volume)),
        (SettingsField::Rate, format!("Playback rate: {}x", view.rate)),
    ];

    let lines: Vec<Line> = rows
        .into_iter()
        .map(|(field, text)| {
            if field != view.selected {
                return Line::from(Span::styled(text, Style::default().fg(Color::White)));
            }
            let style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
            if view.editing {
                Line::from(vec![
                    Span::styled(format!("◀ {} ▶", text), style),
                    Span::styled("  [EDITING]", Style::default().fg(Color::Gray)),
                ])
            } else {
                Line::from(Span::styled(format!("> {}", text), style))
            }
        })
        .collect();

    f.render_widget(Paragraph::new(lines), body);

    let help_text = if view.editing {
        "←/→: Adjust • 0-9: Type volume • Enter: Confirm • Esc: Cancel"
    } else {
        "↑/↓: Navigate • Enter: Edit • s/Esc: Close"
    };
    f.render_widget(hint(help_text), footer);
}

pub fn draw_search(f: &mut Frame, query: &str, results: &[&SurahInfo], list_state: &mut ListState) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);
    f.render_widget(modal_block(" Choose surah ", Color::Yellow), area);

    let inner = Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(2),
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Yellow)),
            Span::styled(query.to_string(), Style::default().fg(Color::White)),
            Span::styled("█", Style::default().fg(Color::Gray)),
        ])),
        chunks[0],
    );

    let items: Vec<ListItem> = results
        .iter()
        .map(|s| ListItem::new(s.to_string()))
        .collect();
    let title = if results.is_empty() {
        " No matches ".to_string()
    } else {
        format!(" {} surahs ", results.len())
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::TOP).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");
    f.render_stateful_widget(list, chunks[1], list_state);

    f.render_widget(
        hint("Type to filter • ↑/↓: Navigate • Enter: Open • Ctrl+U: Clear • Esc: Cancel"),
        chunks[2],
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picker_starts_on_stored_location() {
        let countries: Vec<&'static str> = catalog::countries().collect();
        let picker = LocationPicker::for_location(&countries, &Location::default());
        assert_eq!(picker.location(&countries), Some(Location::default()));
        assert!(!picker.editing);
    }

    #[test]
    fn unknown_country_falls_back_to_first_entry() {
        let countries: Vec<&'static str> = catalog::countries().collect();
        let picker = LocationPicker::for_location(
            &countries,
            &Location {
                city: "Atlantis".into(),
                country: "Nowhere".into(),
            },
        );
        assert_eq!(picker, LocationPicker::default());
    }

    #[test]
    fn settings_fields_wrap() {
        assert_eq!(SettingsField::Rate.next(), SettingsField::Surah);
        assert_eq!(SettingsField::Surah.previous(), SettingsField::Rate);
    }

    #[test]
    fn centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert!(inner.x >= outer.x && inner.right() <= outer.right());
        assert!(inner.y >= outer.y && inner.bottom() <= outer.bottom());
    }
}
