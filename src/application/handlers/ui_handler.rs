use crate::application::handlers::{lock, HandlerContext};
use crate::core::events::{AppEvent, PlaybackEvent, QuranEvent, UiEvent};
use crate::modules::memorization::action::LISTENING_REPETITIONS;
use crate::modules::memorization::session::PressOutcome;
use crate::modules::playback::coordinator::PLAYBACK_RATES;
use crate::utils::volume_percent_to_amplitude;
use anyhow::Result;
use tracing::warn;

/// Which memorization control was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Press {
    Action,
    Card,
    SelfRead,
}

/// Handles all [`UiEvent`] variants that require side effects.
///
/// Responsible for:
/// - Running the memorization ritual against the playback coordinator
/// - Turning selection changes into chapter fetches
/// - Starting tafsir and prayer-time lookups
/// - Persisting preference changes to storage
///
/// Pure state updates (focus, modals, messages) are already handled by
/// `AppState::apply_event`.
pub struct UiHandler;

impl UiHandler {
    pub fn handle(&self, event: &UiEvent, ctx: &mut HandlerContext) -> Result<()> {
        match event {
            UiEvent::ActionRequested => Self::press(ctx, Press::Action)?,
            UiEvent::CardPressed => Self::press(ctx, Press::Card)?,
            UiEvent::SelfReadRequested => Self::press(ctx, Press::SelfRead)?,

            UiEvent::StopRequested => {
                if let Some(coordinator) = ctx.coordinator.as_mut() {
                    coordinator.pause_verse();
                }
            }

            UiEvent::RadioToggled => {
                if let Some(coordinator) = ctx.coordinator.as_mut() {
                    coordinator.toggle_radio(&ctx.config.radio.stream_url);
                }
            }

            UiEvent::Media { action } => {
                if let Some(coordinator) = ctx.coordinator.as_mut() {
                    coordinator.handle_media_action(*action, &ctx.config.radio.stream_url);
                }
            }

            UiEvent::SurahSelected { .. }
            | UiEvent::ReciterSelected { .. }
            | UiEvent::TranslationSelected { .. } => {
                ctx.persist_state()?;
                ctx.send(AppEvent::Quran(QuranEvent::SurahRequested))?;
            }

            UiEvent::TafsirRequested { ayah } => {
                let Some(source) = ctx.quran.clone() else {
                    return Ok(());
                };
                let ayah = *ayah;
                let translation = ctx.lock_state().selection.translation.clone();

                ctx.spawn(move || match source.tafsir(ayah, &translation) {
                    Ok(tafsir) => AppEvent::Quran(QuranEvent::TafsirLoaded { ayah, tafsir }),
                    Err(e) => {
                        warn!(ayah, "Tafsir unavailable: {}", e);
                        AppEvent::Quran(QuranEvent::TafsirFailed {
                            ayah,
                            message: e.to_string(),
                        })
                    }
                });
            }

            UiEvent::PrayerTimesToggled { open: true } => {
                let needs_fetch = {
                    let state = ctx.lock_state();
                    state.prayer.times.is_none() && !state.prayer.loading
                };
                if needs_fetch {
                    ctx.send(AppEvent::Quran(QuranEvent::PrayerTimesRequested))?;
                }
            }

            UiEvent::LocationChanged { .. } => {
                ctx.persist_state()?;
                ctx.send(AppEvent::Quran(QuranEvent::PrayerTimesRequested))?;
            }

            UiEvent::VolumeChangeRequested { volume } => {
                let volume_f32 = volume_percent_to_amplitude(*volume);
                ctx.send(AppEvent::Playback(PlaybackEvent::VolumeChanged {
                    volume: volume_f32,
                }))?;
                ctx.send(AppEvent::Ui(UiEvent::ShowMessage {
                    message: format!("Volume set to {}%", volume),
                }))?;
            }

            UiEvent::RateChangeRequested { rate } => {
                if !PLAYBACK_RATES.contains(rate) {
                    ctx.send(AppEvent::Ui(UiEvent::ShowError {
                        message: format!("Unsupported playback rate: {}", rate),
                    }))?;
                    return Ok(());
                }
                ctx.send(AppEvent::Playback(PlaybackEvent::RateChanged { rate: *rate }))?;
                ctx.send(AppEvent::Ui(UiEvent::ShowMessage {
                    message: format!("Playback rate set to {}x", rate),
                }))?;
            }

            UiEvent::QuitRequested => {
                ctx.send(AppEvent::Shutdown)?;
            }

            // Pure state updates, already handled by AppState::apply_event.
            UiEvent::AyahClicked { .. }
            | UiEvent::CardToggled { .. }
            | UiEvent::NextAyahRequested
            | UiEvent::PreviousAyahRequested
            | UiEvent::TafsirClosed
            | UiEvent::PrayerTimesToggled { open: false }
            | UiEvent::ShowMessage { .. }
            | UiEvent::ShowError { .. } => {}
        }

        Ok(())
    }

    /// Apply one memorization press to the focused ayah.
    fn press(ctx: &mut HandlerContext, press: Press) -> Result<()> {
        let Some(coordinator) = ctx.coordinator.as_mut() else {
            return Ok(());
        };

        let outcome = {
            let mut state = lock(ctx.state);
            let Some(ayah) = state.focused_ayah().cloned() else {
                return Ok(());
            };
            match press {
                Press::Action => state.memorization.press_action(&ayah, coordinator),
                Press::Card => state.memorization.press_card(&ayah, coordinator),
                Press::SelfRead => state.memorization.self_read(&ayah, coordinator),
            }
        };

        if let Some(message) = describe(outcome) {
            ctx.send(AppEvent::Ui(UiEvent::ShowMessage { message }))?;
        }
        Ok(())
    }
}

/// Status line text for a press
fn describe(outcome: PressOutcome) -> Option<String> {
    match outcome {
        PressOutcome::Ignored => None,
        PressOutcome::Listen { count, played: true } => {
            Some(format!("Listening {} of {}", count, LISTENING_REPETITIONS))
        }
        PressOutcome::Listen {
            count,
            played: false,
        } => Some(format!(
            "Counted {} of {} (no audio for this ayah)",
            count, LISTENING_REPETITIONS
        )),
        PressOutcome::Relisten { played: true, .. } => Some("Listening again".to_string()),
        PressOutcome::Relisten { played: false, .. } => {
            Some("No audio for this ayah".to_string())
        }
        PressOutcome::SelfRead { count } => Some(format!(
            "Self-reading {} done",
            count - LISTENING_REPETITIONS
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignored_press_is_silent() {
        assert_eq!(describe(PressOutcome::Ignored), None);
    }

    #[test]
    fn listen_message_counts_toward_seven() {
        assert_eq!(
            describe(PressOutcome::Listen { count: 3, played: true }).as_deref(),
            Some("Listening 3 of 7")
        );
    }

    #[test]
    fn self_read_message_counts_past_seven() {
        assert_eq!(
            describe(PressOutcome::SelfRead { count: 9 }).as_deref(),
            Some("Self-reading 2 done")
        );
    }
}
