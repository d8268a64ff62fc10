use crate::application::handlers::HandlerContext;
use crate::core::events::{AppEvent, PlaybackEvent, UiEvent};
use crate::modules::memorization::action::LISTENING_REPETITIONS;
use anyhow::Result;
use tracing::debug;

/// Handles all [`PlaybackEvent`] variants.
///
/// Responsible for:
/// - Pushing volume and rate changes into the coordinator
/// - Persisting them to storage
/// - Reporting completed listens
pub struct PlaybackHandler;

impl PlaybackHandler {
    pub fn handle(&self, event: &PlaybackEvent, ctx: &mut HandlerContext) -> Result<()> {
        match event {
            PlaybackEvent::VerseFinished { ayah } => {
                let count = ctx.lock_state().memorization.count(*ayah);
                debug!(ayah, count, "Listen complete");
                let message = if count >= LISTENING_REPETITIONS {
                    "Listening done. Recite it yourself and count with 'r'.".to_string()
                } else {
                    format!("Listen {} of {} done", count, LISTENING_REPETITIONS)
                };
                ctx.send(AppEvent::Ui(UiEvent::ShowMessage { message }))?;
            }

            PlaybackEvent::VolumeChanged { volume } => {
                if let Some(coordinator) = ctx.coordinator.as_mut() {
                    coordinator.set_volume(*volume);
                }
                ctx.persist_state()?;
            }

            PlaybackEvent::RateChanged { rate } => {
                if let Some(coordinator) = ctx.coordinator.as_mut() {
                    coordinator.set_playback_rate(*rate);
                }
                ctx.persist_state()?;
            }

            // Flag transitions only update state, already handled by AppState::apply_event.
            PlaybackEvent::VerseStarted
            | PlaybackEvent::VerseStopped
            | PlaybackEvent::RadioStarted
            | PlaybackEvent::RadioStopped => {}
        }

        Ok(())
    }
}
