use crate::application::handlers::HandlerContext;
use crate::core::events::{AppEvent, QuranEvent};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Handles all [`QuranEvent`] variants that need network work.
///
/// Fetches run on worker threads and report back through the event bus;
/// `AppState::apply_event` drops results that arrive for an outdated selection.
pub struct QuranHandler;

impl QuranHandler {
    pub fn handle(&self, event: &QuranEvent, ctx: &mut HandlerContext) -> Result<()> {
        match event {
            QuranEvent::SurahRequested => {
                let Some(source) = ctx.quran.clone() else {
                    return Ok(());
                };

                let request = {
                    let state = ctx.lock_state();
                    let request = state.selection.request();
                    if state.quran.covers(&request) {
                        return Ok(());
                    }
                    request
                };

                ctx.send(AppEvent::Quran(QuranEvent::SurahLoading {
                    request: request.clone(),
                }))?;

                ctx.spawn(move || {
                    match source.surah(request.surah, &request.reciter, &request.translation) {
                        Ok(surah) => {
                            info!(surah = request.surah, ayahs = surah.ayahs.len(), "Surah loaded");
                            AppEvent::Quran(QuranEvent::SurahLoaded { request, surah })
                        }
                        Err(e) => {
                            error!(surah = request.surah, "Failed to load surah: {}", e);
                            AppEvent::Quran(QuranEvent::SurahFailed {
                                request,
                                message: e.to_string(),
                            })
                        }
                    }
                });
            }

            QuranEvent::PrayerTimesRequested => {
                let Some(source) = ctx.prayer.clone() else {
                    return Ok(());
                };
                let location = ctx.lock_state().preferences.location.clone();

                ctx.spawn(move || match source.prayer_times(&location) {
                    Ok(times) => AppEvent::Quran(QuranEvent::PrayerTimesLoaded { location, times }),
                    Err(e) => {
                        error!(%location, "Failed to fetch prayer times: {}", e);
                        AppEvent::Quran(QuranEvent::PrayerTimesFailed {
                            location,
                            message: e.to_string(),
                        })
                    }
                });
            }

            QuranEvent::SurahsLoaded { surahs } => {
                debug!(count = surahs.len(), "Surah list ready");
            }

            // All other variants only update state, handled by AppState::apply_event.
            _ => {}
        }

        Ok(())
    }

    /// Fetch the chapter list and edition catalogues once at startup.
    pub fn load_catalogues(ctx: &HandlerContext) {
        let Some(source) = ctx.quran.clone() else {
            return;
        };

        let list_source = Arc::clone(&source);
        ctx.spawn(move || match list_source.surahs() {
            Ok(surahs) => AppEvent::Quran(QuranEvent::SurahsLoaded { surahs }),
            Err(e) => {
                error!("Failed to load surah list: {}", e);
                AppEvent::Quran(QuranEvent::SurahsFailed {
                    message: e.to_string(),
                })
            }
        });

        ctx.spawn(move || {
            AppEvent::Quran(QuranEvent::EditionsLoaded {
                reciters: source.reciters(),
                translations: source.translations(),
            })
        });
    }
}
