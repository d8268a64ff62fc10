pub mod playback_handler;
pub mod quran_handler;
pub mod ui_handler;

use crate::application::state::AppState;
use crate::config::AppConfig;
use crate::core::events::{AppEvent, EventSender};
use crate::core::traits::{PrayerTimesSource, QuranSource, StorageBackend};
use crate::modules::playback::coordinator::PlaybackCoordinator;
use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// All dependencies that event handlers need to do their work.
///
/// Passed by `&mut` into each handler method, giving handlers access to
/// shared resources without coupling them to the `Application` struct itself.
pub struct HandlerContext<'a> {
    pub state: &'a Arc<Mutex<AppState>>,
    pub event_tx: &'a EventSender,
    pub config: &'a AppConfig,
    pub coordinator: &'a mut Option<PlaybackCoordinator>,
    pub storage: &'a Option<Box<dyn StorageBackend>>,
    pub quran: &'a Option<Arc<dyn QuranSource>>,
    pub prayer: &'a Option<Arc<dyn PrayerTimesSource>>,
}

impl<'a> HandlerContext<'a> {
    pub fn lock_state(&self) -> MutexGuard<'a, AppState> {
        lock(self.state)
    }

    /// Save the current state to storage, if a backend is present.
    pub fn persist_state(&self) -> Result<()> {
        if let Some(storage) = self.storage {
            let state = self.lock_state();
            storage.save(&state)?;
        }

        Ok(())
    }

    pub fn send(&self, event: AppEvent) -> Result<()> {
        self.event_tx.send(event)?;
        Ok(())
    }

    /// Run `job` on a worker thread and post whatever event it produces.
    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() -> AppEvent + Send + 'static,
    {
        let tx = self.event_tx.clone();
        std::thread::spawn(move || {
            if tx.send(job()).is_err() {
                warn!("Event bus closed before a background result arrived");
            }
        });
    }
}

/// Lock shared state, recovering it if a panicking thread poisoned the mutex.
pub fn lock(state: &Mutex<AppState>) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
