use crossterm::{execute, terminal::SetTitle};
use std::io::stdout;
use tracing::debug;

/// Now-playing metadata published while the radio is on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    pub title: String,
    pub artist: String,
    pub artwork: Option<String>,
}

/// Play/pause requests arriving from outside the app's own controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaAction {
    Play,
    Pause,
    Toggle,
}

/// Platform media integration (lock screen, media keys, window title).
///
/// Optional: the coordinator works without one.
pub trait MediaSession: Send {
    fn set_metadata(&mut self, metadata: &MediaMetadata);

    fn set_playing(&mut self, playing: bool);
}

/// Publishes metadata through the terminal window title.
pub struct TerminalMediaSession {
    app_title: String,
    metadata: Option<MediaMetadata>,
}

impl TerminalMediaSession {
    pub fn new(app_title: &str) -> Self {
        Self {
            app_title: app_title.to_string(),
            metadata: None,
        }
    }

    fn title(&self, playing: bool) -> String {
        match (&self.metadata, playing) {
            (Some(meta), true) => format!("▶ {} - {}", meta.title, meta.artist),
            _ => self.app_title.clone(),
        }
    }

    fn apply(&self, playing: bool) {
        if let Err(e) = execute!(stdout(), SetTitle(self.title(playing))) {
            debug!("Could not set terminal title: {}", e);
        }
    }
}

impl MediaSession for TerminalMediaSession {
    fn set_metadata(&mut self, metadata: &MediaMetadata) {
        self.metadata = Some(metadata.clone());
    }

    fn set_playing(&mut self, playing: bool) {
        self.apply(playing);
    }
}
