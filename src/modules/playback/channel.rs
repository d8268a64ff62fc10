use crate::core::traits::{AudioOutput, OutputSignal};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Verse,
    Radio,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Verse => write!(f, "verse"),
            ChannelKind::Radio => write!(f, "radio"),
        }
    }
}

/// The only two things a channel reports. `Stopped` covers natural end and pause alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    Started,
    Stopped,
}

/// One long-lived audio handle with a current source, a requested flag and a
/// confirmed playing flag.
///
/// `is_playing` flips to true only when the output confirms sound, never on
/// the request itself. `is_busy` also covers a request still loading.
pub struct AudioChannel {
    kind: ChannelKind,
    output: Box<dyn AudioOutput>,
    source: Option<String>,
    requested: bool,
    playing: bool,
    pending: VecDeque<ChannelEvent>,
}

impl AudioChannel {
    pub fn new(kind: ChannelKind, output: Box<dyn AudioOutput>) -> Self {
        Self {
            kind,
            output,
            source: None,
            requested: false,
            playing: false,
            pending: VecDeque::new(),
        }
    }

    /// Set the source if it differs from the current one. Returns true when it changed.
    pub fn load(&mut self, url: &str) -> bool {
        if self.source.as_deref() == Some(url) {
            return false;
        }
        self.source = Some(url.to_string());
        true
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Requested and not yet settled, or confirmed playing
    pub fn is_busy(&self) -> bool {
        self.requested || self.playing
    }

    /// Start or resume the current source in place.
    pub fn play(&mut self) {
        self.request(false);
    }

    /// Start the current source from time zero.
    pub fn play_from_start(&mut self) {
        self.request(true);
    }

    fn request(&mut self, restart: bool) {
        match &self.source {
            Some(url) => {
                self.output.play(url, restart);
                self.requested = true;
            }
            None => debug!(channel = %self.kind, "Play requested with no source loaded"),
        }
    }

    pub fn pause(&mut self) {
        self.output.pause();
        self.requested = false;
        if self.playing {
            self.playing = false;
            self.pending.push_back(ChannelEvent::Stopped);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.output.set_volume(volume);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.output.set_speed(speed);
    }

    /// Drain settled output signals into channel events.
    pub fn poll(&mut self) -> Vec<ChannelEvent> {
        while let Some(signal) = self.output.poll_signal() {
            match signal {
                OutputSignal::Started => {
                    self.requested = false;
                    self.playing = true;
                    self.pending.push_back(ChannelEvent::Started);
                }
                OutputSignal::Ended => {
                    self.requested = false;
                    if self.playing {
                        self.playing = false;
                        self.pending.push_back(ChannelEvent::Stopped);
                    }
                }
                // Only a newer play or pause interrupts, and both already set `requested`.
                OutputSignal::Failed(err) if err.is_interrupted() => {
                    debug!(channel = %self.kind, "Superseded play request dropped");
                }
                OutputSignal::Failed(err) => {
                    error!(channel = %self.kind, "Playback failed: {}", err);
                    self.requested = false;
                    // Never leave a "playing" indicator behind a dead output.
                    if self.playing {
                        warn!(channel = %self.kind, "Forcing channel to stopped after failure");
                        self.playing = false;
                        self.pending.push_back(ChannelEvent::Stopped);
                    }
                }
            }
        }

        self.pending.drain(..).collect()
    }
}
