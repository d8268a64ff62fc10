use crate::core::models::Ayah;
use crate::core::traits::{AudioOutput, VersePlayer};
use crate::modules::playback::channel::{AudioChannel, ChannelEvent, ChannelKind};
use crate::modules::playback::media_session::{MediaAction, MediaMetadata, MediaSession};
use tracing::{debug, info};

/// Verse playback rates offered to the user.
pub const PLAYBACK_RATES: [f32; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// Flag transitions observed while polling the channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSignal {
    VerseStarted,
    VerseStopped,
    RadioStarted,
    RadioStopped,
}

type FinishedListener = Box<dyn FnMut(&Ayah) + Send>;

/// Keeps the verse and radio channels mutually exclusive.
///
/// Starting one side always pauses the other first. The two playing flags
/// are only ever set by confirmed `Started` events, so at no observable point
/// are both true.
pub struct PlaybackCoordinator {
    verse: AudioChannel,
    radio: AudioChannel,
    current_verse: Option<Ayah>,
    // Set when we pause verse audio ourselves, so the resulting Stopped is not a completion.
    verse_pause_requested: bool,
    finished_listeners: Vec<FinishedListener>,
    media_session: Option<Box<dyn MediaSession>>,
    radio_metadata: Option<MediaMetadata>,
}

impl PlaybackCoordinator {
    pub fn new(verse_output: Box<dyn AudioOutput>, radio_output: Box<dyn AudioOutput>) -> Self {
        Self {
            verse: AudioChannel::new(ChannelKind::Verse, verse_output),
            radio: AudioChannel::new(ChannelKind::Radio, radio_output),
            current_verse: None,
            verse_pause_requested: false,
            finished_listeners: Vec::new(),
            media_session: None,
            radio_metadata: None,
        }
    }

    /// Attach OS/terminal media integration and the metadata shown while the radio plays
    pub fn with_media_session(
        mut self,
        session: Box<dyn MediaSession>,
        radio_metadata: MediaMetadata,
    ) -> Self {
        self.media_session = Some(session);
        self.radio_metadata = Some(radio_metadata);
        self
    }

    /// Register a callback fired once each time verse audio plays to its natural end
    pub fn on_playback_finished<F>(&mut self, listener: F)
    where
        F: FnMut(&Ayah) + Send + 'static,
    {
        self.finished_listeners.push(Box::new(listener));
    }

    pub fn is_verse_playing(&self) -> bool {
        self.verse.is_playing()
    }

    pub fn is_radio_playing(&self) -> bool {
        self.radio.is_playing()
    }

    /// Verse audio requested but not yet settled, or playing
    pub fn is_verse_busy(&self) -> bool {
        self.verse.is_busy()
    }

    pub fn is_radio_busy(&self) -> bool {
        self.radio.is_busy()
    }

    /// Play an ayah from time zero, silencing the radio first.
    ///
    /// Returns false (and does nothing) when the ayah has no audio.
    pub fn play_verse(&mut self, ayah: &Ayah) -> bool {
        let Some(url) = ayah.audio_url() else {
            debug!(ayah = ayah.number, "Ayah has no audio; nothing to play");
            return false;
        };

        self.pause_radio();
        self.verse.load(&url);
        self.current_verse = Some(ayah.clone());
        self.verse.play_from_start();
        true
    }

    /// Stop verse audio. The resulting stop is not reported as a completion.
    pub fn pause_verse(&mut self) {
        if self.verse.is_playing() {
            self.verse_pause_requested = true;
        }
        self.verse.pause();
    }

    /// A second toggle while the stream is still connecting cancels it.
    pub fn toggle_radio(&mut self, stream_url: &str) {
        if self.radio.is_busy() {
            self.pause_radio();
        } else {
            self.start_radio(stream_url);
        }
    }

    fn start_radio(&mut self, stream_url: &str) {
        self.pause_verse();
        if self.radio.load(stream_url) {
            info!(url = stream_url, "Radio source changed");
        }
        self.radio.play();
    }

    pub fn pause_radio(&mut self) {
        self.radio.pause();
    }

    /// Media-session play/pause handlers defer to the same radio logic.
    pub fn handle_media_action(&mut self, action: MediaAction, stream_url: &str) {
        match action {
            MediaAction::Play if !self.radio.is_busy() => self.start_radio(stream_url),
            MediaAction::Pause => self.pause_radio(),
            MediaAction::Toggle => self.toggle_radio(stream_url),
            MediaAction::Play => {}
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.verse.set_volume(volume);
        self.radio.set_volume(volume);
    }

    pub fn set_playback_rate(&mut self, rate: f32) {
        self.verse.set_speed(rate);
    }

    /// Drain both channels, fire completion callbacks and report flag transitions.
    ///
    /// Whichever channel confirms a start last wins; the other is paused.
    pub fn poll(&mut self) -> Vec<PlaybackSignal> {
        let mut signals = Vec::new();

        for event in self.verse.poll() {
            match event {
                ChannelEvent::Started => {
                    if self.radio.is_playing() {
                        self.pause_radio();
                    }
                    signals.push(PlaybackSignal::VerseStarted);
                }
                ChannelEvent::Stopped => {
                    signals.push(PlaybackSignal::VerseStopped);
                    if self.verse_pause_requested {
                        self.verse_pause_requested = false;
                    } else {
                        self.notify_finished();
                    }
                }
            }
        }

        for event in self.radio.poll() {
            match event {
                ChannelEvent::Started => {
                    if self.verse.is_playing() {
                        self.pause_verse();
                    }
                    if let (Some(session), Some(meta)) =
                        (self.media_session.as_mut(), self.radio_metadata.as_ref())
                    {
                        session.set_metadata(meta);
                        session.set_playing(true);
                    }
                    signals.push(PlaybackSignal::RadioStarted);
                }
                ChannelEvent::Stopped => {
                    if let Some(session) = self.media_session.as_mut() {
                        session.set_playing(false);
                    }
                    signals.push(PlaybackSignal::RadioStopped);
                }
            }
        }

        signals
    }

    fn notify_finished(&mut self) {
        let Some(ayah) = self.current_verse.clone() else {
            return;
        };
        debug!(ayah = ayah.number, "Verse playback finished");
        for listener in self.finished_listeners.iter_mut() {
            listener(&ayah);
        }
    }
}

impl VersePlayer for PlaybackCoordinator {
    fn is_verse_busy(&self) -> bool {
        PlaybackCoordinator::is_verse_busy(self)
    }

    fn play_verse(&mut self, ayah: &Ayah) -> bool {
        PlaybackCoordinator::play_verse(self, ayah)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PlaybackError;
    use crate::core::traits::OutputSignal;
    use crate::modules::playback::channel::tests::{Call, FakeOutput};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const RADIO: &str = "https://radio.example/stream";

    fn ayah(number: u32) -> Ayah {
        Ayah {
            number,
            number_in_surah: number,
            text: format!("ayah {}", number),
            translation_text: None,
            audio: Some(format!("http://cdn.example/{}.mp3", number)),
            juz: 1,
            page: 1,
        }
    }

    fn coordinator() -> (PlaybackCoordinator, FakeOutput, FakeOutput) {
        let verse = FakeOutput::new();
        let radio = FakeOutput::new();
        let c = PlaybackCoordinator::new(Box::new(verse.clone()), Box::new(radio.clone()));
        (c, verse, radio)
    }

    #[test]
    fn play_verse_pauses_radio_and_restarts_from_zero() {
        let (mut c, verse, radio) = coordinator();
        c.toggle_radio(RADIO);
        radio.push(OutputSignal::Started);
        c.poll();
        assert!(c.is_radio_playing());

        assert!(c.play_verse(&ayah(1)));
        assert!(!c.is_radio_playing(), "radio must be off right after play_verse");
        assert!(radio.calls().contains(&Call::Pause));
        assert_eq!(
            verse.play_calls().last(),
            Some(&Call::Play { url: "https://cdn.example/1.mp3".into(), restart: true })
        );
    }

    #[test]
    fn replaying_same_verse_still_restarts() {
        let (mut c, verse, _) = coordinator();
        c.play_verse(&ayah(1));
        c.play_verse(&ayah(1));
        assert_eq!(verse.play_calls().len(), 2);
        assert!(verse.play_calls().iter().all(|call| matches!(call, Call::Play { restart: true, .. })));
    }

    #[test]
    fn verse_without_audio_is_noop() {
        let (mut c, verse, radio) = coordinator();
        let mut silent = ayah(1);
        silent.audio = None;
        assert!(!c.play_verse(&silent));
        assert!(verse.calls().is_empty());
        assert!(radio.calls().is_empty());
    }

    #[test]
    fn toggle_radio_pauses_verse_then_plays_stream() {
        let (mut c, verse, radio) = coordinator();
        c.play_verse(&ayah(1));
        verse.push(OutputSignal::Started);
        c.poll();
        assert!(c.is_verse_playing());

        c.toggle_radio(RADIO);
        assert!(!c.is_verse_playing(), "verse must be off before radio starts");
        radio.push(OutputSignal::Started);
        let signals = c.poll();
        assert!(signals.contains(&PlaybackSignal::RadioStarted));
        assert!(c.is_radio_playing());
        assert!(!c.is_verse_playing());
        assert_eq!(
            radio.play_calls(),
            vec![Call::Play { url: RADIO.into(), restart: false }]
        );
    }

    #[test]
    fn toggle_radio_twice_turns_it_off() {
        let (mut c, _, radio) = coordinator();
        c.toggle_radio(RADIO);
        radio.push(OutputSignal::Started);
        c.poll();
        c.toggle_radio(RADIO);
        assert!(!c.is_radio_playing());
        assert_eq!(c.poll(), vec![PlaybackSignal::RadioStopped]);
    }

    #[test]
    fn toggle_while_stream_connects_cancels_it() {
        let (mut c, _, radio) = coordinator();
        c.toggle_radio(RADIO);
        assert!(c.is_radio_busy());
        assert!(!c.is_radio_playing());

        c.toggle_radio(RADIO);
        assert!(!c.is_radio_busy());
        assert_eq!(radio.play_calls().len(), 1);
        assert_eq!(radio.calls().last(), Some(&Call::Pause));
    }

    #[test]
    fn verse_is_busy_while_loading() {
        let (mut c, verse, _) = coordinator();
        c.play_verse(&ayah(4));
        assert!(c.is_verse_busy());
        assert!(!c.is_verse_playing());

        verse.push(OutputSignal::Failed(PlaybackError::Fetch {
            url: "https://cdn.example/4.mp3".into(),
            message: "timed out".into(),
        }));
        c.poll();
        assert!(!c.is_verse_busy());
    }

    #[test]
    fn flags_are_never_both_true() {
        let (mut c, verse, radio) = coordinator();
        let steps: Vec<Box<dyn Fn(&mut PlaybackCoordinator)>> = vec![
            Box::new(|c| c.toggle_radio(RADIO)),
            Box::new(|c| {
                c.play_verse(&ayah(2));
            }),
            Box::new(|c| c.toggle_radio(RADIO)),
            Box::new(|c| {
                c.play_verse(&ayah(3));
            }),
        ];
        for step in steps {
            step(&mut c);
            assert!(!(c.is_verse_playing() && c.is_radio_playing()));
            verse.push(OutputSignal::Started);
            radio.push(OutputSignal::Started);
            c.poll();
            assert!(!(c.is_verse_playing() && c.is_radio_playing()));
        }
    }

    #[test]
    fn natural_end_fires_finished_exactly_once() {
        let (mut c, verse, _) = coordinator();
        let fired = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let fired = Arc::clone(&fired);
            let seen = Arc::clone(&seen);
            c.on_playback_finished(move |a| {
                fired.fetch_add(1, Ordering::SeqCst);
                seen.lock().unwrap().push(a.number);
            });
        }

        c.play_verse(&ayah(3));
        verse.push(OutputSignal::Started);
        verse.push(OutputSignal::Ended);
        c.poll();
        c.poll();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[test]
    fn manual_pause_is_not_a_completion() {
        let (mut c, verse, _) = coordinator();
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = Arc::clone(&fired);
            c.on_playback_finished(move |_| {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        c.play_verse(&ayah(1));
        verse.push(OutputSignal::Started);
        c.poll();
        c.pause_verse();
        assert_eq!(c.poll(), vec![PlaybackSignal::VerseStopped]);

        c.toggle_radio(RADIO);
        c.poll();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_verse_play_leaves_flags_false() {
        let (mut c, verse, _) = coordinator();
        c.play_verse(&ayah(1));
        verse.push(OutputSignal::Failed(PlaybackError::Fetch {
            url: "https://cdn.example/1.mp3".into(),
            message: "404".into(),
        }));
        assert!(c.poll().is_empty());
        assert!(!c.is_verse_playing());
        assert!(!c.is_radio_playing());
    }

    #[test]
    fn radio_failure_while_playing_clears_flag() {
        let (mut c, _, radio) = coordinator();
        c.toggle_radio(RADIO);
        radio.push(OutputSignal::Started);
        c.poll();
        radio.push(OutputSignal::Failed(PlaybackError::Fetch {
            url: RADIO.into(),
            message: "stream dropped".into(),
        }));
        assert_eq!(c.poll(), vec![PlaybackSignal::RadioStopped]);
        assert!(!c.is_radio_playing());
    }

    struct RecordingSession {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl MediaSession for RecordingSession {
        fn set_metadata(&mut self, metadata: &MediaMetadata) {
            self.log.lock().unwrap().push(format!("meta:{}", metadata.title));
        }

        fn set_playing(&mut self, playing: bool) {
            self.log.lock().unwrap().push(format!("playing:{}", playing));
        }
    }

    #[test]
    fn media_session_gets_metadata_when_radio_starts() {
        let verse = FakeOutput::new();
        let radio = FakeOutput::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut c = PlaybackCoordinator::new(Box::new(verse), Box::new(radio.clone()))
            .with_media_session(
                Box::new(RecordingSession { log: Arc::clone(&log) }),
                MediaMetadata {
                    title: "Quran Radio".into(),
                    artist: "Cairo".into(),
                    artwork: None,
                },
            );

        c.handle_media_action(MediaAction::Play, RADIO);
        radio.push(OutputSignal::Started);
        c.poll();
        c.handle_media_action(MediaAction::Pause, RADIO);
        c.poll();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["meta:Quran Radio", "playing:true", "playing:false"]
        );
    }

    #[test]
    fn media_play_while_playing_does_not_restart() {
        let (mut c, _, radio) = coordinator();
        c.handle_media_action(MediaAction::Play, RADIO);
        radio.push(OutputSignal::Started);
        c.poll();
        radio.clear_calls();

        c.handle_media_action(MediaAction::Play, RADIO);
        assert!(radio.calls().is_empty());
        assert!(c.is_radio_playing());
    }

    #[test]
    fn volume_is_clamped_and_applied_to_both_channels() {
        let (mut c, verse, radio) = coordinator();
        c.set_volume(1.5);
        assert_eq!(verse.calls(), vec![Call::Volume(1.0)]);
        assert_eq!(radio.calls(), vec![Call::Volume(1.0)]);
    }

    #[test]
    fn playback_rate_only_affects_verse_channel() {
        let (mut c, verse, radio) = coordinator();
        c.set_playback_rate(1.25);
        assert_eq!(verse.calls(), vec![Call::Speed(1.25)]);
        assert!(radio.calls().is_empty());
    }
}
