use crate::core::models::{Ayah, AyahId};
use crate::core::traits::VersePlayer;
use crate::modules::memorization::action::{self, ActionState, LISTENING_REPETITIONS};
use crate::modules::memorization::counter::MemorizationCounter;
use tracing::debug;

/// Result of one press in the memorization ritual
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Verse audio was playing; nothing changed
    Ignored,
    /// Counted a listening repetition. `played` is false when the ayah has no audio.
    Listen { count: u32, played: bool },
    /// Played again without counting
    Relisten { count: u32, played: bool },
    /// Counted a self-reading repetition, no audio
    SelfRead { count: u32 },
}

/// The listen-seven-times ritual on top of the per-ayah counter.
///
/// Every press is a no-op while verse audio plays or is still loading.
/// Counting happens only here, never on playback completion.
#[derive(Debug, Clone, Default)]
pub struct MemorizationSession {
    counter: MemorizationCounter,
}

impl MemorizationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, ayah: AyahId) -> u32 {
        self.counter.get_count(ayah)
    }

    pub fn counter(&self) -> &MemorizationCounter {
        &self.counter
    }

    pub fn action_state(&self, ayah: AyahId, verse_playing: bool) -> ActionState {
        action::resolve(self.count(ayah), verse_playing)
    }

    /// Main action button.
    ///
    /// Below seven listens the count goes up and the verse plays while the
    /// new count is at most seven. From seven on the press only replays.
    pub fn press_action(&mut self, ayah: &Ayah, player: &mut dyn VersePlayer) -> PressOutcome {
        if player.is_verse_busy() {
            return PressOutcome::Ignored;
        }

        if self.count(ayah.number) >= LISTENING_REPETITIONS {
            return self.relisten(ayah, player);
        }
        self.listen(ayah, player)
    }

    /// Press on the memorization card: a listen while below seven, a self-read after.
    pub fn press_card(&mut self, ayah: &Ayah, player: &mut dyn VersePlayer) -> PressOutcome {
        if player.is_verse_busy() {
            return PressOutcome::Ignored;
        }

        if self.count(ayah.number) >= LISTENING_REPETITIONS {
            return self.self_read(ayah, &*player);
        }
        self.listen(ayah, player)
    }

    /// Count one unaided reading. Only available once seven listens are done.
    pub fn self_read(&mut self, ayah: &Ayah, player: &dyn VersePlayer) -> PressOutcome {
        if player.is_verse_busy() {
            return PressOutcome::Ignored;
        }

        let count = self.count(ayah.number);
        if count < LISTENING_REPETITIONS {
            debug!(ayah = ayah.number, count, "Self-read before listening phase is complete");
            return PressOutcome::Ignored;
        }

        PressOutcome::SelfRead {
            count: self.counter.increment(ayah.number),
        }
    }

    /// Play the ayah again without counting.
    pub fn relisten(&mut self, ayah: &Ayah, player: &mut dyn VersePlayer) -> PressOutcome {
        if player.is_verse_busy() {
            return PressOutcome::Ignored;
        }

        PressOutcome::Relisten {
            count: self.count(ayah.number),
            played: player.play_verse(ayah),
        }
    }

    fn listen(&mut self, ayah: &Ayah, player: &mut dyn VersePlayer) -> PressOutcome {
        let count = self.counter.increment(ayah.number);
        // Decided on the count after incrementing: exactly seven listens play.
        let played = count <= LISTENING_REPETITIONS && player.play_verse(ayah);
        PressOutcome::Listen { count, played }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakePlayer {
        playing: bool,
        plays: Vec<AyahId>,
    }

    impl VersePlayer for FakePlayer {
        fn is_verse_busy(&self) -> bool {
            self.playing
        }

        fn play_verse(&mut self, ayah: &Ayah) -> bool {
            if ayah.audio_url().is_none() {
                return false;
            }
            self.plays.push(ayah.number);
            true
        }
    }

    fn ayah(number: AyahId) -> Ayah {
        Ayah {
            number,
            number_in_surah: number,
            text: String::new(),
            translation_text: None,
            audio: Some(format!("https://cdn.example/{}.mp3", number)),
            juz: 1,
            page: 1,
        }
    }

    fn session_at(count: u32, a: &Ayah) -> MemorizationSession {
        let mut session = MemorizationSession::new();
        for _ in 0..count {
            session.counter.increment(a.number);
        }
        session
    }

    #[test]
    fn press_while_playing_is_noop() {
        let a = ayah(5);
        let mut session = session_at(3, &a);
        let mut player = FakePlayer { playing: true, ..Default::default() };

        assert_eq!(session.press_action(&a, &mut player), PressOutcome::Ignored);
        assert_eq!(session.press_card(&a, &mut player), PressOutcome::Ignored);
        assert_eq!(session.self_read(&a, &player), PressOutcome::Ignored);
        assert_eq!(session.count(5), 3);
        assert!(player.plays.is_empty());
    }

    #[test]
    fn first_press_starts_first_listen() {
        let a = ayah(1);
        let mut session = MemorizationSession::new();
        let mut player = FakePlayer::default();

        assert_eq!(
            session.press_action(&a, &mut player),
            PressOutcome::Listen { count: 1, played: true }
        );
        assert_eq!(player.plays, vec![1]);
    }

    #[test]
    fn seventh_listen_still_plays() {
        let a = ayah(2);
        let mut session = session_at(6, &a);
        let mut player = FakePlayer::default();

        assert_eq!(
            session.press_action(&a, &mut player),
            PressOutcome::Listen { count: 7, played: true }
        );
        assert_eq!(player.plays, vec![2]);
    }

    #[test]
    fn relisten_at_seven_keeps_count() {
        let a = ayah(3);
        let mut session = session_at(7, &a);
        let mut player = FakePlayer::default();

        assert_eq!(
            session.press_action(&a, &mut player),
            PressOutcome::Relisten { count: 7, played: true }
        );
        assert_eq!(session.count(3), 7);
        assert_eq!(player.plays, vec![3]);
    }

    #[test]
    fn self_read_at_seven_counts_without_audio() {
        let a = ayah(4);
        let mut session = session_at(7, &a);
        let player = FakePlayer::default();

        assert_eq!(session.self_read(&a, &player), PressOutcome::SelfRead { count: 8 });
        assert!(player.plays.is_empty());
    }

    #[test]
    fn self_read_before_seven_is_ignored() {
        let a = ayah(4);
        let mut session = session_at(6, &a);
        let player = FakePlayer::default();
        assert_eq!(session.self_read(&a, &player), PressOutcome::Ignored);
        assert_eq!(session.count(4), 6);
    }

    #[test]
    fn card_press_switches_to_self_read_after_seven() {
        let a = ayah(9);
        let mut session = MemorizationSession::new();
        let mut player = FakePlayer::default();

        for expected in 1..=7 {
            assert_eq!(
                session.press_card(&a, &mut player),
                PressOutcome::Listen { count: expected, played: true }
            );
        }
        assert_eq!(session.press_card(&a, &mut player), PressOutcome::SelfRead { count: 8 });
        assert_eq!(player.plays.len(), 7);
    }

    #[test]
    fn ayah_without_audio_still_counts() {
        let mut a = ayah(6);
        a.audio = None;
        let mut session = MemorizationSession::new();
        let mut player = FakePlayer::default();

        assert_eq!(
            session.press_action(&a, &mut player),
            PressOutcome::Listen { count: 1, played: false }
        );
    }

    #[test]
    fn self_read_counts_are_unbounded() {
        let a = ayah(10);
        let mut session = session_at(7, &a);
        let player = FakePlayer::default();
        for _ in 0..30 {
            session.self_read(&a, &player);
        }
        assert_eq!(session.count(10), 37);
        assert_eq!(session.action_state(10, false).kind, action::ActionKind::Relisten);
    }

    #[test]
    fn press_while_audio_loads_is_noop() {
        use crate::modules::playback::channel::tests::FakeOutput;
        use crate::modules::playback::coordinator::PlaybackCoordinator;

        let verse = FakeOutput::new();
        let mut coordinator =
            PlaybackCoordinator::new(Box::new(verse.clone()), Box::new(FakeOutput::new()));
        let a = ayah(11);
        let mut session = MemorizationSession::new();

        assert_eq!(
            session.press_action(&a, &mut coordinator),
            PressOutcome::Listen { count: 1, played: true }
        );
        // Still downloading: no Started yet.
        assert_eq!(session.press_action(&a, &mut coordinator), PressOutcome::Ignored);
        assert_eq!(session.press_card(&a, &mut coordinator), PressOutcome::Ignored);
        assert_eq!(session.count(11), 1);
        assert_eq!(verse.play_calls().len(), 1);
    }
}
