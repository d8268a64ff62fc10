use std::fmt;

/// Listens per ayah before the self-reading phase begins.
pub const LISTENING_REPETITIONS: u32 = 7;

/// Self-reading shades cycle with this period.
pub const SELF_READING_SHADES: u32 = 5;

/// What the main action button does next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Start,
    ListenAgain,
    Relisten,
}

impl ActionKind {
    pub fn for_count(count: u32) -> Self {
        if count >= LISTENING_REPETITIONS {
            ActionKind::Relisten
        } else if count > 0 {
            ActionKind::ListenAgain
        } else {
            ActionKind::Start
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Start => "Start",
            ActionKind::ListenAgain => "Again",
            ActionKind::Relisten => "Re-listen",
        }
    }

    /// Longer text for screen readers and the status line
    pub fn description(&self) -> &'static str {
        match self {
            ActionKind::Start => "Start memorizing this ayah",
            ActionKind::ListenAgain => "Listen to this ayah again",
            ActionKind::Relisten => "Re-listen to this ayah",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    Primary,
    Secondary,
}

/// Everything the player bar needs to draw the action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionState {
    pub kind: ActionKind,
    pub color: ColorTag,
    pub triggers_audio: bool,
    pub enabled: bool,
    pub self_reading_phase: bool,
    pub self_read_available: bool,
}

impl ActionState {
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn description(&self) -> &'static str {
        self.kind.description()
    }
}

/// Derive the action button from the ayah's count and whether verse audio is playing.
pub fn resolve(count: u32, verse_playing: bool) -> ActionState {
    let kind = ActionKind::for_count(count);
    let self_reading_phase = count >= LISTENING_REPETITIONS;
    ActionState {
        kind,
        color: if self_reading_phase {
            ColorTag::Secondary
        } else {
            ColorTag::Primary
        },
        triggers_audio: true,
        enabled: !verse_playing,
        self_reading_phase,
        self_read_available: self_reading_phase,
    }
}

/// Background shade for an ayah row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    /// 0 (untouched) through 7
    Listening(u32),
    /// Cycles 0..SELF_READING_SHADES past the seventh listen
    SelfReading(u32),
}

pub fn shade(count: u32) -> Shade {
    if count <= LISTENING_REPETITIONS {
        Shade::Listening(count)
    } else {
        Shade::SelfReading((count - LISTENING_REPETITIONS - 1) % SELF_READING_SHADES)
    }
}
