use crate::config::MoodHint;

/// Clicks at which the ghost waves goodbye and vanishes for a while.
pub const VANISH_AT: u32 = 15;
/// Delay between a click and its reaction appearing (lets the pop play).
pub const REVEAL_DELAY_MS: u64 = 300;
/// Pop cue duration.
pub const POP_MS: u64 = 300;
/// Farewell wave to hiding.
pub const VANISH_DELAY_MS: u64 = 1_000;
/// Hiding to reappearing, measured from the click.
pub const REAPPEAR_AFTER_MS: u64 = VANISH_DELAY_MS + 3_000;
/// How long the greeting stays after reappearing.
pub const GREETING_MS: u64 = 1_500;
/// Click to counter reset.
pub const RESET_AFTER_MS: u64 = 5_000;

/// Mood the interaction machine is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoodState {
    #[default]
    Idle,
    Surprised,
    HappyBounce,
    Celebrate,
    Vanished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emote {
    Exclamation,
    Heart,
    Sparkles,
    Dizzy,
    Wave,
    Smile,
}

impl Emote {
    pub fn symbol(self) -> &'static str {
        match self {
            Emote::Exclamation => "!",
            Emote::Heart => "❤️",
            Emote::Sparkles => "✨",
            Emote::Dizzy => "💫",
            Emote::Wave => "👋",
            Emote::Smile => "😊",
        }
    }

    /// Stable index for render instance packing.
    pub fn code(self) -> u32 {
        match self {
            Emote::Exclamation => 1,
            Emote::Heart => 2,
            Emote::Sparkles => 3,
            Emote::Dizzy => 4,
            Emote::Wave => 5,
            Emote::Smile => 6,
        }
    }
}

/// Face shown by the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression {
    Neutral,
    Happy,
    Sad,
    Surprised,
    Excited,
}

/// Response picked for a click, from the running count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Surprised,
    HappyBounce,
    Celebrate,
}

impl Reaction {
    pub fn for_count(count: u32) -> Self {
        if count > 0 && count % 10 == 0 {
            Reaction::Celebrate
        } else if count > 0 && count % 5 == 0 {
            Reaction::HappyBounce
        } else {
            Reaction::Surprised
        }
    }

    pub fn mood(self) -> MoodState {
        match self {
            Reaction::Surprised => MoodState::Surprised,
            Reaction::HappyBounce => MoodState::HappyBounce,
            Reaction::Celebrate => MoodState::Celebrate,
        }
    }

    /// Click to return-to-idle.
    pub fn revert_after_ms(self) -> u64 {
        match self {
            Reaction::Surprised => 1_000,
            Reaction::HappyBounce => 1_500,
            Reaction::Celebrate => 2_000,
        }
    }
}

/// Outcome of a registered click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    pub count: u32,
    pub reaction: Reaction,
    /// This click starts the disappearance cycle.
    pub farewell: bool,
}

/// Click counter, mood, emote and visibility of one ghost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    count: u32,
    mood: MoodState,
    emote: Option<Emote>,
    visible: bool,
    hovered: bool,
    /// A disappearance cycle is running and the counter has not reset yet.
    vanish_pending: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction {
    pub fn new() -> Self {
        Self {
            count: 0,
            mood: MoodState::Idle,
            emote: None,
            visible: true,
            hovered: false,
            vanish_pending: false,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn mood(&self) -> MoodState {
        self.mood
    }

    pub fn emote(&self) -> Option<Emote> {
        self.emote
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Count a click. Hidden ghosts cannot be clicked.
    pub fn register_click(&mut self) -> Option<Click> {
        if !self.visible {
            return None;
        }
        self.count += 1;
        let farewell = self.count == VANISH_AT && !self.vanish_pending;
        if farewell {
            self.vanish_pending = true;
            self.emote = Some(Emote::Wave);
        }
        Some(Click {
            count: self.count,
            reaction: Reaction::for_count(self.count),
            farewell,
        })
    }

    /// Show the reaction once the pop has played.
    pub fn reveal(&mut self, reaction: Reaction, emote: Emote) {
        if self.mood == MoodState::Vanished {
            return;
        }
        self.mood = reaction.mood();
        self.emote = Some(emote);
    }

    /// Return to idle after a reaction. No effect while hidden.
    pub fn revert(&mut self) {
        if self.mood == MoodState::Vanished {
            return;
        }
        self.mood = MoodState::Idle;
        self.emote = None;
    }

    pub fn vanish(&mut self) {
        self.visible = false;
        self.hovered = false;
        self.mood = MoodState::Vanished;
        self.emote = None;
    }

    pub fn reappear(&mut self) {
        self.visible = true;
        self.mood = MoodState::Idle;
        self.emote = Some(Emote::Smile);
    }

    pub fn clear_greeting(&mut self) {
        if self.emote == Some(Emote::Smile) {
            self.emote = None;
        }
    }

    /// Single counter reset, closing the disappearance cycle.
    pub fn reset_counter(&mut self) {
        self.count = 0;
        self.vanish_pending = false;
    }

    /// Drop all transient presentation. A disappearance cycle in flight is
    /// completed on the spot so the ghost is never left hidden.
    pub fn settle(&mut self) {
        if self.vanish_pending {
            self.reset_counter();
        }
        self.visible = true;
        self.mood = MoodState::Idle;
        self.emote = None;
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered && self.visible;
    }

    /// Face to draw, given the page's resting mood.
    pub fn expression(&self, hint: MoodHint) -> Expression {
        if self.count >= 10 {
            return Expression::Excited;
        }
        if self.hovered {
            return Expression::Happy;
        }
        match hint {
            MoodHint::Normal => Expression::Neutral,
            MoodHint::Happy => Expression::Happy,
            MoodHint::Sad => Expression::Sad,
            MoodHint::Surprised => Expression::Surprised,
        }
    }

    /// Hover speech bubble text.
    pub fn speech_line(&self) -> Option<&'static str> {
        if !self.hovered {
            return None;
        }
        Some(match self.count {
            0 => "Hello there!",
            1..=4 => "Click me again!",
            5..=9 => "We're becoming friends!",
            14 => "Byee!",
            _ => "You found me so many times!",
        })
    }
}
