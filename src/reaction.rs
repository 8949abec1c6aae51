use serde::{Deserialize, Serialize};
use std::fmt;

/// Reaction score attached to a recommendation by one actor.
///
/// Persisted as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Reaction {
    Laugh,
    UpThumb,
    Heart,
    DownThumb,
    Angry,
}

impl Reaction {
    pub const fn score(self) -> i8 {
        match self {
            Reaction::Laugh => 0,
            Reaction::UpThumb => 1,
            Reaction::Heart => 2,
            Reaction::DownThumb => -1,
            Reaction::Angry => -2,
        }
    }
}

impl From<Reaction> for i8 {
    fn from(reaction: Reaction) -> Self {
        reaction.score()
    }
}

impl TryFrom<i8> for Reaction {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Reaction::Laugh),
            1 => Ok(Reaction::UpThumb),
            2 => Ok(Reaction::Heart),
            -1 => Ok(Reaction::DownThumb),
            -2 => Ok(Reaction::Angry),
            other => Err(format!("unknown reaction score {}", other)),
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reaction::Laugh => "LAUGH",
            Reaction::UpThumb => "UPTHUMB",
            Reaction::Heart => "HEART",
            Reaction::DownThumb => "DOWNTHUMB",
            Reaction::Angry => "ANGRY",
        };
        write!(f, "{}", name)
    }
}

/// Immutable emoji to reaction mapping used by the link extractor
#[derive(Debug, Clone, Copy)]
pub struct EmojiTable {
    entries: &'static [(&'static str, Reaction)],
}

/// Emoji recognized in chat exports
pub const EMOJI_REACTIONS: EmojiTable = EmojiTable {
    entries: &[
        ("\u{2764}", Reaction::Heart),     // ❤
        ("\u{1F60D}", Reaction::Heart),    // 😍
        ("\u{1F44D}", Reaction::UpThumb),  // 👍
        ("\u{1F606}", Reaction::Laugh),    // 😆
        ("\u{1F44E}", Reaction::DownThumb), // 👎
        ("\u{1F620}", Reaction::Angry),    // 😠
    ],
};

const VARIATION_SELECTOR: char = '\u{FE0F}';

impl EmojiTable {
    /// Look up an already-decoded emoji glyph
    pub fn lookup(&self, emoji: &str) -> Option<Reaction> {
        let glyph = emoji.trim_end_matches(VARIATION_SELECTOR);
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == glyph)
            .map(|(_, reaction)| *reaction)
    }
}
