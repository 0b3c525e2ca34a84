use std::{fmt, str::FromStr};

use shared::domain::{ModeTag, UnknownMode};

/// UI surface selected in the navigation bar. `Notes` is local-only and never
/// produces a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Chat,
    Study,
    Learn,
    Motivation,
    Notes,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Chat,
        Mode::Study,
        Mode::Learn,
        Mode::Motivation,
        Mode::Notes,
    ];

    pub fn tag(self) -> Option<ModeTag> {
        match self {
            Mode::Chat => Some(ModeTag::Chat),
            Mode::Study => Some(ModeTag::Study),
            Mode::Learn => Some(ModeTag::Learn),
            Mode::Motivation => Some(ModeTag::Motivation),
            Mode::Notes => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self.tag() {
            Some(tag) => tag.as_str(),
            None => "notes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Chat => "Chat",
            Mode::Study => "Study",
            Mode::Learn => "Learn",
            Mode::Motivation => "Motivation",
            Mode::Notes => "Notes",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Mode::Chat => "\u{1F4AC}",
            Mode::Study => "\u{1F4D6}",
            Mode::Learn => "\u{1F9E0}",
            Mode::Motivation => "\u{1F4AA}",
            Mode::Notes => "\u{1F4DD}",
        }
    }
}

impl From<ModeTag> for Mode {
    fn from(tag: ModeTag) -> Self {
        match tag {
            ModeTag::Chat => Mode::Chat,
            ModeTag::Study => Mode::Study,
            ModeTag::Learn => Mode::Learn,
            ModeTag::Motivation => Mode::Motivation,
        }
    }
}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "notes" {
            return Ok(Mode::Notes);
        }
        s.parse::<ModeTag>().map(Mode::from)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
