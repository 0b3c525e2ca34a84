use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub accent: &'static str,
    pub user_bubble: &'static str,
    pub assistant_bubble: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeId {
    #[default]
    Blue,
    Pink,
    Purple,
    Green,
    Yellow,
}

impl ThemeId {
    pub const ALL: [ThemeId; 5] = [
        ThemeId::Blue,
        ThemeId::Pink,
        ThemeId::Purple,
        ThemeId::Green,
        ThemeId::Yellow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeId::Blue => "blue",
            ThemeId::Pink => "pink",
            ThemeId::Purple => "purple",
            ThemeId::Green => "green",
            ThemeId::Yellow => "yellow",
        }
    }

    /// Unknown or missing identifiers fall back to the default theme.
    pub fn resolve(raw: Option<&str>) -> ThemeId {
        raw.and_then(|value| value.parse().ok()).unwrap_or_default()
    }

    pub fn palette(self) -> ThemePalette {
        match self {
            ThemeId::Blue => ThemePalette {
                accent: "#00aaff",
                user_bubble: "rgba(0, 150, 255, 0.25)",
                assistant_bubble: "rgba(0, 200, 255, 0.25)",
            },
            ThemeId::Pink => ThemePalette {
                accent: "#e91e63",
                user_bubble: "rgba(233, 30, 99, 0.25)",
                assistant_bubble: "rgba(244, 143, 177, 0.25)",
            },
            ThemeId::Purple => ThemePalette {
                accent: "#9c27b0",
                user_bubble: "rgba(156, 39, 176, 0.25)",
                assistant_bubble: "rgba(206, 147, 216, 0.25)",
            },
            ThemeId::Green => ThemePalette {
                accent: "#4caf50",
                user_bubble: "rgba(76, 175, 80, 0.25)",
                assistant_bubble: "rgba(165, 214, 167, 0.25)",
            },
            ThemeId::Yellow => ThemePalette {
                accent: "#ffc107",
                user_bubble: "rgba(255, 179, 0, 0.25)",
                assistant_bubble: "rgba(255, 213, 79, 0.25)",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme '{0}'")]
pub struct UnknownTheme(pub String);

impl FromStr for ThemeId {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeId::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
