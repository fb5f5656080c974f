//! Relay wire signals

use std::fmt;

use crate::game::PlayerId;

/// A signal carried by the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaySignal {
    /// Jump button pressed on a player's trigger device
    Jump(PlayerId),
}

impl RelaySignal {
    /// Parse wire text; anything unrecognized is `None`
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "jump1" => Some(Self::Jump(PlayerId::One)),
            "jump2" => Some(Self::Jump(PlayerId::Two)),
            // Older trigger firmware sends a bare "jump" for player one
            "jump" => Some(Self::Jump(PlayerId::One)),
            _ => None,
        }
    }

    /// Text sent to relay listeners
    pub fn wire(&self) -> &'static str {
        match self {
            Self::Jump(PlayerId::One) => "jump1",
            Self::Jump(PlayerId::Two) => "jump2",
        }
    }
}

impl fmt::Display for RelaySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire())
    }
}
