//! Game simulation modules

pub mod collision;
pub mod entity;
pub mod frame;
pub mod ground;
pub mod host;
pub mod obstacle;
pub mod player;
pub mod session;
pub mod settings;

pub use host::{HostCommand, HostHandle, HostStatus, SessionHost};
pub use session::{GameOutcome, GameSession, SessionPhase, TickEvent};
pub use settings::{GameSettings, SettingsError};

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two dinos (1-based on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    /// Zero-based slot
    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    /// One-based number shown to players
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerId::One),
            2 => Ok(PlayerId::Two),
            other => Err(format!("no player {other}")),
        }
    }
}

impl From<PlayerId> for u8 {
    fn from(id: PlayerId) -> Self {
        id.number()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.number())
    }
}
