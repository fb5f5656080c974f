//! WebSocket protocol message definitions
//! These are the wire types between the session host and browser viewers

use serde::{Deserialize, Serialize};

use crate::game::entity::SpriteHandle;
use crate::game::settings::SpriteAsset;
use crate::game::{GameOutcome, PlayerId, SessionPhase};

/// Messages sent from a viewer to the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Any key released; restarts the round once game over is armed
    KeyUp,

    /// Local jump input for a player
    Jump {
        /// 1 or 2
        player: PlayerId,
    },

    /// Viewer window resized
    Resize {
        /// Multiplier applied to the base viewport
        scale_ratio: f32,
    },

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },
}

/// Messages sent from the server to a viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Sent once after connecting: what to load before drawing frames
    Welcome {
        server_time: u64,
        viewport_width: f32,
        viewport_height: f32,
        sprites: Vec<SpriteAsset>,
    },

    /// One rendered frame
    Frame {
        /// Host tick number
        tick: u64,
        phase: SessionPhase,
        game_speed: f32,
        outcome: Option<GameOutcome>,
        /// Draw calls in painter's order
        commands: Vec<DrawCommand>,
    },

    /// Error message
    Error {
        code: String,
        message: String,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

/// A single draw call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Sprite {
        sprite: SpriteHandle,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        font_size: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages_parse() {
        let msg: ClientMsg = serde_json::from_str(r#"{"type":"key_up"}"#).unwrap();
        assert!(matches!(msg, ClientMsg::KeyUp));

        let msg: ClientMsg = serde_json::from_str(r#"{"type":"jump","player":2}"#).unwrap();
        assert!(matches!(msg, ClientMsg::Jump { player: PlayerId::Two }));

        let msg: ClientMsg = serde_json::from_str(r#"{"type":"resize","scale_ratio":1.5}"#).unwrap();
        assert!(matches!(msg, ClientMsg::Resize { scale_ratio } if scale_ratio == 1.5));
    }

    #[test]
    fn test_unknown_player_rejected() {
        let result = serde_json::from_str::<ClientMsg>(r#"{"type":"jump","player":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_frame_serializes_tagged() {
        let frame = ServerMsg::Frame {
            tick: 3,
            phase: SessionPhase::GameOver { armed: true },
            game_speed: 1.0,
            outcome: Some(GameOutcome::Winner(PlayerId::One)),
            commands: vec![DrawCommand::Sprite {
                sprite: SpriteHandle(6),
                x: 0.0,
                y: 176.0,
                width: 2400.0,
                height: 24.0,
            }],
        };
        let v = serde_json::to_value(&frame).unwrap();
        assert_eq!(v["type"], "frame");
        assert_eq!(v["phase"]["state"], "game_over");
        assert_eq!(v["phase"]["armed"], true);
        assert_eq!(v["outcome"]["result"], "winner");
        assert_eq!(v["outcome"]["player"], 1);
        assert_eq!(v["commands"][0]["op"], "sprite");
        assert_eq!(v["commands"][0]["sprite"], 6);
    }
}
