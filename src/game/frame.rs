//! Frame building: records a session's draw pass as wire draw commands

use crate::ws::protocol::{DrawCommand, ServerMsg};

use super::entity::{RenderSurface, SpriteHandle};
use super::GameSession;

/// Render surface that records draw calls and paces frame broadcasts
pub struct FrameBuilder {
    /// Tick counter since last frame
    ticks_since_frame: u32,
    /// Frame interval in ticks
    frame_interval: u32,
    commands: Vec<DrawCommand>,
}

impl FrameBuilder {
    pub fn new(frame_interval: u32) -> Self {
        Self {
            ticks_since_frame: 0,
            frame_interval: frame_interval.max(1),
            commands: Vec::new(),
        }
    }

    /// Check if it's time to send a frame
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_frame += 1;
        if self.ticks_since_frame >= self.frame_interval {
            self.ticks_since_frame = 0;
            true
        } else {
            false
        }
    }

    /// Force a frame on next check (used for state transitions)
    pub fn force_next(&mut self) {
        self.ticks_since_frame = self.frame_interval;
    }

    /// Run the session's draw pass and package it as a frame message
    pub fn build(&mut self, tick: u64, session: &GameSession) -> ServerMsg {
        self.commands.clear();
        session.draw(self);

        ServerMsg::Frame {
            tick,
            phase: session.phase(),
            game_speed: session.game_speed(),
            outcome: session.outcome(),
            commands: std::mem::take(&mut self.commands),
        }
    }
}

impl RenderSurface for FrameBuilder {
    fn draw_sprite(&mut self, sprite: SpriteHandle, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::Sprite {
            sprite,
            x,
            y,
            width,
            height,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            font_size,
        });
    }
}
