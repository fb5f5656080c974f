//! Dino controller: variable-height jump physics and run-cycle animation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::entity::{BoundingBox, Drawable, SpriteHandle};
use super::settings::{GameSettings, PlayerSprites};
use super::PlayerId;

/// Distance of the standing baseline above the viewport bottom, unscaled
const BASELINE_MARGIN: f32 = 1.5;

/// Jump button state shared between the relay path and the game loop.
///
/// Holds the session-clock time (ms) until which the button counts as
/// pressed. Writers only ever do a single atomic store.
#[derive(Debug)]
pub struct JumpLatch {
    pressed_until: AtomicU64,
    window_ms: f64,
}

impl JumpLatch {
    pub fn new(window_ms: f64) -> Self {
        Self {
            pressed_until: AtomicU64::new(f64::NEG_INFINITY.to_bits()),
            window_ms,
        }
    }

    /// Hold the button for one debounce window starting at `now_ms`
    pub fn press(&self, now_ms: f64) {
        self.pressed_until
            .store((now_ms + self.window_ms).to_bits(), Ordering::Relaxed);
    }

    /// Read the current press, to be handed back to `consume`
    pub fn observe(&self) -> LatchToken {
        LatchToken(self.pressed_until.load(Ordering::Relaxed))
    }

    /// Clear the press seen as `token`. A press stored after it survives.
    pub fn consume(&self, token: LatchToken) -> bool {
        self.pressed_until
            .compare_exchange(
                token.0,
                f64::NEG_INFINITY.to_bits(),
                Ordering::Relaxed,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    pub fn is_pressed(&self, now_ms: f64) -> bool {
        self.observe().is_pressed(now_ms)
    }
}

/// One observed value of a `JumpLatch`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatchToken(u64);

impl LatchToken {
    pub fn is_pressed(self, now_ms: f64) -> bool {
        now_ms < f64::from_bits(self.0)
    }
}

/// Scaled per-player construction parameters
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub id: PlayerId,
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub viewport_height: f32,
    pub min_jump_height: f32,
    pub max_jump_height: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    pub scale: f32,
    pub jump_enabled: bool,
    pub run_frame_ms: f32,
    pub sprites: PlayerSprites,
}

impl PlayerConfig {
    pub fn from_settings(settings: &GameSettings, id: PlayerId) -> Self {
        let scale = settings.scale_ratio;
        Self {
            id,
            x: settings.start_x_for(id) * scale,
            width: settings.player_width * scale,
            height: settings.player_height * scale,
            viewport_height: settings.viewport_height * scale,
            min_jump_height: settings.min_jump_height * scale,
            max_jump_height: settings.max_jump_height * scale,
            jump_speed: settings.jump_speed,
            gravity: settings.gravity,
            scale,
            jump_enabled: settings.jump_enabled,
            run_frame_ms: settings.run_frame_ms,
            sprites: settings.sprites_for(id).clone(),
        }
    }
}

/// Snapshot of the tri-state jump machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpState {
    pub pressed: bool,
    pub in_progress: bool,
    pub falling: bool,
}

#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    standing_y: f32,
    scale: f32,

    min_jump_height: f32,
    max_jump_height: f32,
    /// Lowest y a jump must reach before it may fall
    min_jump_y: f32,
    /// Highest y a jump may reach
    ceiling_y: f32,
    jump_speed: f32,
    gravity: f32,
    jump_enabled: bool,

    latch: Arc<JumpLatch>,
    in_progress: bool,
    falling: bool,

    running: bool,
    run_frame: usize,
    frame_timer: f32,
    run_frame_ms: f32,
    sprites: PlayerSprites,
    sprite: SpriteHandle,
}

impl Player {
    pub fn new(config: PlayerConfig, latch: Arc<JumpLatch>) -> Self {
        let standing_y = config.viewport_height - config.height - BASELINE_MARGIN * config.scale;
        Self {
            id: config.id,
            x: config.x,
            y: standing_y,
            width: config.width,
            height: config.height,
            standing_y,
            scale: config.scale,
            min_jump_height: config.min_jump_height,
            max_jump_height: config.max_jump_height,
            min_jump_y: standing_y - config.min_jump_height,
            ceiling_y: standing_y - config.max_jump_height,
            jump_speed: config.jump_speed,
            gravity: config.gravity,
            jump_enabled: config.jump_enabled,
            latch,
            in_progress: false,
            falling: false,
            running: false,
            run_frame: 0,
            frame_timer: config.run_frame_ms,
            run_frame_ms: config.run_frame_ms,
            sprite: config.sprites.standing,
            sprites: config.sprites,
        }
    }

    /// Advance animation and jump physics by one frame
    pub fn update(&mut self, game_speed: f32, elapsed_ms: f32, now_ms: f64) {
        if !self.running {
            self.sprite = self.sprites.standing;
            return;
        }

        self.advance_run_cycle(game_speed, elapsed_ms);
        if self.jump_enabled {
            // Airborne pose overrides the run cycle
            if self.in_progress {
                self.sprite = self.sprites.standing;
            }
            self.advance_jump(elapsed_ms, now_ms);
        }
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Hold jump for one debounce window starting at `now_ms`
    pub fn receive_jump_signal(&self, now_ms: f64) {
        self.latch.press(now_ms);
    }

    fn advance_run_cycle(&mut self, game_speed: f32, elapsed_ms: f32) {
        if self.frame_timer <= 0.0 {
            self.run_frame = (self.run_frame + 1) % self.sprites.run_frames.len();
            self.sprite = self.sprites.run_frames[self.run_frame];
            self.frame_timer = self.run_frame_ms;
        }
        self.frame_timer -= elapsed_ms * game_speed;
    }

    fn advance_jump(&mut self, elapsed_ms: f32, now_ms: f64) {
        let token = self.latch.observe();
        let pressed = token.is_pressed(now_ms);
        if pressed {
            self.in_progress = true;
        }

        if self.in_progress && !self.falling {
            // Compare positions, not recomputed heights, so the clamp is exact
            if self.y > self.min_jump_y || (self.y > self.ceiling_y && pressed) {
                self.y = (self.y - self.jump_speed * elapsed_ms * self.scale).max(self.ceiling_y);
                if self.y <= self.ceiling_y {
                    self.falling = true;
                }
            } else {
                self.falling = true;
            }
            return;
        }

        if self.y < self.standing_y {
            self.y = (self.y + self.gravity * elapsed_ms * self.scale).min(self.standing_y);
        }
        // Only a landing consumes the press; a grounded idle tick leaves the latch alone
        if self.in_progress && self.y >= self.standing_y {
            self.falling = false;
            self.in_progress = false;
            self.latch.consume(token);
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn standing_y(&self) -> f32 {
        self.standing_y
    }

    pub fn min_jump_height(&self) -> f32 {
        self.min_jump_height
    }

    pub fn max_jump_height(&self) -> f32 {
        self.max_jump_height
    }

    pub fn height_above_ground(&self) -> f32 {
        self.standing_y - self.y
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run_frame(&self) -> usize {
        self.run_frame
    }

    pub fn jump_state(&self, now_ms: f64) -> JumpState {
        JumpState {
            pressed: self.latch.is_pressed(now_ms),
            in_progress: self.in_progress,
            falling: self.falling,
        }
    }

    pub fn latch(&self) -> &Arc<JumpLatch> {
        &self.latch
    }
}

impl Drawable for Player {
    fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }

    fn sprite(&self) -> SpriteHandle {
        self.sprite
    }
}
