//! Session state machine and per-frame update order

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::relay::SignalBridge;
use crate::util::time::SessionClock;

use super::entity::{Drawable, RenderSurface};
use super::ground::Ground;
use super::obstacle::ObstacleController;
use super::player::{JumpLatch, Player, PlayerConfig};
use super::settings::{GameSettings, SettingsError};
use super::PlayerId;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Physics and spawning advance every tick
    Running,
    /// Frozen; `armed` once the restart trigger may be accepted
    GameOver { armed: bool },
}

/// How the last round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "player", rename_all = "snake_case")]
pub enum GameOutcome {
    /// Exactly one player hit an obstacle; the other wins
    Winner(PlayerId),
    /// Both players hit on the same frame
    Draw,
}

impl GameOutcome {
    pub fn message(&self) -> String {
        match self {
            GameOutcome::Winner(id) => {
                format!("Player {} wins, press any button to restart", id.number())
            }
            GameOutcome::Draw => "Game Over".to_string(),
        }
    }

    fn font_size(&self) -> f32 {
        match self {
            GameOutcome::Winner(_) => 30.0,
            GameOutcome::Draw => 80.0,
        }
    }
}

/// What a single `tick` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// First timestamp, only anchors the clock
    Anchored,
    /// One physics step ran
    Advanced,
    /// A collision ended the round on this tick
    GameOver(GameOutcome),
    /// The arming delay elapsed on this tick
    Armed,
    /// Game over, nothing changed
    Idle,
}

/// One two-player round plus everything it needs to restart
pub struct GameSession {
    settings: GameSettings,
    players: [Player; 2],
    ground: Ground,
    obstacles: ObstacleController,
    rng: ChaCha8Rng,

    game_speed: f32,
    phase: SessionPhase,
    outcome: Option<GameOutcome>,
    previous_time: Option<f64>,
    game_over_at: f64,
}

impl GameSession {
    /// Build a session, failing fast on unusable settings
    pub fn new(settings: GameSettings) -> Result<Self, SettingsError> {
        settings.validate()?;

        let mut rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let latches = PlayerId::ALL.map(|_| Arc::new(JumpLatch::new(settings.jump_debounce_ms)));
        let players = build_players(&settings, &latches);
        let ground = Ground::new(&settings);
        let obstacles = ObstacleController::new(&settings, ChaCha8Rng::seed_from_u64(rng.gen()));

        info!(
            scale = settings.scale_ratio,
            obstacle_kinds = settings.obstacles.len(),
            jump_enabled = settings.jump_enabled,
            "Game session created"
        );

        Ok(Self {
            game_speed: settings.game_speed_start,
            settings,
            players,
            ground,
            obstacles,
            rng,
            phase: SessionPhase::Running,
            outcome: None,
            previous_time: None,
            game_over_at: 0.0,
        })
    }

    /// Advance the session to host timestamp `now_ms`
    pub fn tick(&mut self, now_ms: f64) -> TickEvent {
        let Some(previous) = self.previous_time.replace(now_ms) else {
            return TickEvent::Anchored;
        };
        let elapsed_ms = (now_ms - previous).max(0.0) as f32;

        match self.phase {
            SessionPhase::Running => {
                for player in self.players.iter_mut() {
                    player.set_running(true);
                }
                self.ground.update(self.game_speed, elapsed_ms);
                for player in self.players.iter_mut() {
                    player.update(self.game_speed, elapsed_ms, now_ms);
                }
                self.obstacles.update(self.game_speed, elapsed_ms);
                self.game_speed += self.settings.game_speed_increment * elapsed_ms;

                match self.detect_collision() {
                    Some(outcome) => {
                        self.enter_game_over(outcome, now_ms);
                        TickEvent::GameOver(outcome)
                    }
                    None => TickEvent::Advanced,
                }
            }
            SessionPhase::GameOver { armed: false } => {
                if now_ms - self.game_over_at >= self.settings.arming_delay_ms {
                    self.phase = SessionPhase::GameOver { armed: true };
                    debug!("Restart armed");
                    TickEvent::Armed
                } else {
                    TickEvent::Idle
                }
            }
            SessionPhase::GameOver { armed: true } => TickEvent::Idle,
        }
    }

    fn detect_collision(&self) -> Option<GameOutcome> {
        let [one, two] = &self.players;
        match (
            self.obstacles.collide_with(one),
            self.obstacles.collide_with(two),
        ) {
            (false, false) => None,
            (true, false) => Some(GameOutcome::Winner(PlayerId::Two)),
            (false, true) => Some(GameOutcome::Winner(PlayerId::One)),
            (true, true) => Some(GameOutcome::Draw),
        }
    }

    fn enter_game_over(&mut self, outcome: GameOutcome, now_ms: f64) {
        self.phase = SessionPhase::GameOver { armed: false };
        self.outcome = Some(outcome);
        self.game_over_at = now_ms;
        for player in self.players.iter_mut() {
            player.set_running(false);
        }
        info!(
            outcome = ?outcome,
            game_speed = self.game_speed,
            "Game over"
        );
    }

    /// Consume the restart trigger; ignored unless the game-over state is armed
    pub fn restart(&mut self) -> bool {
        if self.phase != (SessionPhase::GameOver { armed: true }) {
            debug!(phase = ?self.phase, "Restart trigger ignored");
            return false;
        }

        self.ground.reset();
        self.obstacles.reset();
        self.game_speed = self.settings.game_speed_start;
        self.outcome = None;
        self.phase = SessionPhase::Running;
        info!("Session restarted");
        true
    }

    /// Rebuild all entities for a new scale ratio, keeping speed, phase and jump latches
    pub fn resize(&mut self, scale_ratio: f32) -> Result<(), SettingsError> {
        let settings = GameSettings {
            scale_ratio,
            ..self.settings.clone()
        };
        settings.validate()?;

        let latches = self.players.each_ref().map(|p| p.latch().clone());
        let running = self.players[0].is_running();
        self.players = build_players(&settings, &latches);
        for player in self.players.iter_mut() {
            player.set_running(running);
        }
        self.ground = Ground::new(&settings);
        self.obstacles =
            ObstacleController::new(&settings, ChaCha8Rng::seed_from_u64(self.rng.gen()));
        self.settings = settings;

        info!(scale = scale_ratio, "Session rescaled");
        Ok(())
    }

    /// Render the current state; called once per frame after `tick`
    pub fn draw(&self, surface: &mut dyn RenderSurface) {
        self.ground.draw(surface);
        for player in &self.players {
            player.draw(surface);
        }
        self.obstacles.draw(surface);

        if let Some(outcome) = self.outcome {
            let scale = self.settings.scale_ratio;
            surface.draw_text(
                &outcome.message(),
                self.settings.viewport_width * scale / 4.5,
                self.settings.viewport_height * scale / 2.3,
                outcome.font_size() * scale,
            );
        }
    }

    /// Local input path for a jump press
    pub fn receive_jump_signal(&self, id: PlayerId, now_ms: f64) {
        self.player(id).receive_jump_signal(now_ms);
    }

    /// Bridge that lets the relay path press this session's jump buttons
    pub fn signal_bridge(&self, clock: SessionClock) -> SignalBridge {
        SignalBridge::new(self.players.each_ref().map(|p| p.latch().clone()), clock)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, SessionPhase::GameOver { .. })
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn game_speed(&self) -> f32 {
        self.game_speed
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    pub fn obstacles(&self) -> &ObstacleController {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut ObstacleController {
        &mut self.obstacles
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }
}

fn build_players(settings: &GameSettings, latches: &[Arc<JumpLatch>; 2]) -> [Player; 2] {
    PlayerId::ALL.map(|id| {
        Player::new(
            PlayerConfig::from_settings(settings, id),
            latches[id.index()].clone(),
        )
    })
}
