//! Server-side session host: owns a `GameSession` and drives it on a fixed tick

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::util::time::{frame_duration, unix_millis, SessionClock};
use crate::ws::protocol::ServerMsg;

use super::frame::FrameBuilder;
use super::settings::SpriteAsset;
use super::{GameOutcome, GameSession, GameSettings, PlayerId, SessionPhase, TickEvent};

/// Input forwarded from viewers to the host task
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCommand {
    /// Any key released
    KeyUp,
    /// Local jump press
    Jump(PlayerId),
    /// Viewer window changed; rebuild the scene at this scale
    Resize(f32),
}

/// Latest session summary, readable without touching the host task
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HostStatus {
    pub phase: SessionPhase,
    pub game_speed: f32,
    pub tick: u64,
    pub outcome: Option<GameOutcome>,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl HostStatus {
    fn capture(session: &GameSession, tick: u64) -> Self {
        let settings = session.settings();
        Self {
            phase: session.phase(),
            game_speed: session.game_speed(),
            tick,
            outcome: session.outcome(),
            viewport_width: settings.viewport_width * settings.scale_ratio,
            viewport_height: settings.viewport_height * settings.scale_ratio,
        }
    }
}

/// Handle to a running host
#[derive(Clone)]
pub struct HostHandle {
    pub command_tx: mpsc::Sender<HostCommand>,
    pub frame_tx: broadcast::Sender<ServerMsg>,
    status: Arc<RwLock<HostStatus>>,
    sprites: Arc<Vec<SpriteAsset>>,
}

impl HostHandle {
    pub fn status(&self) -> HostStatus {
        *self.status.read()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.frame_tx.subscribe()
    }

    /// First message for a newly connected viewer
    pub fn welcome(&self) -> ServerMsg {
        let status = self.status();
        ServerMsg::Welcome {
            server_time: unix_millis(),
            viewport_width: status.viewport_width,
            viewport_height: status.viewport_height,
            sprites: self.sprites.as_ref().clone(),
        }
    }
}

/// Owns the session (owned by host task)
pub struct SessionHost {
    session: GameSession,
    clock: SessionClock,
    command_rx: mpsc::Receiver<HostCommand>,
    frame_tx: broadcast::Sender<ServerMsg>,
    status: Arc<RwLock<HostStatus>>,
    frame_builder: FrameBuilder,
    frame_rate: u32,
    tick: u64,
}

impl SessionHost {
    /// Create a host ticking at `frame_rate`, broadcasting every `frame_interval` ticks
    pub fn new(
        session: GameSession,
        clock: SessionClock,
        frame_rate: u32,
        frame_interval: u32,
    ) -> (Self, HostHandle) {
        let (command_tx, command_rx) = mpsc::channel(256);
        let (frame_tx, _) = broadcast::channel(64);

        let status = Arc::new(RwLock::new(HostStatus::capture(&session, 0)));

        let handle = HostHandle {
            command_tx,
            frame_tx: frame_tx.clone(),
            status: status.clone(),
            sprites: Arc::new(GameSettings::default_assets()),
        };

        let host = Self {
            session,
            clock,
            command_rx,
            frame_tx,
            status,
            frame_builder: FrameBuilder::new(frame_interval),
            frame_rate,
            tick: 0,
        };

        (host, handle)
    }

    /// Run the host loop until the process exits
    pub async fn run(mut self) {
        info!(frame_rate = self.frame_rate, "Session host started");

        let mut tick_interval = interval(frame_duration(self.frame_rate));
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            // Drain viewer input
            self.process_commands();

            let now = self.clock.now_ms();
            self.step(now);
        }
    }

    /// Apply queued viewer input
    pub fn process_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                HostCommand::KeyUp => {
                    if self.session.restart() {
                        self.frame_builder.force_next();
                    }
                }
                HostCommand::Jump(player) => {
                    self.session.receive_jump_signal(player, self.clock.now_ms());
                }
                HostCommand::Resize(scale_ratio) => match self.session.resize(scale_ratio) {
                    Ok(()) => {
                        *self.status.write() = HostStatus::capture(&self.session, self.tick);
                        self.frame_builder.force_next();
                    }
                    Err(e) => warn!(scale = scale_ratio, error = %e, "Ignoring resize"),
                },
            }
        }
    }

    /// Tick the session at `now_ms`, publish status and maybe a frame
    pub fn step(&mut self, now_ms: f64) -> TickEvent {
        self.tick += 1;
        let event = self.session.tick(now_ms);

        match event {
            TickEvent::GameOver(outcome) => {
                info!(tick = self.tick, outcome = ?outcome, "Round ended");
                self.frame_builder.force_next();
            }
            TickEvent::Armed => {
                debug!(tick = self.tick, "Waiting for restart");
                self.frame_builder.force_next();
            }
            TickEvent::Anchored | TickEvent::Advanced | TickEvent::Idle => {}
        }

        *self.status.write() = HostStatus::capture(&self.session, self.tick);

        if self.frame_builder.should_send() {
            let frame = self.frame_builder.build(self.tick, &self.session);
            // No viewers is fine
            let _ = self.frame_tx.send(frame);
        }

        event
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }
}
