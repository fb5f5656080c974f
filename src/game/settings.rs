//! Game tunables and their validation
//!
//! All lengths here are unscaled (design-resolution) pixels; the session
//! multiplies them by `scale_ratio` when it builds its entities.

use serde::{Deserialize, Serialize};

use super::entity::SpriteHandle;
use super::PlayerId;

/// Sprite handles used by the default asset set
pub mod sprites {
    use super::SpriteHandle;

    pub const STANDING: SpriteHandle = SpriteHandle(0);
    pub const RUN_1: SpriteHandle = SpriteHandle(1);
    pub const RUN_2: SpriteHandle = SpriteHandle(2);
    pub const INVERTED_STANDING: SpriteHandle = SpriteHandle(3);
    pub const INVERTED_RUN_1: SpriteHandle = SpriteHandle(4);
    pub const INVERTED_RUN_2: SpriteHandle = SpriteHandle(5);
    pub const GROUND: SpriteHandle = SpriteHandle(6);
    pub const CACTUS_1: SpriteHandle = SpriteHandle(7);
    pub const CACTUS_2: SpriteHandle = SpriteHandle(8);
    pub const CACTUS_3: SpriteHandle = SpriteHandle(9);
}

/// Handle-to-image mapping sent to renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteAsset {
    pub handle: SpriteHandle,
    pub path: String,
}

/// Standing + run-cycle sprites for one player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSprites {
    pub standing: SpriteHandle,
    pub run_frames: Vec<SpriteHandle>,
}

/// One entry of the obstacle catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleKind {
    pub width: f32,
    pub height: f32,
    pub sprite: SpriteHandle,
}

/// Everything needed to build a session
#[derive(Debug, Clone)]
pub struct GameSettings {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Multiplier from design resolution to screen pixels
    pub scale_ratio: f32,

    pub player_width: f32,
    pub player_height: f32,
    pub player_one_x: f32,
    pub player_two_x: f32,
    pub min_jump_height: f32,
    pub max_jump_height: f32,
    /// Ascent rate in px per ms
    pub jump_speed: f32,
    /// Descent rate in px per ms
    pub gravity: f32,
    pub jump_enabled: bool,
    pub run_frame_ms: f32,
    pub jump_debounce_ms: f64,
    pub player_one_sprites: PlayerSprites,
    pub player_two_sprites: PlayerSprites,

    pub ground_width: f32,
    pub ground_height: f32,
    pub ground_sprite: SpriteHandle,
    /// Shared by ground and obstacles, px per ms at game speed 1
    pub scroll_speed: f32,

    pub obstacles: Vec<ObstacleKind>,
    /// Scrolled distance between consecutive spawns
    pub spawn_gap_min: f32,
    pub spawn_gap_max: f32,

    pub game_speed_start: f32,
    /// Added to game speed per elapsed ms
    pub game_speed_increment: f32,
    /// Fraction of each box trimmed per side before collision tests
    pub collision_inset: f32,
    pub arming_delay_ms: f64,

    /// Obstacle RNG seed, `None` draws one from entropy
    pub seed: Option<u64>,
}

const CACTUS_SCALE: f32 = 2.0;

impl Default for GameSettings {
    fn default() -> Self {
        let viewport_height = 200.0;
        Self {
            viewport_width: 800.0,
            viewport_height,
            scale_ratio: 1.0,

            player_width: 88.0 / 1.5,
            player_height: 94.0 / 1.5,
            player_one_x: 10.0,
            player_two_x: 400.0,
            min_jump_height: 150.0,
            max_jump_height: viewport_height * 0.75,
            jump_speed: 0.6,
            gravity: 0.3,
            jump_enabled: true,
            run_frame_ms: 200.0,
            jump_debounce_ms: 100.0,
            player_one_sprites: PlayerSprites {
                standing: sprites::STANDING,
                run_frames: vec![sprites::RUN_1, sprites::RUN_2],
            },
            player_two_sprites: PlayerSprites {
                standing: sprites::INVERTED_STANDING,
                run_frames: vec![sprites::INVERTED_RUN_1, sprites::INVERTED_RUN_2],
            },

            ground_width: 2400.0,
            ground_height: 24.0,
            ground_sprite: sprites::GROUND,
            scroll_speed: 0.5,

            obstacles: vec![
                ObstacleKind {
                    width: 48.0 / CACTUS_SCALE,
                    height: 100.0 / CACTUS_SCALE,
                    sprite: sprites::CACTUS_1,
                },
                ObstacleKind {
                    width: 98.0 / CACTUS_SCALE,
                    height: 100.0 / CACTUS_SCALE,
                    sprite: sprites::CACTUS_2,
                },
                ObstacleKind {
                    width: 68.0 / CACTUS_SCALE,
                    height: 100.0 / CACTUS_SCALE,
                    sprite: sprites::CACTUS_3,
                },
            ],
            spawn_gap_min: 250.0,
            spawn_gap_max: 900.0,

            game_speed_start: 0.85,
            game_speed_increment: 0.00001,
            collision_inset: 0.0,
            arming_delay_ms: 500.0,

            seed: None,
        }
    }
}

impl GameSettings {
    /// Reject configurations the loop cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let dimensions = [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("scale_ratio", self.scale_ratio),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("min_jump_height", self.min_jump_height),
            ("max_jump_height", self.max_jump_height),
            ("jump_speed", self.jump_speed),
            ("gravity", self.gravity),
            ("run_frame_ms", self.run_frame_ms),
            ("ground_width", self.ground_width),
            ("ground_height", self.ground_height),
            ("scroll_speed", self.scroll_speed),
            ("spawn_gap_min", self.spawn_gap_min),
            ("spawn_gap_max", self.spawn_gap_max),
            ("game_speed_start", self.game_speed_start),
        ];
        for (name, value) in dimensions {
            if !positive(value) {
                return Err(SettingsError::NonPositive(name));
            }
        }

        if !(self.jump_debounce_ms > 0.0) || !(self.arming_delay_ms >= 0.0) {
            return Err(SettingsError::InvalidDelay);
        }
        if !(self.game_speed_increment >= 0.0) {
            return Err(SettingsError::NonPositive("game_speed_increment"));
        }
        if self.min_jump_height > self.max_jump_height {
            return Err(SettingsError::InvertedRange("jump height"));
        }
        if self.spawn_gap_min > self.spawn_gap_max {
            return Err(SettingsError::InvertedRange("spawn gap"));
        }
        if self.ground_width < self.viewport_width {
            return Err(SettingsError::GroundTooNarrow {
                ground: self.ground_width,
                viewport: self.viewport_width,
            });
        }
        if !(0.0..0.5).contains(&self.collision_inset) {
            return Err(SettingsError::InvalidInset(self.collision_inset));
        }
        if self.obstacles.is_empty() {
            return Err(SettingsError::EmptyObstacleCatalog);
        }
        for kind in &self.obstacles {
            if !positive(kind.width) || !positive(kind.height) {
                return Err(SettingsError::NonPositive("obstacle size"));
            }
        }
        for id in PlayerId::ALL {
            if self.sprites_for(id).run_frames.is_empty() {
                return Err(SettingsError::EmptyRunCycle(id));
            }
        }

        Ok(())
    }

    pub fn sprites_for(&self, id: PlayerId) -> &PlayerSprites {
        match id {
            PlayerId::One => &self.player_one_sprites,
            PlayerId::Two => &self.player_two_sprites,
        }
    }

    pub fn start_x_for(&self, id: PlayerId) -> f32 {
        match id {
            PlayerId::One => self.player_one_x,
            PlayerId::Two => self.player_two_x,
        }
    }

    /// Image paths for the default sprite handles
    pub fn default_assets() -> Vec<SpriteAsset> {
        [
            (sprites::STANDING, "images/standing_still.png"),
            (sprites::RUN_1, "images/dino_run1.png"),
            (sprites::RUN_2, "images/dino_run2.png"),
            (sprites::INVERTED_STANDING, "images/inverted_standing_still.png"),
            (sprites::INVERTED_RUN_1, "images/inverted_dino_run1.png"),
            (sprites::INVERTED_RUN_2, "images/inverted_dino_run2.png"),
            (sprites::GROUND, "images/ground.png"),
            (sprites::CACTUS_1, "images/cactus_1.png"),
            (sprites::CACTUS_2, "images/cactus_2.png"),
            (sprites::CACTUS_3, "images/cactus_3.png"),
        ]
        .into_iter()
        .map(|(handle, path)| SpriteAsset {
            handle,
            path: path.to_string(),
        })
        .collect()
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Configuration that cannot start a session
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("{0} must be a positive finite number")]
    NonPositive(&'static str),

    #[error("{0} range is inverted (min > max)")]
    InvertedRange(&'static str),

    #[error("ground width {ground} does not cover viewport width {viewport}")]
    GroundTooNarrow { ground: f32, viewport: f32 },

    #[error("collision inset {0} must be in [0, 0.5)")]
    InvalidInset(f32),

    #[error("debounce and arming delays must be non-negative")]
    InvalidDelay,

    #[error("obstacle catalog is empty")]
    EmptyObstacleCatalog,

    #[error("{0} has no run frames")]
    EmptyRunCycle(PlayerId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(GameSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let settings = GameSettings {
            obstacles: Vec::new(),
            ..GameSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::EmptyObstacleCatalog)
        );
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let settings = GameSettings {
            viewport_height: 0.0,
            ..GameSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::NonPositive("viewport_height"))
        );

        let settings = GameSettings {
            scale_ratio: f32::NAN,
            ..GameSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::NonPositive("scale_ratio"))
        );
    }

    #[test]
    fn test_inverted_jump_range_rejected() {
        let settings = GameSettings {
            min_jump_height: 160.0,
            max_jump_height: 100.0,
            ..GameSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InvertedRange("jump height"))
        );
    }

    #[test]
    fn test_missing_run_frames_rejected() {
        let mut settings = GameSettings::default();
        settings.player_two_sprites.run_frames.clear();
        assert_eq!(
            settings.validate(),
            Err(SettingsError::EmptyRunCycle(PlayerId::Two))
        );
    }

    #[test]
    fn test_default_assets_cover_default_handles() {
        let settings = GameSettings::default();
        let assets = GameSettings::default_assets();
        let known = |h: SpriteHandle| assets.iter().any(|a| a.handle == h);

        assert!(known(settings.ground_sprite));
        for kind in &settings.obstacles {
            assert!(known(kind.sprite));
        }
        for id in PlayerId::ALL {
            let s = settings.sprites_for(id);
            assert!(known(s.standing));
            assert!(s.run_frames.iter().all(|h| known(*h)));
        }
    }
}
