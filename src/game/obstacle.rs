//! Obstacle (cactus) spawning, scrolling, recycling and hit testing

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use super::collision::overlaps_with_inset;
use super::entity::{BoundingBox, Drawable, RenderSurface, SpriteHandle};
use super::settings::{GameSettings, ObstacleKind};

/// A single active obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub sprite: SpriteHandle,
}

impl Drawable for Obstacle {
    fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }

    fn sprite(&self) -> SpriteHandle {
        self.sprite
    }
}

/// Owns the active obstacle sequence (oldest at the front)
pub struct ObstacleController {
    obstacles: VecDeque<Obstacle>,
    /// Catalog with sizes already scaled
    catalog: Vec<ObstacleKind>,
    speed: f32,
    scale: f32,
    spawn_x: f32,
    floor_y: f32,
    gap_min: f32,
    gap_max: f32,
    /// Scroll distance left before the next spawn
    distance_to_spawn: f32,
    collision_inset: f32,
    rng: ChaCha8Rng,
}

impl ObstacleController {
    pub fn new(settings: &GameSettings, rng: ChaCha8Rng) -> Self {
        let scale = settings.scale_ratio;
        let catalog = settings
            .obstacles
            .iter()
            .map(|kind| ObstacleKind {
                width: kind.width * scale,
                height: kind.height * scale,
                sprite: kind.sprite,
            })
            .collect();

        let mut controller = Self {
            obstacles: VecDeque::new(),
            catalog,
            speed: settings.scroll_speed,
            scale,
            spawn_x: settings.viewport_width * scale,
            floor_y: settings.viewport_height * scale,
            gap_min: settings.spawn_gap_min * scale,
            gap_max: settings.spawn_gap_max * scale,
            distance_to_spawn: 0.0,
            collision_inset: settings.collision_inset,
            rng,
        };
        controller.roll_gap();
        controller
    }

    /// Controller with a fixed RNG seed
    pub fn with_seed(settings: &GameSettings, seed: u64) -> Self {
        Self::new(settings, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn update(&mut self, game_speed: f32, elapsed_ms: f32) {
        let distance = self.speed * game_speed * elapsed_ms * self.scale;

        for obstacle in self.obstacles.iter_mut() {
            obstacle.x -= distance;
        }
        self.obstacles.retain(|o| o.x + o.width >= 0.0);

        self.distance_to_spawn -= distance;
        if self.distance_to_spawn <= 0.0 {
            self.spawn();
            self.roll_gap();
        }
    }

    fn spawn(&mut self) {
        let index = self.rng.gen_range(0..self.catalog.len());
        let kind = self.catalog[index];
        self.obstacles.push_back(Obstacle {
            x: self.spawn_x,
            y: self.floor_y - kind.height,
            width: kind.width,
            height: kind.height,
            sprite: kind.sprite,
        });
        trace!(kind = index, active = self.obstacles.len(), "Obstacle spawned");
    }

    fn roll_gap(&mut self) {
        self.distance_to_spawn = if self.gap_max > self.gap_min {
            self.rng.gen_range(self.gap_min..=self.gap_max)
        } else {
            self.gap_min
        };
    }

    pub fn draw(&self, surface: &mut dyn RenderSurface) {
        for obstacle in &self.obstacles {
            obstacle.draw(surface);
        }
    }

    /// Remove every obstacle and start a fresh spawn gap
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.roll_gap();
    }

    /// True if any active obstacle overlaps `target`
    pub fn collide_with(&self, target: &dyn Drawable) -> bool {
        let bounds = target.bounds();
        self.obstacles
            .iter()
            .any(|o| overlaps_with_inset(&o.bounds(), &bounds, self.collision_inset))
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Place an obstacle directly (used to stage collisions)
    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push_back(obstacle);
    }
}
