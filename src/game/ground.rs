//! Horizontally looping ground strip

use super::entity::{BoundingBox, Drawable, RenderSurface, SpriteHandle};
use super::settings::GameSettings;

#[derive(Debug, Clone)]
pub struct Ground {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    speed: f32,
    scale: f32,
    sprite: SpriteHandle,
}

impl Ground {
    pub fn new(settings: &GameSettings) -> Self {
        let scale = settings.scale_ratio;
        let height = settings.ground_height * scale;
        Self {
            x: 0.0,
            y: settings.viewport_height * scale - height,
            width: settings.ground_width * scale,
            height,
            speed: settings.scroll_speed,
            scale,
            sprite: settings.ground_sprite,
        }
    }

    /// Scroll left; once a full tile has passed, shift back by one tile width
    pub fn update(&mut self, game_speed: f32, elapsed_ms: f32) {
        self.x -= game_speed * elapsed_ms * self.speed * self.scale;
        if self.x <= -self.width {
            let wrapped = self.x.rem_euclid(self.width) - self.width;
            self.x = if wrapped <= -self.width { 0.0 } else { wrapped };
        }
    }

    pub fn reset(&mut self) {
        self.x = 0.0;
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn width(&self) -> f32 {
        self.width
    }
}

impl Drawable for Ground {
    fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }

    fn sprite(&self) -> SpriteHandle {
        self.sprite
    }

    /// Two back-to-back tiles so the wrap seam is never visible
    fn draw(&self, surface: &mut dyn RenderSurface) {
        surface.draw_sprite(self.sprite, self.x, self.y, self.width, self.height);
        surface.draw_sprite(
            self.sprite,
            self.x + self.width,
            self.y,
            self.width,
            self.height,
        );
    }
}
