//! Shared entity capabilities: bounding boxes, sprite handles and the draw contract

use serde::{Deserialize, Serialize};

/// Opaque reference to a sprite image owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteHandle(pub u16);

/// Axis-aligned rectangle in scaled pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Shrink the box by `fraction` of its size on every side
    pub fn inset(&self, fraction: f32) -> Self {
        let dx = self.width * fraction;
        let dy = self.height * fraction;
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: (self.width - 2.0 * dx).max(0.0),
            height: (self.height - 2.0 * dy).max(0.0),
        }
    }
}

/// Drawing surface supplied by the host environment
pub trait RenderSurface {
    /// Draw `sprite` at (x, y) stretched to (width, height)
    fn draw_sprite(&mut self, sprite: SpriteHandle, x: f32, y: f32, width: f32, height: f32);

    /// Draw an overlay message
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32);
}

/// Anything with a position, a size and a current sprite
pub trait Drawable {
    fn bounds(&self) -> BoundingBox;

    fn sprite(&self) -> SpriteHandle;

    fn draw(&self, surface: &mut dyn RenderSurface) {
        let b = self.bounds();
        surface.draw_sprite(self.sprite(), b.x, b.y, b.width, b.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inset_shrinks_symmetrically() {
        let b = BoundingBox::new(10.0, 20.0, 100.0, 50.0).inset(0.1);
        assert_eq!(b.x, 20.0);
        assert_eq!(b.y, 25.0);
        assert_eq!(b.width, 80.0);
        assert_eq!(b.height, 40.0);
    }

    #[test]
    fn test_inset_never_negative() {
        let b = BoundingBox::new(0.0, 0.0, 10.0, 10.0).inset(0.75);
        assert_eq!(b.width, 0.0);
        assert_eq!(b.height, 0.0);
    }
}
