//! The contract between a level and the things moving around in it.

use macroquad::prelude::*;

use crate::canvas::Canvas;
use crate::level::Solids;
use crate::mask::Mask;

/// Shadow color painted under every actor.
pub const SHADOW_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.35);

/// Anything drawn in the sorted entity pass.
pub trait Actor {
    /// Screen-space bounding box.
    fn rect(&self) -> Rect;

    /// Pixel mask for narrow-phase tests; `None` means the whole rect.
    fn mask(&self) -> Option<&Mask> {
        None
    }

    fn draw(&self, canvas: &mut dyn Canvas);

    /// Flat ellipse under the bottom edge of the bounding box.
    fn draw_shadow(&self, canvas: &mut dyn Canvas) {
        let r = self.rect();
        let h = (r.h * 0.3).max(4.0);
        canvas.ellipse(SHADOW_COLOR, Rect::new(r.x, r.y + r.h - h * 0.6, r.w, h));
    }
}

/// The player as seen by a level. The level never owns it.
pub trait Player: Actor {
    /// Called at most once per frame when the player overlaps solid pixels.
    fn collide_with_solid(&mut self);

    /// Called by an enemy that touched the player.
    fn take_hit(&mut self, from: Rect);
}

/// A level-owned opponent.
pub trait Enemy: Actor {
    /// Move for this frame. Movement must respect `solids`.
    fn update(&mut self, now: f64, dt: f32, solids: &Solids<'_>);

    /// Called when this enemy is the one found touching the player.
    fn collide_with_player(&mut self, player: &mut dyn Player);
}
