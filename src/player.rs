use macroquad::prelude::*;

use crate::canvas::Canvas;
use crate::entity::{Actor, Player};
use crate::input::{Controls, Keys};
use crate::sheet::SpriteRef;

pub const HERO_SIZE: Vec2 = Vec2::new(36.0, 44.0);
/// How long the hero flashes after being hit, in ms.
const HIT_FLASH_MS: f64 = 400.0;

/// Keyboard-driven player.
#[derive(Debug, Clone)]
pub struct Hero {
    pub name: String,
    rect: Rect,
    old_pos: Vec2,
    speed: f32,
    sprite: Option<SpriteRef>,
    hits: u32,
    solid_bumps: u32,
    last_hit: Option<f64>,
    now: f64,
}

impl Hero {
    pub fn new(name: impl Into<String>, pos: Vec2) -> Self {
        Self {
            name: name.into(),
            rect: Rect::new(pos.x, pos.y, HERO_SIZE.x, HERO_SIZE.y),
            old_pos: pos,
            speed: 180.0,
            sprite: None,
            hits: 0,
            solid_bumps: 0,
            last_hit: None,
            now: 0.0,
        }
    }

    pub fn with_sprite(mut self, sprite: SpriteRef) -> Self {
        self.sprite = Some(sprite);
        self
    }

    /// Move according to the held direction keys.
    pub fn update(&mut self, keys: &Keys, controls: &Controls, now: f64, dt: f32) {
        self.now = now;
        self.old_pos = self.rect.point();
        let dir = controls.held_vector(keys);
        if dir != Vec2::ZERO {
            let step = dir.normalize() * self.speed * dt;
            self.rect.move_to(self.rect.point() + step);
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.rect.point()
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.rect.move_to(pos);
        self.old_pos = pos;
    }

    /// Times an enemy has hit the hero.
    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Times the hero was pushed back out of a wall.
    pub fn solid_bumps(&self) -> u32 {
        self.solid_bumps
    }

    fn flashing(&self) -> bool {
        self.last_hit.is_some_and(|t| self.now - t < HIT_FLASH_MS)
    }
}

impl Actor for Hero {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        match &self.sprite {
            Some(sprite) => canvas.blit(sprite, self.rect.point()),
            None => canvas.fill(SKYBLUE, Some(self.rect)),
        }
        if self.flashing() {
            canvas.outline(RED, self.rect, 3.0);
        }
    }
}

impl Player for Hero {
    fn collide_with_solid(&mut self) {
        self.solid_bumps += 1;
        self.rect.move_to(self.old_pos);
    }

    fn take_hit(&mut self, _from: Rect) {
        self.hits += 1;
        self.last_hit = Some(self.now);
    }
}
