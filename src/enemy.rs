use macroquad::prelude::*;

use crate::canvas::Canvas;
use crate::config::MAP_SIZE;
use crate::entity::{Actor, Enemy, Player};
use crate::level::Solids;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Cabbage,
    Zombie,
    Snake,
}

impl EnemyKind {
    fn size(self) -> Vec2 {
        match self {
            EnemyKind::Cabbage => vec2(40.0, 40.0),
            EnemyKind::Zombie => vec2(40.0, 50.0),
            EnemyKind::Snake => vec2(50.0, 30.0),
        }
    }

    fn color(self) -> Color {
        match self {
            EnemyKind::Cabbage => GREEN,
            EnemyKind::Zombie => GRAY,
            EnemyKind::Snake => GOLD,
        }
    }
}

/// How an enemy moves between collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Pace left and right, turning at walls.
    Walk,
    Idle,
}

/// Where and how to place one enemy.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Pixels per second.
    pub speed: f32,
    pub behavior: Behavior,
}

/// The fixed starting enemies every map gets.
// TODO: read placements from the map's Enemies layer instead.
pub fn default_roster() -> Vec<EnemySpawn> {
    vec![
        EnemySpawn {
            kind: EnemyKind::Cabbage,
            pos: vec2(500.0, 500.0),
            speed: 0.0,
            behavior: Behavior::Walk,
        },
        EnemySpawn {
            kind: EnemyKind::Zombie,
            pos: vec2(50.0, 300.0),
            speed: 200.0,
            behavior: Behavior::Walk,
        },
        EnemySpawn {
            kind: EnemyKind::Snake,
            pos: vec2(850.0, 300.0),
            speed: 120.0,
            behavior: Behavior::Walk,
        },
    ]
}

/// Simple pacing enemy.
#[derive(Debug, Clone)]
pub struct Walker {
    pub kind: EnemyKind,
    rect: Rect,
    speed: f32,
    behavior: Behavior,
    heading: f32,
}

impl Walker {
    pub fn from_spawn(spawn: &EnemySpawn) -> Self {
        let size = spawn.kind.size();
        Self {
            kind: spawn.kind,
            rect: Rect::new(spawn.pos.x, spawn.pos.y, size.x, size.y),
            speed: spawn.speed,
            behavior: spawn.behavior,
            heading: 1.0,
        }
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    fn turn(&mut self) {
        self.heading = -self.heading;
    }
}

impl Actor for Walker {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.fill(self.kind.color(), Some(self.rect));
    }
}

impl Enemy for Walker {
    fn update(&mut self, _now: f64, dt: f32, solids: &Solids<'_>) {
        if self.behavior != Behavior::Walk || self.speed <= 0.0 {
            return;
        }
        let mut next = self.rect;
        next.x += self.heading * self.speed * dt;
        let off_map = next.x < 0.0 || next.right() > MAP_SIZE.x;
        if off_map || solids.hits(&next, None) {
            self.turn();
        } else {
            self.rect = next;
        }
    }

    fn collide_with_player(&mut self, player: &mut dyn Player) {
        player.take_hit(self.rect);
        self.turn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_matches_the_three_starting_enemies() {
        let roster = default_roster();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[1].kind, EnemyKind::Zombie);
        assert_eq!(roster[1].speed, 200.0);
    }

    #[test]
    fn walker_keeps_spawn_position() {
        let w = Walker::from_spawn(&default_roster()[2]);
        assert_eq!(w.rect().point(), vec2(850.0, 300.0));
        assert_eq!(w.heading(), 1.0);
    }
}
