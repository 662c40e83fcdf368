//! Input events and the key-to-direction mapping.

use macroquad::prelude::*;
use std::collections::{HashMap, HashSet};

/// Something that happened since the last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Quit,
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseDown(Vec2),
}

/// Snapshot of the keys held down right now.
pub type Keys = HashSet<KeyCode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit grid step, y pointing down.
    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Maps raw keys to logical directions.
#[derive(Debug, Clone)]
pub struct Controls {
    bindings: HashMap<KeyCode, Direction>,
}

impl Default for Controls {
    fn default() -> Self {
        let bindings = [
            (KeyCode::Up, Direction::Up),
            (KeyCode::Down, Direction::Down),
            (KeyCode::Left, Direction::Left),
            (KeyCode::Right, Direction::Right),
            (KeyCode::W, Direction::Up),
            (KeyCode::S, Direction::Down),
            (KeyCode::A, Direction::Left),
            (KeyCode::D, Direction::Right),
        ];
        Self {
            bindings: bindings.into_iter().collect(),
        }
    }
}

impl Controls {
    pub fn new(bindings: HashMap<KeyCode, Direction>) -> Self {
        Self { bindings }
    }

    pub fn direction(&self, key: KeyCode) -> Option<Direction> {
        self.bindings.get(&key).copied()
    }

    /// Sum of the direction vectors of every held key, not normalised.
    pub fn held_vector(&self, keys: &Keys) -> Vec2 {
        let mut dirs: Vec<Direction> = keys.iter().filter_map(|k| self.direction(*k)).collect();
        dirs.sort_by_key(|d| *d as u8);
        dirs.dedup();
        dirs.into_iter().fold(Vec2::ZERO, |acc, d| {
            let (x, y) = d.vector();
            acc + vec2(x as f32, y as f32)
        })
    }
}

/// Pending events plus the live key snapshot, polled from macroquad once
/// per frame.
pub fn poll_events() -> (Vec<Event>, Keys) {
    let mut events = Vec::new();
    if is_quit_requested() {
        events.push(Event::Quit);
    }
    for key in get_keys_pressed() {
        events.push(Event::KeyDown(key));
    }
    for key in get_keys_released() {
        events.push(Event::KeyUp(key));
    }
    if is_mouse_button_pressed(MouseButton::Left) {
        let (x, y) = mouse_position();
        events.push(Event::MouseDown(vec2(x, y)));
    }
    (events, get_keys_down())
}
