//! Name entry for a new player.

use macroquad::prelude::*;
use std::rc::Rc;

use crate::canvas::Canvas;
use crate::config::{Settings, BACKGROUND_COLOR};
use crate::error::Result;
use crate::input::{Controls, Direction, Event, Keys};
use crate::save::{PlayerData, SaveSlots};
use crate::state::{Persist, State, StateCore, StateId};
use crate::timer::Timer;

pub const MAX_LETTERS: usize = 8;

const CURSOR: Rect = Rect {
    x: 292.0,
    y: 141.0,
    w: 41.0,
    h: 45.0,
};
const CURSOR_SPACER: f32 = 82.0;

const HIGHLIGHT: Rect = Rect {
    x: 80.0,
    y: 270.0,
    w: 80.0,
    h: 85.0,
};
const HIGHLIGHT_SPACER: (f32, f32) = (80.0, 75.0);
const HIGHLIGHT_COLOR: Color = Color::new(72.0 / 255.0, 61.0 / 255.0, 139.0 / 255.0, 1.0);

pub const ALPHAGRID: [&str; 5] = [
    "ABCDEFGHIJKLM",
    "NOPQRSTUVWXYZ",
    "abcdefghijklm",
    "nopqrstuvwxyz",
    "0123456789-",
];

pub const END_CELL: (usize, usize) = (12, 4);
pub const BACKSPACE_CELL: (usize, usize) = (11, 4);

/// Cursor blink period in ms.
const BLINK_MS: f64 = 333.0;

pub struct Register {
    core: StateCore,
    settings: Rc<Settings>,
    controls: Controls,
    timer: Timer,
    blink: bool,
    index: (usize, usize),
    name: Vec<char>,
}

impl Register {
    pub fn new(settings: Rc<Settings>) -> Result<Self> {
        Ok(Self {
            core: StateCore::new(StateId::Select),
            settings,
            controls: Controls::default(),
            timer: Timer::new(BLINK_MS)?,
            blink: true,
            index: (0, 0),
            name: Vec::new(),
        })
    }

    pub fn name(&self) -> String {
        self.name.iter().collect()
    }

    pub fn index(&self) -> (usize, usize) {
        self.index
    }

    pub fn blink(&self) -> bool {
        self.blink
    }

    pub fn move_on_grid(&mut self, direction: Direction) {
        let (dx, dy) = direction.vector();
        let cols = ALPHAGRID[0].len() as i32;
        let rows = ALPHAGRID.len() as i32;
        self.index.0 = (self.index.0 as i32 + dx).rem_euclid(cols) as usize;
        self.index.1 = (self.index.1 as i32 + dy).rem_euclid(rows) as usize;
    }

    pub fn select_from_grid(&mut self) {
        if self.index == END_CELL {
            if !self.name.is_empty() {
                match self.save_new() {
                    Ok(()) => self.pressed_exit(),
                    Err(err) => log::error!("Could not save new player: {err}"),
                }
            }
        } else if self.index == BACKSPACE_CELL {
            self.name.pop();
        } else if self.name.len() < MAX_LETTERS {
            let (i, j) = self.index;
            // cells past the end of the short last row hold nothing
            if let Some(letter) = ALPHAGRID[j].chars().nth(i) {
                self.name.push(letter);
            }
        }
    }

    fn save_new(&mut self) -> Result<()> {
        let player = PlayerData::new(self.name(), self.settings.start_map.clone());
        let slot = self.core.persist.save_slot;
        SaveSlots::store(&self.settings.save_path, slot, player)?;
        log::info!("Registered '{}' in slot {}", self.name(), slot);
        Ok(())
    }

    fn pressed_exit(&mut self) {
        self.core.finish_to(StateId::Select);
    }

    fn grid_cell(&self, i: usize, j: usize) -> Rect {
        let mut rect = HIGHLIGHT;
        rect.x += HIGHLIGHT_SPACER.0 * i as f32;
        rect.y += HIGHLIGHT_SPACER.1 * j as f32;
        rect
    }
}

impl State for Register {
    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn startup(&mut self, now: f64, persist: Persist) -> Result<()> {
        self.core.start(now, persist);
        self.index = (0, 0);
        self.name.clear();
        Ok(())
    }

    fn update(&mut self, _keys: &Keys, now: f64, _dt: f32) {
        if self.timer.check_tick(now) {
            self.blink = !self.blink;
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas, _interpolate: f32) {
        canvas.fill(BACKGROUND_COLOR, None);
        let highlight = self.grid_cell(self.index.0, self.index.1);
        canvas.fill(HIGHLIGHT_COLOR, Some(highlight));

        for (j, row) in ALPHAGRID.iter().enumerate() {
            for (i, letter) in row.chars().enumerate() {
                let cell = self.grid_cell(i, j);
                canvas.text(&letter.to_string(), cell.point() + vec2(25.0, 15.0), 50.0, WHITE);
            }
        }
        let (bi, bj) = BACKSPACE_CELL;
        canvas.text("DEL", self.grid_cell(bi, bj).point() + vec2(10.0, 25.0), 28.0, WHITE);
        let (ei, ej) = END_CELL;
        canvas.text("END", self.grid_cell(ei, ej).point() + vec2(10.0, 25.0), 28.0, WHITE);

        canvas.outline(YELLOW, highlight, 5.0);

        if self.blink && self.name.len() < MAX_LETTERS {
            let mut rect = CURSOR;
            rect.x += CURSOR_SPACER * self.name.len() as f32;
            canvas.fill(WHITE, Some(rect));
        }
        for (i, letter) in self.name.iter().enumerate() {
            let mut rect = CURSOR;
            rect.x += CURSOR_SPACER * i as f32;
            canvas.fill(BACKGROUND_COLOR, Some(rect));
            canvas.text(&letter.to_string(), rect.point(), 60.0, YELLOW);
        }
    }

    fn get_event(&mut self, event: &Event) {
        let Event::KeyDown(key) = event else {
            return;
        };
        if let Some(direction) = self.controls.direction(*key) {
            self.move_on_grid(direction);
        } else if matches!(key, KeyCode::Enter | KeyCode::KpEnter) {
            self.select_from_grid();
        } else if matches!(key, KeyCode::X | KeyCode::Escape) {
            self.pressed_exit();
        }
    }
}
