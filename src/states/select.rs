use macroquad::prelude::*;
use std::rc::Rc;

use crate::canvas::Canvas;
use crate::config::{Settings, BACKGROUND_COLOR};
use crate::error::Result;
use crate::input::{Controls, Direction, Event, Keys};
use crate::save::{SaveSlots, Slot, SLOT_COUNT};
use crate::state::{Persist, State, StateCore, StateId};

const SLOT_RECT: Rect = Rect {
    x: 350.0,
    y: 200.0,
    w: 500.0,
    h: 100.0,
};
const SLOT_SPACER: f32 = 130.0;

/// Title menu: pick a save slot, or open the map editor.
pub struct Select {
    core: StateCore,
    settings: Rc<Settings>,
    controls: Controls,
    saves: SaveSlots,
    index: usize,
}

impl Select {
    pub fn new(settings: Rc<Settings>) -> Self {
        Self {
            core: StateCore::new(StateId::Register),
            settings,
            controls: Controls::default(),
            saves: SaveSlots::default(),
            index: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    fn choose(&mut self) {
        self.core.persist.save_slot = self.index;
        match self.saves.get(self.index) {
            Some(Slot::Player(data)) => {
                self.core.persist.map = Some(data.map.clone());
                self.core.finish_to(StateId::Game);
            }
            _ => {
                self.core.persist.map = None;
                self.core.finish_to(StateId::Register);
            }
        }
    }
}

impl State for Select {
    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn startup(&mut self, now: f64, persist: Persist) -> Result<()> {
        self.index = persist.save_slot.min(SLOT_COUNT - 1);
        self.core.start(now, persist);
        self.saves = SaveSlots::load(&self.settings.save_path)?;
        Ok(())
    }

    fn update(&mut self, _keys: &Keys, _now: f64, _dt: f32) {}

    fn draw(&self, canvas: &mut dyn Canvas, _interpolate: f32) {
        canvas.fill(BACKGROUND_COLOR, None);
        canvas.text(&self.settings.caption, vec2(SLOT_RECT.x, 80.0), 60.0, GOLD);
        for (i, slot) in self.saves.slots.iter().enumerate() {
            let mut rect = SLOT_RECT;
            rect.y += SLOT_SPACER * i as f32;
            let label = match slot.player() {
                Some(p) => format!("{}. {}", i + 1, p.name),
                None => format!("{}. EMPTY", i + 1),
            };
            canvas.text(&label, rect.point() + vec2(20.0, 30.0), 40.0, WHITE);
            if i == self.index {
                canvas.outline(YELLOW, rect, 5.0);
            }
        }
        canvas.text("Enter: play   E: edit maps   Esc: quit", vec2(SLOT_RECT.x, 620.0), 24.0, LIGHTGRAY);
    }

    fn get_event(&mut self, event: &Event) {
        let Event::KeyDown(key) = event else {
            return;
        };
        match (self.controls.direction(*key), *key) {
            (Some(Direction::Up), _) => self.index = (self.index + SLOT_COUNT - 1) % SLOT_COUNT,
            (Some(Direction::Down), _) => self.index = (self.index + 1) % SLOT_COUNT,
            (_, KeyCode::Enter | KeyCode::KpEnter) => self.choose(),
            (_, KeyCode::E) => self.core.finish_to(StateId::Edit),
            (_, KeyCode::Escape) => self.core.quit = true,
            _ => {}
        }
    }
}
