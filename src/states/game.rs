//! The playing screen: one level and the hero walking around it.

use macroquad::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::canvas::Canvas;
use crate::config::{Settings, SIDEBAR};
use crate::error::Result;
use crate::input::{Controls, Event, Keys};
use crate::level::{Level, LevelConfig, SharedPlayer};
use crate::player::Hero;
use crate::save::{PlayerData, SaveSlots};
use crate::sheet::Sheets;
use crate::state::{Persist, State, StateCore, StateId};

pub struct Game {
    core: StateCore,
    settings: Rc<Settings>,
    sheets: Rc<Sheets>,
    config: LevelConfig,
    controls: Controls,
    hero: Option<Rc<RefCell<Hero>>>,
    level: Option<Level>,
    map_name: String,
}

impl Game {
    pub fn new(settings: Rc<Settings>, sheets: Rc<Sheets>, config: LevelConfig) -> Self {
        Self {
            core: StateCore::new(StateId::Select),
            settings,
            sheets,
            config,
            controls: Controls::default(),
            hero: None,
            level: None,
            map_name: String::new(),
        }
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn hero(&self) -> Option<&Rc<RefCell<Hero>>> {
        self.hero.as_ref()
    }

    fn save_progress(&self) -> Result<()> {
        let Some(hero) = &self.hero else {
            return Ok(());
        };
        let hero = hero.borrow();
        let pos = hero.pos();
        let data = PlayerData {
            name: hero.name.clone(),
            map: self.map_name.clone(),
            position: [pos.x, pos.y],
        };
        SaveSlots::store(&self.settings.save_path, self.core.persist.save_slot, data)?;
        Ok(())
    }
}

impl State for Game {
    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn startup(&mut self, now: f64, persist: Persist) -> Result<()> {
        self.core.start(now, persist);
        self.core.next = StateId::Select;

        let saves = SaveSlots::load(&self.settings.save_path)?;
        let data = match saves.get(self.core.persist.save_slot).and_then(|s| s.player()) {
            Some(data) => data.clone(),
            None => {
                log::warn!("Slot {} is empty, starting a nameless player", self.core.persist.save_slot);
                PlayerData::new("", self.settings.start_map.clone())
            }
        };
        self.map_name = self.core.persist.map.clone().unwrap_or(data.map);

        let hero = Rc::new(RefCell::new(Hero::new(data.name, Vec2::from(data.position))));
        let shared: SharedPlayer = hero.clone();
        let path = self.settings.map_path(&self.map_name);
        self.level = Some(Level::load(shared, &path, &self.sheets, &self.config)?);
        self.hero = Some(hero);
        Ok(())
    }

    fn cleanup(&mut self) -> Persist {
        if let Err(err) = self.save_progress() {
            log::error!("Could not save progress: {err}");
        }
        self.level = None;
        self.hero = None;
        self.core.persist.map = Some(self.map_name.clone());
        self.core.finish()
    }

    fn update(&mut self, keys: &Keys, now: f64, dt: f32) {
        if let Some(hero) = &self.hero {
            hero.borrow_mut().update(keys, &self.controls, now, dt);
        }
        if let Some(level) = &mut self.level {
            let report = level.update(now, dt);
            if let Some(i) = report.enemy {
                log::trace!("Enemy {i} touched the player");
            }
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas, _interpolate: f32) {
        let Some(level) = &self.level else {
            return;
        };
        level.draw(canvas);
        if let Some(hero) = &self.hero {
            let hero = hero.borrow();
            let origin = SIDEBAR.point() + vec2(12.0, 16.0);
            canvas.text(&hero.name, origin, 32.0, GOLD);
            canvas.text(&self.map_name, origin + vec2(0.0, 40.0), 20.0, LIGHTGRAY);
            canvas.text(&format!("Hits: {}", hero.hits()), origin + vec2(0.0, 70.0), 20.0, WHITE);
        }
    }

    fn get_event(&mut self, event: &Event) {
        if *event == Event::KeyDown(KeyCode::Escape) {
            self.core.finish_to(StateId::Select);
        }
    }
}
