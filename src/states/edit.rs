//! Map editor: pick a cell from a sheet panel and paint it onto a layer.

use macroquad::prelude::*;
use std::rc::Rc;

use crate::canvas::Canvas;
use crate::config::{Settings, CELL_SIZE, MAP_SIZE, SIDEBAR};
use crate::error::Result;
use crate::input::{Event, Keys};
use crate::loader::json_loader::{decode_map_file, save_map_file};
use crate::map_data::{Coord, LayerName, MapDescription, TileRef};
use crate::sheet::{get_cell_coordinates, Sheets, SpriteRef};
use crate::state::{Persist, State, StateCore, StateId};

const BACKGROUND: Color = Color::new(30.0 / 255.0, 40.0 / 255.0, 50.0 / 255.0, 1.0);

/// Sheets offered as panel pages, in paging order.
pub const BASIC_PANELS: [&str; 8] = [
    "base",
    "exttemple",
    "inttemple1",
    "inttemple2",
    "dungeon1",
    "forest",
    "misc",
    "tatami",
];

/// Map written when the editor was opened without one.
pub const DEFAULT_MAP_NAME: &str = "untitled.json";

const MAP_RECT: Rect = Rect {
    x: 0.0,
    y: 0.0,
    w: MAP_SIZE.x,
    h: MAP_SIZE.y,
};
const PANEL: Rect = Rect {
    x: SIDEBAR.x,
    y: SIDEBAR.y,
    w: SIDEBAR.w,
    h: 600.0,
};

const LAYER_KEYS: [KeyCode; 8] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
];

pub struct Edit {
    core: StateCore,
    settings: Rc<Settings>,
    sheets: Rc<Sheets>,
    panels: Vec<String>,
    page: usize,
    layer: LayerName,
    selected: Option<TileRef>,
    map: MapDescription,
    map_name: String,
}

impl Edit {
    pub fn new(settings: Rc<Settings>, sheets: Rc<Sheets>) -> Self {
        let panels = BASIC_PANELS
            .iter()
            .filter(|name| sheets.get(name).is_ok())
            .map(|name| name.to_string())
            .collect();
        Self {
            core: StateCore::new(StateId::Select),
            settings,
            sheets,
            panels,
            page: 0,
            layer: LayerName::BgTiles,
            selected: None,
            map: MapDescription::blank(),
            map_name: DEFAULT_MAP_NAME.to_owned(),
        }
    }

    pub fn map(&self) -> &MapDescription {
        &self.map
    }

    pub fn layer(&self) -> LayerName {
        self.layer
    }

    pub fn selected(&self) -> Option<&TileRef> {
        self.selected.as_ref()
    }

    /// Name of the sheet on the current panel page.
    pub fn panel(&self) -> Option<&str> {
        self.panels.get(self.page).map(String::as_str)
    }

    /// Step `delta` pages, wrapping at both ends.
    pub fn change_panel(&mut self, delta: i32) {
        if self.panels.is_empty() {
            return;
        }
        let count = self.panels.len() as i32;
        self.page = (self.page as i32 + delta).rem_euclid(count) as usize;
        self.selected = None;
    }

    /// Handle a click at `pos` in screen coordinates.
    pub fn click(&mut self, pos: Vec2) {
        if PANEL.contains(pos) {
            self.select_from_panel(pos);
        } else if MAP_RECT.contains(pos) {
            let target = get_cell_coordinates(&MAP_RECT, pos, CELL_SIZE);
            match &self.selected {
                Some(tile) => self.map.set_tile(self.layer, target, tile.clone()),
                None => {
                    self.map.clear_tile(self.layer, target);
                }
            }
        }
    }

    fn select_from_panel(&mut self, pos: Vec2) {
        let Some(sheet) = self.panel() else {
            return;
        };
        let source = get_cell_coordinates(&PANEL, pos, CELL_SIZE);
        let region = Rect::new(source.0 as f32, source.1 as f32, CELL_SIZE.x, CELL_SIZE.y);
        // clicks past the sheet's edge pick nothing
        if self.sheets.sprite(sheet, region).is_ok() {
            self.selected = Some(TileRef {
                sheet: sheet.to_owned(),
                source,
            });
        }
    }

    /// Write the map under the map directory.
    pub fn save(&self) -> Result<()> {
        let path = self.settings.map_path(&self.map_name);
        save_map_file(&self.map, &path)?;
        log::info!("Saved map to {}", path.display());
        Ok(())
    }

    fn panel_region(&self, sheet: &str) -> Option<Rect> {
        let image = self.sheets.get(sheet).ok()?;
        Some(Rect::new(
            0.0,
            0.0,
            (image.width() as f32).min(PANEL.w),
            (image.height() as f32).min(PANEL.h),
        ))
    }

    fn draw_map(&self, canvas: &mut dyn Canvas) {
        if let Some(bg) = &self.map.bg_colors {
            let [r, g, b] = bg.fill;
            canvas.fill(Color::from_rgba(r, g, b, 255), Some(MAP_RECT));
            for (target, [r, g, b]) in &bg.cells {
                let cell = Rect::new(target.0 as f32, target.1 as f32, CELL_SIZE.x, CELL_SIZE.y);
                canvas.fill(Color::from_rgba(*r, *g, *b, 255), Some(cell));
            }
        }
        for layer in LayerName::TILE_LAYERS {
            let mut cells: Vec<(&Coord, &TileRef)> = self.map.layer(layer).iter().collect();
            cells.sort_by_key(|(target, _)| (target.1, target.0));
            for (target, tile) in cells {
                let sprite = SpriteRef {
                    sheet: tile.sheet.clone(),
                    source: Rect::new(tile.source.0 as f32, tile.source.1 as f32, CELL_SIZE.x, CELL_SIZE.y),
                };
                canvas.blit(&sprite, target.to_vec2());
            }
        }
    }
}

impl State for Edit {
    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn startup(&mut self, now: f64, persist: Persist) -> Result<()> {
        self.core.start(now, persist);
        self.core.next = StateId::Select;
        self.selected = None;
        self.map = MapDescription::blank();
        self.map_name = DEFAULT_MAP_NAME.to_owned();
        if let Some(name) = self.core.persist.map.clone() {
            match decode_map_file(&self.settings.map_path(&name)) {
                Ok(map) => {
                    self.map = map;
                    self.map_name = name;
                }
                Err(err) => log::warn!("Opening a blank map instead of {name}: {err}"),
            }
        }
        Ok(())
    }

    fn update(&mut self, _keys: &Keys, _now: f64, _dt: f32) {}

    fn draw(&self, canvas: &mut dyn Canvas, _interpolate: f32) {
        canvas.fill(BACKGROUND, None);
        self.draw_map(canvas);

        if let Some(sheet) = self.panel() {
            if let Some(region) = self.panel_region(sheet) {
                let sprite = SpriteRef {
                    sheet: sheet.to_owned(),
                    source: region,
                };
                canvas.blit(&sprite, PANEL.point());
            }
        }
        if let Some(tile) = &self.selected {
            let cell = Rect::new(
                PANEL.x + tile.source.0 as f32,
                PANEL.y + tile.source.1 as f32,
                CELL_SIZE.x,
                CELL_SIZE.y,
            );
            canvas.outline(YELLOW, cell, 3.0);
        }

        let info = vec2(PANEL.x + 8.0, PANEL.bottom() + 8.0);
        canvas.text(self.layer.as_str(), info, 20.0, WHITE);
        canvas.text(self.panel().unwrap_or("-"), info + vec2(0.0, 24.0), 20.0, LIGHTGRAY);
    }

    fn get_event(&mut self, event: &Event) {
        match *event {
            Event::MouseDown(pos) => self.click(pos),
            Event::KeyDown(KeyCode::PageUp) => self.change_panel(-1),
            Event::KeyDown(KeyCode::PageDown) => self.change_panel(1),
            Event::KeyDown(KeyCode::Backspace) => self.selected = None,
            Event::KeyDown(KeyCode::F6) => {
                if let Err(err) = self.save() {
                    log::error!("Could not save map: {err}");
                }
            }
            Event::KeyDown(KeyCode::Escape) => {
                self.core.persist.map = None;
                self.core.finish_to(StateId::Select);
            }
            Event::KeyDown(key) => {
                if let Some(i) = LAYER_KEYS.iter().position(|k| *k == key) {
                    self.layer = LayerName::TILE_LAYERS[i];
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Recorder;

    fn editor() -> Edit {
        let mut sheets = Sheets::new();
        sheets.insert("base", Image::gen_image_color(100, 100, WHITE));
        sheets.insert("forest", Image::gen_image_color(50, 50, GREEN));
        sheets.insert("unlisted", Image::gen_image_color(50, 50, RED));
        Edit::new(Rc::new(Settings::default()), Rc::new(sheets))
    }

    #[test]
    fn only_known_loaded_sheets_become_pages() {
        let mut edit = editor();
        assert_eq!(edit.panel(), Some("base"));
        edit.change_panel(1);
        assert_eq!(edit.panel(), Some("forest"));
        edit.change_panel(1);
        assert_eq!(edit.panel(), Some("base"));
        edit.change_panel(-1);
        assert_eq!(edit.panel(), Some("forest"));
    }

    #[test]
    fn paint_and_erase_on_the_active_layer() {
        let mut edit = editor();
        edit.get_event(&Event::KeyDown(KeyCode::Key3));
        assert_eq!(edit.layer(), LayerName::Solid);

        edit.click(vec2(1060.0, 10.0));
        assert_eq!(
            edit.selected(),
            Some(&TileRef {
                sheet: "base".into(),
                source: Coord(50, 0)
            })
        );
        edit.click(vec2(120.0, 260.0));
        assert!(edit.map().layer(LayerName::Solid).contains_key(&Coord(100, 250)));

        edit.get_event(&Event::KeyDown(KeyCode::Backspace));
        edit.click(vec2(120.0, 260.0));
        assert!(edit.map().layer(LayerName::Solid).is_empty());
    }

    #[test]
    fn click_past_the_sheet_selects_nothing() {
        let mut edit = editor();
        edit.click(vec2(1160.0, 10.0));
        assert_eq!(edit.selected(), None);
    }

    #[test]
    fn draws_placed_tiles_and_the_panel() {
        let mut edit = editor();
        edit.click(vec2(1010.0, 10.0));
        edit.click(vec2(10.0, 10.0));
        let mut canvas = Recorder::new();
        edit.draw(&mut canvas, 0.0);
        assert_eq!(canvas.blitted_sheets(), vec!["base", "base"]);
    }

    #[test]
    fn escape_returns_to_select() {
        let mut edit = editor();
        edit.get_event(&Event::KeyDown(KeyCode::Escape));
        assert!(edit.core().done);
        assert_eq!(edit.core().next, StateId::Select);
    }
}
