//! A single playable map: tile layers, enemies, collisions and layered
//! drawing around a shared player.

use macroquad::prelude::*;
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::canvas::Canvas;
use crate::config::{CELL_SIZE, MAP_SIZE, SIDEBAR};
use crate::enemy::{default_roster, EnemySpawn, Walker};
use crate::entity::{Enemy, Player};
use crate::error::{Error, Result};
use crate::loader::json_loader::decode_map_file;
use crate::map_data::{BgColors, Coord, LayerName, MapDescription};
use crate::mask::{collide_mask, rects_overlap, Mask};
use crate::sheet::Sheets;
use crate::spatial::{SolidIndex, TileHandle};
use crate::tile::{Tile, ANIMATED_TILE_FPS};

/// Player handle shared between the game state and its level.
pub type SharedPlayer = Rc<RefCell<dyn Player>>;

/// Per-tileset settings for building levels.
#[derive(Debug, Clone)]
pub struct LevelConfig {
    /// Sheet whose tiles are animated.
    pub anim_sheet: String,
    /// Frame count of each animation, keyed by sheet and first-frame source.
    pub animated_tiles: HashMap<(String, Coord), usize>,
    pub anim_fps: f32,
    /// Enemies placed by [`Level::load`].
    pub roster: Vec<EnemySpawn>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let anim_sheet = "animsheet".to_owned();
        let animated_tiles = [((anim_sheet.clone(), Coord(0, 0)), 2)].into_iter().collect();
        Self {
            anim_sheet,
            animated_tiles,
            anim_fps: ANIMATED_TILE_FPS,
            roster: default_roster(),
        }
    }
}

impl LevelConfig {
    fn frames_for(&self, sheet: &str, source: Coord) -> Result<usize> {
        self.animated_tiles
            .get(&(sheet.to_owned(), source))
            .copied()
            .ok_or_else(|| Error::UnknownAnimation {
                sheet: sheet.to_owned(),
                source,
            })
    }
}

/// Map colors composited once into a single image.
pub struct Background {
    image: Image,
    texture: OnceCell<Texture2D>,
}

impl Background {
    /// Fill with `bg.fill`, then paint each colored cell.
    pub fn compose(bg: &BgColors, size: Vec2) -> Self {
        let [r, g, b] = bg.fill;
        let mut image = Image::gen_image_color(size.x as u16, size.y as u16, Color::from_rgba(r, g, b, 255));
        for (target, [r, g, b]) in &bg.cells {
            let color = Color::from_rgba(*r, *g, *b, 255);
            let x0 = target.0.max(0) as u32;
            let y0 = target.1.max(0) as u32;
            let x1 = (target.0.saturating_add(CELL_SIZE.x as i32).max(0) as u32).min(image.width() as u32);
            let y1 = (target.1.saturating_add(CELL_SIZE.y as i32).max(0) as u32).min(image.height() as u32);
            for y in y0..y1 {
                for x in x0..x1 {
                    image.set_pixel(x, y, color);
                }
            }
        }
        Self {
            image,
            texture: OnceCell::new(),
        }
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    /// GPU copy, uploaded on first use.
    pub fn texture(&self) -> &Texture2D {
        self.texture.get_or_init(|| Texture2D::from_image(&self.image))
    }
}

/// Read-only view of a level's solid tiles (Solid/Fore, Solid and Water).
#[derive(Clone, Copy)]
pub struct Solids<'a> {
    layers: &'a HashMap<LayerName, Vec<Tile>>,
    index: &'a SolidIndex,
}

impl<'a> Solids<'a> {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn handles(&self) -> &'a [TileHandle] {
        self.index.handles()
    }

    pub fn get(&self, handle: TileHandle) -> Option<&'a Tile> {
        self.layers.get(&handle.layer)?.get(handle.index)
    }

    pub fn iter(self) -> impl Iterator<Item = &'a Tile> + 'a {
        self.index.handles().iter().filter_map(move |h| self.get(*h))
    }

    /// Broad phase: solid tiles whose rectangle overlaps `rect`.
    pub fn colliding(&self, rect: &Rect) -> Vec<&'a Tile> {
        self.index
            .query(rect)
            .into_iter()
            .filter_map(|h| self.get(h))
            .filter(|t| rects_overlap(&t.rect, rect))
            .collect()
    }

    /// Broad then narrow phase against a positioned shape.
    pub fn hits(&self, rect: &Rect, mask: Option<&Mask>) -> bool {
        self.colliding(rect)
            .into_iter()
            .any(|t| collide_mask((rect, mask), (&t.rect, t.mask.as_ref())))
    }
}

/// Member of the combined player-plus-enemies draw collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainSprite {
    Player,
    Enemy(usize),
}

/// What one call to [`Level::check_collisions`] dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionReport {
    pub solid: bool,
    pub enemy: Option<usize>,
}

pub struct Level {
    player: SharedPlayer,
    enemies: Vec<Box<dyn Enemy>>,
    main_sprites: Vec<MainSprite>,
    layers: HashMap<LayerName, Vec<Tile>>,
    solid_index: SolidIndex,
    background: Background,
    map: MapDescription,
}

impl Level {
    /// Build the level stored at `path`, with the roster from `config`.
    pub fn load(player: SharedPlayer, path: &Path, sheets: &Sheets, config: &LevelConfig) -> Result<Self> {
        let enemies: Vec<Box<dyn Enemy>> = config
            .roster
            .iter()
            .map(|spawn| Box::new(Walker::from_spawn(spawn)) as Box<dyn Enemy>)
            .collect();
        let map = decode_map_file(path)?;
        log::info!("Loading level {}", path.display());
        Self::new(player, enemies, map, sheets, config)
    }

    /// Build a level from an already decoded map.
    pub fn new(
        player: SharedPlayer,
        enemies: Vec<Box<dyn Enemy>>,
        mut map: MapDescription,
        sheets: &Sheets,
        config: &LevelConfig,
    ) -> Result<Self> {
        let main_sprites = std::iter::once(MainSprite::Player)
            .chain((0..enemies.len()).map(MainSprite::Enemy))
            .collect();

        let bg = map
            .take_bg_colors()
            .ok_or_else(|| Error::InvalidMap("map has no BG Colors".into()))?;
        let background = Background::compose(&bg, MAP_SIZE);

        let mut layers = HashMap::new();
        for layer in LayerName::DECOR {
            layers.insert(layer, make_tile_group(&map, layer, sheets, config, false)?);
        }
        let mut solid_index = SolidIndex::new();
        for layer in LayerName::COLLIDABLE {
            let group = make_tile_group(&map, layer, sheets, config, true)?;
            for (index, tile) in group.iter().enumerate() {
                solid_index.add_tile(TileHandle { layer, index }, &tile.rect);
            }
            layers.insert(layer, group);
        }

        log::debug!(
            "Level built: {} enemies, {} solid tiles, {} animated tiles",
            enemies.len(),
            solid_index.len(),
            layers.values().flatten().filter(|t| t.is_animated()).count()
        );

        Ok(Self {
            player,
            enemies,
            main_sprites,
            layers,
            solid_index,
            background,
            map,
        })
    }

    /// Animate tiles, move enemies, then resolve collisions.
    pub fn update(&mut self, now: f64, dt: f32) -> CollisionReport {
        for tiles in self.layers.values_mut() {
            for tile in tiles.iter_mut() {
                tile.update(now);
            }
        }
        let solids = Solids {
            layers: &self.layers,
            index: &self.solid_index,
        };
        for enemy in self.enemies.iter_mut() {
            enemy.update(now, dt, &solids);
        }
        self.check_collisions()
    }

    /// Dispatch at most one solid response and one enemy response.
    ///
    /// When several enemies touch the player the first in roster order is
    /// the one notified; nearer enemies get no priority.
    pub fn check_collisions(&mut self) -> CollisionReport {
        let mut report = CollisionReport::default();
        let mut player = self.player.borrow_mut();
        let solids = Solids {
            layers: &self.layers,
            index: &self.solid_index,
        };

        let rect = player.rect();
        if solids.hits(&rect, player.mask()) {
            player.collide_with_solid();
            report.solid = true;
        }

        let rect = player.rect();
        if let Some(i) = self.enemies.iter().position(|e| rects_overlap(&e.rect(), &rect)) {
            self.enemies[i].collide_with_player(&mut *player);
            report.enemy = Some(i);
        }
        report
    }

    /// Paint the level back to front onto `canvas`.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.fill(BLACK, Some(SIDEBAR));
        canvas.background(&self.background);
        for layer in [LayerName::BgTiles, LayerName::Water] {
            self.draw_layer(canvas, layer);
        }

        let player = self.player.borrow();
        let mut sprites: Vec<Drawn<'_>> = self
            .main_sprites
            .iter()
            .map(|s| match *s {
                MainSprite::Player => Drawn::Player(&*player),
                MainSprite::Enemy(i) => Drawn::Enemy(self.enemies[i].as_ref()),
            })
            .collect();
        // stable: equal heights keep roster order
        sprites.sort_by(|a, b| a.y().total_cmp(&b.y()));

        for sprite in &sprites {
            sprite.draw_shadow(canvas);
        }
        self.draw_layer(canvas, LayerName::Solid);
        for sprite in &sprites {
            sprite.draw(canvas);
        }
        for layer in [LayerName::SolidFore, LayerName::Foreground] {
            self.draw_layer(canvas, layer);
        }
    }

    fn draw_layer(&self, canvas: &mut dyn Canvas, layer: LayerName) {
        for tile in self.layer(layer) {
            canvas.blit(&tile.image, tile.rect.point());
        }
    }

    /// Tiles built for `layer`; empty for layers the level does not draw.
    pub fn layer(&self, layer: LayerName) -> &[Tile] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn solids(&self) -> Solids<'_> {
        Solids {
            layers: &self.layers,
            index: &self.solid_index,
        }
    }

    pub fn enemies(&self) -> &[Box<dyn Enemy>] {
        &self.enemies
    }

    pub fn main_sprites(&self) -> &[MainSprite] {
        &self.main_sprites
    }

    pub fn player(&self) -> &SharedPlayer {
        &self.player
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// The map this level was built from, minus its consumed background.
    pub fn map(&self) -> &MapDescription {
        &self.map
    }
}

fn make_tile_group(
    map: &MapDescription,
    layer: LayerName,
    sheets: &Sheets,
    config: &LevelConfig,
    make_mask: bool,
) -> Result<Vec<Tile>> {
    let mut cells: Vec<_> = map.layer(layer).iter().collect();
    // row-major so tile order is stable between runs
    cells.sort_by_key(|(target, _)| (target.1, target.0));

    let mut group = Vec::with_capacity(cells.len());
    for (target, tile) in cells {
        let built = if tile.sheet == config.anim_sheet {
            let frames = config.frames_for(&tile.sheet, tile.source)?;
            Tile::animated(sheets, &tile.sheet, tile.source, *target, frames, make_mask, config.anim_fps)?
        } else {
            Tile::new(sheets, &tile.sheet, tile.source, *target, make_mask)?
        };
        group.push(built);
    }
    Ok(group)
}

enum Drawn<'a> {
    Player(&'a dyn Player),
    Enemy(&'a dyn Enemy),
}

impl Drawn<'_> {
    fn y(&self) -> f32 {
        match self {
            Drawn::Player(p) => p.rect().y,
            Drawn::Enemy(e) => e.rect().y,
        }
    }

    fn draw_shadow(&self, canvas: &mut dyn Canvas) {
        match self {
            Drawn::Player(p) => p.draw_shadow(canvas),
            Drawn::Enemy(e) => e.draw_shadow(canvas),
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        match self {
            Drawn::Player(p) => p.draw(canvas),
            Drawn::Enemy(e) => e.draw(canvas),
        }
    }
}
