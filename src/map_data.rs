// Canonical, format-agnostic map description.
use macroquad::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Grid-aligned pixel coordinate, written `[x, y]` in map files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord(pub i32, pub i32);

impl Coord {
    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        vec2(self.0 as f32, self.1 as f32)
    }

    /// Coordinate of the top-left corner of `rect`.
    #[inline]
    pub fn of_rect(rect: &Rect) -> Self {
        Coord(rect.x as i32, rect.y as i32)
    }
}

/// The fixed set of map layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerName {
    BgColors,
    BgTiles,
    Water,
    Solid,
    SolidFore,
    Foreground,
    Environment,
    Enemies,
    Items,
}

impl LayerName {
    /// Every layer in editor order.
    pub const ALL: [LayerName; 9] = [
        LayerName::BgColors,
        LayerName::BgTiles,
        LayerName::Water,
        LayerName::Solid,
        LayerName::SolidFore,
        LayerName::Foreground,
        LayerName::Environment,
        LayerName::Enemies,
        LayerName::Items,
    ];

    /// Every layer that holds tile references (all but `BG Colors`).
    pub const TILE_LAYERS: [LayerName; 8] = [
        LayerName::BgTiles,
        LayerName::Water,
        LayerName::Solid,
        LayerName::SolidFore,
        LayerName::Foreground,
        LayerName::Environment,
        LayerName::Enemies,
        LayerName::Items,
    ];

    /// Layers the player can run into.
    pub const COLLIDABLE: [LayerName; 3] = [LayerName::SolidFore, LayerName::Solid, LayerName::Water];

    /// Layers drawn but never collided with.
    pub const DECOR: [LayerName; 2] = [LayerName::Foreground, LayerName::BgTiles];

    /// Key used in map files.
    pub fn as_str(self) -> &'static str {
        match self {
            LayerName::BgColors => "BG Colors",
            LayerName::BgTiles => "BG Tiles",
            LayerName::Water => "Water",
            LayerName::Solid => "Solid",
            LayerName::SolidFore => "Solid/Fore",
            LayerName::Foreground => "Foreground",
            LayerName::Environment => "Environment",
            LayerName::Enemies => "Enemies",
            LayerName::Items => "Items",
        }
    }

    pub fn from_key(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == name)
    }

    pub fn is_collidable(self) -> bool {
        Self::COLLIDABLE.contains(&self)
    }
}

/// Where a cell's image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileRef {
    pub sheet: String,
    pub source: Coord,
}

/// Solid colors painted into the background once at level load.
#[derive(Debug, Clone, PartialEq)]
pub struct BgColors {
    pub fill: [u8; 3],
    pub cells: HashMap<Coord, [u8; 3]>,
}

impl Default for BgColors {
    fn default() -> Self {
        Self {
            fill: [0, 0, 0],
            cells: HashMap::new(),
        }
    }
}

/// One map: background colors plus per-layer cell contents. Every tile
/// layer is always present, possibly empty.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDescription {
    /// `None` once consumed into a composited background.
    pub bg_colors: Option<BgColors>,
    layers: HashMap<LayerName, HashMap<Coord, TileRef>>,
}

impl MapDescription {
    /// All layers empty, black fill.
    pub fn blank() -> Self {
        let layers = LayerName::TILE_LAYERS
            .into_iter()
            .map(|l| (l, HashMap::new()))
            .collect();
        Self {
            bg_colors: Some(BgColors::default()),
            layers,
        }
    }

    /// Contents of a tile layer. `BG Colors` has no tiles and reads empty.
    pub fn layer(&self, layer: LayerName) -> &HashMap<Coord, TileRef> {
        static EMPTY: std::sync::OnceLock<HashMap<Coord, TileRef>> = std::sync::OnceLock::new();
        self.layers
            .get(&layer)
            .unwrap_or_else(|| EMPTY.get_or_init(HashMap::new))
    }

    pub fn set_tile(&mut self, layer: LayerName, target: Coord, tile: TileRef) {
        if layer != LayerName::BgColors {
            self.layers.entry(layer).or_default().insert(target, tile);
        }
    }

    pub fn clear_tile(&mut self, layer: LayerName, target: Coord) -> Option<TileRef> {
        self.layers.get_mut(&layer).and_then(|l| l.remove(&target))
    }

    /// Remove and return the background colors.
    pub fn take_bg_colors(&mut self) -> Option<BgColors> {
        self.bg_colors.take()
    }

    /// Number of tiles across all tile layers.
    pub fn tile_count(&self) -> usize {
        self.layers.values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_map_has_every_tile_layer() {
        let map = MapDescription::blank();
        for l in LayerName::TILE_LAYERS {
            assert!(map.layer(l).is_empty());
        }
        assert_eq!(map.bg_colors.as_ref().map(|b| b.fill), Some([0, 0, 0]));
    }

    #[test]
    fn layer_names_round_trip_through_keys() {
        for l in LayerName::ALL {
            assert_eq!(LayerName::from_key(l.as_str()), Some(l));
        }
        assert_eq!(LayerName::from_key("Lava"), None);
    }

    #[test]
    fn bg_colors_layer_rejects_tiles() {
        let mut map = MapDescription::blank();
        let tile = TileRef {
            sheet: "base".into(),
            source: Coord(0, 0),
        };
        map.set_tile(LayerName::BgColors, Coord(0, 0), tile.clone());
        map.set_tile(LayerName::Solid, Coord(50, 0), tile);
        assert_eq!(map.tile_count(), 1);
        assert!(map.clear_tile(LayerName::Solid, Coord(50, 0)).is_some());
        assert_eq!(map.tile_count(), 0);
    }
}
