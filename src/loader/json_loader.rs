// src/loader/json_loader.rs
use crate::config::MAP_SIZE;
use crate::error::{Error, Result};
use crate::map_data::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Deserialize, Serialize, Default)]
struct JsonMap {
    #[serde(rename = "BG Colors")]
    bg_colors: JsonBgColors,
    #[serde(rename = "BG Tiles", default)]
    bg_tiles: Vec<JsonTile>,
    #[serde(rename = "Water", default)]
    water: Vec<JsonTile>,
    #[serde(rename = "Solid", default)]
    solid: Vec<JsonTile>,
    #[serde(rename = "Solid/Fore", default)]
    solid_fore: Vec<JsonTile>,
    #[serde(rename = "Foreground", default)]
    foreground: Vec<JsonTile>,
    #[serde(rename = "Environment", default)]
    environment: Vec<JsonTile>,
    #[serde(rename = "Enemies", default)]
    enemies: Vec<JsonTile>,
    #[serde(rename = "Items", default)]
    items: Vec<JsonTile>,
}

#[derive(Deserialize, Serialize, Default)]
struct JsonBgColors {
    fill: [u8; 3],
    #[serde(default)]
    cells: Vec<JsonColorCell>,
}

#[derive(Deserialize, Serialize)]
struct JsonColorCell {
    target: Coord,
    color: [u8; 3],
}

#[derive(Deserialize, Serialize)]
struct JsonTile {
    target: Coord,
    sheet: String,
    source: Coord,
}

impl JsonMap {
    fn layer(&self, layer: LayerName) -> &[JsonTile] {
        match layer {
            LayerName::BgColors => &[],
            LayerName::BgTiles => &self.bg_tiles,
            LayerName::Water => &self.water,
            LayerName::Solid => &self.solid,
            LayerName::SolidFore => &self.solid_fore,
            LayerName::Foreground => &self.foreground,
            LayerName::Environment => &self.environment,
            LayerName::Enemies => &self.enemies,
            LayerName::Items => &self.items,
        }
    }

    fn layer_mut(&mut self, layer: LayerName) -> Option<&mut Vec<JsonTile>> {
        Some(match layer {
            LayerName::BgColors => return None,
            LayerName::BgTiles => &mut self.bg_tiles,
            LayerName::Water => &mut self.water,
            LayerName::Solid => &mut self.solid,
            LayerName::SolidFore => &mut self.solid_fore,
            LayerName::Foreground => &mut self.foreground,
            LayerName::Environment => &mut self.environment,
            LayerName::Enemies => &mut self.enemies,
            LayerName::Items => &mut self.items,
        })
    }
}

fn check_target(layer: LayerName, target: Coord) -> Result<()> {
    if target.0 < 0 || target.1 < 0 {
        return Err(Error::InvalidMap(format!(
            "layer '{}' has a cell at negative position ({}, {})",
            layer.as_str(),
            target.0,
            target.1
        )));
    }
    if target.0 as f32 >= MAP_SIZE.x || target.1 as f32 >= MAP_SIZE.y {
        return Err(Error::InvalidMap(format!(
            "layer '{}' has a cell outside the {}x{} map at ({}, {})",
            layer.as_str(),
            MAP_SIZE.x,
            MAP_SIZE.y,
            target.0,
            target.1
        )));
    }
    Ok(())
}

fn json_to_ir(j: JsonMap) -> Result<MapDescription> {
    let mut map = MapDescription::blank();

    let mut cells = HashMap::with_capacity(j.bg_colors.cells.len());
    for cell in &j.bg_colors.cells {
        check_target(LayerName::BgColors, cell.target)?;
        cells.insert(cell.target, cell.color);
    }
    map.bg_colors = Some(BgColors {
        fill: j.bg_colors.fill,
        cells,
    });

    for layer in LayerName::TILE_LAYERS {
        for t in j.layer(layer) {
            check_target(layer, t.target)?;
            if t.sheet.is_empty() {
                return Err(Error::InvalidMap(format!(
                    "layer '{}' has a tile with no sheet at ({}, {})",
                    layer.as_str(),
                    t.target.0,
                    t.target.1
                )));
            }
            // later entries for the same cell win
            map.set_tile(
                layer,
                t.target,
                TileRef {
                    sheet: t.sheet.clone(),
                    source: t.source,
                },
            );
        }
    }
    Ok(map)
}

fn ir_to_json(map: &MapDescription) -> JsonMap {
    let mut j = JsonMap::default();
    if let Some(bg) = &map.bg_colors {
        j.bg_colors.fill = bg.fill;
        let mut cells: Vec<_> = bg
            .cells
            .iter()
            .map(|(target, color)| JsonColorCell {
                target: *target,
                color: *color,
            })
            .collect();
        cells.sort_by_key(|c| c.target);
        j.bg_colors.cells = cells;
    }
    for layer in LayerName::TILE_LAYERS {
        if let Some(out) = j.layer_mut(layer) {
            out.extend(map.layer(layer).iter().map(|(target, tile)| JsonTile {
                target: *target,
                sheet: tile.sheet.clone(),
                source: tile.source,
            }));
            out.sort_by_key(|t| t.target);
        }
    }
    j
}

/// Decode a map from JSON text.
pub fn decode_map_str(txt: &str, path: &Path) -> Result<MapDescription> {
    let j: JsonMap = serde_json::from_str(txt).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    json_to_ir(j)
}

/// Read and decode a map file. Only `.json` files are accepted.
pub fn decode_map_file(path: &Path) -> Result<MapDescription> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(Error::InvalidMap(format!(
            "Map file must be a JSON file: {}",
            path.display()
        )));
    }
    let txt = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_map_str(&txt, path)
}

/// Encode a map as pretty JSON with cells sorted by position.
pub fn encode_map(map: &MapDescription) -> Result<String> {
    encode_for(map, Path::new("<memory>"))
}

fn encode_for(map: &MapDescription, path: &Path) -> Result<String> {
    serde_json::to_string_pretty(&ir_to_json(map)).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a map file, creating parent directories as needed.
pub fn save_map_file(map: &MapDescription, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let txt = encode_for(map, path)?;
    std::fs::write(path, txt).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock went backwards")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("tile_quest_maps_{nanos}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    const POND: &str = r#"{
      "BG Colors": {
        "fill": [10, 20, 30],
        "cells": [ { "target": [50, 0], "color": [200, 0, 0] } ]
      },
      "BG Tiles": [ { "target": [0, 0], "sheet": "base", "source": [100, 50] } ],
      "Water": [
        { "target": [100, 100], "sheet": "animsheet", "source": [0, 0] },
        { "target": [150, 100], "sheet": "animsheet", "source": [0, 0] }
      ],
      "Solid": [ { "target": [200, 200], "sheet": "base", "source": [0, 0] } ]
    }"#;

    #[test]
    fn decodes_layers_and_background_colors() {
        let map = decode_map_str(POND, Path::new("pond.json")).expect("decode");
        let bg = map.bg_colors.as_ref().expect("bg colors");
        assert_eq!(bg.fill, [10, 20, 30]);
        assert_eq!(bg.cells.get(&Coord(50, 0)), Some(&[200, 0, 0]));

        assert_eq!(map.layer(LayerName::Water).len(), 2);
        assert_eq!(
            map.layer(LayerName::BgTiles).get(&Coord(0, 0)),
            Some(&TileRef {
                sheet: "base".into(),
                source: Coord(100, 50)
            })
        );
        // layers absent from the file exist and are empty
        assert!(map.layer(LayerName::Foreground).is_empty());
        assert!(map.layer(LayerName::SolidFore).is_empty());
    }

    #[test]
    fn missing_fill_is_an_error() {
        let err = decode_map_str(r#"{ "BG Colors": { "cells": [] } }"#, Path::new("x.json"))
            .expect_err("fill is required");
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn negative_targets_are_rejected() {
        let txt = r#"{
          "BG Colors": { "fill": [0,0,0] },
          "Solid": [ { "target": [-50, 0], "sheet": "base", "source": [0, 0] } ]
        }"#;
        let err = decode_map_str(txt, Path::new("x.json")).expect_err("negative target");
        assert!(matches!(err, Error::InvalidMap(_)));
    }

    #[test]
    fn targets_past_the_map_edge_are_rejected() {
        let txt = r#"{
          "BG Colors": { "fill": [0,0,0], "cells": [ { "target": [2147483647, 0], "color": [1,2,3] } ] }
        }"#;
        let err = decode_map_str(txt, Path::new("x.json")).expect_err("huge target");
        assert!(matches!(err, Error::InvalidMap(msg) if msg.contains("outside")));

        let txt = r#"{
          "BG Colors": { "fill": [0,0,0] },
          "Solid": [ { "target": [950, 700], "sheet": "base", "source": [0, 0] } ]
        }"#;
        assert!(decode_map_str(txt, Path::new("x.json")).is_err());

        let txt = r#"{
          "BG Colors": { "fill": [0,0,0] },
          "Solid": [ { "target": [950, 650], "sheet": "base", "source": [0, 0] } ]
        }"#;
        assert!(decode_map_str(txt, Path::new("x.json")).is_ok());
    }

    #[test]
    fn saving_writes_the_encoded_map() {
        let map = decode_map_str(POND, Path::new("pond.json")).expect("decode");
        let path = temp_dir().join("pond.json");
        save_map_file(&map, &path).expect("save");
        let written = fs::read_to_string(&path).expect("read back");
        assert!(!written.is_empty());
        assert_eq!(written, encode_map(&map).expect("encode"));
    }

    #[test]
    fn non_json_extension_is_rejected() {
        let err = decode_map_file(Path::new("pond.yaml")).expect_err("wrong extension");
        assert!(matches!(err, Error::InvalidMap(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = decode_map_file(&temp_dir().join("nope.json")).expect_err("missing");
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn saved_map_loads_back_identically() {
        let map = decode_map_str(POND, Path::new("pond.json")).expect("decode");
        let path = temp_dir().join("map_data").join("pond.json");
        save_map_file(&map, &path).expect("save");
        let again = decode_map_file(&path).expect("reload");
        assert_eq!(map, again);
    }
}
