//! Fixed screen geometry plus the user-tunable settings file.

use macroquad::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Logical window resolution (map area plus sidebar).
pub const SCREEN_SIZE: Vec2 = Vec2::new(1200.0, 700.0);
/// Size of the composited map background.
pub const MAP_SIZE: Vec2 = Vec2::new(1000.0, 700.0);
/// One map cell in pixels.
pub const CELL_SIZE: Vec2 = Vec2::new(50.0, 50.0);
/// Region to the right of the map reserved for the sidebar.
pub const SIDEBAR: Rect = Rect {
    x: 1000.0,
    y: 0.0,
    w: 200.0,
    h: 700.0,
};
/// Transparent color for images without an alpha channel.
pub const COLORKEY: [u8; 3] = [255, 0, 255];
/// Fill color used by menu screens.
pub const BACKGROUND_COLOR: Color = Color::new(5.0 / 255.0, 5.0 / 255.0, 15.0 / 255.0, 1.0);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Runtime settings read from `settings.json`.
pub struct Settings {
    /// Window caption.
    pub caption: String,
    /// Target update rate.
    pub fps: f32,
    /// Whether the fps readout starts visible.
    pub show_fps: bool,
    /// Root of `graphics/`, `fonts/`, `music/` and `map_data/`.
    pub resource_dir: PathBuf,
    /// Save-slot file.
    pub save_path: PathBuf,
    /// Map given to newly registered players.
    pub start_map: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            caption: "Tile Quest".to_owned(),
            fps: 60.0,
            show_fps: true,
            resource_dir: PathBuf::from("resources"),
            save_path: PathBuf::from("save_data.json"),
            start_map: "pond.json".to_owned(),
        }
    }
}

impl Settings {
    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let txt = match std::fs::read_to_string(path) {
            Ok(txt) => txt,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let settings: Settings = serde_json::from_str(&txt).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if settings.fps <= 0.0 {
            return Err(Error::InvalidTiming(format!(
                "target fps must be positive, got {}",
                settings.fps
            )));
        }
        Ok(settings)
    }

    /// Directory holding map JSON files.
    pub fn map_dir(&self) -> PathBuf {
        self.resource_dir.join("map_data")
    }

    /// Full path of a named map.
    pub fn map_path(&self, name: &str) -> PathBuf {
        self.map_dir().join(name)
    }
}
