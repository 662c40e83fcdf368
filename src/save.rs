//! Three-slot save file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

pub const SLOT_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub name: String,
    /// Map file the player is on.
    pub map: String,
    /// Last saved position, `[x, y]`.
    #[serde(default = "default_position")]
    pub position: [f32; 2],
}

fn default_position() -> [f32; 2] {
    [450.0, 400.0]
}

impl PlayerData {
    pub fn new(name: impl Into<String>, map: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            map: map.into(),
            position: default_position(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "slot", content = "player")]
pub enum Slot {
    #[default]
    Empty,
    Player(PlayerData),
}

impl Slot {
    pub fn player(&self) -> Option<&PlayerData> {
        match self {
            Slot::Empty => None,
            Slot::Player(p) => Some(p),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SaveSlots {
    pub slots: [Slot; SLOT_COUNT],
}

impl SaveSlots {
    /// Read the save file. A file that does not exist yet means no players.
    pub fn load(path: &Path) -> Result<Self> {
        let txt = match std::fs::read_to_string(path) {
            Ok(txt) => txt,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No save file at {}, all slots empty", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&txt).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let txt = serde_json::to_string_pretty(self).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, txt).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved players to {}", path.display());
        Ok(())
    }

    pub fn get(&self, slot: usize) -> Option<&Slot> {
        self.slots.get(slot)
    }

    /// Read-modify-write of one slot.
    pub fn store(path: &Path, slot: usize, player: PlayerData) -> Result<Self> {
        let mut saves = Self::load(path)?;
        if let Some(s) = saves.slots.get_mut(slot) {
            *s = Slot::Player(player);
        }
        saves.save(path)?;
        Ok(saves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock went backwards")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("tile_quest_save_{nanos}"));
        std::fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir.join(name)
    }

    #[test]
    fn missing_file_means_all_empty() {
        let saves = SaveSlots::load(&temp_file("absent.json")).unwrap();
        assert!(saves.slots.iter().all(|s| *s == Slot::Empty));
    }

    #[test]
    fn store_fills_only_the_chosen_slot() {
        let path = temp_file("save.json");
        SaveSlots::store(&path, 1, PlayerData::new("MIRA", "pond.json")).unwrap();
        let saves = SaveSlots::load(&path).unwrap();
        assert_eq!(saves.slots[0], Slot::Empty);
        assert_eq!(saves.slots[1].player().map(|p| p.name.as_str()), Some("MIRA"));
        assert_eq!(saves.slots[2], Slot::Empty);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = temp_file("bad.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(SaveSlots::load(&path), Err(Error::Json { .. })));
    }
}
