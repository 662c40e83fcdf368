//! Tile-based 2D game core for Macroquad.
//!
//! Maps are JSON documents of named layers. A [`Level`] turns one into
//! tiles, solid lookups and a composited background, moves enemies and
//! resolves their collisions with the shared player. Screens are
//! [`State`]s driven by a [`StateMachine`], which [`Control`] runs at a
//! fixed update rate.

pub mod anim;
pub mod assets;
pub mod canvas;
pub mod config;
pub mod control;
pub mod enemy;
pub mod entity;
mod error;
pub mod input;
pub mod level;
pub mod loader {
    pub mod json_loader;
}
pub mod map_data;
pub mod mask;
pub mod player;
pub mod save;
pub mod sheet;
pub mod spatial;
pub mod state;
pub mod states;
pub mod tile;
pub mod timer;

pub use anim::{Anim, Epoch};
pub use canvas::{Canvas, DrawOp, Recorder, Screen};
pub use config::Settings;
pub use control::{Control, FrameClock};
pub use entity::{Actor, Enemy, Player};
pub use error::{Error, Result};
pub use level::{CollisionReport, Level, LevelConfig, MainSprite, SharedPlayer, Solids};
pub use map_data::{Coord, LayerName, MapDescription, TileRef};
pub use sheet::{Sheets, SpriteRef};
pub use state::{Persist, State, StateCore, StateId, StateMachine};
pub use tile::Tile;
pub use timer::Timer;
