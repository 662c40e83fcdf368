use std::{error, fmt, io, path::PathBuf};

use macroquad::prelude::Rect;

use crate::map_data::Coord;
use crate::state::StateId;

/// Errors raised while loading game data or wiring up states.
#[derive(Debug)]
pub enum Error {
    /// Reading or writing a file failed.
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A JSON document could not be decoded.
    Json {
        /// File that was being decoded.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// An image file could not be decoded.
    Image {
        /// File that was being decoded.
        path: PathBuf,
        /// Error reported by the image decoder.
        message: String,
    },
    /// Structurally valid JSON that does not describe a usable map.
    InvalidMap(String),
    /// A tile references a sheet that was never loaded.
    MissingSheet(String),
    /// A requested region lies outside its sheet.
    SheetRegion {
        /// Sheet name.
        sheet: String,
        /// Region that was requested.
        region: Rect,
    },
    /// An animated tile has no entry in the frame-count table.
    UnknownAnimation {
        /// Sheet name.
        sheet: String,
        /// Source coordinate on the sheet.
        source: Coord,
    },
    /// Zero or negative fps/delay, or an empty frame list.
    InvalidTiming(String),
    /// A state named a successor that was never registered.
    UnknownState(StateId),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            Error::Json { path, source } => {
                write!(f, "Failed to parse JSON in {}: {}", path.display(), source)
            }
            Error::Image { path, message } => {
                write!(f, "Failed to decode image {}: {}", path.display(), message)
            }
            Error::InvalidMap(msg) => write!(f, "Invalid map: {}", msg),
            Error::MissingSheet(name) => write!(f, "Sprite sheet '{}' is not loaded", name),
            Error::SheetRegion { sheet, region } => write!(
                f,
                "Region ({}, {}, {}x{}) is outside sheet '{}'",
                region.x, region.y, region.w, region.h, sheet
            ),
            Error::UnknownAnimation { sheet, source } => write!(
                f,
                "No frame count registered for animated tile at ({}, {}) on sheet '{}'",
                source.0, source.1, sheet
            ),
            Error::InvalidTiming(msg) => write!(f, "Invalid timing: {}", msg),
            Error::UnknownState(id) => write!(f, "State {:?} is not registered", id),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}
