use macroquad::prelude::*;

use crate::anim::Anim;
use crate::config::CELL_SIZE;
use crate::error::Result;
use crate::map_data::Coord;
use crate::mask::Mask;
use crate::sheet::{strip_from_sheet, Sheets, SpriteRef};

/// Default playback rate of animated tiles.
pub const ANIMATED_TILE_FPS: f32 = 4.0;

/// One map cell. Animated cells carry an [`Anim`] that swaps `image` on
/// every [`Tile::update`].
#[derive(Debug, Clone)]
pub struct Tile {
    pub rect: Rect,
    pub image: SpriteRef,
    pub mask: Option<Mask>,
    anim: Option<Anim<SpriteRef>>,
}

impl Tile {
    /// Static tile showing the cell at `source` of `sheet`, placed at
    /// `target`. Pass `make_mask` for anything the player can collide with.
    pub fn new(sheets: &Sheets, sheet: &str, source: Coord, target: Coord, make_mask: bool) -> Result<Self> {
        let region = cell_rect(source);
        let image = sheets.sprite(sheet, region)?;
        let mask = if make_mask {
            Some(sheets.mask(sheet, region)?)
        } else {
            None
        };
        Ok(Self {
            rect: cell_rect(target),
            image,
            mask,
            anim: None,
        })
    }

    /// Tile cycling through `frames` consecutive cells starting at `source`.
    pub fn animated(
        sheets: &Sheets,
        sheet: &str,
        source: Coord,
        target: Coord,
        frames: usize,
        make_mask: bool,
        fps: f32,
    ) -> Result<Self> {
        let mut tile = Self::new(sheets, sheet, source, target, make_mask)?;
        let frames = strip_from_sheet(sheets, sheet, source, CELL_SIZE, frames, 1)?;
        tile.anim = Some(Anim::new(frames, fps)?);
        Ok(tile)
    }

    pub fn is_animated(&self) -> bool {
        self.anim.is_some()
    }

    /// Advance the animation, if any, and show its current frame.
    pub fn update(&mut self, now: f64) {
        if let Some(anim) = self.anim.as_mut() {
            let frame = anim.advance(now);
            if *frame != self.image {
                self.image = frame.clone();
            }
        }
    }

    pub fn anim(&self) -> Option<&Anim<SpriteRef>> {
        self.anim.as_ref()
    }
}

/// One cell-sized rectangle at `at`.
pub fn cell_rect(at: Coord) -> Rect {
    Rect::new(at.0 as f32, at.1 as f32, CELL_SIZE.x, CELL_SIZE.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn sheets() -> Sheets {
        let mut s = Sheets::new();
        let mut anim = Image::gen_image_color(100, 50, Color::from_rgba(0, 0, 0, 0));
        for y in 0..50 {
            for x in 0..25 {
                anim.set_pixel(x, y, BLUE);
            }
        }
        s.insert("animsheet", anim);
        s.insert("base", Image::gen_image_color(200, 200, WHITE));
        s
    }

    #[test]
    fn static_tile_has_no_mask_unless_asked() {
        let s = sheets();
        let plain = Tile::new(&s, "base", Coord(50, 50), Coord(100, 0), false).unwrap();
        assert!(plain.mask.is_none());
        assert_eq!(plain.rect, Rect::new(100.0, 0.0, 50.0, 50.0));
        assert_eq!(plain.image.source, Rect::new(50.0, 50.0, 50.0, 50.0));

        let solid = Tile::new(&s, "base", Coord(0, 0), Coord(0, 0), true).unwrap();
        assert_eq!(solid.mask.as_ref().map(Mask::count), Some(2500));
    }

    #[test]
    fn mask_follows_transparency() {
        let tile = Tile::new(&sheets(), "animsheet", Coord(0, 0), Coord(0, 0), true).unwrap();
        assert_eq!(tile.mask.as_ref().map(Mask::count), Some(25 * 50));
    }

    #[test]
    fn animated_tile_swaps_frames_over_time() {
        let mut tile =
            Tile::animated(&sheets(), "animsheet", Coord(0, 0), Coord(0, 0), 2, false, ANIMATED_TILE_FPS).unwrap();
        tile.update(0.0);
        assert_eq!(tile.image.source.x, 0.0);
        tile.update(250.0);
        assert_eq!(tile.image.source.x, 50.0);
        tile.update(500.0);
        assert_eq!(tile.image.source.x, 0.0);
    }

    #[test]
    fn static_tile_ignores_update() {
        let mut tile = Tile::new(&sheets(), "base", Coord(0, 0), Coord(0, 0), false).unwrap();
        let before = tile.image.clone();
        tile.update(10_000.0);
        assert_eq!(tile.image, before);
    }

    #[test]
    fn source_outside_sheet_fails() {
        let err = Tile::new(&sheets(), "base", Coord(200, 0), Coord(0, 0), false).unwrap_err();
        assert!(matches!(err, Error::SheetRegion { .. }));
    }
}
