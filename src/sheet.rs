//! Sprite sheets held on the CPU and the helpers that slice them.

use macroquad::prelude::*;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::map_data::Coord;
use crate::mask::Mask;

/// A region of a named sheet. Cheap to clone; drawing resolves the sheet
/// name to a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRef {
    pub sheet: String,
    pub source: Rect,
}

/// Named sheet images.
#[derive(Default)]
pub struct Sheets {
    images: HashMap<String, Image>,
}

impl Sheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, image: Image) {
        self.images.insert(name.into(), image);
    }

    pub fn get(&self, name: &str) -> Result<&Image> {
        self.images
            .get(name)
            .ok_or_else(|| Error::MissingSheet(name.to_owned()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }

    /// Checked reference to `region` of `sheet`.
    pub fn sprite(&self, sheet: &str, region: Rect) -> Result<SpriteRef> {
        let image = self.get(sheet)?;
        check_region(sheet, image, region)?;
        Ok(SpriteRef {
            sheet: sheet.to_owned(),
            source: region,
        })
    }

    /// Collision mask of `region` of `sheet`.
    pub fn mask(&self, sheet: &str, region: Rect) -> Result<Mask> {
        let image = self.get(sheet)?;
        check_region(sheet, image, region)?;
        Ok(Mask::from_image(&image.sub_image(region)))
    }

    pub fn into_images(self) -> HashMap<String, Image> {
        self.images
    }
}

impl From<HashMap<String, Image>> for Sheets {
    fn from(images: HashMap<String, Image>) -> Self {
        Self { images }
    }
}

fn check_region(sheet: &str, image: &Image, region: Rect) -> Result<()> {
    let inside = region.x >= 0.0
        && region.y >= 0.0
        && region.w > 0.0
        && region.h > 0.0
        && region.x + region.w <= image.width() as f32
        && region.y + region.h <= image.height() as f32;
    if inside {
        Ok(())
    } else {
        Err(Error::SheetRegion {
            sheet: sheet.to_owned(),
            region,
        })
    }
}

/// Frames laid out in a grid starting at `start`, row-major.
pub fn strip_from_sheet(
    sheets: &Sheets,
    sheet: &str,
    start: Coord,
    size: Vec2,
    columns: usize,
    rows: usize,
) -> Result<Vec<SpriteRef>> {
    let mut frames = Vec::with_capacity(columns * rows);
    for j in 0..rows {
        for i in 0..columns {
            let location = start.to_vec2() + vec2(size.x * i as f32, size.y * j as f32);
            frames.push(sheets.sprite(sheet, Rect::new(location.x, location.y, size.x, size.y))?);
        }
    }
    Ok(frames)
}

/// Frames at specific cell coordinates (in cells, not pixels).
pub fn strip_coords_from_sheet(
    sheets: &Sheets,
    sheet: &str,
    coords: &[Coord],
    size: Vec2,
) -> Result<Vec<SpriteRef>> {
    coords
        .iter()
        .map(|c| {
            let location = vec2(c.0 as f32 * size.x, c.1 as f32 * size.y);
            sheets.sprite(sheet, Rect::new(location.x, location.y, size.x, size.y))
        })
        .collect()
}

/// Top-left, relative to `rect`, of the `size` cell that `point` falls in.
pub fn get_cell_coordinates(rect: &Rect, point: Vec2, size: Vec2) -> Coord {
    let local = point - rect.point();
    Coord(
        ((local.x / size.x).floor() * size.x) as i32,
        ((local.y / size.y).floor() * size.y) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheets() -> Sheets {
        let mut s = Sheets::new();
        s.insert("anim", Image::gen_image_color(100, 50, WHITE));
        s
    }

    #[test]
    fn strips_a_row_of_frames() {
        let frames = strip_from_sheet(&sheets(), "anim", Coord(0, 0), vec2(50.0, 50.0), 2, 1).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].source, Rect::new(50.0, 0.0, 50.0, 50.0));
    }

    #[test]
    fn strip_past_the_edge_fails() {
        let err = strip_from_sheet(&sheets(), "anim", Coord(50, 0), vec2(50.0, 50.0), 2, 1)
            .expect_err("third column does not exist");
        assert!(matches!(err, Error::SheetRegion { .. }));
    }

    #[test]
    fn coords_are_in_cells() {
        let frames =
            strip_coords_from_sheet(&sheets(), "anim", &[Coord(1, 0), Coord(0, 0)], vec2(50.0, 50.0))
                .unwrap();
        assert_eq!(frames[0].source.x, 50.0);
        assert_eq!(frames[1].source.x, 0.0);
    }

    #[test]
    fn unknown_sheet_is_reported() {
        assert!(matches!(
            sheets().sprite("nope", Rect::new(0.0, 0.0, 1.0, 1.0)),
            Err(Error::MissingSheet(_))
        ));
    }

    #[test]
    fn cell_under_point() {
        let panel = Rect::new(1000.0, 100.0, 200.0, 400.0);
        let cell = get_cell_coordinates(&panel, vec2(1073.0, 149.0), vec2(50.0, 50.0));
        assert_eq!(cell, Coord(50, 0));
    }
}
