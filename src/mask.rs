//! Per-pixel collision masks and the rectangle tests that precede them.

use macroquad::prelude::*;

/// Alpha at or below this is treated as empty space.
pub const ALPHA_THRESHOLD: u8 = 127;

/// Bitmap of the solid pixels of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Mask {
    /// Every pixel solid.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width * height],
        }
    }

    /// No pixel solid.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Pixels whose alpha exceeds [`ALPHA_THRESHOLD`].
    pub fn from_image(image: &Image) -> Self {
        let bits = image
            .get_image_data()
            .iter()
            .map(|px| px[3] > ALPHA_THRESHOLD)
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            bits,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, solid: bool) {
        if x < self.width && y < self.height {
            self.bits[y * self.width + x] = solid;
        }
    }

    /// Number of solid pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Whether `other`, placed `offset` pixels from this mask's top-left,
    /// shares at least one solid pixel with it.
    pub fn overlaps(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (dx, dy) = offset;
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (self.width as i32).min(dx + other.width as i32);
        let y1 = (self.height as i32).min(dy + other.height as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x as usize, y as usize)
                    && other.get((x - dx) as usize, (y - dy) as usize)
                {
                    return true;
                }
            }
        }
        false
    }
}

/// Strict rectangle overlap: shared edges do not count.
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && b.x < a.x + a.w && a.y < b.y + b.h && b.y < a.y + a.h
}

/// Narrow-phase test between two positioned shapes. A missing mask counts
/// as a fully solid rectangle.
pub fn collide_mask(a: (&Rect, Option<&Mask>), b: (&Rect, Option<&Mask>)) -> bool {
    let (ra, ma) = a;
    let (rb, mb) = b;
    let full_a;
    let ma = match ma {
        Some(m) => m,
        None => {
            full_a = Mask::full(ra.w as usize, ra.h as usize);
            &full_a
        }
    };
    let full_b;
    let mb = match mb {
        Some(m) => m,
        None => {
            full_b = Mask::full(rb.w as usize, rb.h as usize);
            &full_b
        }
    };
    let offset = ((rb.x - ra.x).floor() as i32, (rb.y - ra.y).floor() as i32);
    ma.overlaps(mb, offset)
}
