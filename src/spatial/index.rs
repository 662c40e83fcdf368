use macroquad::prelude::*;
use std::collections::HashMap;

use crate::map_data::LayerName;

pub const CHUNK_SIZE: i32 = 200;

/// Position of a tile inside a level's layer collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileHandle {
    pub layer: LayerName,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

#[inline]
pub fn world_to_chunk(p: Vec2) -> ChunkCoord {
    ChunkCoord {
        x: (p.x.floor() as i32).div_euclid(CHUNK_SIZE),
        y: (p.y.floor() as i32).div_euclid(CHUNK_SIZE),
    }
}

/// Last whole pixel a span starting at `start` of length `len` covers.
fn last_pixel(start: f32, len: f32) -> i32 {
    ((start + len).ceil() as i32 - 1).max(start.floor() as i32)
}

/// Every chunk `rect` touches. Edges are exclusive so a rect ending exactly
/// on a chunk boundary stays out of the next chunk; any fraction past it
/// reaches in.
pub fn chunks_covering(rect: &Rect) -> impl Iterator<Item = ChunkCoord> {
    let min = world_to_chunk(rect.point());
    let max = ChunkCoord {
        x: last_pixel(rect.x, rect.w).div_euclid(CHUNK_SIZE),
        y: last_pixel(rect.y, rect.h).div_euclid(CHUNK_SIZE),
    };
    (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| ChunkCoord { x, y }))
}

/// Chunk-bucketed lookup of solid tiles.
///
/// Handles keep the order they were added in; queries return them in that
/// order so "first hit" stays deterministic.
#[derive(Debug, Default)]
pub struct SolidIndex {
    handles: Vec<TileHandle>,
    buckets: HashMap<ChunkCoord, Vec<u32>>,
}

impl SolidIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tile(&mut self, handle: TileHandle, rect: &Rect) {
        let id = self.handles.len() as u32;
        self.handles.push(handle);
        for cc in chunks_covering(rect) {
            self.buckets.entry(cc).or_insert_with(Vec::new).push(id);
        }
    }

    /// Every handle, in insertion order.
    pub fn handles(&self) -> &[TileHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handles of tiles in chunks touched by `rect`, in insertion order.
    /// Callers still test the actual rectangles.
    pub fn query(&self, rect: &Rect) -> Vec<TileHandle> {
        let mut ids: Vec<u32> = chunks_covering(rect)
            .filter_map(|cc| self.buckets.get(&cc))
            .flatten()
            .copied()
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter().map(|id| self.handles[id as usize]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(index: usize) -> TileHandle {
        TileHandle {
            layer: LayerName::Solid,
            index,
        }
    }

    #[test]
    fn rect_on_boundary_covers_one_chunk() {
        let chunks: Vec<_> = chunks_covering(&Rect::new(150.0, 0.0, 50.0, 50.0)).collect();
        assert_eq!(chunks, vec![ChunkCoord { x: 0, y: 0 }]);
    }

    #[test]
    fn fractional_edge_reaches_the_next_chunk() {
        let chunks: Vec<_> = chunks_covering(&Rect::new(150.5, 10.0, 50.0, 20.0)).collect();
        assert_eq!(chunks, vec![ChunkCoord { x: 0, y: 0 }, ChunkCoord { x: 1, y: 0 }]);

        let mut index = SolidIndex::new();
        index.add_tile(h(0), &Rect::new(200.0, 0.0, 50.0, 50.0));
        assert_eq!(index.query(&Rect::new(150.5, 10.0, 50.0, 20.0)), vec![h(0)]);
        assert_eq!(index.query(&Rect::new(150.5, 199.25, 20.0, 0.5)), Vec::new());
    }

    #[test]
    fn straddling_rect_covers_four_chunks() {
        let chunks: Vec<_> = chunks_covering(&Rect::new(190.0, 190.0, 20.0, 20.0)).collect();
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn query_returns_nearby_handles_in_insertion_order() {
        let mut index = SolidIndex::new();
        index.add_tile(h(0), &Rect::new(600.0, 600.0, 50.0, 50.0));
        index.add_tile(h(1), &Rect::new(50.0, 0.0, 50.0, 50.0));
        index.add_tile(h(2), &Rect::new(0.0, 0.0, 50.0, 50.0));

        let hits = index.query(&Rect::new(10.0, 10.0, 30.0, 30.0));
        assert_eq!(hits, vec![h(1), h(2)]);
        assert!(index.query(&Rect::new(400.0, 0.0, 10.0, 10.0)).is_empty());
    }

    #[test]
    fn straddling_tile_is_reported_once() {
        let mut index = SolidIndex::new();
        index.add_tile(h(0), &Rect::new(180.0, 0.0, 50.0, 50.0));
        let hits = index.query(&Rect::new(150.0, 0.0, 100.0, 20.0));
        assert_eq!(hits, vec![h(0)]);
    }
}
