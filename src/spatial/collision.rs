use crate::object::{GameObject, ObjectId, ObjectLayer};
use macroquad::math::Rect;

/// Tile layer whose non-zero cells block movement.
#[derive(Debug, Clone)]
pub struct CollisionLayer {
    /// Width in tiles
    pub width: usize,
    /// Height in tiles
    pub height: usize,
    /// Tile width in pixels
    pub tile_w: u32,
    /// Tile height in pixels
    pub tile_h: u32,
    data: Vec<u32>,
}

/// Inclusive cell range `(x0, y0, x1, y1)`.
pub type CellRange = (usize, usize, usize, usize);

impl CollisionLayer {
    /// Wrap raw row-major cell data. Short data is padded with open cells,
    /// extra data is ignored.
    pub fn new(width: usize, height: usize, tile_w: u32, tile_h: u32, mut data: Vec<u32>) -> Self {
        data.resize(width * height, 0);
        Self {
            width,
            height,
            tile_w: tile_w.max(1),
            tile_h: tile_h.max(1),
            data,
        }
    }

    /// All-open layer.
    pub fn empty(width: usize, height: usize, tile_w: u32, tile_h: u32) -> Self {
        Self::new(width, height, tile_w, tile_h, Vec::new())
    }

    /// Cell value, `0` outside the layer.
    pub fn cell(&self, x: usize, y: usize) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y * self.width + x]
    }

    /// Overwrite one cell; out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: u32) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Cells spanned by `rect`, clamped to the layer. `None` when the clamped
    /// range is empty or the rectangle has no area.
    ///
    /// The right and bottom edges are exclusive, so a rectangle ending exactly
    /// on a tile boundary does not claim the next tile.
    pub fn cell_range(&self, rect: Rect) -> Option<CellRange> {
        if !(rect.w > 0.0 && rect.h > 0.0) || !rect.x.is_finite() || !rect.y.is_finite() {
            return None;
        }
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let tw = self.tile_w as i64;
        let th = self.tile_h as i64;

        let x0 = (rect.x.floor() as i64).div_euclid(tw).max(0);
        let y0 = (rect.y.floor() as i64).div_euclid(th).max(0);
        let x1 = ((rect.x + rect.w - 1.0).floor() as i64)
            .div_euclid(tw)
            .min(self.width as i64 - 1);
        let y1 = ((rect.y + rect.h - 1.0).floor() as i64)
            .div_euclid(th)
            .min(self.height as i64 - 1);

        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}

/// True when any non-zero cell of `layer` lies under `rect`.
///
/// A missing layer never blocks, and neither does anything outside the
/// layer's grid: map edges are open unless walled with collision tiles.
pub fn blocked(layer: Option<&CollisionLayer>, rect: Rect) -> bool {
    let Some(layer) = layer else {
        return false;
    };
    let Some((x0, y0, x1, y1)) = layer.cell_range(rect) else {
        return false;
    };
    (y0..=y1).any(|ty| (x0..=x1).any(|tx| layer.data[ty * layer.width + tx] != 0))
}

/// Strict AABB overlap: touching edges and zero-area rectangles never overlap.
#[inline]
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.w > 0.0
        && a.h > 0.0
        && b.w > 0.0
        && b.h > 0.0
        && a.x < b.x + b.w
        && a.x + a.w > b.x
        && a.y < b.y + b.h
        && a.y + a.h > b.y
}

/// First visible object in layer order overlapping `rect`, skipping `exclude`.
pub fn first_overlap(
    layer: Option<&ObjectLayer>,
    rect: Rect,
    exclude: ObjectId,
) -> Option<&GameObject> {
    layer?
        .objects
        .iter()
        .find(|obj| obj.visible && obj.id != exclude && rects_overlap(rect, obj.bounds()))
}
