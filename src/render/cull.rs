//! Viewport culling for tile layers and objects.

use crate::object::{GameObject, ObjectLayer};
use crate::spatial::rects_overlap;
use macroquad::prelude::*;

const CULL_MARGIN_TILES: i64 = 1;

/// Inclusive tile range to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    /// First column
    pub x0: usize,
    /// First row
    pub y0: usize,
    /// Last column, inclusive
    pub x1: usize,
    /// Last row, inclusive
    pub y1: usize,
}

impl TileRange {
    /// `(x, y)` of every cell, row by row.
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        (self.y0..=self.y1).flat_map(move |y| (self.x0..=self.x1).map(move |x| (x, y)))
    }
}

/// Tiles of a `width`x`height` layer under the viewport scrolled to `camera`,
/// padded by one tile and clamped to the layer. `None` when nothing shows.
pub fn visible_tile_range(
    camera: Vec2,
    viewport: Vec2,
    tile_w: u32,
    tile_h: u32,
    width: usize,
    height: usize,
) -> Option<TileRange> {
    if width == 0 || height == 0 || tile_w == 0 || tile_h == 0 {
        return None;
    }
    if !(viewport.x > 0.0 && viewport.y > 0.0) || !camera.is_finite() {
        return None;
    }
    let (tw, th) = (tile_w as i64, tile_h as i64);
    let view_max = camera + viewport;

    //pad by one tile
    let x0 = (camera.x.floor() as i64).div_euclid(tw) - CULL_MARGIN_TILES;
    let y0 = (camera.y.floor() as i64).div_euclid(th) - CULL_MARGIN_TILES;
    let x1 = (view_max.x.ceil() as i64).div_euclid(tw) + CULL_MARGIN_TILES;
    let y1 = (view_max.y.ceil() as i64).div_euclid(th) + CULL_MARGIN_TILES;

    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(width as i64 - 1);
    let y1 = y1.min(height as i64 - 1);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some(TileRange {
        x0: x0 as usize,
        y0: y0 as usize,
        x1: x1 as usize,
        y1: y1 as usize,
    })
}

/// Visible objects of `layer` intersecting the viewport, in layer order.
pub fn visible_objects<'a>(
    layer: &'a ObjectLayer,
    camera: Vec2,
    viewport: Vec2,
) -> impl Iterator<Item = &'a GameObject> + 'a {
    let view = Rect::new(camera.x, camera.y, viewport.x, viewport.y);
    layer
        .iter()
        .filter(move |obj| obj.visible && rects_overlap(obj.bounds(), view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    #[test]
    fn range_is_padded_and_clamped() {
        let r = visible_tile_range(vec2(0.0, 0.0), vec2(320.0, 240.0), 16, 16, 100, 100).expect("range");
        assert_eq!((r.x0, r.y0, r.x1, r.y1), (0, 0, 21, 16));

        let r = visible_tile_range(vec2(160.0, 80.0), vec2(320.0, 240.0), 16, 16, 25, 25).expect("range");
        assert_eq!((r.x0, r.y0, r.x1, r.y1), (9, 4, 24, 21));
    }

    #[test]
    fn nothing_outside_the_layer() {
        assert!(visible_tile_range(vec2(5000.0, 0.0), vec2(320.0, 240.0), 16, 16, 10, 10).is_none());
        assert!(visible_tile_range(Vec2::ZERO, vec2(320.0, 240.0), 16, 16, 0, 10).is_none());
        assert!(visible_tile_range(Vec2::ZERO, Vec2::ZERO, 16, 16, 10, 10).is_none());
    }

    #[test]
    fn cells_walk_rows_in_order() {
        let r = TileRange { x0: 1, y0: 0, x1: 2, y1: 1 };
        let cells: Vec<_> = r.cells().collect();
        assert_eq!(cells, vec![(1, 0), (2, 0), (1, 1), (2, 1)]);
    }

    #[test]
    fn objects_outside_view_or_hidden_are_skipped() {
        let mut layer = ObjectLayer::new("objects");
        let kind = || ObjectKind::Other(String::new());
        layer.objects.push(GameObject::new(1, kind(), vec2(10.0, 10.0), vec2(16.0, 16.0)));
        layer.objects.push(GameObject::new(2, kind(), vec2(400.0, 10.0), vec2(16.0, 16.0)));
        let mut hidden = GameObject::new(3, kind(), vec2(20.0, 20.0), vec2(16.0, 16.0));
        hidden.visible = false;
        layer.objects.push(hidden);
        layer.objects.push(GameObject::new(4, kind(), vec2(310.0, 230.0), vec2(16.0, 16.0)));

        let ids: Vec<u32> = visible_objects(&layer, Vec2::ZERO, vec2(320.0, 240.0))
            .map(|o| o.id.0)
            .collect();
        assert_eq!(ids, vec![1, 4]);
    }
}
