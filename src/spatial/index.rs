use macroquad::math::Vec2;

/// Global tile id, flip flags included. Also used as an object's sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

/// Integer tile coordinate on a layer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

/// Horizontal flip flag (bit 31).
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip flag (bit 30).
pub const FLIP_V: u32 = 0x4000_0000;
/// Anti-diagonal flip flag (bit 29).
pub const FLIP_D: u32 = 0x2000_0000;
/// Tile index bits of a gid, flags stripped.
pub const GID_MASK: u32 = 0x1FFF_FFFF;

impl TileId {
    /// The gid as stored, flags included.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// The gid without flip flags.
    #[inline]
    pub fn clean(self) -> u32 {
        self.0 & GID_MASK
    }

    /// Mirrored left to right.
    #[inline]
    pub fn flip_h(self) -> bool {
        (self.0 & FLIP_H) != 0
    }

    /// Mirrored top to bottom.
    #[inline]
    pub fn flip_v(self) -> bool {
        (self.0 & FLIP_V) != 0
    }

    /// Mirrored along the anti-diagonal.
    #[inline]
    pub fn flip_d(self) -> bool {
        (self.0 & FLIP_D) != 0
    }

    /// Gid 0: no tile, no sprite.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.clean() == 0
    }

    /// Same flip flags, different tile.
    #[inline]
    pub fn with_clean(self, gid: u32) -> TileId {
        TileId((self.0 & !GID_MASK) | (gid & GID_MASK))
    }
}

impl TileCoord {
    /// Manhattan distance in tiles.
    #[inline]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Tile containing pixel `p`. Floors, so negative pixels map to negative tiles.
#[inline]
pub fn world_to_tile(p: Vec2, tile_w: u32, tile_h: u32) -> TileCoord {
    TileCoord {
        x: (p.x.floor() as i32).div_euclid(tile_w.max(1) as i32),
        y: (p.y.floor() as i32).div_euclid(tile_h.max(1) as i32),
    }
}
