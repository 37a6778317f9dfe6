//! Tile ids, grid coordinates and the two collision oracles.

mod collision;
mod index;

pub use collision::{blocked, first_overlap, rects_overlap, CollisionLayer};
pub use index::{world_to_tile, TileCoord, TileId, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
