#![warn(missing_docs)]

//! Top-down adventure runtime over Tiled JSON maps for Macroquad: map
//! loading, tile and object collision, player and NPC movement, a clamped
//! camera and delayed sprite effects.

mod actor;
mod camera;
mod config;
mod effects;
mod error;
mod ir_map;
mod loader {
    pub mod json_loader;
}
mod map;
mod movement;
mod object;
mod registry;
/// Draw-time culling helpers.
pub mod render {
    pub mod cull;
}
mod rules;
mod session;
mod spatial;

pub use actor::{Actor, Behavior, CharacterSprites, Direction, FRAMES_PER_DIRECTION, TILES_PER_CHARACTER};
pub use camera::compute_camera;
pub use config::{AdventureConfig, HitboxConfig};
pub use effects::{DelayedEffect, EffectQueue, EffectTarget, ObjectStore};
pub use error::MapError;
pub use ir_map::{
    IrLayer, IrLayerKind, IrMap, IrObject, IrObjectShape, IrTileset, Properties, PropertyValue,
};
pub use loader::json_loader::{decode_map_file_to_ir, decode_map_str_to_ir, MAP_EXTENSIONS, MAX_TILESET_GID};
pub use map::{MapContainer, TileLayer, TilesetInfo};
pub use movement::{
    bump_back, is_aware, proximity_step, try_move, Approach, CollisionKind, MoveOutcome, MovePolicy,
    Resolution,
};
pub use object::{GameObject, ObjectId, ObjectKind, ObjectLayer};
pub use registry::{InlineMapProvider, JsonMapProvider, MapProvider, MapRegistry};
pub use rules::{ClassicRules, Collision, GameRules};
pub use session::{FrameReport, GameSession};
pub use spatial::{
    blocked, first_overlap, rects_overlap, world_to_tile, CollisionLayer, TileCoord, TileId, FLIP_D,
    FLIP_H, FLIP_V, GID_MASK,
};
