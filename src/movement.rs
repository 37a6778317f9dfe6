//! Movement resolution against tile geometry and other objects.
//!
//! Everything here is pure: functions read an actor, its position and the
//! map layers, and return the displacement that is legal. Applying it (and
//! reacting to collisions) is the caller's job, see
//! [`MapContainer::move_actor`](crate::MapContainer::move_actor).

use crate::actor::{Actor, Direction};
use crate::object::{ObjectId, ObjectLayer};
use crate::spatial::{blocked, first_overlap, world_to_tile, CollisionLayer};
use macroquad::math::{vec2, Vec2};
use serde::Deserialize;

/// Deltas smaller than this count as "already there".
const ARRIVE_EPSILON: f32 = 0.01;

/// What to do when the full displacement is obstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicy {
    /// Reject the whole move.
    Strict,
    /// Retry with X alone, then Y alone, so actors slide along walls.
    #[default]
    AxisFallback,
}

/// Which displacement was finally applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The requested vector
    Full,
    /// Only its X component
    AxisX,
    /// Only its Y component
    AxisY,
    /// Nothing
    Blocked,
}

/// What stopped the full displacement. Tiles win when both were hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Collision-layer tile
    Tile,
    /// Another object's bounds
    Object,
}

/// Result of [`try_move`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// Displacement asked for
    pub requested: Vec2,
    /// Displacement that is legal
    pub applied: Vec2,
    /// How `applied` was chosen
    pub resolution: Resolution,
    /// The full displacement touched a collision tile
    pub hit_tile: bool,
    /// The full displacement overlapped this object
    pub hit_object: Option<ObjectId>,
}

impl MoveOutcome {
    /// Nothing requested, nothing hit.
    pub fn idle() -> Self {
        Self {
            requested: Vec2::ZERO,
            applied: Vec2::ZERO,
            resolution: Resolution::Full,
            hit_tile: false,
            hit_object: None,
        }
    }

    /// Kind reported for the full-displacement test.
    pub fn collision_kind(&self) -> Option<CollisionKind> {
        if self.hit_tile {
            Some(CollisionKind::Tile)
        } else if self.hit_object.is_some() {
            Some(CollisionKind::Object)
        } else {
            None
        }
    }

    /// True when the actor could not move at all.
    pub fn is_blocked(&self) -> bool {
        self.resolution == Resolution::Blocked
    }
}

/// Decide how far `actor`, standing at `position`, may move by `requested`.
///
/// The full vector is tried first. Under [`MovePolicy::AxisFallback`] an
/// obstructed move is retried with X alone, then Y alone, in that fixed order
/// regardless of which component is larger. Collision flags always describe
/// the full-vector test, even when a fallback succeeded.
pub fn try_move(
    actor: &Actor,
    position: Vec2,
    collisions: Option<&CollisionLayer>,
    objects: Option<&ObjectLayer>,
    requested: Vec2,
    policy: MovePolicy,
) -> MoveOutcome {
    if requested == Vec2::ZERO {
        return MoveOutcome::idle();
    }

    let clear = |delta: Vec2| {
        let rect = actor.hitbox_at(position + delta);
        !blocked(collisions, rect) && first_overlap(objects, rect, actor.object).is_none()
    };

    let full = actor.hitbox_at(position + requested);
    let hit_tile = blocked(collisions, full);
    let hit_object = first_overlap(objects, full, actor.object).map(|o| o.id);

    let (applied, resolution) = if !hit_tile && hit_object.is_none() {
        (requested, Resolution::Full)
    } else if policy == MovePolicy::Strict {
        (Vec2::ZERO, Resolution::Blocked)
    } else {
        let only_x = vec2(requested.x, 0.0);
        let only_y = vec2(0.0, requested.y);
        if requested.x != 0.0 && clear(only_x) {
            (only_x, Resolution::AxisX)
        } else if requested.y != 0.0 && clear(only_y) {
            (only_y, Resolution::AxisY)
        } else {
            (Vec2::ZERO, Resolution::Blocked)
        }
    };

    MoveOutcome {
        requested,
        applied,
        resolution,
        hit_tile,
        hit_object,
    }
}

/// Whether to close in on or flee from a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approach {
    /// Close the distance
    Toward,
    /// Open the distance
    Away,
}

fn axis_step(delta: f32, speed: f32, approach: Approach) -> f32 {
    if delta.abs() <= ARRIVE_EPSILON {
        return 0.0;
    }
    match approach {
        // never overshoot the target
        Approach::Toward => delta.signum() * speed.min(delta.abs()),
        Approach::Away => -delta.signum() * speed,
    }
}

/// Displacement for one proximity step of `speed` pixels.
///
/// Only the axis with the larger distance to the target moves, which gives
/// staircase paths. When that step hits collision tiles, the orthogonal axis
/// is tried under [`MovePolicy::AxisFallback`]. Other objects are ignored.
pub fn proximity_step(
    actor: &Actor,
    position: Vec2,
    target: Vec2,
    speed: f32,
    approach: Approach,
    collisions: Option<&CollisionLayer>,
    policy: MovePolicy,
) -> Vec2 {
    let delta = target - position;
    let (primary, secondary) = if delta.x.abs() > delta.y.abs() {
        (
            vec2(axis_step(delta.x, speed, approach), 0.0),
            vec2(0.0, axis_step(delta.y, speed, approach)),
        )
    } else {
        (
            vec2(0.0, axis_step(delta.y, speed, approach)),
            vec2(axis_step(delta.x, speed, approach), 0.0),
        )
    };

    let free = |step: Vec2| step != Vec2::ZERO && !blocked(collisions, actor.hitbox_at(position + step));

    if free(primary) {
        primary
    } else if policy == MovePolicy::AxisFallback && primary != Vec2::ZERO && free(secondary) {
        secondary
    } else {
        Vec2::ZERO
    }
}

/// Manhattan tile distance between `position` and `target` is within `radius`.
pub fn is_aware(position: Vec2, target: Vec2, tile_w: u32, tile_h: u32, radius: u32) -> bool {
    world_to_tile(position, tile_w, tile_h).manhattan_distance(world_to_tile(target, tile_w, tile_h)) <= radius
}

/// Knock-back of `distance` pixels against the actor's facing.
///
/// Returns the new facing and the displacement. The displacement is checked
/// against collision tiles and is zero when the landing spot is solid, so a
/// bump never pushes an actor into a wall.
pub fn bump_back(
    actor: &Actor,
    position: Vec2,
    distance: f32,
    collisions: Option<&CollisionLayer>,
) -> (Direction, Vec2) {
    let facing = actor.facing.opposite();
    let delta = facing.step() * distance;
    if delta == Vec2::ZERO || blocked(collisions, actor.hitbox_at(position + delta)) {
        (facing, Vec2::ZERO)
    } else {
        (facing, delta)
    }
}
