use crate::object::{GameObject, ObjectId, ObjectKind};
use crate::spatial::TileId;
use macroquad::math::{vec2, Rect, Vec2};

/// Facing of an actor. Screen space is y-down, so `South` is +y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// No facing (no movement, or no sprite)
    #[default]
    None,
    /// -y
    North,
    /// +y
    South,
    /// +x
    East,
    /// -x
    West,
}

impl Direction {
    /// Direction of travel from `from` to `to`. The axis with the larger
    /// delta wins; equal non-zero deltas resolve vertically.
    pub fn between(from: Vec2, to: Vec2) -> Direction {
        Direction::of(to - from)
    }

    /// Direction of a displacement vector.
    pub fn of(delta: Vec2) -> Direction {
        if delta.x == 0.0 && delta.y == 0.0 {
            Direction::None
        } else if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if delta.y > 0.0 {
            Direction::South
        } else {
            Direction::North
        }
    }

    /// Reverse facing; `None` stays `None`.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::None => Direction::None,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Unit step for this direction.
    pub fn step(self) -> Vec2 {
        match self {
            Direction::None => Vec2::ZERO,
            Direction::North => vec2(0.0, -1.0),
            Direction::South => vec2(0.0, 1.0),
            Direction::East => vec2(1.0, 0.0),
            Direction::West => vec2(-1.0, 0.0),
        }
    }

    /// Parse `north|south|east|west` (case-insensitive).
    pub fn parse(s: &str) -> Option<Direction> {
        match s.to_ascii_lowercase().as_str() {
            "north" | "n" | "up" => Some(Direction::North),
            "south" | "s" | "down" => Some(Direction::South),
            "east" | "e" | "right" => Some(Direction::East),
            "west" | "w" | "left" => Some(Direction::West),
            _ => None,
        }
    }

    // spritesheet column order is S, N, E, W
    fn sheet_index(self) -> Option<u32> {
        match self {
            Direction::None => None,
            Direction::South => Some(0),
            Direction::North => Some(1),
            Direction::East => Some(2),
            Direction::West => Some(3),
        }
    }

    fn from_sheet_index(i: u32) -> Direction {
        match i {
            0 => Direction::South,
            1 => Direction::North,
            2 => Direction::East,
            3 => Direction::West,
            _ => Direction::None,
        }
    }
}

/// Character sprite rows: 12 tiles per character, 3 frames per direction
/// (S, N, E, W), the middle frame being the walking pose.
pub const FRAMES_PER_DIRECTION: u32 = 3;
/// Tiles per character row.
pub const TILES_PER_CHARACTER: u32 = 4 * FRAMES_PER_DIRECTION;

/// Sprite selector for one character row of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterSprites {
    /// First gid of the row (still, facing south)
    pub first_gid: u32,
}

impl CharacterSprites {
    /// Row containing `gid`.
    pub fn from_gid(gid: TileId) -> Option<Self> {
        let clean = gid.clean();
        if clean == 0 {
            return None;
        }
        let row = (clean - 1) / TILES_PER_CHARACTER;
        Some(Self {
            first_gid: row * TILES_PER_CHARACTER + 1,
        })
    }

    /// Gid for a facing and pose. `None` facing keeps the south frames.
    pub fn gid_for(&self, facing: Direction, walking: bool) -> u32 {
        let dir = facing.sheet_index().unwrap_or(0);
        self.first_gid + dir * FRAMES_PER_DIRECTION + u32::from(walking)
    }

    /// Facing encoded in `gid`, `None` for gids outside this row.
    pub fn direction_of(&self, gid: TileId) -> Direction {
        let clean = gid.clean();
        if clean < self.first_gid || clean >= self.first_gid + TILES_PER_CHARACTER {
            return Direction::None;
        }
        Direction::from_sheet_index((clean - self.first_gid) / FRAMES_PER_DIRECTION)
    }
}

/// How a non-player actor reacts to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    /// Stands still
    #[default]
    Idle,
    /// Walks toward the player when aware of it
    Follow,
    /// Walks away from the player when aware of it
    Avoid,
}

/// Movement state layered over a [`GameObject`] that lives in a map's object layer.
#[derive(Debug, Clone)]
pub struct Actor {
    /// The object this actor moves
    pub object: ObjectId,
    /// Current facing
    pub facing: Direction,
    /// True while moving this frame
    pub walking: bool,
    /// Pixels per second
    pub speed: f32,
    /// Collision box relative to the object's origin
    pub hitbox: Rect,
    /// Reaction to the player
    pub behavior: Behavior,
    /// Manhattan tile radius gating `behavior`
    pub awareness: u32,
    /// Sprite row, when the object is a character tile
    pub sprites: Option<CharacterSprites>,
}

impl Actor {
    /// Actor for `object` with facing and sprite row read from its gid.
    pub fn new(object: &GameObject, speed: f32, hitbox: Rect) -> Self {
        let sprites = object.sprite.and_then(CharacterSprites::from_gid);
        let facing = match (sprites, object.sprite) {
            (Some(s), Some(gid)) => s.direction_of(gid),
            _ => Direction::None,
        };
        Self {
            object: object.id,
            facing,
            walking: false,
            speed,
            hitbox,
            behavior: Behavior::Idle,
            awareness: 0,
            sprites,
        }
    }

    /// Non-player actor reading `follows`, `avoids`, `awareness` and `speed`
    /// from the object's properties.
    pub fn npc(object: &GameObject, default_speed: f32, default_awareness: u32, hitbox: Rect) -> Self {
        let props = &object.properties;
        let mut actor = Actor::new(object, props.float_or("speed", default_speed), hitbox);
        // enemies chase by default
        actor.behavior = if props.bool_or("avoids", false) {
            Behavior::Avoid
        } else if props.bool_or("follows", object.kind == ObjectKind::Enemy) {
            Behavior::Follow
        } else {
            Behavior::Idle
        };
        actor.awareness = u32::try_from(props.int_or("awareness", default_awareness as i32)).unwrap_or(0);
        actor
    }

    /// Hitbox placed at `position`.
    #[inline]
    pub fn hitbox_at(&self, position: Vec2) -> Rect {
        Rect::new(
            position.x + self.hitbox.x,
            position.y + self.hitbox.y,
            self.hitbox.w,
            self.hitbox.h,
        )
    }

    /// Rewrite `object.sprite` for the current facing and pose.
    pub fn apply_sprite(&self, object: &mut GameObject) {
        let (Some(sprites), Some(current)) = (self.sprites, object.sprite) else {
            return;
        };
        object.sprite = Some(current.with_clean(sprites.gid_for(self.facing, self.walking)));
    }
}
