use crate::actor::{Actor, Direction};
use crate::config::AdventureConfig;
use crate::error::MapError;
use crate::ir_map::*;
use crate::loader::json_loader::decode_map_file_to_ir;
use crate::movement::{self, Approach, MoveOutcome, MovePolicy};
use crate::object::{GameObject, ObjectId, ObjectKind, ObjectLayer};
use crate::spatial::{CollisionLayer, TileId};
use macroquad::math::{vec2, Vec2};
use std::path::Path;
use tracing::{debug, info, warn};

/// Atlas geometry of one tileset; textures are the host's business.
#[derive(Debug, Clone)]
pub struct TilesetInfo {
    /// First gid of this tileset
    pub first_gid: u32,
    /// Number of tiles
    pub tilecount: u32,
    /// Atlas columns
    pub cols: u32,
    /// Image path relative to the map file
    pub image: String,
    /// Tile width in pixels
    pub tile_w: u32,
    /// Tile height in pixels
    pub tile_h: u32,
    /// Pixels between tiles
    pub spacing: u32,
    /// Pixels around the atlas
    pub margin: u32,
}

impl TilesetInfo {
    /// Pixel source rectangle `(x, y, w, h)` of `local` inside the atlas.
    pub fn source_rect(&self, local: u32) -> (u32, u32, u32, u32) {
        let cols = self.cols.max(1);
        let col = local % cols;
        let row = local / cols;
        let sx = self.margin + col * (self.tile_w + self.spacing);
        let sy = self.margin + row * (self.tile_h + self.spacing);
        (sx, sy, self.tile_w, self.tile_h)
    }
}

/// A drawable tile layer.
#[derive(Debug, Clone)]
pub struct TileLayer {
    /// Layer name
    pub name: String,
    /// Drawn at all; false for the collision layer
    pub visible: bool,
    /// 0.0 to 1.0
    pub opacity: f32,
    /// Pixel offset, group offsets included
    pub offset: Vec2,
    /// Width in tiles
    pub width: usize,
    /// Height in tiles
    pub height: usize,
    /// Raw gids, flip flags included, row-major
    pub data: Vec<u32>,
}

/// One loaded map: its layers, its objects, and the actors moving on it.
///
/// The player is not owned separately. [`MapContainer::player`] holds the
/// movement state of this map's own `player` object, so switching maps
/// switches player objects too.
pub struct MapContainer {
    /// Registry key
    pub name: String,
    /// Tile width in pixels
    pub tile_w: u32,
    /// Tile height in pixels
    pub tile_h: u32,
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    /// Map-level custom properties
    pub properties: Properties,
    /// Tilesets sorted by first gid
    pub tilesets: Vec<TilesetInfo>,
    gid_lut: Vec<u16>,
    /// Tile layers in draw order; the collision layer is kept but hidden
    pub tile_layers: Vec<TileLayer>,
    /// The layer named by `objects_layer`, if any
    pub objects: Option<ObjectLayer>,
    /// The layer named by `collisions_layer`, if any
    pub collisions: Option<CollisionLayer>,
    /// Movement state of the player object, if the map has one
    pub player: Option<Actor>,
    /// Non-player actors (enemies, followers, ...)
    pub actors: Vec<Actor>,
}

impl MapContainer {
    /// Load and wire up a Tiled JSON map; the file stem becomes the name.
    pub fn load(path: &Path, config: &AdventureConfig) -> Result<Self, MapError> {
        let (ir, _) = decode_map_file_to_ir(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_owned();
        Ok(Self::from_ir(name, ir, config))
    }

    /// Build from a decoded map, caching the configured object and collision
    /// layers and the player object. Missing pieces are logged and left unset.
    pub fn from_ir(name: impl Into<String>, ir: IrMap, config: &AdventureConfig) -> Self {
        let name = name.into();

        let mut tilesets = Vec::with_capacity(ir.tilesets.len());
        for t in &ir.tilesets {
            match t {
                IrTileset::Atlas {
                    first_gid,
                    image,
                    tile_w,
                    tile_h,
                    tilecount,
                    columns,
                    spacing,
                    margin,
                    ..
                } => tilesets.push(TilesetInfo {
                    first_gid: *first_gid,
                    tilecount: *tilecount,
                    cols: *columns,
                    image: image.clone(),
                    tile_w: *tile_w,
                    tile_h: *tile_h,
                    spacing: *spacing,
                    margin: *margin,
                }),
            }
        }

        let mut gid_lut = vec![u16::MAX; ir.max_gid() as usize + 1];
        for (i, t) in tilesets.iter().enumerate() {
            for gid in t.first_gid..t.first_gid.saturating_add(t.tilecount) {
                gid_lut[gid as usize] = i as u16;
            }
        }

        let mut tile_layers = Vec::new();
        let mut objects = None;
        let mut collisions = None;
        let (mut width, mut height) = (ir.width, ir.height);

        for layer in ir.layers {
            match layer.kind {
                IrLayerKind::Tiles {
                    width: lw,
                    height: lh,
                    data,
                } => {
                    width = width.max(lw as u32);
                    height = height.max(lh as u32);
                    let is_collision = layer.name == config.collisions_layer && collisions.is_none();
                    if is_collision {
                        collisions = Some(CollisionLayer::new(lw, lh, ir.tile_w, ir.tile_h, data.clone()));
                    }
                    tile_layers.push(TileLayer {
                        name: layer.name,
                        visible: layer.visible && !is_collision,
                        opacity: layer.opacity,
                        offset: layer.offset,
                        width: lw,
                        height: lh,
                        data,
                    });
                }
                IrLayerKind::Objects { objects: list } => {
                    if layer.name == config.objects_layer && objects.is_none() {
                        objects = Some(ObjectLayer {
                            name: layer.name,
                            // the loader already folded the layer offset in
                            objects: list
                                .into_iter()
                                .map(|o| GameObject::from_ir(o, Vec2::ZERO))
                                .collect(),
                        });
                    } else {
                        debug!(map = %name, layer = %layer.name, "ignoring extra object layer");
                    }
                }
                IrLayerKind::Unsupported => {
                    debug!(map = %name, layer = %layer.name, "skipping unsupported layer");
                }
            }
        }

        if collisions.is_none() {
            warn!(map = %name, layer = %config.collisions_layer, "no collision layer, movement is unrestricted");
        }

        let mut player = None;
        let mut actors = Vec::new();
        match &objects {
            Some(layer) => {
                let hitbox = config.player_hitbox.rect();
                for obj in layer.iter() {
                    if obj.name == config.player_name {
                        if player.is_none() {
                            player = Some(Actor::new(obj, config.player_speed, hitbox));
                        }
                    } else if obj.kind == ObjectKind::Enemy
                        || obj.properties.get_bool("follows").is_some()
                        || obj.properties.get_bool("avoids").is_some()
                    {
                        actors.push(Actor::npc(obj, config.npc_speed, config.awareness_radius, hitbox));
                    }
                }
                if player.is_none() {
                    warn!(map = %name, marker = %config.player_name, "no player object found");
                }
            }
            None => warn!(map = %name, layer = %config.objects_layer, "no object layer"),
        }

        info!(
            map = %name,
            width,
            height,
            objects = objects.as_ref().map_or(0, |l| l.objects.len()),
            actors = actors.len(),
            "map ready"
        );

        Self {
            name,
            tile_w: ir.tile_w,
            tile_h: ir.tile_h,
            width,
            height,
            properties: ir.properties,
            tilesets,
            gid_lut,
            tile_layers,
            objects,
            collisions,
            player,
            actors,
        }
    }

    /// Tileset and local tile index for `gid`.
    #[inline]
    pub fn ts_for_gid(&self, gid: TileId) -> Option<(&TilesetInfo, u32)> {
        let clean = gid.clean() as usize;
        if clean >= self.gid_lut.len() {
            return None;
        }
        let idx = self.gid_lut[clean];
        if idx == u16::MAX {
            return None;
        }
        let ts = &self.tilesets[idx as usize];
        Some((ts, gid.clean() - ts.first_gid))
    }

    /// Map size in pixels.
    pub fn pixel_size(&self) -> Vec2 {
        vec2(
            (self.width * self.tile_w) as f32,
            (self.height * self.tile_h) as f32,
        )
    }

    /// Object by id.
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.as_ref()?.get(id)
    }

    /// Mutable object by id.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.as_mut()?.get_mut(id)
    }

    /// Id of the player object.
    pub fn player_id(&self) -> Option<ObjectId> {
        self.player.as_ref().map(|p| p.object)
    }

    /// Current top-left of the player object.
    pub fn player_position(&self) -> Option<Vec2> {
        self.object(self.player_id()?).map(|o| o.position)
    }

    /// Movement state for `id`, player included.
    pub fn actor(&self, id: ObjectId) -> Option<&Actor> {
        self.player
            .iter()
            .chain(self.actors.iter())
            .find(|a| a.object == id)
    }

    /// Mutable movement state for `id`, player included.
    pub fn actor_mut(&mut self, id: ObjectId) -> Option<&mut Actor> {
        self.player
            .iter_mut()
            .chain(self.actors.iter_mut())
            .find(|a| a.object == id)
    }

    /// Set facing/pose from a requested displacement and refresh the sprite.
    /// A zero displacement keeps the previous facing and stops walking.
    pub fn steer(&mut self, id: ObjectId, requested: Vec2) {
        let Some(actor) = self.actor_mut(id) else {
            return;
        };
        let facing = Direction::of(requested);
        if facing != Direction::None {
            actor.facing = facing;
        }
        actor.walking = facing != Direction::None;
        self.refresh_sprite(id);
    }

    /// Turn actor `id` to `facing`, standing still.
    pub fn face(&mut self, id: ObjectId, facing: Direction) {
        let Some(actor) = self.actor_mut(id) else {
            return;
        };
        actor.facing = facing;
        actor.walking = false;
        self.refresh_sprite(id);
    }

    fn refresh_sprite(&mut self, id: ObjectId) {
        let Some(actor) = self.actor(id).cloned() else {
            return;
        };
        if let Some(obj) = self.object_mut(id) {
            actor.apply_sprite(obj);
        }
    }

    /// Resolve and apply a move for actor `id`. Unknown actors and maps
    /// without the object get an idle outcome.
    pub fn move_actor(&mut self, id: ObjectId, requested: Vec2, policy: MovePolicy) -> MoveOutcome {
        let (Some(actor), Some(position)) = (self.actor(id), self.object(id).map(|o| o.position)) else {
            return MoveOutcome::idle();
        };
        let outcome = movement::try_move(
            actor,
            position,
            self.collisions.as_ref(),
            self.objects.as_ref(),
            requested,
            policy,
        );
        if let Some(obj) = self.object_mut(id) {
            obj.position += outcome.applied;
        }
        outcome
    }

    /// Move the player; idle outcome when the map has none.
    pub fn move_player(&mut self, requested: Vec2, policy: MovePolicy) -> MoveOutcome {
        match self.player_id() {
            Some(id) => self.move_actor(id, requested, policy),
            None => MoveOutcome::idle(),
        }
    }

    /// One proximity step of `speed` pixels toward or away from `target`.
    /// Updates facing, pose and sprite; returns the applied displacement.
    pub fn move_relative(
        &mut self,
        id: ObjectId,
        target: Vec2,
        speed: f32,
        approach: Approach,
        policy: MovePolicy,
    ) -> Vec2 {
        let (Some(actor), Some(position)) = (self.actor(id), self.object(id).map(|o| o.position)) else {
            return Vec2::ZERO;
        };
        let step = movement::proximity_step(
            actor,
            position,
            target,
            speed,
            approach,
            self.collisions.as_ref(),
            policy,
        );
        if let Some(obj) = self.object_mut(id) {
            obj.position += step;
        }
        self.steer(id, step);
        step
    }

    /// Step toward `target`.
    pub fn move_toward(&mut self, id: ObjectId, target: Vec2, speed: f32, policy: MovePolicy) -> Vec2 {
        self.move_relative(id, target, speed, Approach::Toward, policy)
    }

    /// Step away from `target`.
    pub fn move_away(&mut self, id: ObjectId, target: Vec2, speed: f32, policy: MovePolicy) -> Vec2 {
        self.move_relative(id, target, speed, Approach::Away, policy)
    }

    /// Step only when `target` is within `radius` tiles (Manhattan).
    pub fn move_if_aware(
        &mut self,
        id: ObjectId,
        target: Vec2,
        speed: f32,
        radius: u32,
        approach: Approach,
        policy: MovePolicy,
    ) -> Vec2 {
        let Some(position) = self.object(id).map(|o| o.position) else {
            return Vec2::ZERO;
        };
        if !movement::is_aware(position, target, self.tile_w, self.tile_h, radius) {
            self.steer(id, Vec2::ZERO);
            return Vec2::ZERO;
        }
        self.move_relative(id, target, speed, approach, policy)
    }

    /// Knock actor `id` back against its facing, turning it around.
    pub fn bump_back(&mut self, id: ObjectId, distance: f32) -> Vec2 {
        let (Some(actor), Some(position)) = (self.actor(id), self.object(id).map(|o| o.position)) else {
            return Vec2::ZERO;
        };
        let (facing, delta) = movement::bump_back(actor, position, distance, self.collisions.as_ref());
        if let Some(actor) = self.actor_mut(id) {
            actor.facing = facing;
            actor.walking = false;
        }
        if let Some(obj) = self.object_mut(id) {
            obj.position += delta;
        }
        self.refresh_sprite(id);
        delta
    }
}
