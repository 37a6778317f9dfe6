use crate::ir_map::{IrObject, IrObjectShape, Properties};
use crate::spatial::TileId;
use macroquad::math::{vec2, Rect, Vec2};

/// Tiled object id, stable for the lifetime of a loaded map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// Gameplay role of an object, decided once at load time from its class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    /// Switches the active map
    Portal,
    /// Picked up on touch
    Loot,
    /// Hurts and bumps the toucher
    Trap,
    /// Moving hostile actor
    Enemy,
    /// Anything else, class kept verbatim
    Other(String),
}

impl ObjectKind {
    /// Classify a Tiled `class`/`type` string.
    pub fn from_class(class: &str) -> Self {
        match class {
            "portal" => ObjectKind::Portal,
            "loot" => ObjectKind::Loot,
            "trap" => ObjectKind::Trap,
            "enemy" => ObjectKind::Enemy,
            other => ObjectKind::Other(other.to_owned()),
        }
    }
}

/// An entity placed on an object layer.
#[derive(Debug, Clone)]
pub struct GameObject {
    /// Identity, used to exclude self from overlap queries
    pub id: ObjectId,
    /// Authored name ("player", a portal's destination, ...)
    pub name: String,
    /// Gameplay role
    pub kind: ObjectKind,
    /// Top-left corner in pixels
    pub position: Vec2,
    /// Width and height in pixels
    pub size: Vec2,
    /// Invisible objects never take part in overlap queries
    pub visible: bool,
    /// Sprite drawn for this object, if it is a tile object
    pub sprite: Option<TileId>,
    /// Custom properties
    pub properties: Properties,
}

impl GameObject {
    /// Bare rectangle object, mostly for tests and scripted spawns.
    pub fn new(id: u32, kind: ObjectKind, position: Vec2, size: Vec2) -> Self {
        Self {
            id: ObjectId(id),
            name: String::new(),
            kind,
            position,
            size,
            visible: true,
            sprite: None,
            properties: Properties::new(),
        }
    }

    /// Build from the decoded Tiled object, applying the layer offset.
    pub fn from_ir(obj: IrObject, layer_offset: Vec2) -> Self {
        let sprite = match obj.shape {
            IrObjectShape::Tile { gid } => Some(TileId(gid)),
            _ => None,
        };
        Self {
            id: ObjectId(obj.id),
            kind: ObjectKind::from_class(&obj.class_name),
            name: obj.name,
            position: vec2(obj.x, obj.y) + layer_offset,
            size: vec2(obj.width, obj.height),
            visible: obj.visible,
            sprite,
            properties: obj.properties,
        }
    }

    /// Axis-aligned bounds in pixel space.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }
}

/// An object group: objects in source order.
#[derive(Debug, Clone, Default)]
pub struct ObjectLayer {
    /// Layer name
    pub name: String,
    /// Objects in insertion order
    pub objects: Vec<GameObject>,
}

impl ObjectLayer {
    /// Empty layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
        }
    }

    /// Object by id.
    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Mutable object by id.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// First object carrying `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Objects in layer order.
    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.iter()
    }
}
