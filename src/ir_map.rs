// src/ir_map.rs
use macroquad::math::Vec2;
use std::collections::HashMap;

/// Canonical, format-agnostic map.
#[derive(Debug, Clone)]
pub struct IrMap {
    /// Tile width in pixels
    pub tile_w: u32,
    /// Tile height in pixels
    pub tile_h: u32,
    /// Map width in tiles
    pub width: u32,
    /// Map height in tiles
    pub height: u32,
    /// Map-level custom properties
    pub properties: Properties,
    /// Tilesets, sorted by first_gid
    pub tilesets: Vec<IrTileset>,
    /// Layers in draw order
    pub layers: Vec<IrLayer>,
}

impl IrMap {
    /// Largest gid covered by any tileset (0 when there are none).
    pub fn max_gid(&self) -> u32 {
        self.tilesets
            .iter()
            .map(|t| match t {
                IrTileset::Atlas {
                    first_gid,
                    tilecount,
                    ..
                } => first_gid.saturating_add(*tilecount).saturating_sub(1),
            })
            .max()
            .unwrap_or(0)
    }
}

/// Tileset description; only gid ranges and atlas geometry are kept.
#[derive(Debug, Clone)]
pub enum IrTileset {
    /// One image atlas with a regular grid.
    Atlas {
        /// First gid of this tileset
        first_gid: u32,
        /// Atlas image, relative to the map file
        image: String,
        /// Tile width in pixels
        tile_w: u32,
        /// Tile height in pixels
        tile_h: u32,
        /// Number of tiles
        tilecount: u32,
        /// Atlas columns
        columns: u32,
        /// Pixels between tiles, 0 if not used
        spacing: u32,
        /// Pixels around the atlas, 0 if not used
        margin: u32,
        /// Tileset-level custom properties
        properties: Properties,
    },
}

/// Layer payload.
#[derive(Debug, Clone)]
pub enum IrLayerKind {
    /// Regular tile grid
    Tiles {
        /// Width in tiles
        width: usize,
        /// Height in tiles
        height: usize,
        /// Raw GIDs, flip flags included
        data: Vec<u32>,
    },
    /// Object group, objects in source order
    Objects {
        /// Objects
        objects: Vec<IrObject>,
    },
    /// Image layers, groups and anything else we skip
    Unsupported,
}

/// A single layer of the map.
#[derive(Debug, Clone)]
pub struct IrLayer {
    /// Layer name as authored in Tiled
    pub name: String,
    /// Visibility flag
    pub visible: bool,
    /// Layer opacity
    pub opacity: f32,
    /// World offset for this layer
    pub offset: Vec2,
    /// Layer-level custom properties
    pub properties: Properties,
    /// Payload
    pub kind: IrLayerKind,
}

/// Shape of an object as authored.
#[derive(Debug, Clone, PartialEq)]
pub enum IrObjectShape {
    /// Plain rectangle
    Rectangle,
    /// Point marker
    Point,
    /// Polygon, points relative to the object origin
    Polygon(Vec<Vec2>),
    /// Polyline, points relative to the object origin
    Polyline(Vec<Vec2>),
    /// Tile object drawing `gid`
    Tile {
        /// Raw gid including flip flags
        gid: u32,
    },
}

/// An object from an object group.
#[derive(Debug, Clone)]
pub struct IrObject {
    /// Tiled object id, unique per map
    pub id: u32,
    /// Object name
    pub name: String,
    /// `class` (Tiled >= 1.9) or legacy `type`
    pub class_name: String,
    /// Left edge in pixels
    pub x: f32,
    /// Top edge in pixels (tile objects are normalised by the loader)
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
    /// Rotation in degrees
    pub rotation: f32,
    /// Visibility flag
    pub visible: bool,
    /// Authored shape
    pub shape: IrObjectShape,
    /// Custom properties
    pub properties: Properties,
}

/// Typed Tiled property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `bool`
    Bool(bool),
    /// `int` and `object`
    I64(i64),
    /// `float`
    F32(f32),
    /// `string`, `file`, `color`, `class`
    String(String),
}

/// Named custom properties of a map, layer, tileset or object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    values: HashMap<String, PropertyValue>,
}

impl Properties {
    /// Empty property bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a property.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw lookup.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no property is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `bool` property.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer property, `None` when it does not fit in an `i64`.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            PropertyValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer property, `None` when it does not fit in an `i32`.
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get_i64(name).and_then(|v| i32::try_from(v).ok())
    }

    /// Float property. Integers are widened since untyped JSON numbers
    /// without a fraction decode as integers.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.values.get(name)? {
            PropertyValue::F32(v) => Some(*v),
            PropertyValue::I64(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// String-like property.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            PropertyValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Best-effort `bool`: missing or mistyped yields `default`.
    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.get_bool(name).unwrap_or(default)
    }

    /// Best-effort integer: missing or mistyped yields `default`.
    pub fn int_or(&self, name: &str, default: i32) -> i32 {
        self.get_i32(name).unwrap_or(default)
    }

    /// Best-effort float: missing or mistyped yields `default`.
    pub fn float_or(&self, name: &str, default: f32) -> f32 {
        self.get_f32(name).unwrap_or(default)
    }

    /// Best-effort string: missing or mistyped yields `default`.
    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get_string(name).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_mistyped_properties_fall_back_to_default() {
        let mut props = Properties::new();
        props.insert("value", PropertyValue::I64(3));
        props.insert("text", PropertyValue::String("hi".into()));

        assert_eq!(props.int_or("value", 1), 3);
        assert_eq!(props.int_or("missing", 1), 1);
        assert_eq!(props.int_or("text", 7), 7);
        assert!(!props.bool_or("value", false));
        assert_eq!(props.str_or("value", "none"), "none");
        assert_eq!(props.str_or("text", "none"), "hi");
    }

    #[test]
    fn float_lookup_widens_integers() {
        let mut props = Properties::new();
        props.insert("speed", PropertyValue::I64(40));
        assert_eq!(props.float_or("speed", 0.0), 40.0);
    }

    #[test]
    fn oversized_int_is_not_an_i32() {
        let mut props = Properties::new();
        props.insert("big", PropertyValue::I64(5_000_000_000));
        assert_eq!(props.get_i64("big"), Some(5_000_000_000));
        assert_eq!(props.get_i32("big"), None);
    }
}
