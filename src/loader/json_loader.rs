// src/loader/json_loader.rs
use crate::error::MapError;
use crate::ir_map::*;
use crate::spatial::GID_MASK;
use macroquad::math::{vec2, Vec2};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

/// Map file extensions the loader accepts.
pub const MAP_EXTENSIONS: [&str; 2] = ["json", "tmj"];

/// Highest gid a tileset may cover; bounds the gid lookup table.
pub const MAX_TILESET_GID: u32 = 1 << 24;

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: Vec<u32>,
    #[serde(default)]
    width: usize,
    #[serde(default)]
    height: usize,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default = "one")]
    opacity: f32,
    #[serde(default)]
    offsetx: f32,
    #[serde(default)]
    offsety: f32,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" expected here
    #[serde(default)]
    properties: Vec<JsonProperty>,
    #[serde(default)]
    objects: Vec<JsonObject>,
    #[serde(default)]
    layers: Vec<JsonLayer>,
}

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    // embedded tilesets carry the atlas inline
    #[serde(flatten)]
    inline: Option<ExternalTileset>,
}

#[derive(Deserialize)]
struct JsonMap {
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct ExternalTileset {
    tilewidth: u32,
    tileheight: u32,
    tilecount: u32,
    columns: u32,
    #[serde(default)]
    image: String,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    value: JsonValue,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    point: bool,
    #[serde(default)]
    polygon: Vec<JsonObjectPoint>,
    #[serde(default)]
    polyline: Vec<JsonObjectPoint>,
    #[serde(default)]
    gid: Option<u32>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonObjectPoint {
    x: f32,
    y: f32,
}

fn json_property_to_ir(prop: JsonProperty) -> Result<Option<(String, PropertyValue)>, MapError> {
    let JsonProperty { name, kind, value } = prop;

    let parsed = match kind.as_deref() {
        Some("bool") => value.as_bool().map(PropertyValue::Bool),
        Some("int") | Some("object") => value.as_i64().map(PropertyValue::I64),
        Some("float") => value.as_f64().map(|n| PropertyValue::F32(n as f32)),
        Some("string") | Some("file") | Some("color") | Some("class") => {
            value.as_str().map(|s| PropertyValue::String(s.to_owned()))
        }
        Some(other) => {
            return Err(MapError::UnsupportedPropertyType {
                name,
                kind: other.to_owned(),
            });
        }
        None => {
            if let Some(v) = value.as_bool() {
                Some(PropertyValue::Bool(v))
            } else if let Some(v) = value.as_i64() {
                Some(PropertyValue::I64(v))
            } else if let Some(v) = value.as_f64() {
                Some(PropertyValue::F32(v as f32))
            } else {
                value.as_str().map(|s| PropertyValue::String(s.to_owned()))
            }
        }
    };

    Ok(parsed.map(|value| (name, value)))
}

fn properties_from_json(props: Vec<JsonProperty>) -> Result<Properties, MapError> {
    let mut out = Properties::new();
    for p in props {
        if let Some((name, value)) = json_property_to_ir(p)? {
            out.insert(name, value);
        }
    }
    Ok(out)
}

fn object_to_ir(obj: JsonObject, offset: Vec2) -> Result<IrObject, MapError> {
    let shape = if let Some(gid) = obj.gid {
        IrObjectShape::Tile { gid }
    } else if obj.point {
        IrObjectShape::Point
    } else if !obj.polygon.is_empty() {
        IrObjectShape::Polygon(obj.polygon.into_iter().map(|p| vec2(p.x, p.y)).collect())
    } else if !obj.polyline.is_empty() {
        IrObjectShape::Polyline(obj.polyline.into_iter().map(|p| vec2(p.x, p.y)).collect())
    } else {
        IrObjectShape::Rectangle
    };

    let class_name = if !obj.class.is_empty() {
        obj.class
    } else {
        obj.kind
    };

    // Tiled anchors tile objects at their bottom-left corner
    let y = match shape {
        IrObjectShape::Tile { .. } => obj.y - obj.height,
        _ => obj.y,
    };

    Ok(IrObject {
        id: obj.id,
        name: obj.name,
        class_name,
        x: obj.x + offset.x,
        y: y + offset.y,
        width: obj.width,
        height: obj.height,
        rotation: obj.rotation,
        visible: obj.visible,
        shape,
        properties: properties_from_json(obj.properties)?,
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, MapError> {
    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn tileset_to_ir(ts: JsonTilesetRef, map_dir: &Path) -> Result<IrTileset, MapError> {
    let ext = match (ts.source, ts.inline) {
        (Some(source), _) => {
            if !source.ends_with(".json") && !source.ends_with(".tsj") {
                return Err(MapError::InvalidMap(format!(
                    "External tileset must be JSON: {source}"
                )));
            }
            read_json::<ExternalTileset>(&map_dir.join(&source))?
        }
        (None, Some(inline)) => inline,
        (None, None) => {
            return Err(MapError::InvalidMap(format!(
                "Tileset at firstgid {} has neither a source nor inline data",
                ts.firstgid
            )));
        }
    };

    Ok(IrTileset::Atlas {
        first_gid: ts.firstgid,
        image: ext.image,
        tile_w: ext.tilewidth,
        tile_h: ext.tileheight,
        tilecount: ext.tilecount,
        columns: ext.columns,
        spacing: ext.spacing,
        margin: ext.margin,
        properties: properties_from_json(ext.properties)?,
    })
}

fn check_gid_range(tileset: &IrTileset) -> Result<(), MapError> {
    let IrTileset::Atlas {
        first_gid,
        tilecount,
        image,
        ..
    } = tileset;
    match first_gid.checked_add(*tilecount) {
        Some(end) if end.saturating_sub(1) <= MAX_TILESET_GID => Ok(()),
        _ => Err(MapError::InvalidMap(format!(
            "Tileset {image} covers gids {first_gid}+{tilecount}, past the limit of {MAX_TILESET_GID}"
        ))),
    }
}

/// Decodes layers depth-first; group layers are flattened into their
/// children with the group offset and visibility folded in.
fn layers_to_ir(
    layers: Vec<JsonLayer>,
    parent_offset: Vec2,
    parent_visible: bool,
    max_gid: u32,
    out: &mut Vec<IrLayer>,
) -> Result<(), MapError> {
    for l in layers {
        let layer_name = l.name.clone();
        let offset = parent_offset + vec2(l.offsetx, l.offsety);
        let visible = parent_visible && l.visible;
        let properties = properties_from_json(l.properties)?;
        let layer_kind = match l.kind.as_deref().unwrap_or("tilelayer") {
            "tilelayer" => {
                if l.data.len() != l.width * l.height {
                    return Err(MapError::InvalidLayerSize {
                        layer: layer_name,
                        len: l.data.len(),
                        width: l.width,
                        height: l.height,
                    });
                }
                for &raw_gid in &l.data {
                    let gid = raw_gid & GID_MASK;
                    if gid != 0 && gid > max_gid {
                        return Err(MapError::InvalidTileGid {
                            layer: layer_name.clone(),
                            gid,
                            max_gid,
                        });
                    }
                }
                IrLayerKind::Tiles {
                    width: l.width,
                    height: l.height,
                    data: l.data,
                }
            }
            "objectgroup" => IrLayerKind::Objects {
                objects: l
                    .objects
                    .into_iter()
                    .map(|obj| {
                        if let Some(raw_gid) = obj.gid {
                            let gid = raw_gid & GID_MASK;
                            if gid == 0 || gid > max_gid {
                                return Err(MapError::InvalidObjectGid {
                                    layer: layer_name.clone(),
                                    object_id: obj.id,
                                    gid,
                                    max_gid,
                                });
                            }
                        }
                        object_to_ir(obj, offset)
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            },
            "group" => {
                layers_to_ir(l.layers, offset, visible, max_gid, out)?;
                continue;
            }
            _ => IrLayerKind::Unsupported,
        };
        out.push(IrLayer {
            name: l.name,
            visible,
            opacity: l.opacity,
            offset,
            properties,
            kind: layer_kind,
        });
    }
    Ok(())
}

/// Decode Tiled JSON text. `map_dir` resolves external tilesets and
/// `origin` names the source in errors.
pub fn decode_map_str_to_ir(json: &str, origin: &Path, map_dir: &Path) -> Result<IrMap, MapError> {
    let j: JsonMap = serde_json::from_str(json).map_err(|source| MapError::Json {
        path: origin.to_path_buf(),
        source,
    })?;

    if j.tilewidth == 0 || j.tileheight == 0 {
        return Err(MapError::InvalidMap(format!(
            "{} has a zero tile size",
            origin.display()
        )));
    }

    let mut ir_tilesets = j
        .tilesets
        .into_iter()
        .map(|ts| tileset_to_ir(ts, map_dir))
        .collect::<Result<Vec<_>, _>>()?;
    for ts in &ir_tilesets {
        check_gid_range(ts)?;
    }

    // Sort by first_gid to make LUT building trivial
    ir_tilesets.sort_by_key(|t| match t {
        IrTileset::Atlas { first_gid, .. } => *first_gid,
    });

    let mut ir = IrMap {
        tile_w: j.tilewidth,
        tile_h: j.tileheight,
        width: j.width,
        height: j.height,
        properties: properties_from_json(j.properties)?,
        tilesets: ir_tilesets,
        layers: Vec::with_capacity(j.layers.len()),
    };

    let max_gid = ir.max_gid();
    layers_to_ir(j.layers, Vec2::ZERO, true, max_gid, &mut ir.layers)?;

    Ok(ir)
}

/// Decode a Tiled JSON map file, returning the map and its directory.
pub fn decode_map_file_to_ir(path: &Path) -> Result<(IrMap, PathBuf), MapError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !MAP_EXTENSIONS.contains(&ext) {
        return Err(MapError::InvalidMap(format!(
            "Map file must be a JSON file: {}",
            path.display()
        )));
    }

    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let map_dir = path
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    let ir = decode_map_str_to_ir(&txt, path, &map_dir)?;
    Ok((ir, map_dir))
}
