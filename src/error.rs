use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a Tiled file into a [`MapContainer`](crate::MapContainer).
///
/// Only the load boundary produces these. Everything that runs per frame
/// answers with a sentinel instead.
#[derive(Debug, Error)]
pub enum MapError {
    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// JSON parse error
    #[error("failed to parse {path}: {source}")]
    Json {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
    /// Structurally invalid map (bad extension, zero tile size, ...)
    #[error("invalid map: {0}")]
    InvalidMap(String),
    /// A tile layer's data length does not match width * height
    #[error("layer '{layer}' has {len} cells, expected {width}x{height}")]
    InvalidLayerSize {
        /// Layer name
        layer: String,
        /// Cells actually present
        len: usize,
        /// Declared width in tiles
        width: usize,
        /// Declared height in tiles
        height: usize,
    },
    /// A tile layer references a gid no tileset covers
    #[error("layer '{layer}' references gid {gid}, max is {max_gid}")]
    InvalidTileGid {
        /// Layer name
        layer: String,
        /// Offending gid (flip bits stripped)
        gid: u32,
        /// Largest gid covered by the tilesets
        max_gid: u32,
    },
    /// A tile object references a gid no tileset covers
    #[error("object {object_id} on layer '{layer}' references gid {gid}, max is {max_gid}")]
    InvalidObjectGid {
        /// Layer name
        layer: String,
        /// Tiled object id
        object_id: u32,
        /// Offending gid (flip bits stripped)
        gid: u32,
        /// Largest gid covered by the tilesets
        max_gid: u32,
    },
    /// Property with a `type` the loader does not know
    #[error("property '{name}' has unsupported type '{kind}'")]
    UnsupportedPropertyType {
        /// Property name
        name: String,
        /// Declared Tiled type
        kind: String,
    },
    /// Lookup of a map that is neither loaded nor loadable
    #[error("unknown map '{0}'")]
    UnknownMap(String),
}
