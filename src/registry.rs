use crate::config::AdventureConfig;
use crate::effects::ObjectStore;
use crate::error::MapError;
use crate::loader::json_loader::decode_map_str_to_ir;
use crate::map::MapContainer;
use crate::object::{GameObject, ObjectId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resolves a logical map name to a freshly loaded [`MapContainer`].
pub trait MapProvider {
    /// Load `name`. The container's `name` must equal the requested name.
    fn load(&self, name: &str, config: &AdventureConfig) -> Result<MapContainer, MapError>;
}

impl<F> MapProvider for F
where
    F: Fn(&str, &AdventureConfig) -> Result<MapContainer, MapError>,
{
    fn load(&self, name: &str, config: &AdventureConfig) -> Result<MapContainer, MapError> {
        self(name, config)
    }
}

/// Reads `<root>/<name>.<extension>` from disk.
#[derive(Debug, Clone)]
pub struct JsonMapProvider {
    root: PathBuf,
    extension: String,
}

impl JsonMapProvider {
    /// Provider rooted at `root`, e.g. `assets` with extension `tmj`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// File backing `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{}", self.extension))
    }
}

impl MapProvider for JsonMapProvider {
    fn load(&self, name: &str, config: &AdventureConfig) -> Result<MapContainer, MapError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(MapError::UnknownMap(name.to_owned()));
        }
        let mut map = MapContainer::load(&path, config)?;
        map.name = name.to_owned();
        Ok(map)
    }
}

/// Maps held as JSON text in memory, for embedded assets and tests.
#[derive(Debug, Clone, Default)]
pub struct InlineMapProvider {
    sources: HashMap<String, String>,
}

impl InlineMapProvider {
    /// Empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `json` under `name`. Builder style.
    pub fn with_map(mut self, name: impl Into<String>, json: impl Into<String>) -> Self {
        self.sources.insert(name.into(), json.into());
        self
    }
}

impl MapProvider for InlineMapProvider {
    fn load(&self, name: &str, config: &AdventureConfig) -> Result<MapContainer, MapError> {
        let json = self
            .sources
            .get(name)
            .ok_or_else(|| MapError::UnknownMap(name.to_owned()))?;
        let ir = decode_map_str_to_ir(json, Path::new(name), Path::new("."))?;
        Ok(MapContainer::from_ir(name, ir, config))
    }
}

/// Loaded maps keyed by logical name. Maps stay loaded until unloaded, so
/// walking back through a portal is free.
#[derive(Default)]
pub struct MapRegistry {
    maps: HashMap<String, MapContainer>,
}

impl MapRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the loaded map, loading it through `provider` on first use.
    pub fn load_or_get(
        &mut self,
        name: &str,
        provider: &dyn MapProvider,
        config: &AdventureConfig,
    ) -> Result<&mut MapContainer, MapError> {
        if !self.maps.contains_key(name) {
            info!(map = name, "loading map");
            let map = provider.load(name, config)?;
            self.maps.insert(name.to_owned(), map);
        } else {
            debug!(map = name, "map already loaded");
        }
        self.maps
            .get_mut(name)
            .ok_or_else(|| MapError::UnknownMap(name.to_owned()))
    }

    /// Insert a map built elsewhere, replacing any map with the same name.
    pub fn insert(&mut self, map: MapContainer) -> Option<MapContainer> {
        self.maps.insert(map.name.clone(), map)
    }

    /// Loaded map by name.
    pub fn get(&self, name: &str) -> Option<&MapContainer> {
        self.maps.get(name)
    }

    /// Mutable loaded map by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut MapContainer> {
        self.maps.get_mut(name)
    }

    /// Whether `name` is loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.maps.contains_key(name)
    }

    /// Drop one map.
    pub fn unload(&mut self, name: &str) -> Option<MapContainer> {
        let removed = self.maps.remove(name);
        if removed.is_some() {
            info!(map = name, "unloaded map");
        }
        removed
    }

    /// Drop every map.
    pub fn unload_all(&mut self) {
        self.maps.clear();
    }

    /// Number of loaded maps.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// True when nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Names of the loaded maps, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }
}

impl ObjectStore for MapRegistry {
    fn object_mut(&mut self, map: &str, id: ObjectId) -> Option<&mut GameObject> {
        self.maps.get_mut(map)?.object_mut(id)
    }
}
