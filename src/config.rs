use crate::movement::MovePolicy;
use anyhow::Context;
use macroquad::math::{vec2, Rect, Vec2};
use serde::Deserialize;
use std::path::Path;

/// Hitbox relative to an actor's origin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HitboxConfig {
    /// Offset from the sprite's left edge
    pub x: f32,
    /// Offset from the sprite's top edge
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Default for HitboxConfig {
    // on a 16x16 character tile this is the body, below the head
    fn default() -> Self {
        Self {
            x: 4.0,
            y: 8.0,
            width: 8.0,
            height: 8.0,
        }
    }
}

impl HitboxConfig {
    /// As a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Tunables for a game session. Every field has a default, so an empty JSON
/// object is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdventureConfig {
    /// Player speed, pixels per second
    pub player_speed: f32,
    /// Player collision box
    pub player_hitbox: HitboxConfig,
    /// Default speed of non-player actors, pixels per second
    pub npc_speed: f32,
    /// Default awareness radius of non-player actors, in tiles
    pub awareness_radius: u32,
    /// Name of the object layer
    pub objects_layer: String,
    /// Name of the collision tile layer
    pub collisions_layer: String,
    /// Name of the player object
    pub player_name: String,
    /// Collision policy for every mover
    pub move_policy: MovePolicy,
    /// Viewport width in pixels
    pub viewport_width: f32,
    /// Viewport height in pixels
    pub viewport_height: f32,
    /// Knock-back distance for traps and enemies, pixels
    pub bump_distance: f32,
    /// Seconds before a sprung trap shows its idle frame again
    pub trap_reset_delay: f32,
    /// Map file extension used by the file provider
    pub map_extension: String,
    /// Map loaded when a session starts or restarts
    pub start_map: String,
}

impl Default for AdventureConfig {
    fn default() -> Self {
        Self {
            player_speed: 200.0,
            player_hitbox: HitboxConfig::default(),
            npc_speed: 40.0,
            awareness_radius: 5,
            objects_layer: "objects".to_owned(),
            collisions_layer: "collisions".to_owned(),
            player_name: "player".to_owned(),
            move_policy: MovePolicy::AxisFallback,
            viewport_width: 320.0,
            viewport_height: 240.0,
            bump_distance: 8.0,
            trap_reset_delay: 0.4,
            map_extension: "tmj".to_owned(),
            start_map: "main".to_owned(),
        }
    }
}

impl AdventureConfig {
    /// Parse from JSON text.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Parsing adventure config")
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        Self::from_json_str(&txt).with_context(|| format!("Loading config {}", path.display()))
    }

    /// Viewport size as a vector.
    pub fn viewport(&self) -> Vec2 {
        vec2(self.viewport_width, self.viewport_height)
    }
}
