use crate::actor::Behavior;
use crate::camera::compute_camera;
use crate::config::AdventureConfig;
use crate::effects::{EffectQueue, EffectTarget};
use crate::error::MapError;
use crate::map::MapContainer;
use crate::movement::{Approach, CollisionKind, MoveOutcome};
use crate::object::ObjectId;
use crate::registry::{MapProvider, MapRegistry};
use crate::rules::{Collision, GameRules};
use crate::spatial::TileId;
use macroquad::math::Vec2;
use tracing::{debug, info};

/// What one [`GameSession::update`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Player move resolution
    pub outcome: MoveOutcome,
    /// Collisions dispatched to the rules, in dispatch order
    pub collisions: Vec<Collision>,
    /// Active map after the frame
    pub map: Option<String>,
    /// Camera offset after the frame
    pub camera: Vec2,
    /// Delayed effects applied this frame
    pub effects_fired: usize,
}

/// All runtime state of one play session: loaded maps, the active map,
/// pending effects and the camera.
pub struct GameSession {
    config: AdventureConfig,
    provider: Box<dyn MapProvider>,
    maps: MapRegistry,
    active: Option<String>,
    effects: EffectQueue,
    camera: Vec2,
}

impl GameSession {
    /// New session with nothing loaded.
    pub fn new(config: AdventureConfig, provider: impl MapProvider + 'static) -> Self {
        Self {
            config,
            provider: Box::new(provider),
            maps: MapRegistry::new(),
            active: None,
            effects: EffectQueue::new(),
            camera: Vec2::ZERO,
        }
    }

    /// Session tunables.
    pub fn config(&self) -> &AdventureConfig {
        &self.config
    }

    /// Loaded maps.
    pub fn maps(&self) -> &MapRegistry {
        &self.maps
    }

    /// Loaded maps, mutably.
    pub fn maps_mut(&mut self) -> &mut MapRegistry {
        &mut self.maps
    }

    /// Load `name` without activating it.
    pub fn load(&mut self, name: &str) -> Result<&mut MapContainer, MapError> {
        self.maps.load_or_get(name, self.provider.as_ref(), &self.config)
    }

    /// Load `name` if needed and make it the active map.
    pub fn activate(&mut self, name: &str) -> Result<&mut MapContainer, MapError> {
        if self.active.as_deref() != Some(name) {
            info!(from = ?self.active, to = name, "switching map");
        }
        let map = self.maps.load_or_get(name, self.provider.as_ref(), &self.config)?;
        self.active = Some(name.to_owned());
        Ok(map)
    }

    /// Name of the active map.
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active map.
    pub fn active_map(&self) -> Option<&MapContainer> {
        self.maps.get(self.active.as_deref()?)
    }

    /// The active map, mutably.
    pub fn active_map_mut(&mut self) -> Option<&mut MapContainer> {
        let name = self.active.as_deref()?;
        self.maps.get_mut(name)
    }

    /// Unload `name`; unloading the active map leaves no map active.
    pub fn unload(&mut self, name: &str) -> bool {
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        self.maps.unload(name).is_some()
    }

    /// Throw away every map and pending effect and start over on the
    /// configured start map.
    pub fn reset(&mut self) -> Result<&mut MapContainer, MapError> {
        info!(start = %self.config.start_map, "resetting session");
        self.maps.unload_all();
        self.effects.clear();
        self.active = None;
        self.camera = Vec2::ZERO;
        let start = self.config.start_map.clone();
        self.activate(&start)
    }

    /// Pending delayed effects.
    pub fn effects(&self) -> &EffectQueue {
        &self.effects
    }

    /// Pending delayed effects, mutably (e.g. to cancel).
    pub fn effects_mut(&mut self) -> &mut EffectQueue {
        &mut self.effects
    }

    /// Queue a sprite and/or position change `delay` seconds from now.
    pub fn schedule_effect(
        &mut self,
        target: EffectTarget,
        sprite: Option<TileId>,
        position: Option<Vec2>,
        delay: f32,
    ) -> bool {
        self.effects.schedule(target, sprite, position, delay)
    }

    /// Camera offset computed by the last update.
    pub fn camera_offset(&self) -> Vec2 {
        self.camera
    }

    /// Run one frame: move the player by `displacement` (already scaled by
    /// speed and `dt`), dispatch its collisions, update the other actors,
    /// fire due effects and recompute the camera.
    pub fn update<R: GameRules + ?Sized>(&mut self, rules: &mut R, displacement: Vec2, dt: f32) -> FrameReport {
        let policy = self.config.move_policy;
        let mut collisions = Vec::new();
        let mut outcome = MoveOutcome::idle();

        if let Some(map_name) = self.active.clone() {
            if let Some(map) = self.maps.get_mut(&map_name) {
                if let Some(player) = map.player_id() {
                    map.steer(player, displacement);
                    outcome = map.move_actor(player, displacement, policy);
                    if outcome.hit_tile {
                        collisions.push(Collision {
                            map: map_name.clone(),
                            mover: player,
                            object: None,
                            kind: CollisionKind::Tile,
                        });
                    }
                    if let Some(other) = outcome.hit_object {
                        collisions.push(Collision {
                            map: map_name.clone(),
                            mover: player,
                            object: Some(other),
                            kind: CollisionKind::Object,
                        });
                    }
                }
            }

            for collision in &collisions {
                debug!(map = %collision.map, mover = collision.mover.0, other = ?collision.object, "collision");
                rules.on_collision(self, collision);
            }
        }

        // rules may have switched maps
        let actor_ids: Vec<ObjectId> = self
            .active_map()
            .map(|m| m.actors.iter().map(|a| a.object).collect())
            .unwrap_or_default();
        for id in actor_ids {
            rules.on_actor_update(self, id, dt);
        }

        let effects_fired = self.effects.advance(dt, &mut self.maps);

        let viewport = self.config.viewport();
        // without a player the camera stays where it was
        if let Some(map) = self.active_map() {
            if let Some(focus) = map.player_position() {
                self.camera = compute_camera(viewport, map.pixel_size(), focus);
            }
        }

        FrameReport {
            outcome,
            collisions,
            map: self.active.clone(),
            camera: self.camera,
            effects_fired,
        }
    }

    /// Default non-player behavior: follow or avoid the active map's player
    /// while it is within the actor's awareness radius.
    pub fn run_behavior(&mut self, id: ObjectId, dt: f32) -> Vec2 {
        let policy = self.config.move_policy;
        let Some(map) = self.active_map_mut() else {
            return Vec2::ZERO;
        };
        let Some(target) = map.player_position() else {
            return Vec2::ZERO;
        };
        let Some(actor) = map.actor(id) else {
            return Vec2::ZERO;
        };
        let approach = match actor.behavior {
            Behavior::Idle => return Vec2::ZERO,
            Behavior::Follow => Approach::Toward,
            Behavior::Avoid => Approach::Away,
        };
        let (speed, radius) = (actor.speed * dt, actor.awareness);
        map.move_if_aware(id, target, speed, radius, approach, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InlineMapProvider;
    use macroquad::math::vec2;

    // 4x4 map of 16px tiles, wall along the right column
    const ROOM: &str = r#"{
      "tilewidth": 16, "tileheight": 16, "width": 4, "height": 4,
      "tilesets": [{"firstgid":1,"name":"t","image":"t.png","tilewidth":16,"tileheight":16,"tilecount":4,"columns":2}],
      "layers": [
        {"type":"tilelayer","name":"collisions","width":4,"height":4,
         "data":[0,0,0,1, 0,0,0,1, 0,0,0,1, 0,0,0,1]},
        {"type":"objectgroup","name":"objects","objects":[
          {"id":1,"name":"player","x":16,"y":16,"width":16,"height":16},
          {"id":2,"name":"gem","type":"loot","x":0,"y":32,"width":16,"height":16}
        ]}
      ]
    }"#;

    #[derive(Default)]
    struct Recorder(Vec<Collision>);

    impl GameRules for Recorder {
        fn on_collision(&mut self, _session: &mut GameSession, collision: &Collision) {
            self.0.push(collision.clone());
        }
    }

    fn session() -> GameSession {
        GameSession::new(AdventureConfig::default(), InlineMapProvider::new().with_map("main", ROOM))
    }

    #[test]
    fn activate_and_reset() {
        let mut s = session();
        assert!(s.active_map().is_none());
        s.activate("main").expect("activate");
        assert_eq!(s.active_name(), Some("main"));

        s.active_map_mut().and_then(|m| m.object_mut(ObjectId(1))).expect("player").position = vec2(0.0, 0.0);
        s.reset().expect("reset");
        assert_eq!(s.active_map().and_then(|m| m.player_position()), Some(vec2(16.0, 16.0)));
        assert!(matches!(s.activate("nowhere"), Err(MapError::UnknownMap(_))));
        assert_eq!(s.active_name(), Some("main"));
    }

    #[test]
    fn update_reports_wall_collision() {
        let mut s = session();
        s.activate("main").expect("activate");
        let mut rules = Recorder::default();
        // hitbox right edge is at 28; the wall column starts at 48
        let report = s.update(&mut rules, vec2(24.0, 0.0), 0.1);
        assert!(report.outcome.hit_tile);
        assert_eq!(report.outcome.applied, Vec2::ZERO);
        assert_eq!(rules.0.len(), 1);
        assert_eq!(rules.0[0].kind, CollisionKind::Tile);
        assert_eq!(report.map.as_deref(), Some("main"));
    }

    #[test]
    fn update_without_active_map_only_ticks_effects() {
        let mut s = session();
        s.schedule_effect(EffectTarget::new("main", ObjectId(2)), None, Some(Vec2::ZERO), 0.0);
        let report = s.update(&mut Recorder::default(), vec2(1.0, 0.0), 0.1);
        assert_eq!(report.outcome, MoveOutcome::idle());
        // the map is not loaded, so the effect is consumed without landing
        assert_eq!(report.effects_fired, 0);
        assert!(s.effects().is_empty());
    }

    #[test]
    fn camera_stays_at_origin_on_small_maps() {
        let mut s = session();
        s.activate("main").expect("activate");
        let report = s.update(&mut Recorder::default(), vec2(0.0, 4.0), 0.1);
        assert_eq!(report.camera, Vec2::ZERO);
        assert_eq!(s.camera_offset(), Vec2::ZERO);
    }

    #[test]
    fn camera_holds_when_the_player_is_gone() {
        let plain = r#"{
          "tilewidth": 16, "tileheight": 16, "width": 40, "height": 40,
          "layers": [{"type":"objectgroup","name":"objects","objects":[
            {"id":1,"name":"player","x":320,"y":240,"width":16,"height":16}
          ]}]
        }"#;
        let mut s = GameSession::new(AdventureConfig::default(), InlineMapProvider::new().with_map("plain", plain));
        s.activate("plain").expect("activate");
        let report = s.update(&mut Recorder::default(), Vec2::ZERO, 0.1);
        assert_eq!(report.camera, vec2(160.0, 120.0));

        s.active_map_mut().expect("map").player = None;
        let report = s.update(&mut Recorder::default(), vec2(4.0, 0.0), 0.1);
        assert_eq!(report.outcome, MoveOutcome::idle());
        assert_eq!(report.camera, vec2(160.0, 120.0));
    }
}
