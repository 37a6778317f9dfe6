use crate::actor::{CharacterSprites, Direction};
use crate::effects::EffectTarget;
use crate::ir_map::Properties;
use crate::movement::CollisionKind;
use crate::object::{ObjectId, ObjectKind};
use crate::session::GameSession;
use crate::spatial::TileId;
use macroquad::math::vec2;
use tracing::{debug, info, warn};

/// A collision raised by a mover during [`GameSession::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    /// Map the collision happened on
    pub map: String,
    /// Object that was moving
    pub mover: ObjectId,
    /// The object hit, `None` for static geometry
    pub object: Option<ObjectId>,
    /// Static or object
    pub kind: CollisionKind,
}

/// Game-specific reactions plugged into a [`GameSession`].
pub trait GameRules {
    /// Called once per collision counterpart, static geometry first.
    fn on_collision(&mut self, session: &mut GameSession, collision: &Collision);

    /// Called once per frame for every non-player actor of the active map.
    /// The default runs the actor's follow/avoid behavior.
    fn on_actor_update(&mut self, session: &mut GameSession, actor: ObjectId, dt: f32) {
        session.run_behavior(actor, dt);
    }
}

/// Treasure hunt: collect loot, avoid traps and enemies, walk through
/// portals. Going below zero gems kills the player.
#[derive(Debug, Clone, Default)]
pub struct ClassicRules {
    gems: i32,
    dialog: Option<String>,
    last_sound: Option<String>,
}

impl ClassicRules {
    /// Fresh game with no gems.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh game starting with `gems`.
    pub fn with_gems(gems: i32) -> Self {
        Self {
            gems,
            ..Self::default()
        }
    }

    /// Current gem count.
    pub fn gems(&self) -> i32 {
        self.gems
    }

    /// True once the gem count went negative.
    pub fn is_dead(&self) -> bool {
        self.gems < 0
    }

    /// Text of the open dialog, if any.
    pub fn dialog(&self) -> Option<&str> {
        self.dialog.as_deref()
    }

    /// Dismiss the open dialog.
    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// Last sound id requested by an object.
    pub fn last_sound(&self) -> Option<&str> {
        self.last_sound.as_deref()
    }

    /// Take the pending sound id, leaving none.
    pub fn take_sound(&mut self) -> Option<String> {
        self.last_sound.take()
    }

    /// Back to a fresh game. The session is reset separately.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn enter_portal(&mut self, session: &mut GameSession, portal_name: &str, props: &Properties) {
        let dest = props.get_string("map").unwrap_or(portal_name).to_owned();
        let map = match session.activate(&dest) {
            Ok(map) => map,
            Err(err) => {
                warn!(map = %dest, error = %err, "portal leads nowhere");
                return;
            }
        };
        let Some(player) = map.player_id() else {
            return;
        };
        if props.get_f32("pos_x").is_some() || props.get_f32("pos_y").is_some() {
            if let Some(obj) = map.object_mut(player) {
                obj.position = vec2(
                    props.float_or("pos_x", obj.position.x),
                    props.float_or("pos_y", obj.position.y),
                );
            }
        }
        if let Some(facing) = props.get_string("facing").and_then(Direction::parse) {
            map.face(player, facing);
        }
        info!(map = %dest, "entered portal");
    }

    fn spring_trap(&mut self, session: &mut GameSession, collision: &Collision, trap: ObjectId) {
        let delay = session.config().trap_reset_delay;
        let Some(map) = session.maps_mut().get_mut(&collision.map) else {
            return;
        };
        let Some(obj) = map.object_mut(trap) else {
            return;
        };
        // traps use a character row: south walking frame armed, still frame at rest
        let Some(sprites) = obj.sprite.and_then(CharacterSprites::from_gid) else {
            return;
        };
        if let Some(current) = obj.sprite {
            obj.sprite = Some(current.with_clean(sprites.gid_for(Direction::South, true)));
        }
        let rest = TileId(sprites.gid_for(Direction::South, false));
        session.schedule_effect(EffectTarget::new(collision.map.as_str(), trap), Some(rest), None, delay);
    }

    fn bump_mover(&self, session: &mut GameSession, collision: &Collision) {
        let distance = session.config().bump_distance;
        if let Some(map) = session.maps_mut().get_mut(&collision.map) {
            map.bump_back(collision.mover, distance);
        }
    }
}

impl GameRules for ClassicRules {
    fn on_collision(&mut self, session: &mut GameSession, collision: &Collision) {
        if self.is_dead() {
            return;
        }
        let Some(other) = collision.object else {
            debug!(map = %collision.map, mover = collision.mover.0, "bumped static");
            return;
        };
        let Some(map) = session.maps().get(&collision.map) else {
            return;
        };
        let Some(obj) = map.object(other) else {
            return;
        };
        let is_player = map.player_id() == Some(collision.mover);
        let (kind, name, props) = (obj.kind.clone(), obj.name.clone(), obj.properties.clone());

        if let Some(text) = props.get_string("text") {
            self.dialog = Some(text.to_owned());
        }
        if let Some(sound) = props.get_string("sound") {
            self.last_sound = Some(sound.to_owned());
        }
        if !is_player {
            return;
        }

        let value = props.int_or("value", 1);
        match kind {
            ObjectKind::Portal => self.enter_portal(session, &name, &props),
            ObjectKind::Loot => {
                if let Some(obj) = session.maps_mut().get_mut(&collision.map).and_then(|m| m.object_mut(other)) {
                    obj.visible = false;
                }
                self.gems += value;
                info!(gems = self.gems, "picked up loot");
            }
            ObjectKind::Trap => {
                self.gems -= value;
                self.spring_trap(session, collision, other);
                self.bump_mover(session, collision);
            }
            ObjectKind::Enemy => {
                self.gems -= value;
                self.bump_mover(session, collision);
            }
            ObjectKind::Other(_) => {}
        }

        if self.is_dead() {
            info!(gems = self.gems, "player died");
        }
    }
}
