use crate::object::{GameObject, ObjectId};
use crate::spatial::TileId;
use macroquad::math::Vec2;
use tracing::{debug, warn};

/// Object an effect lands on: maps stay loaded across portal switches, so
/// the map is part of the address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectTarget {
    /// Registry key of the owning map
    pub map: String,
    /// Object inside that map
    pub object: ObjectId,
}

impl EffectTarget {
    /// Address `object` on `map`.
    pub fn new(map: impl Into<String>, object: ObjectId) -> Self {
        Self {
            map: map.into(),
            object,
        }
    }
}

/// A pending mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayedEffect {
    /// Object to mutate
    pub target: EffectTarget,
    /// New sprite, `None` leaves it alone
    pub sprite: Option<TileId>,
    /// New top-left position, `None` leaves it alone
    pub position: Option<Vec2>,
    /// Queue clock value at which the effect fires
    pub fire_at: f64,
}

/// Anything that can hand out objects by map and id.
pub trait ObjectStore {
    /// Mutable object lookup; `None` when the map or object is gone.
    fn object_mut(&mut self, map: &str, id: ObjectId) -> Option<&mut GameObject>;
}

/// Time-ordered set of delayed object mutations driven by a monotonic clock.
///
/// There is no deduplication: a target mutated again before its effect
/// fires still receives the scheduled mutation. Use [`EffectQueue::cancel`]
/// to drop it.
#[derive(Debug, Default)]
pub struct EffectQueue {
    clock: f64,
    pending: Vec<DelayedEffect>,
}

impl EffectQueue {
    /// Empty queue at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds accumulated by [`advance`](Self::advance).
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Number of effects still waiting.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending effects in scheduling order.
    pub fn pending(&self) -> &[DelayedEffect] {
        &self.pending
    }

    /// Queue a mutation `delay` seconds from now. A zero sprite counts as
    /// "no sprite change". Returns `false` when the effect was dropped.
    pub fn schedule(
        &mut self,
        target: EffectTarget,
        sprite: Option<TileId>,
        position: Option<Vec2>,
        delay: f32,
    ) -> bool {
        let sprite = sprite.filter(|s| !s.is_empty());
        if self.pending.try_reserve(1).is_err() {
            warn!(map = %target.map, object = target.object.0, "effect queue is out of memory, dropping effect");
            return false;
        }
        let fire_at = self.clock + f64::from(delay.max(0.0));
        debug!(map = %target.map, object = target.object.0, ?sprite, ?position, fire_at, "scheduled effect");
        self.pending.push(DelayedEffect {
            target,
            sprite,
            position,
            fire_at,
        });
        true
    }

    /// Remove every pending effect for `target`, returning how many were dropped.
    pub fn cancel(&mut self, target: &EffectTarget) -> usize {
        let before = self.pending.len();
        self.pending.retain(|e| &e.target != target);
        before - self.pending.len()
    }

    /// Drop everything, keeping the clock.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Move the clock forward and apply each effect that is due, once.
    /// Returns the number of effects that reached a live object.
    pub fn advance(&mut self, dt: f32, store: &mut impl ObjectStore) -> usize {
        self.clock += f64::from(dt.max(0.0));
        let now = self.clock;

        // due effects are applied and dropped in place, in scheduling order
        let mut applied = 0;
        self.pending.retain(|effect| {
            if effect.fire_at > now {
                return true;
            }
            if apply(effect, store) {
                applied += 1;
            }
            false
        });
        applied
    }
}

fn apply(effect: &DelayedEffect, store: &mut impl ObjectStore) -> bool {
    let Some(obj) = store.object_mut(&effect.target.map, effect.target.object) else {
        debug!(map = %effect.target.map, object = effect.target.object.0, "effect target is gone");
        return false;
    };
    if let Some(sprite) = effect.sprite {
        obj.sprite = Some(match obj.sprite {
            Some(current) => current.with_clean(sprite.clean()),
            None => sprite,
        });
    }
    if let Some(position) = effect.position {
        obj.position = position;
    }
    true
}
