//! Persistent damage aura carried by the garlic.
//!
//! The aura keeps its own clock and remembers, per enemy, when it last dealt
//! damage.  An enemy inside the radius is hurt again only once `tick_rate`
//! seconds have passed since its previous tick; entries idle for twice the
//! tick rate are dropped.

use crate::constants::AURA_TIMER_PRUNE_FACTOR;
use crate::enemy::{EnemyArena, EnemyId};
use bevy::math::Vec2;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct GarlicAura {
    pub radius: f32,
    pub damage: f32,
    pub tick_rate: f32,
    clock: f32,
    last_tick: HashMap<EnemyId, f32>,
}

impl GarlicAura {
    pub fn new(radius: f32, damage: f32, tick_rate: f32) -> Self {
        Self {
            radius,
            damage,
            tick_rate,
            clock: 0.0,
            last_tick: HashMap::new(),
        }
    }

    /// Advance the aura clock and prune idle per-enemy timers.
    pub fn advance(&mut self, dt: f32) {
        self.clock += dt;
        let horizon = self.tick_rate * AURA_TIMER_PRUNE_FACTOR;
        let now = self.clock;
        self.last_tick.retain(|_, t| now - *t < horizon);
    }

    /// Enemies whose centre is within the radius of `center`, in slot order.
    pub fn enemies_in_range(&self, center: Vec2, enemies: &EnemyArena) -> Vec<EnemyId> {
        let r2 = self.radius * self.radius;
        enemies
            .iter()
            .filter(|(_, e)| e.pos.distance_squared(center) <= r2)
            .map(|(id, _)| id)
            .collect()
    }

    /// Whether `id` is due a tick now; records the tick when it is.
    pub fn try_tick(&mut self, id: EnemyId) -> bool {
        match self.last_tick.get(&id) {
            Some(&t) if self.clock - t < self.tick_rate => false,
            _ => {
                self.last_tick.insert(id, self.clock);
                true
            }
        }
    }

    pub fn tracked(&self) -> usize {
        self.last_tick.len()
    }
}
