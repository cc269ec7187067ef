//! Collectibles left by dead enemies: XP gems, health pickups and chests.
//!
//! ## Flow
//!
//! 1. The collision pass hands each kill's [`DropDescriptor`] to
//!    [`DropManager::spawn_from_enemy`]: one gem always, plus independent rolls
//!    for a health pickup and a chest, each jittered off the gem.
//! 2. Every tick [`DropManager::update`] checks each drop against the player.
//!    Gems and pickups inside the pickup radius become *magnetized* (sticky)
//!    and fly toward the player, faster the closer they are.
//! 3. A drop within the collect distance at the start of an update is paid
//!    out; chests never magnetize and are collected only by direct proximity.

use crate::config::DropConfig;
use crate::constants::{
    CHEST_COLLECT_MARGIN, CHEST_DROP_JITTER, CHEST_SIZE, GEM_LARGE_THRESHOLD,
    GEM_MEDIUM_THRESHOLD, HEALTH_DROP_JITTER,
};
use crate::enemy::DropDescriptor;
use bevy::log::debug;
use bevy::math::Vec2;
use rand::Rng;

/// Visual size class of an XP gem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GemTier {
    Small,
    Medium,
    Large,
}

impl GemTier {
    pub fn for_value(value: u32) -> Self {
        if value >= GEM_LARGE_THRESHOLD {
            GemTier::Large
        } else if value >= GEM_MEDIUM_THRESHOLD {
            GemTier::Medium
        } else {
            GemTier::Small
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropKind {
    XpGem { value: u32, tier: GemTier },
    Health { amount: f32 },
    Chest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropItem {
    pub kind: DropKind,
    pub pos: Vec2,
    pub magnetized: bool,
}

impl DropItem {
    fn new(kind: DropKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            magnetized: false,
        }
    }

    pub fn is_chest(&self) -> bool {
        matches!(self.kind, DropKind::Chest)
    }
}

/// What the player picked up during one update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Collected {
    /// Raw gem value, before the XP multiplier.
    pub xp: u32,
    pub heal: f32,
    pub chests: u32,
    /// Number of gems and health pickups collected.
    pub pickups: u32,
}

impl Collected {
    pub fn is_empty(&self) -> bool {
        self.xp == 0 && self.heal == 0.0 && self.chests == 0 && self.pickups == 0
    }
}

#[derive(Debug, Clone)]
pub struct DropManager {
    config: DropConfig,
    drops: Vec<DropItem>,
}

impl DropManager {
    pub fn new(config: DropConfig) -> Self {
        Self {
            config,
            drops: Vec::new(),
        }
    }

    pub fn drops(&self) -> &[DropItem] {
        &self.drops
    }

    pub fn len(&self) -> usize {
        self.drops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    pub fn clear(&mut self) {
        self.drops.clear();
    }

    pub fn spawn_gem(&mut self, pos: Vec2, value: u32) {
        let tier = GemTier::for_value(value);
        self.drops.push(DropItem::new(DropKind::XpGem { value, tier }, pos));
    }

    pub fn spawn_health(&mut self, pos: Vec2) {
        let amount = self.config.health_pickup_value;
        self.drops.push(DropItem::new(DropKind::Health { amount }, pos));
    }

    pub fn spawn_chest(&mut self, pos: Vec2) {
        self.drops.push(DropItem::new(DropKind::Chest, pos));
    }

    /// Gem at the kill position plus the random health and chest rolls.
    pub fn spawn_from_enemy<R: Rng + ?Sized>(&mut self, desc: &DropDescriptor, rng: &mut R) {
        self.spawn_gem(desc.pos, desc.xp_value);
        if rng.gen::<f64>() < self.config.health_drop_chance {
            self.spawn_health(desc.pos + jitter(HEALTH_DROP_JITTER, rng));
        }
        if rng.gen::<f64>() < self.config.chest_drop_chance {
            debug!("chest dropped by {:?}", desc.kind);
            self.spawn_chest(desc.pos + jitter(CHEST_DROP_JITTER, rng));
        }
    }

    /// Magnetize, move and collect against the player.
    pub fn update(&mut self, dt: f32, player_pos: Vec2, pickup_radius: f32) -> Collected {
        let collect = self.config.collect_distance;
        let speed = self.config.magnet_speed;
        let mut out = Collected::default();

        self.drops.retain_mut(|drop| {
            let offset = player_pos - drop.pos;
            let dist = offset.length();

            if drop.is_chest() {
                if dist <= CHEST_SIZE + CHEST_COLLECT_MARGIN {
                    out.chests += 1;
                    return false;
                }
                return true;
            }

            if dist <= collect {
                match drop.kind {
                    DropKind::XpGem { value, .. } => out.xp += value,
                    DropKind::Health { amount } => out.heal += amount,
                    DropKind::Chest => {}
                }
                out.pickups += 1;
                return false;
            }

            if dist <= pickup_radius {
                drop.magnetized = true;
            }
            if drop.magnetized {
                let closeness = if pickup_radius > 0.0 {
                    (pickup_radius - dist).max(0.0) / pickup_radius
                } else {
                    0.0
                };
                let step = (speed * (1.0 + closeness) * dt).min(dist);
                drop.pos += offset / dist * step;
            }
            true
        });

        out
    }
}

fn jitter<R: Rng + ?Sized>(extent: f32, rng: &mut R) -> Vec2 {
    Vec2::new(
        rng.gen_range(-extent..=extent),
        rng.gen_range(-extent..=extent),
    )
}
