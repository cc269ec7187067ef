//! Hostile actors: per-type stats, seek movement, knockback, and the
//! generation-checked arena that owns them.
//!
//! Enemies live in an [`EnemyArena`] rather than a plain `Vec` so that attack
//! effects can remember which enemies they already hit by [`EnemyId`].  A slot
//! freed by a dead enemy is reused for the next spawn, but with a bumped
//! generation, so a stale id never aliases the newcomer.

use crate::config::EnemyProfile;
use crate::constants::{
    DAMAGE_SCALE_RATIO, ENEMY_CONTACT_COOLDOWN, ENEMY_HITBOX_INSET, KNOCKBACK_DURATION,
    KNOCKBACK_SPEED, PHASE_ALPHA_MAX, PHASE_ALPHA_MIN, PHASE_ALPHA_SPEED, ZIGZAG_BIAS,
    ZIGZAG_FLIP_SECS,
};
use crate::geometry::{safe_normalize, Aabb};
use bevy::log::warn;
use bevy::math::Vec2;
use serde::Deserialize;

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnemyKind {
    Chaser,
    Tank,
    Swarm,
    Ghost,
    Bat,
    Boss,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Chaser,
        EnemyKind::Tank,
        EnemyKind::Swarm,
        EnemyKind::Ghost,
        EnemyKind::Bat,
        EnemyKind::Boss,
    ];

    /// Kinds the regular spawner may pick (the boss has its own timer).
    pub const REGULAR: [EnemyKind; 5] = [
        EnemyKind::Chaser,
        EnemyKind::Tank,
        EnemyKind::Swarm,
        EnemyKind::Ghost,
        EnemyKind::Bat,
    ];

    pub fn id(self) -> &'static str {
        match self {
            EnemyKind::Chaser => "chaser",
            EnemyKind::Tank => "tank",
            EnemyKind::Swarm => "swarm",
            EnemyKind::Ghost => "ghost",
            EnemyKind::Bat => "bat",
            EnemyKind::Boss => "boss",
        }
    }

    pub fn parse_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    /// Lenient lookup: unknown ids become [`EnemyKind::Chaser`].
    pub fn from_id(id: &str) -> Self {
        Self::parse_id(id).unwrap_or_else(|| {
            warn!("unknown enemy id '{id}', falling back to chaser");
            EnemyKind::Chaser
        })
    }
}

/// Render-only outline hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyShape {
    #[default]
    Circle,
    Square,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMovement {
    /// Sways side to side while approaching.
    Zigzag,
    /// Fades in and out (visual only).
    Phase,
}

/// Stable handle to an arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId {
    pub index: u32,
    pub generation: u32,
}

/// Position and payout captured from an enemy at the moment it died.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropDescriptor {
    pub pos: Vec2,
    pub xp_value: u32,
    pub kind: EnemyKind,
}

/// Round half up, applied to every difficulty-scaled stat.
pub fn scale_stat(base: f32, multiplier: f64) -> f32 {
    (base as f64 * multiplier + 0.5).floor() as f32
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub direction: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub xp_value: u32,
    /// Half-extent of the body box.
    pub size: f32,
    pub shape: EnemyShape,
    pub special: Option<SpecialMovement>,
    /// Seconds until this enemy may hurt the player again.
    pub contact_cooldown: f32,
    pub knockback: Vec2,
    pub knockback_timer: f32,
    zigzag_timer: f32,
    zigzag_sign: f32,
    /// Render alpha for phasing enemies, 255 otherwise.
    pub alpha: f32,
    alpha_dir: f32,
    /// Set when damaged; cleared on the next update.
    pub flash: bool,
}

impl Enemy {
    /// Build an enemy from its base profile scaled by `difficulty`.
    ///
    /// HP scales with the full multiplier, damage with half of the excess.
    pub fn new(kind: EnemyKind, profile: &EnemyProfile, pos: Vec2, difficulty: f64) -> Self {
        let hp = scale_stat(profile.hp, difficulty).max(1.0);
        let damage = scale_stat(profile.damage, 1.0 + (difficulty - 1.0) * DAMAGE_SCALE_RATIO);
        Self {
            kind,
            pos,
            direction: Vec2::ZERO,
            hp,
            max_hp: hp,
            damage,
            speed: profile.speed,
            xp_value: profile.xp_value,
            size: profile.size,
            shape: profile.shape,
            special: profile.special,
            contact_cooldown: 0.0,
            knockback: Vec2::ZERO,
            knockback_timer: 0.0,
            zigzag_timer: 0.0,
            zigzag_sign: 1.0,
            alpha: PHASE_ALPHA_MAX,
            alpha_dir: -1.0,
            flash: false,
        }
    }

    #[inline]
    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        }
    }

    /// Full body box, used for weapon hits.
    pub fn body(&self) -> Aabb {
        Aabb::square(self.pos, self.size)
    }

    /// Slightly shrunk box, used for contact damage against the player.
    pub fn hitbox(&self) -> Aabb {
        Aabb::square(self.pos, (self.size - ENEMY_HITBOX_INSET).max(1.0))
    }

    pub fn can_damage(&self) -> bool {
        self.contact_cooldown <= 0.0
    }

    pub fn reset_contact_cooldown(&mut self) {
        self.contact_cooldown = ENEMY_CONTACT_COOLDOWN;
    }

    /// Apply `amount` damage and shove the enemy along `push`.
    ///
    /// A zero `push` skips the knockback.  Returns `true` if this hit killed it.
    pub fn take_damage(&mut self, amount: f32, push: Vec2) -> bool {
        let was_alive = !self.is_dead();
        self.hp -= amount;
        let dir = safe_normalize(push);
        if dir != Vec2::ZERO {
            self.knockback = dir * KNOCKBACK_SPEED;
            self.knockback_timer = KNOCKBACK_DURATION;
        }
        self.flash = true;
        was_alive && self.is_dead()
    }

    /// Advance movement and timers by `dt`.
    pub fn update(&mut self, dt: f32, player_pos: Vec2, world: Vec2) {
        self.flash = false;

        let to_player = player_pos - self.pos;
        if to_player != Vec2::ZERO {
            self.direction = safe_normalize(to_player);
        }

        if self.special == Some(SpecialMovement::Zigzag) {
            self.zigzag_timer += dt;
            if self.zigzag_timer >= ZIGZAG_FLIP_SECS {
                self.zigzag_timer = 0.0;
                self.zigzag_sign = -self.zigzag_sign;
            }
            let swayed = self.direction + self.direction.perp() * ZIGZAG_BIAS * self.zigzag_sign;
            self.direction = safe_normalize(swayed);
        }

        let movement = if self.knockback_timer > 0.0 {
            self.knockback_timer -= dt;
            self.knockback * dt
        } else {
            self.knockback = Vec2::ZERO;
            self.direction * self.speed * dt
        };
        self.pos += movement;

        let lo = Vec2::splat(self.size);
        let hi = (world - lo).max(lo);
        self.pos = self.pos.clamp(lo, hi);

        if self.contact_cooldown > 0.0 {
            self.contact_cooldown -= dt;
        }

        if self.special == Some(SpecialMovement::Phase) {
            self.alpha += self.alpha_dir * PHASE_ALPHA_SPEED * dt;
            if self.alpha <= PHASE_ALPHA_MIN {
                self.alpha = PHASE_ALPHA_MIN;
                self.alpha_dir = 1.0;
            } else if self.alpha >= PHASE_ALPHA_MAX {
                self.alpha = PHASE_ALPHA_MAX;
                self.alpha_dir = -1.0;
            }
        }
    }

    pub fn drop_descriptor(&self) -> DropDescriptor {
        DropDescriptor {
            pos: self.pos,
            xp_value: self.xp_value,
            kind: self.kind,
        }
    }
}

// ── Arena ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    enemy: Option<Enemy>,
}

/// Slot-reusable enemy storage.  Iteration is always in slot order.
#[derive(Debug, Clone, Default)]
pub struct EnemyArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl EnemyArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, enemy: Enemy) -> EnemyId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.enemy = Some(enemy);
            EnemyId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                enemy: Some(enemy),
            });
            EnemyId {
                index,
                generation: 0,
            }
        }
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.enemy.as_ref())
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.enemy.as_mut())
    }

    pub fn contains(&self, id: EnemyId) -> bool {
        self.get(id).is_some()
    }

    /// Remove and return the enemy; the slot's generation is bumped.
    pub fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let enemy = slot.enemy.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(enemy)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (EnemyId, &Enemy)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.enemy.as_ref().map(|e| {
                (
                    EnemyId {
                        index: i as u32,
                        generation: s.generation,
                    },
                    e,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EnemyId, &mut Enemy)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let generation = s.generation;
            s.enemy.as_mut().map(|e| {
                (
                    EnemyId {
                        index: i as u32,
                        generation,
                    },
                    e,
                )
            })
        })
    }

    pub fn ids(&self) -> Vec<EnemyId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Nearest live enemy to `pos`; ties go to the lower slot.
    pub fn nearest(&self, pos: Vec2) -> Option<(EnemyId, &Enemy)> {
        let mut best: Option<(EnemyId, &Enemy, f32)> = None;
        for (id, e) in self.iter() {
            let d = e.pos.distance_squared(pos);
            if best.as_ref().is_none_or(|(_, _, bd)| d < *bd) {
                best = Some((id, e, d));
            }
        }
        best.map(|(id, e, _)| (id, e))
    }
}
