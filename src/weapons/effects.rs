//! Attack effects: the physical result of a weapon firing.
//!
//! Three motion models cover the four discrete attacks:
//!
//! | Effect | Motion | Hitbox half-extents |
//! |--------|--------|---------------------|
//! | wand shot | straight or homing, `speed` u/s | `6 · size` square |
//! | knife | straight, `speed` u/s | 10 × 4 blade rotated to its heading, `· size` |
//! | axe | ballistic arc + spin | `12 · size` square |
//! | whip swing | anchored beside the player | `width/2 × height/2` |
//!
//! The garlic aura is not an effect; it lives on its weapon (see
//! [`super::aura`]).

use super::WeaponKind;
use crate::constants::{HOMING_STEER, UNLIMITED_PIERCE};
use crate::enemy::{EnemyArena, EnemyId};
use crate::geometry::{safe_normalize, Aabb};
use bevy::math::Vec2;
use std::collections::HashSet;

pub const WAND_RADIUS: f32 = 6.0;
pub const WAND_LIFETIME: f32 = 3.0;
pub const KNIFE_HALF_LENGTH: f32 = 10.0;
pub const KNIFE_HALF_WIDTH: f32 = 4.0;
pub const KNIFE_LIFETIME: f32 = 2.0;
pub const AXE_RADIUS: f32 = 12.0;
pub const AXE_LIFETIME: f32 = 3.0;
pub const AXE_LAUNCH_VERTICAL_SPEED: f32 = -300.0;
pub const AXE_GRAVITY: f32 = 400.0;
pub const AXE_SPIN_DEG_PER_SEC: f32 = 720.0;
pub const WHIP_BASE_WIDTH: f32 = 100.0;
pub const WHIP_BASE_HEIGHT: f32 = 30.0;
pub const WHIP_REACH: f32 = 40.0;
pub const WHIP_LIFETIME: f32 = 0.2;

/// Remaining distinct-hit budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pierce {
    Limited(u32),
    Unlimited,
}

impl Pierce {
    /// Config values at or above the unlimited sentinel never run out.
    pub fn from_config(base: u32) -> Self {
        if base >= UNLIMITED_PIERCE {
            Pierce::Unlimited
        } else {
            Pierce::Limited(base.max(1))
        }
    }

    pub fn exhausted(&self) -> bool {
        matches!(self, Pierce::Limited(0))
    }

    fn consume(&mut self) {
        if let Pierce::Limited(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Flies along `direction`; steers toward `target` while it lives.
    Projectile {
        speed: f32,
        homing: bool,
        target: Option<EnemyId>,
    },
    /// Horizontal drift plus a vertical launch decaying under gravity.
    Arc {
        horizontal_speed: f32,
        vertical_speed: f32,
    },
    /// Stays where it was spawned.
    Anchored,
}

#[derive(Debug, Clone)]
pub struct AttackEffect {
    pub source: WeaponKind,
    pub pos: Vec2,
    pub direction: Vec2,
    pub damage: f32,
    pub pierce: Pierce,
    pub age: f32,
    pub lifetime: f32,
    /// Hitbox half-extents before any heading rotation.
    pub half: Vec2,
    /// Visual rotation in degrees.
    pub rotation: f32,
    pub motion: Motion,
    hit: HashSet<EnemyId>,
}

impl AttackEffect {
    fn base(
        source: WeaponKind,
        pos: Vec2,
        direction: Vec2,
        damage: f32,
        pierce: Pierce,
        lifetime: f32,
        half: Vec2,
        motion: Motion,
    ) -> Self {
        let direction = safe_normalize(direction);
        Self {
            source,
            pos,
            direction,
            damage,
            pierce,
            age: 0.0,
            lifetime,
            half,
            rotation: direction.y.atan2(direction.x).to_degrees(),
            motion,
            hit: HashSet::new(),
        }
    }

    pub fn wand_shot(
        pos: Vec2,
        direction: Vec2,
        damage: f32,
        speed: f32,
        pierce: Pierce,
        size: f32,
        homing: bool,
        target: Option<EnemyId>,
    ) -> Self {
        Self::base(
            WeaponKind::Wand,
            pos,
            direction,
            damage,
            pierce,
            WAND_LIFETIME,
            Vec2::splat(WAND_RADIUS * size),
            Motion::Projectile {
                speed,
                homing,
                target,
            },
        )
    }

    pub fn knife(pos: Vec2, direction: Vec2, damage: f32, speed: f32, pierce: Pierce, size: f32) -> Self {
        Self::base(
            WeaponKind::Knife,
            pos,
            direction,
            damage,
            pierce,
            KNIFE_LIFETIME,
            Vec2::new(KNIFE_HALF_LENGTH, KNIFE_HALF_WIDTH) * size,
            Motion::Projectile {
                speed,
                homing: false,
                target: None,
            },
        )
    }

    pub fn axe(pos: Vec2, direction: Vec2, damage: f32, speed: f32, pierce: Pierce, size: f32) -> Self {
        let mut e = Self::base(
            WeaponKind::Axe,
            pos,
            direction,
            damage,
            pierce,
            AXE_LIFETIME,
            Vec2::splat(AXE_RADIUS * size),
            Motion::Arc {
                horizontal_speed: 0.0,
                vertical_speed: AXE_LAUNCH_VERTICAL_SPEED,
            },
        );
        e.motion = Motion::Arc {
            horizontal_speed: e.direction.x * speed,
            vertical_speed: AXE_LAUNCH_VERTICAL_SPEED,
        };
        e.rotation = 0.0;
        e
    }

    /// Swing to the side of `origin` given by the sign of `direction.x`.
    pub fn whip_swing(origin: Vec2, direction: Vec2, damage: f32, area: f32, size: f32) -> Self {
        let width = WHIP_BASE_WIDTH * area * size;
        let height = WHIP_BASE_HEIGHT * area;
        let side = if direction.x >= 0.0 { 1.0 } else { -1.0 };
        let pos = origin + Vec2::new(side * (WHIP_REACH + width * 0.5), 0.0);
        Self::base(
            WeaponKind::Whip,
            pos,
            direction,
            damage,
            Pierce::Unlimited,
            WHIP_LIFETIME,
            Vec2::new(width, height) * 0.5,
            Motion::Anchored,
        )
    }

    /// Advance motion and age.
    pub fn update(&mut self, dt: f32, enemies: &EnemyArena) {
        match &mut self.motion {
            Motion::Projectile {
                speed,
                homing,
                target,
            } => {
                if *homing {
                    if let Some(t) = target.and_then(|id| enemies.get(id)) {
                        let desired = safe_normalize(t.pos - self.pos);
                        if desired != Vec2::ZERO {
                            let steered = safe_normalize(self.direction.lerp(desired, HOMING_STEER));
                            if steered != Vec2::ZERO {
                                self.direction = steered;
                            }
                        }
                    }
                }
                self.pos += self.direction * *speed * dt;
            }
            Motion::Arc {
                horizontal_speed,
                vertical_speed,
            } => {
                self.pos.x += *horizontal_speed * dt;
                self.pos.y += *vertical_speed * dt;
                *vertical_speed += AXE_GRAVITY * dt;
                self.rotation += AXE_SPIN_DEG_PER_SEC * dt;
            }
            Motion::Anchored => {}
        }
        self.age += dt;
    }

    pub fn expired(&self) -> bool {
        self.age >= self.lifetime
    }

    /// Done: out of time or out of pierce.
    pub fn finished(&self) -> bool {
        self.expired() || self.pierce.exhausted()
    }

    /// World-space hitbox.  Knives use the bounds of their rotated blade.
    pub fn bounds(&self) -> Aabb {
        match self.source {
            WeaponKind::Knife => {
                let (c, s) = (self.direction.x.abs(), self.direction.y.abs());
                let half = Vec2::new(
                    c * self.half.x + s * self.half.y,
                    s * self.half.x + c * self.half.y,
                );
                Aabb::new(self.pos, half)
            }
            _ => Aabb::new(self.pos, self.half),
        }
    }

    pub fn has_hit(&self, id: EnemyId) -> bool {
        self.hit.contains(&id)
    }

    /// Record a first-time hit on `id`, spending one pierce.
    ///
    /// Returns `false` (and changes nothing) for a repeat target or when the
    /// budget is already spent.
    pub fn register_hit(&mut self, id: EnemyId) -> bool {
        if self.pierce.exhausted() || !self.hit.insert(id) {
            return false;
        }
        self.pierce.consume();
        true
    }

    pub fn hit_count(&self) -> usize {
        self.hit.len()
    }
}
