//! The player character: movement, health, i-frames, XP and the stat block.
//!
//! Weapons read [`PlayerStats::might`] and [`PlayerStats::cooldown_reduction`]
//! whenever they recompute; passives mutate the stat block through
//! [`Player::apply_passive`].

use super::progression::{xp_threshold, PassiveStat};
use crate::config::{GameConfig, XpConfig};
use crate::constants::{LEVEL_UP_HEAL_FRACTION, PLAYER_HITBOX_INSET, REGEN_INTERVAL_SECS};
use crate::geometry::{safe_normalize, Aabb};
use bevy::log::info;
use bevy::math::Vec2;

/// Modifiable stat block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStats {
    pub move_speed: f32,
    pub pickup_radius: f32,
    /// Damage multiplier applied to every weapon.
    pub might: f32,
    /// Fractional cooldown reduction applied to every weapon.
    pub cooldown_reduction: f32,
    /// Flat reduction of incoming contact damage.
    pub armor: f32,
    /// HP restored per regen tick.
    pub regen: f32,
}

/// Result of a contact hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// The player was invincible; nothing happened.
    Ignored,
    /// Damage applied (possibly zero under the unlimited-health cheat).
    Damaged(f32),
    /// The hit took the player to 0 HP.
    Killed(f32),
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Unit vector of the last non-zero movement; starts facing +X.
    pub facing: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub stats: PlayerStats,
    /// Radius of the drawn body.
    pub size: f32,
    pub kills: u32,
    pub damage_dealt: f64,
    pub damage_taken: f32,
    inv_timer: f32,
    inv_duration: f32,
    regen_timer: f32,
    unlimited_health: bool,
    xp_curve: XpConfig,
}

impl Player {
    /// Fresh player at the centre of the world.
    pub fn new(config: &GameConfig) -> Self {
        let p = &config.player;
        Self {
            pos: Vec2::new(config.world.width, config.world.height) * 0.5,
            facing: Vec2::X,
            hp: p.max_hp,
            max_hp: p.max_hp,
            level: 1,
            xp: 0,
            xp_to_next_level: xp_threshold(&config.xp, 1),
            stats: PlayerStats {
                move_speed: p.move_speed,
                pickup_radius: p.pickup_radius,
                might: p.might,
                cooldown_reduction: p.cooldown_reduction,
                armor: p.armor,
                regen: p.regen,
            },
            size: p.size,
            kills: 0,
            damage_dealt: 0.0,
            damage_taken: 0.0,
            inv_timer: 0.0,
            inv_duration: p.invincibility_duration,
            regen_timer: 0.0,
            unlimited_health: config.cheats.unlimited_health,
            xp_curve: config.xp.clone(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn is_invincible(&self) -> bool {
        self.inv_timer > 0.0
    }

    /// Contact hitbox, slightly smaller than the drawn body.
    pub fn hitbox(&self) -> Aabb {
        Aabb::square(self.pos, (self.size - PLAYER_HITBOX_INSET).max(1.0))
    }

    /// Move along `input` (any length; normalised here) and clamp to the world.
    pub fn apply_movement(&mut self, input: Vec2, dt: f32, world: Vec2) {
        let dir = safe_normalize(input);
        if dir != Vec2::ZERO {
            self.facing = dir;
        }
        self.pos += dir * self.stats.move_speed * dt;
        let lo = Vec2::splat(self.size);
        self.pos = self.pos.clamp(lo, (world - lo).max(lo));
    }

    /// Count down the i-frame window and apply regeneration.
    pub fn tick_timers(&mut self, dt: f32) {
        if self.inv_timer > 0.0 {
            self.inv_timer = (self.inv_timer - dt).max(0.0);
        }
        if self.stats.regen > 0.0 && self.hp < self.max_hp {
            self.regen_timer += dt;
            if self.regen_timer >= REGEN_INTERVAL_SECS {
                self.regen_timer = 0.0;
                self.heal(self.stats.regen);
            }
        }
    }

    /// Full per-tick player step.
    pub fn update(&mut self, dt: f32, input: Vec2, world: Vec2) {
        if self.is_dead() {
            return;
        }
        self.apply_movement(input, dt, world);
        self.tick_timers(dt);
    }

    /// Apply a contact hit of `damage` before armor.
    ///
    /// Armor subtracts a flat amount with a floor of 1.  Every accepted hit
    /// opens the i-frame window, even under the unlimited-health cheat.
    pub fn take_hit(&mut self, damage: f32) -> HitOutcome {
        if self.is_invincible() || self.is_dead() {
            return HitOutcome::Ignored;
        }
        self.inv_timer = self.inv_duration;
        if self.unlimited_health {
            return HitOutcome::Damaged(0.0);
        }
        let actual = (damage - self.stats.armor).max(1.0);
        self.hp = (self.hp - actual).max(0.0);
        self.damage_taken += actual;
        if self.is_dead() {
            HitOutcome::Killed(actual)
        } else {
            HitOutcome::Damaged(actual)
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount.max(0.0)).min(self.max_hp);
    }

    /// Add XP and resolve every level it pays for.  Returns levels gained.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.xp >= self.xp_to_next_level && self.level < self.xp_curve.max_level {
            self.level_up();
            gained += 1;
        }
        gained
    }

    fn level_up(&mut self) {
        self.xp -= self.xp_to_next_level;
        self.level += 1;
        self.xp_to_next_level = xp_threshold(&self.xp_curve, self.level);
        self.heal(self.max_hp * LEVEL_UP_HEAL_FRACTION);
        info!(
            "Player reached level {} (next at {} XP)",
            self.level, self.xp_to_next_level
        );
    }

    /// Apply one level of a passive.
    pub fn apply_passive(&mut self, stat: PassiveStat, value: f32) {
        let s = &mut self.stats;
        match stat {
            PassiveStat::Might => s.might += value,
            PassiveStat::MaxHp => {
                self.max_hp += value;
                self.hp += value;
            }
            PassiveStat::Regen => s.regen += value,
            PassiveStat::PickupRadius => s.pickup_radius *= 1.0 + value,
            PassiveStat::Armor => s.armor += value,
            PassiveStat::MoveSpeed => s.move_speed *= 1.0 + value,
            PassiveStat::CooldownReduction => s.cooldown_reduction += value,
        }
    }

    /// Fraction of the current level's XP collected.
    pub fn xp_progress(&self) -> f32 {
        if self.xp_to_next_level == 0 {
            return 1.0;
        }
        (self.xp as f32 / self.xp_to_next_level as f32).clamp(0.0, 1.0)
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        }
    }
}
