//! Weapons: per-kind stat curves, attack patterns and evolution.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`effects`] | `AttackEffect` (wand shots, knives, axes, whip swings) and the `Pierce` budget |
//! | [`aura`] | `GarlicAura`, the player-anchored per-enemy tick aura |
//! | [`controller`] | `WeaponController`: weapon/passive inventory, upgrade offers, evolutions |
//!
//! A [`Weapon`] is a tagged variant: one struct holds the shared level, stat
//! and cooldown state, and [`Weapon::update`] dispatches on [`WeaponKind`]
//! to the attack pattern.
//!
//! ## Stat curve
//!
//! ```text
//! lb        = level − 1
//! damage    = (base_damage + damage_per_level · lb) · evolution · might
//! cooldown  = max(0.1, base_cooldown + cooldown_per_level · lb) · (1 − cooldown_reduction)
//! area      = base_area + area_per_level · lb
//! amount    = base_amount + ⌊lb / 2⌋ · amount_per_level
//! size      = 1 + lb / (max_level − 1) · 2
//! ```

pub mod aura;
pub mod controller;
pub mod effects;

pub use aura::GarlicAura;
pub use controller::{UpgradeChoice, UpgradeOption, WeaponController};
pub use effects::{AttackEffect, Motion, Pierce};

use crate::config::WeaponProfile;
use crate::constants::{
    AXE_SPREAD_DEGREES, KNIFE_SPREAD_DEGREES, MIN_WEAPON_COOLDOWN, WAND_SPREAD_DEGREES,
};
use crate::enemy::EnemyArena;
use crate::geometry::{rotate_deg, safe_normalize};
use crate::player::{PassiveKind, PlayerStats};
use crate::timer::CooldownTimer;
use bevy::log::{info, warn};
use bevy::math::Vec2;
use rand::Rng;
use serde::Deserialize;

/// Weapon identity.
///
/// Deserialises leniently: an unknown id logs a warning and becomes
/// [`WeaponKind::Whip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "String")]
pub enum WeaponKind {
    Whip,
    Wand,
    Garlic,
    Axe,
    Knife,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 5] = [
        WeaponKind::Whip,
        WeaponKind::Wand,
        WeaponKind::Garlic,
        WeaponKind::Axe,
        WeaponKind::Knife,
    ];

    pub fn id(self) -> &'static str {
        match self {
            WeaponKind::Whip => "whip",
            WeaponKind::Wand => "wand",
            WeaponKind::Garlic => "garlic",
            WeaponKind::Axe => "axe",
            WeaponKind::Knife => "knife",
        }
    }

    pub fn parse_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }
}

impl From<String> for WeaponKind {
    fn from(id: String) -> Self {
        Self::parse_id(&id).unwrap_or_else(|| {
            warn!("unknown weapon id '{id}', falling back to whip");
            WeaponKind::Whip
        })
    }
}

/// Derived stats after level, evolution and player modifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub damage: f32,
    pub cooldown: f32,
    pub area: f32,
    pub speed: f32,
    pub amount: u32,
    pub pierce: Pierce,
    pub size_multiplier: f32,
}

impl WeaponStats {
    pub fn compute(
        profile: &WeaponProfile,
        level: u32,
        evolution_multiplier: f32,
        player: &PlayerStats,
    ) -> Self {
        let steps = level.saturating_sub(1);
        let lb = steps as f32;
        let amount = if profile.amount_per_level > 0 {
            profile.base_amount + (steps / 2) * profile.amount_per_level
        } else {
            profile.base_amount
        };
        let size_multiplier = if profile.max_level > 1 {
            1.0 + lb / (profile.max_level - 1) as f32 * 2.0
        } else {
            1.0
        };
        let raw_cooldown =
            (profile.base_cooldown + profile.cooldown_per_level * lb).max(MIN_WEAPON_COOLDOWN);
        Self {
            damage: (profile.base_damage + profile.damage_per_level * lb)
                * evolution_multiplier
                * player.might,
            cooldown: raw_cooldown * (1.0 - player.cooldown_reduction).max(0.0),
            area: profile.base_area + profile.area_per_level * lb,
            speed: profile.base_speed,
            amount,
            pierce: Pierce::from_config(profile.base_pierce),
            size_multiplier,
        }
    }
}

/// Where and which way the player is when weapons fire.
#[derive(Clone, Copy)]
pub struct AttackContext<'a> {
    pub origin: Vec2,
    pub facing: Vec2,
    pub enemies: &'a EnemyArena,
}

impl AttackContext<'_> {
    fn facing_or_default(&self) -> Vec2 {
        let f = safe_normalize(self.facing);
        if f == Vec2::ZERO {
            Vec2::X
        } else {
            f
        }
    }
}

/// Read-only summary for the inventory display.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponInfo {
    pub id: &'static str,
    pub display_name: String,
    pub level: u32,
    pub max_level: u32,
    pub damage: f32,
    pub cooldown: f32,
    pub evolved: bool,
}

#[derive(Debug, Clone)]
pub struct Weapon {
    pub kind: WeaponKind,
    profile: WeaponProfile,
    level: u32,
    evolved: bool,
    homing: bool,
    stats: WeaponStats,
    timer: CooldownTimer,
    aura: Option<GarlicAura>,
}

impl Weapon {
    /// Level-1 weapon; the cooldown gate starts ready.
    pub fn new(kind: WeaponKind, profile: &WeaponProfile, player: &PlayerStats) -> Self {
        let stats = WeaponStats::compute(profile, 1, 1.0, player);
        let aura = (kind == WeaponKind::Garlic).then(|| {
            GarlicAura::new(
                profile.base_radius * stats.area * stats.size_multiplier,
                stats.damage,
                stats.cooldown,
            )
        });
        Self {
            kind,
            profile: profile.clone(),
            level: 1,
            evolved: false,
            homing: false,
            stats,
            timer: CooldownTimer::new(stats.cooldown),
            aura,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_level(&self) -> u32 {
        self.profile.max_level
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= self.profile.max_level
    }

    pub fn evolved(&self) -> bool {
        self.evolved
    }

    pub fn homing(&self) -> bool {
        self.homing
    }

    pub fn stats(&self) -> &WeaponStats {
        &self.stats
    }

    pub fn timer(&self) -> &CooldownTimer {
        &self.timer
    }

    pub fn aura(&self) -> Option<&GarlicAura> {
        self.aura.as_ref()
    }

    pub fn aura_mut(&mut self) -> Option<&mut GarlicAura> {
        self.aura.as_mut()
    }

    pub fn display_name(&self) -> &str {
        match (&self.profile.evolution, self.evolved) {
            (Some(evo), true) => &evo.display_name,
            _ => &self.profile.display_name,
        }
    }

    /// Passive required to evolve, if this weapon has an evolution.
    pub fn evolution_requirement(&self) -> Option<PassiveKind> {
        self.profile.evolution.as_ref().map(|e| e.required_passive)
    }

    fn evolution_multiplier(&self) -> f32 {
        match (&self.profile.evolution, self.evolved) {
            (Some(evo), true) => evo.damage_multiplier,
            _ => 1.0,
        }
    }

    /// Re-derive stats from level, evolution and the player's modifiers.
    /// Cooldown progress and aura timers carry over.
    pub fn recompute(&mut self, player: &PlayerStats) {
        self.stats =
            WeaponStats::compute(&self.profile, self.level, self.evolution_multiplier(), player);
        self.timer.set_duration(self.stats.cooldown);
        if let Some(aura) = &mut self.aura {
            aura.radius = self.profile.base_radius * self.stats.area * self.stats.size_multiplier;
            aura.damage = self.stats.damage;
            aura.tick_rate = self.stats.cooldown;
        }
    }

    /// `false` (and no change) at the level cap.
    pub fn level_up(&mut self, player: &PlayerStats) -> bool {
        if self.is_max_level() {
            return false;
        }
        self.level += 1;
        self.recompute(player);
        true
    }

    pub fn can_evolve(&self, passives: &[(PassiveKind, u32)]) -> bool {
        if !self.is_max_level() || self.evolved {
            return false;
        }
        self.evolution_requirement()
            .is_some_and(|req| passives.iter().any(|(kind, _)| *kind == req))
    }

    /// Switch to the evolved form.  `false` if there is none or it already happened.
    pub fn evolve(&mut self, player: &PlayerStats) -> bool {
        let Some(evo) = self.profile.evolution.as_ref() else {
            return false;
        };
        if self.evolved {
            return false;
        }
        self.homing = evo.homing;
        self.evolved = true;
        self.recompute(player);
        info!("{} evolved into {}", self.profile.display_name, self.display_name());
        true
    }

    /// Advance the cooldown gate; on ready, fire this weapon's pattern into `out`.
    ///
    /// The garlic never fires; its aura clock advances instead and the
    /// collision pass applies it.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        ctx: &AttackContext,
        rng: &mut R,
        out: &mut Vec<AttackEffect>,
    ) {
        if let Some(aura) = &mut self.aura {
            aura.advance(dt);
            return;
        }
        self.timer.tick(dt);
        if self.timer.try_fire() {
            self.attack(ctx, rng, out);
        }
    }

    fn attack<R: Rng + ?Sized>(
        &self,
        ctx: &AttackContext,
        rng: &mut R,
        out: &mut Vec<AttackEffect>,
    ) {
        let s = &self.stats;
        let facing = ctx.facing_or_default();
        match self.kind {
            WeaponKind::Whip => {
                for i in 0..s.amount {
                    let dir = if i % 2 == 0 { facing } else { -facing };
                    out.push(AttackEffect::whip_swing(
                        ctx.origin,
                        dir,
                        s.damage,
                        s.area,
                        s.size_multiplier,
                    ));
                }
            }
            WeaponKind::Wand => {
                let target = ctx.enemies.nearest(ctx.origin);
                let aim = target
                    .map(|(_, e)| safe_normalize(e.pos - ctx.origin))
                    .filter(|d| *d != Vec2::ZERO)
                    .unwrap_or(facing);
                let target_id = target.map(|(id, _)| id);
                for i in 0..s.amount {
                    let dir = if s.amount > 1 {
                        // Integer half: odd counts keep one shot on the aim line.
                        let offset =
                            (i as i32 - (s.amount / 2) as i32) as f32 * WAND_SPREAD_DEGREES;
                        rotate_deg(aim, offset)
                    } else {
                        aim
                    };
                    out.push(AttackEffect::wand_shot(
                        ctx.origin,
                        dir,
                        s.damage,
                        s.speed,
                        s.pierce,
                        s.size_multiplier,
                        self.homing,
                        target_id,
                    ));
                }
            }
            WeaponKind::Knife => {
                let spread = KNIFE_SPREAD_DEGREES * s.amount.saturating_sub(1) as f32;
                for i in 0..s.amount {
                    let dir = if s.amount > 1 {
                        let step = spread / (s.amount - 1) as f32;
                        rotate_deg(facing, -spread / 2.0 + step * i as f32)
                    } else {
                        facing
                    };
                    out.push(AttackEffect::knife(
                        ctx.origin,
                        dir,
                        s.damage,
                        s.speed,
                        s.pierce,
                        s.size_multiplier,
                    ));
                }
            }
            WeaponKind::Axe => {
                for i in 0..s.amount {
                    let angle = rng.gen_range(-AXE_SPREAD_DEGREES..=AXE_SPREAD_DEGREES);
                    let mut dir = rotate_deg(facing, angle);
                    // Multiple axes alternate sides.
                    if s.amount > 1 {
                        dir.x = if i % 2 == 0 { dir.x.abs() } else { -dir.x.abs() };
                    }
                    out.push(AttackEffect::axe(
                        ctx.origin,
                        dir,
                        s.damage,
                        s.speed,
                        s.pierce,
                        s.size_multiplier,
                    ));
                }
            }
            WeaponKind::Garlic => {}
        }
    }

    pub fn info(&self) -> WeaponInfo {
        WeaponInfo {
            id: self.kind.id(),
            display_name: self.display_name().to_string(),
            level: self.level,
            max_level: self.profile.max_level,
            damage: self.stats.damage,
            cooldown: self.stats.cooldown,
            evolved: self.evolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnemyTable, WeaponTable};
    use crate::enemy::{Enemy, EnemyKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stats(might: f32, cdr: f32) -> PlayerStats {
        PlayerStats {
            move_speed: 200.0,
            pickup_radius: 80.0,
            might,
            cooldown_reduction: cdr,
            armor: 0.0,
            regen: 0.0,
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn stat_curve_matches_closed_form_at_every_level() {
        let table = WeaponTable::default();
        let player = stats(1.3, 0.16);
        for kind in WeaponKind::ALL {
            let p = table.get(kind);
            let mut w = Weapon::new(kind, p, &player);
            for level in 1..=p.max_level {
                let lb = (level - 1) as f32;
                let s = w.stats();
                assert!(close(s.damage, (p.base_damage + p.damage_per_level * lb) * 1.3));
                let cd = (p.base_cooldown + p.cooldown_per_level * lb).max(0.1) * 0.84;
                assert!(close(s.cooldown, cd), "{kind:?} L{level}");
                assert!(close(s.area, p.base_area + p.area_per_level * lb));
                let amount = if p.amount_per_level > 0 {
                    p.base_amount + (level - 1) / 2 * p.amount_per_level
                } else {
                    p.base_amount
                };
                assert_eq!(s.amount, amount);
                assert!(close(s.size_multiplier, 1.0 + lb / (p.max_level - 1) as f32 * 2.0));
                w.level_up(&player);
            }
            assert_eq!(w.level(), p.max_level);
            assert!(!w.level_up(&player));
            assert_eq!(w.level(), p.max_level);
        }
    }

    #[test]
    fn evolution_needs_max_level_and_passive() {
        let table = WeaponTable::default();
        let player = stats(1.0, 0.0);
        let mut whip = Weapon::new(WeaponKind::Whip, &table.whip, &player);
        let have = [(PassiveKind::MightBoost, 1)];
        assert!(!whip.can_evolve(&have));
        while whip.level_up(&player) {}
        assert!(!whip.can_evolve(&[(PassiveKind::ArmorBoost, 5)]));
        assert!(whip.can_evolve(&have));

        let before = whip.stats().damage;
        assert!(whip.evolve(&player));
        assert!(close(whip.stats().damage, before * 2.0));
        assert_eq!(whip.display_name(), "Bloody Whip");
        assert!(!whip.can_evolve(&have));
        assert!(!whip.evolve(&player));

        // The multiplier survives later recomputes.
        whip.recompute(&stats(1.5, 0.0));
        assert!(close(whip.stats().damage, before * 2.0 * 1.5));
    }

    #[test]
    fn weapons_without_evolution_never_evolve() {
        let table = WeaponTable::default();
        let player = stats(1.0, 0.0);
        let mut knife = Weapon::new(WeaponKind::Knife, &table.knife, &player);
        while knife.level_up(&player) {}
        let all: Vec<_> = PassiveKind::ALL.iter().map(|k| (*k, 5)).collect();
        assert!(!knife.can_evolve(&all));
        assert!(!knife.evolve(&player));
    }

    #[test]
    fn wand_fires_once_per_second_along_facing() {
        let table = WeaponTable::default();
        let mut wand = Weapon::new(WeaponKind::Wand, &table.wand, &stats(1.0, 0.0));
        let arena = EnemyArena::new();
        let ctx = AttackContext {
            origin: Vec2::ZERO,
            facing: Vec2::Y,
            enemies: &arena,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut out = Vec::new();
        for _ in 0..16 {
            wand.update(0.25, &ctx, &mut rng, &mut out);
        }
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|e| e.direction == Vec2::Y && e.damage == 10.0));
    }

    #[test]
    fn wand_aims_at_nearest_enemy() {
        let table = WeaponTable::default();
        let enemies = EnemyTable::default();
        let mut arena = EnemyArena::new();
        arena.insert(Enemy::new(EnemyKind::Chaser, &enemies.chaser, Vec2::new(-300.0, 0.0), 1.0));
        let near = arena.insert(Enemy::new(
            EnemyKind::Chaser,
            &enemies.chaser,
            Vec2::new(0.0, -100.0),
            1.0,
        ));
        let mut wand = Weapon::new(WeaponKind::Wand, &table.wand, &stats(1.0, 0.0));
        let ctx = AttackContext {
            origin: Vec2::ZERO,
            facing: Vec2::X,
            enemies: &arena,
        };
        let mut out = Vec::new();
        wand.update(0.0, &ctx, &mut StdRng::seed_from_u64(0), &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].direction, Vec2::new(0.0, -1.0));
        assert_eq!(
            out[0].motion,
            Motion::Projectile {
                speed: 400.0,
                homing: false,
                target: Some(near)
            }
        );
    }

    #[test]
    fn wand_fan_is_centred_on_aim() {
        let table = WeaponTable::default();
        let player = stats(1.0, 0.0);
        let mut wand = Weapon::new(WeaponKind::Wand, &table.wand, &player);
        let angles = |wand: &mut Weapon, arena: &EnemyArena| -> Vec<f32> {
            let ctx = AttackContext {
                origin: Vec2::ZERO,
                facing: Vec2::X,
                enemies: arena,
            };
            let mut out = Vec::new();
            wand.update(10.0, &ctx, &mut StdRng::seed_from_u64(0), &mut out);
            out.iter()
                .map(|e| e.direction.y.atan2(e.direction.x).to_degrees())
                .collect()
        };

        // Level 3: two shots, the second on the facing line.
        for _ in 0..2 {
            wand.level_up(&player);
        }
        assert_eq!(wand.stats().amount, 2);
        let two = angles(&mut wand, &EnemyArena::new());
        assert_eq!(two.len(), 2);
        assert!(close(two[0], -15.0) && close(two[1], 0.0));

        // Level 5: three shots around an enemy straight up.
        for _ in 0..2 {
            wand.level_up(&player);
        }
        assert_eq!(wand.stats().amount, 3);
        let enemies = EnemyTable::default();
        let mut arena = EnemyArena::new();
        arena.insert(Enemy::new(EnemyKind::Chaser, &enemies.chaser, Vec2::new(0.0, 100.0), 1.0));
        let three = angles(&mut wand, &arena);
        assert_eq!(three.len(), 3);
        assert!(close(three[0], 75.0) && close(three[1], 90.0) && close(three[2], 105.0));
    }

    #[test]
    fn knife_fan_is_even() {
        let table = WeaponTable::default();
        let player = stats(1.0, 0.0);
        let mut knife = Weapon::new(WeaponKind::Knife, &table.knife, &player);
        // Level 5: amount 1 + 2 = 3.
        for _ in 0..4 {
            knife.level_up(&player);
        }
        assert_eq!(knife.stats().amount, 3);
        let arena = EnemyArena::new();
        let ctx = AttackContext {
            origin: Vec2::ZERO,
            facing: Vec2::X,
            enemies: &arena,
        };
        let mut out = Vec::new();
        knife.update(0.0, &ctx, &mut StdRng::seed_from_u64(0), &mut out);
        let angles: Vec<f32> = out
            .iter()
            .map(|e| e.direction.y.atan2(e.direction.x).to_degrees())
            .collect();
        assert_eq!(angles.len(), 3);
        assert!(close(angles[0], -10.0) && close(angles[1], 0.0) && close(angles[2], 10.0));
    }

    #[test]
    fn axes_alternate_sides() {
        let table = WeaponTable::default();
        let player = stats(1.0, 0.0);
        let mut axe = Weapon::new(WeaponKind::Axe, &table.axe, &player);
        for _ in 0..2 {
            axe.level_up(&player);
        }
        assert_eq!(axe.stats().amount, 2);
        let arena = EnemyArena::new();
        let ctx = AttackContext {
            origin: Vec2::ZERO,
            facing: Vec2::Y,
            enemies: &arena,
        };
        let mut out = Vec::new();
        axe.update(0.0, &ctx, &mut StdRng::seed_from_u64(9), &mut out);
        assert_eq!(out.len(), 2);
        assert!(out[0].direction.x >= 0.0);
        assert!(out[1].direction.x <= 0.0);
        assert_eq!(out[0].pierce, Pierce::Unlimited);
    }

    #[test]
    fn garlic_has_aura_and_never_fires() {
        let table = WeaponTable::default();
        let player = stats(1.0, 0.0);
        let mut garlic = Weapon::new(WeaponKind::Garlic, &table.garlic, &player);
        assert!(close(garlic.aura().map_or(0.0, |a| a.radius), 60.0));
        garlic.level_up(&player);
        // Level 2: area 1.15, size 1 + 2/7.
        let expected = 60.0 * 1.15 * (1.0 + 2.0 / 7.0);
        assert!(close(garlic.aura().map_or(0.0, |a| a.radius), expected));
        let arena = EnemyArena::new();
        let ctx = AttackContext {
            origin: Vec2::ZERO,
            facing: Vec2::X,
            enemies: &arena,
        };
        let mut out = Vec::new();
        garlic.update(1.0, &ctx, &mut StdRng::seed_from_u64(0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn recompute_keeps_cooldown_progress() {
        let table = WeaponTable::default();
        let mut axe = Weapon::new(WeaponKind::Axe, &table.axe, &stats(1.0, 0.0));
        let arena = EnemyArena::new();
        let ctx = AttackContext {
            origin: Vec2::ZERO,
            facing: Vec2::X,
            enemies: &arena,
        };
        let mut out = Vec::new();
        let mut rng = StdRng::seed_from_u64(3);
        axe.update(0.0, &ctx, &mut rng, &mut out);
        axe.update(1.5, &ctx, &mut rng, &mut out);
        assert_eq!(out.len(), 1);
        axe.recompute(&stats(1.0, 0.4));
        // 2.0 · 0.6 = 1.2 s; 1.5 s already elapsed.
        assert!(axe.timer().ready());
    }

    #[test]
    fn unknown_weapon_id_falls_back() {
        assert_eq!(WeaponKind::from("laser".to_string()), WeaponKind::Whip);
        assert_eq!(WeaponKind::from("knife".to_string()), WeaponKind::Knife);
    }
}
