//! Collision and damage resolution.
//!
//! ## Passes (in tick order)
//!
//! | Pass | Shapes | Gate |
//! |------|--------|------|
//! | effects vs enemies | effect bounds vs enemy body box | hit-once per effect, pierce budget |
//! | auras vs enemies | centre distance ≤ radius | per-enemy aura tick timer |
//! | enemies vs player | enemy hitbox vs player hitbox | enemy contact cooldown **and** player i-frames |
//!
//! Candidates are visited in arena slot order, so when a pierce-limited
//! effect overlaps more enemies than it can hit, the lowest slots win.
//! A killed enemy's [`DropDescriptor`] is captured before it is removed from
//! the arena.

use crate::constants::KNOCKBACK_SPEED;
use crate::enemy::{DropDescriptor, EnemyArena, EnemyId};
use crate::geometry::safe_normalize;
use crate::player::{HitOutcome, Player};
use crate::spatial_partition::SpatialGrid;
use crate::weapons::{AttackEffect, GarlicAura};
use bevy::math::Vec2;

/// Everything one resolve pass did to the enemies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatReport {
    /// Drop data of every enemy killed, in kill order.
    pub kills: Vec<DropDescriptor>,
    /// Number of damage applications.
    pub hits: u32,
    pub damage_dealt: f64,
}

impl CombatReport {
    pub fn merge(&mut self, other: CombatReport) {
        self.kills.extend(other.kills);
        self.hits += other.hits;
        self.damage_dealt += other.damage_dealt;
    }
}

/// Damage one enemy, pushing it away from `source`.  Removes it on death.
fn strike(
    enemies: &mut EnemyArena,
    id: EnemyId,
    damage: f32,
    source: Vec2,
    report: &mut CombatReport,
) {
    let Some(enemy) = enemies.get_mut(id) else {
        return;
    };
    let push = safe_normalize(enemy.pos - source) * KNOCKBACK_SPEED;
    let killed = enemy.take_damage(damage, push);
    report.hits += 1;
    report.damage_dealt += f64::from(damage);
    if killed {
        report.kills.push(enemy.drop_descriptor());
        enemies.remove(id);
    }
}

/// Resolve every live attack effect against the enemies.
///
/// Effects that are past their lifetime are dropped before testing; effects
/// whose pierce runs out during the pass are dropped after it.
pub fn resolve_effects(
    effects: &mut Vec<AttackEffect>,
    enemies: &mut EnemyArena,
    grid: &SpatialGrid,
) -> CombatReport {
    let mut report = CombatReport::default();
    effects.retain(|e| !e.finished());

    for effect in effects.iter_mut() {
        let bounds = effect.bounds();
        for id in grid.query(&bounds) {
            if effect.pierce.exhausted() {
                break;
            }
            let overlapping = enemies
                .get(id)
                .is_some_and(|enemy| bounds.overlaps(&enemy.body()));
            if overlapping && effect.register_hit(id) {
                strike(enemies, id, effect.damage, effect.pos, &mut report);
            }
        }
    }

    effects.retain(|e| !e.finished());
    report
}

/// Apply aura ticks to every enemy in range of `center`.
pub fn resolve_aura(
    aura: &mut GarlicAura,
    center: Vec2,
    enemies: &mut EnemyArena,
) -> CombatReport {
    let mut report = CombatReport::default();
    for id in aura.enemies_in_range(center, enemies) {
        if aura.try_tick(id) {
            strike(enemies, id, aura.damage, center, &mut report);
        }
    }
    report
}

/// Contact damage from enemies touching the player.
///
/// Both gates must be open: the enemy's own contact cooldown and the player's
/// invincibility window.  The first accepted hit opens the window, which
/// blocks every later enemy for the rest of the pass.
pub fn resolve_player_contact(player: &mut Player, enemies: &mut EnemyArena) -> Vec<HitOutcome> {
    let mut outcomes = Vec::new();
    if player.is_dead() {
        return outcomes;
    }
    let hitbox = player.hitbox();
    for (_, enemy) in enemies.iter_mut() {
        if player.is_invincible() {
            break;
        }
        if !enemy.can_damage() || !hitbox.overlaps(&enemy.hitbox()) {
            continue;
        }
        let outcome = player.take_hit(enemy.damage);
        if outcome != HitOutcome::Ignored {
            enemy.reset_contact_cooldown();
            outcomes.push(outcome);
        }
        if matches!(outcome, HitOutcome::Killed(_)) {
            break;
        }
    }
    outcomes
}
