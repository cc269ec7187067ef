//! One run of the game: owns every actor and advances them in a fixed order.
//!
//! ## Tick order
//!
//! 1. player (movement, i-frames, regen)
//! 2. spawner
//! 3. enemy movement
//! 4. weapons fire
//! 5. attack effects move and age
//! 6. effects and auras vs enemies (kills drop loot)
//! 7. drops magnetize and pay out
//! 8. progression (XP, heal, chests)
//! 9. enemy contact with the player
//!
//! ## States
//!
//! | State | `update` | Leaves via |
//! |-------|----------|------------|
//! | `Running` | advances the tick | level-up / chest → `AwaitingUpgrade`; HP 0 → `Ended` |
//! | `AwaitingUpgrade` | no-op | [`Session::commit_upgrade`] once per queued selection |
//! | `Ended` | no-op | [`Session::reset`] |
//!
//! Each level gained and each chest collected queues one selection; the
//! options for the head of the queue are drawn when it becomes current.

use crate::combat::{resolve_aura, resolve_effects, resolve_player_contact};
use crate::config::GameConfig;
use crate::constants::MAX_TICK_DT;
use crate::drops::DropManager;
use crate::enemy::{Enemy, EnemyArena, EnemyId, EnemyKind};
use crate::error::{SimError, SimResult};
use crate::player::{HitOutcome, Player};
use crate::snapshot::SessionSnapshot;
use crate::spatial_partition::SpatialGrid;
use crate::spawner::EnemySpawner;
use crate::weapons::{AttackEffect, UpgradeChoice, UpgradeOption, WeaponController};
use bevy::log::{debug, info};
use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Running,
    AwaitingUpgrade,
    Ended,
}

/// Discrete cues for an external sound dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimEvent {
    Pickup,
    LevelUp,
    Hit,
    Death,
}

impl SimEvent {
    pub fn name(self) -> &'static str {
        match self {
            SimEvent::Pickup => "pickup",
            SimEvent::LevelUp => "levelup",
            SimEvent::Hit => "hit",
            SimEvent::Death => "death",
        }
    }
}

/// Why a selection was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeSource {
    LevelUp,
    Chest,
}

/// End-of-run stats handed to the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunRecord {
    pub time_survived: f32,
    pub level: u32,
    pub kills: u32,
    pub damage_dealt: f64,
}

/// Result of a committed upgrade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeOutcome {
    pub choice: UpgradeChoice,
    /// `false` when the choice was valid but changed nothing (already maxed).
    pub applied: bool,
    /// Selections still queued after this one.
    pub remaining: usize,
}

pub struct Session {
    config: Arc<GameConfig>,
    rng: StdRng,
    state: SessionState,
    elapsed: f32,
    player: Player,
    spawner: EnemySpawner,
    enemies: EnemyArena,
    grid: SpatialGrid,
    controller: WeaponController,
    effects: Vec<AttackEffect>,
    drops: DropManager,
    pending: VecDeque<UpgradeSource>,
    offer: Vec<UpgradeOption>,
    events: Vec<SimEvent>,
}

impl Session {
    /// Fresh run.  Seeds from `config.seed` when set, else from OS entropy.
    pub fn new(config: Arc<GameConfig>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut player = Player::new(&config);
        let controller = WeaponController::with_starting_loadout(config.clone(), &mut player);
        info!(
            "Session started with {} (seed {:?})",
            config.cheats.starting_weapon.id(),
            config.seed
        );
        Self {
            rng,
            state: SessionState::Running,
            elapsed: 0.0,
            player,
            spawner: EnemySpawner::new(config.clone()),
            enemies: EnemyArena::new(),
            grid: SpatialGrid::default(),
            controller,
            effects: Vec::new(),
            drops: DropManager::new(config.drops.clone()),
            pending: VecDeque::new(),
            offer: Vec::new(),
            events: Vec::new(),
            config,
        }
    }

    /// Discard every actor and start over from the same config.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    pub fn config(&self) -> &Arc<GameConfig> {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> &EnemyArena {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut EnemyArena {
        &mut self.enemies
    }

    pub fn effects(&self) -> &[AttackEffect] {
        &self.effects
    }

    pub fn drops(&self) -> &DropManager {
        &self.drops
    }

    pub fn drops_mut(&mut self) -> &mut DropManager {
        &mut self.drops
    }

    pub fn controller(&self) -> &WeaponController {
        &self.controller
    }

    pub fn spawner(&self) -> &EnemySpawner {
        &self.spawner
    }

    /// Options for the current selection; empty unless `AwaitingUpgrade`.
    pub fn offered_options(&self) -> &[UpgradeOption] {
        &self.offer
    }

    /// Selections queued, including the one on offer.
    pub fn pending_upgrades(&self) -> usize {
        self.pending.len()
    }

    /// Place an enemy of `kind` at `pos`, scaled to the current difficulty.
    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, pos: Vec2) -> EnemyId {
        let profile = self.config.enemies.get(kind);
        self.enemies
            .insert(Enemy::new(kind, profile, pos, self.spawner.difficulty()))
    }

    /// Advance one tick.  `dt` is clamped to `[0, 0.1]`; `move_input` is any
    /// direction (normalised inside).  A no-op outside `Running`.
    pub fn update(&mut self, dt: f32, move_input: Vec2) -> SessionState {
        if self.state != SessionState::Running {
            return self.state;
        }
        let dt = dt.clamp(0.0, MAX_TICK_DT);
        let world = Vec2::new(self.config.world.width, self.config.world.height);
        self.elapsed += dt;

        self.player.update(dt, move_input, world);

        self.spawner
            .update(dt, self.player.pos, &mut self.enemies, &mut self.rng);

        let target = self.player.pos;
        for (_, enemy) in self.enemies.iter_mut() {
            enemy.update(dt, target, world);
        }

        self.controller.update(
            dt,
            &self.player,
            &self.enemies,
            &mut self.rng,
            &mut self.effects,
        );
        for effect in &mut self.effects {
            effect.update(dt, &self.enemies);
        }

        self.grid.rebuild(&self.enemies);
        let mut report = resolve_effects(&mut self.effects, &mut self.enemies, &self.grid);
        for aura in self.controller.auras_mut() {
            report.merge(resolve_aura(aura, self.player.pos, &mut self.enemies));
        }
        self.player.kills += report.kills.len() as u32;
        self.player.damage_dealt += report.damage_dealt;
        for kill in &report.kills {
            self.drops.spawn_from_enemy(kill, &mut self.rng);
        }

        let collected = self
            .drops
            .update(dt, self.player.pos, self.player.stats.pickup_radius);
        if collected.xp > 0 {
            let xp = (collected.xp as f32 * self.config.cheats.exp_multiplier).floor() as u32;
            let levels = self.player.gain_xp(xp);
            for _ in 0..levels {
                self.pending.push_back(UpgradeSource::LevelUp);
            }
            self.events.push(SimEvent::Pickup);
        }
        if collected.heal > 0.0 {
            self.player.heal(collected.heal);
            self.events.push(SimEvent::Pickup);
        }
        for _ in 0..collected.chests {
            self.pending.push_back(UpgradeSource::Chest);
        }

        for outcome in resolve_player_contact(&mut self.player, &mut self.enemies) {
            if matches!(outcome, HitOutcome::Damaged(_) | HitOutcome::Killed(_)) {
                self.events.push(SimEvent::Hit);
            }
        }

        if self.player.is_dead() {
            self.end_run();
        } else if !self.pending.is_empty() {
            self.open_selection();
        }
        self.state
    }

    fn end_run(&mut self) {
        self.state = SessionState::Ended;
        self.pending.clear();
        self.offer.clear();
        self.events.push(SimEvent::Death);
        let r = self.record();
        info!(
            "Run ended after {:.1}s at level {} with {} kills ({:.0} damage dealt)",
            r.time_survived, r.level, r.kills, r.damage_dealt
        );
    }

    fn open_selection(&mut self) {
        self.offer = self
            .controller
            .upgrade_options(self.config.inventory.option_count, &mut self.rng);
        self.state = SessionState::AwaitingUpgrade;
        self.events.push(SimEvent::LevelUp);
        debug!(
            "Upgrade selection opened ({:?}, {} queued)",
            self.pending.front(),
            self.pending.len()
        );
    }

    /// Apply one of the offered options and resume, or move on to the next
    /// queued selection.
    pub fn commit_upgrade(&mut self, choice: UpgradeChoice) -> SimResult<UpgradeOutcome> {
        if self.state != SessionState::AwaitingUpgrade {
            return Err(SimError::NoPendingUpgrade);
        }
        if !self.offer.iter().any(|o| o.choice == choice) {
            return Err(SimError::ChoiceNotOffered {
                choice: choice.to_string(),
            });
        }
        let applied = self.controller.apply_upgrade(choice, &mut self.player);
        self.pending.pop_front();
        self.offer.clear();
        self.events.push(SimEvent::LevelUp);
        if self.pending.is_empty() {
            self.state = SessionState::Running;
        } else {
            self.open_selection();
        }
        Ok(UpgradeOutcome {
            choice,
            applied,
            remaining: self.pending.len(),
        })
    }

    /// Take the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn record(&self) -> RunRecord {
        RunRecord {
            time_survived: self.elapsed,
            level: self.player.level,
            kills: self.player.kills,
            damage_dealt: self.player.damage_dealt,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }
}
