//! Time-driven enemy spawning with difficulty scaling.
//!
//! ## Curves
//!
//! | Quantity | Formula |
//! |----------|---------|
//! | spawn rate | `min(base + increase · t/60, max)` enemies per second |
//! | difficulty | `1 + hp_scale · t/60` |
//! | enemy HP | `round(base_hp · difficulty)` |
//! | enemy damage | `round(base_damage · (1 + (difficulty − 1) · 0.5))` |
//!
//! Rounding is half-up everywhere (see [`crate::enemy::scale_stat`]).
//!
//! Regular enemies appear on a ring just outside the viewport around the
//! player.  Bosses run on an independent timer and get an extra ×1.5 on top of
//! the time multiplier.

use crate::config::GameConfig;
use crate::constants::{
    BOSS_DIFFICULTY_BONUS, SPAWN_EDGE_MARGIN, SPECIAL_BOOST_AFTER_MINUTES, SWARM_SCATTER,
    TANK_BOOST_AFTER_MINUTES, WEIGHT_BOOST_PER_MINUTE,
};
use crate::enemy::{Enemy, EnemyArena, EnemyId, EnemyKind};
use crate::geometry::{clamp_to_world, ring_point};
use crate::timer::CooldownTimer;
use bevy::log::{debug, info};
use bevy::math::Vec2;
use rand::Rng;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Read-only spawner summary for HUDs and logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnerStats {
    pub total_spawned: u64,
    pub spawn_rate: f32,
    pub difficulty: f64,
    pub elapsed: f32,
}

#[derive(Debug, Clone)]
pub struct EnemySpawner {
    config: Arc<GameConfig>,
    /// Session time seen by the spawner (seconds).
    elapsed: f32,
    /// Time banked toward the next regular spawn.
    accumulator: f32,
    /// Counts down to the next boss from session start or the last boss.
    boss_timer: CooldownTimer,
    total_spawned: u64,
}

impl EnemySpawner {
    pub fn new(config: Arc<GameConfig>) -> Self {
        let boss_timer = CooldownTimer::new_elapsed_zero(config.spawner.boss_spawn_interval);
        Self {
            config,
            elapsed: 0.0,
            accumulator: 0.0,
            boss_timer,
            total_spawned: 0,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    /// Spawn rate at session time `t`.
    pub fn spawn_rate_at(&self, t: f32) -> f32 {
        let s = &self.config.spawner;
        (s.base_spawn_rate + s.spawn_rate_increase_per_minute * (t / 60.0)).min(s.max_spawn_rate)
    }

    pub fn spawn_rate(&self) -> f32 {
        self.spawn_rate_at(self.elapsed)
    }

    /// Difficulty multiplier at session time `t`.
    pub fn difficulty_at(&self, t: f32) -> f64 {
        1.0 + self.config.spawner.difficulty_hp_scale_per_minute as f64 * (t as f64 / 60.0)
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty_at(self.elapsed)
    }

    /// Spawn weights at `minutes`, in table order, zero-weight kinds omitted.
    pub fn weights_at(&self, minutes: f32) -> Vec<(EnemyKind, f32)> {
        let boost = 1.0 + minutes * WEIGHT_BOOST_PER_MINUTE;
        EnemyKind::REGULAR
            .into_iter()
            .filter_map(|kind| {
                let mut w = self.config.enemies.get(kind).spawn_weight;
                if w <= 0.0 {
                    return None;
                }
                let boosted = match kind {
                    EnemyKind::Tank => minutes > TANK_BOOST_AFTER_MINUTES,
                    EnemyKind::Ghost | EnemyKind::Bat => minutes > SPECIAL_BOOST_AFTER_MINUTES,
                    _ => false,
                };
                if boosted {
                    w *= boost;
                }
                Some((kind, w))
            })
            .collect()
    }

    /// Weighted pick for the current session time.
    pub fn select_kind<R: Rng + ?Sized>(&self, rng: &mut R) -> EnemyKind {
        weighted_pick(&self.weights_at(self.elapsed / 60.0), rng)
    }

    /// A point on the ring just outside the viewport around `player_pos`.
    pub fn spawn_position<R: Rng + ?Sized>(&self, player_pos: Vec2, rng: &mut R) -> Vec2 {
        let w = &self.config.world;
        let half_diag = Vec2::new(w.viewport_width, w.viewport_height).length() * 0.5;
        let radius = half_diag + self.config.spawner.spawn_buffer;
        let angle = rng.gen_range(0.0..TAU);
        clamp_to_world(
            ring_point(player_pos, radius, angle),
            Vec2::new(w.width, w.height),
            SPAWN_EDGE_MARGIN,
        )
    }

    /// Spawn one pick of `kind` (or a weighted-random kind), including any
    /// clustered copies.  Returns the ids of every enemy created.
    pub fn spawn_enemy<R: Rng + ?Sized>(
        &mut self,
        kind: Option<EnemyKind>,
        player_pos: Vec2,
        enemies: &mut EnemyArena,
        rng: &mut R,
    ) -> Vec<EnemyId> {
        let kind = kind.unwrap_or_else(|| self.select_kind(rng));
        let profile = self.config.enemies.get(kind);
        let pos = self.spawn_position(player_pos, rng);
        let difficulty = self.difficulty();
        let world = Vec2::new(self.config.world.width, self.config.world.height);

        let mut ids = Vec::with_capacity(profile.spawn_count.max(1) as usize);
        ids.push(enemies.insert(Enemy::new(kind, profile, pos, difficulty)));
        for _ in 1..profile.spawn_count {
            let offset = Vec2::new(
                rng.gen_range(-SWARM_SCATTER..=SWARM_SCATTER),
                rng.gen_range(-SWARM_SCATTER..=SWARM_SCATTER),
            );
            let p = clamp_to_world(pos + offset, world, SPAWN_EDGE_MARGIN);
            ids.push(enemies.insert(Enemy::new(kind, profile, p, difficulty)));
        }
        self.total_spawned += ids.len() as u64;
        ids
    }

    pub fn spawn_boss<R: Rng + ?Sized>(
        &mut self,
        player_pos: Vec2,
        enemies: &mut EnemyArena,
        rng: &mut R,
    ) -> EnemyId {
        let pos = self.spawn_position(player_pos, rng);
        let difficulty = self.difficulty() * BOSS_DIFFICULTY_BONUS;
        let boss = Enemy::new(EnemyKind::Boss, &self.config.enemies.boss, pos, difficulty);
        info!(
            "Boss spawned at {:.0}s (hp {:.0}, difficulty ×{:.2})",
            self.elapsed, boss.max_hp, difficulty
        );
        self.total_spawned += 1;
        self.boss_timer.reset();
        enemies.insert(boss)
    }

    /// Scripted burst of `count` picks.
    pub fn spawn_wave<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        kind: Option<EnemyKind>,
        player_pos: Vec2,
        enemies: &mut EnemyArena,
        rng: &mut R,
    ) -> Vec<EnemyId> {
        let mut ids = Vec::new();
        for _ in 0..count {
            ids.extend(self.spawn_enemy(kind, player_pos, enemies, rng));
        }
        debug!("Wave of {count} picks spawned {} enemies", ids.len());
        ids
    }

    /// Advance the spawner clock and create whatever is due.
    ///
    /// Returns the number of enemies created this call.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        player_pos: Vec2,
        enemies: &mut EnemyArena,
        rng: &mut R,
    ) -> usize {
        self.elapsed += dt;
        self.accumulator += dt;
        let before = self.total_spawned;

        let rate = self.spawn_rate();
        if rate > 0.0 {
            let interval = 1.0 / rate;
            while self.accumulator >= interval {
                self.accumulator -= interval;
                self.spawn_enemy(None, player_pos, enemies, rng);
            }
        } else {
            self.accumulator = 0.0;
        }

        self.boss_timer.tick(dt);
        if self.boss_timer.ready() {
            self.spawn_boss(player_pos, enemies, rng);
        }

        (self.total_spawned - before) as usize
    }

    pub fn stats(&self) -> SpawnerStats {
        SpawnerStats {
            total_spawned: self.total_spawned,
            spawn_rate: self.spawn_rate(),
            difficulty: self.difficulty(),
            elapsed: self.elapsed,
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.accumulator = 0.0;
        self.boss_timer = CooldownTimer::new_elapsed_zero(self.config.spawner.boss_spawn_interval);
        self.total_spawned = 0;
    }
}

/// Draw in `[0, total]` and walk the cumulative sum; first bucket whose
/// cumulative weight reaches the draw wins.  Empty or zero-total weights
/// default to the chaser.
pub fn weighted_pick<R: Rng + ?Sized>(weights: &[(EnemyKind, f32)], rng: &mut R) -> EnemyKind {
    let total: f32 = weights.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return EnemyKind::Chaser;
    }
    let roll = rng.gen_range(0.0..=total);
    let mut cumulative = 0.0;
    for &(kind, w) in weights {
        cumulative += w.max(0.0);
        if roll <= cumulative {
            return kind;
        }
    }
    EnemyKind::Chaser
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spawner() -> EnemySpawner {
        EnemySpawner::new(Arc::new(GameConfig::default()))
    }

    const CENTER: Vec2 = Vec2::splat(1000.0);

    #[test]
    fn spawn_rate_grows_then_saturates() {
        let s = spawner();
        let mut prev = 0.0;
        for minute in 0..200 {
            let r = s.spawn_rate_at(minute as f32 * 60.0);
            assert!(r >= prev);
            prev = r;
        }
        assert_eq!(s.spawn_rate_at(0.0), 1.0);
        assert!((s.spawn_rate_at(600.0) - 2.0).abs() < 1e-5);
        assert_eq!(s.spawn_rate_at(60.0 * 500.0), 10.0);
    }

    #[test]
    fn difficulty_at_two_minutes() {
        let s = spawner();
        assert!((s.difficulty_at(120.0) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn one_spawn_per_second_at_start() {
        let mut s = spawner();
        let mut arena = EnemyArena::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut config = GameConfig::default();
        config.enemies.swarm.spawn_weight = 0.0;
        s.config = Arc::new(config);
        for _ in 0..8 {
            s.update(0.25, CENTER, &mut arena, &mut rng);
        }
        // 2 s at rate ≈ 1.0–1.003/s.
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn large_tick_spawns_multiple() {
        let mut config = GameConfig::default();
        config.spawner.base_spawn_rate = 4.0;
        config.enemies.swarm.spawn_weight = 0.0;
        let mut s = EnemySpawner::new(Arc::new(config));
        let mut arena = EnemyArena::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(s.update(1.0, CENTER, &mut arena, &mut rng), 4);
    }

    #[test]
    fn spawns_land_on_ring_inside_world() {
        let s = spawner();
        let mut rng = StdRng::seed_from_u64(3);
        let radius = (640.0f32 * 640.0 + 360.0 * 360.0).sqrt() + 100.0;
        for _ in 0..200 {
            let p = s.spawn_position(CENTER, &mut rng);
            assert!(p.x >= 50.0 && p.x <= 1950.0 && p.y >= 50.0 && p.y <= 1950.0);
            assert!(p.distance(CENTER) <= radius + 1e-2);
        }
    }

    #[test]
    fn weighted_draw_frequencies() {
        let weights = [
            (EnemyKind::Chaser, 50.0),
            (EnemyKind::Tank, 20.0),
            (EnemyKind::Swarm, 30.0),
        ];
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0u32; 3];
        let n = 100_000;
        for _ in 0..n {
            match weighted_pick(&weights, &mut rng) {
                EnemyKind::Chaser => counts[0] += 1,
                EnemyKind::Tank => counts[1] += 1,
                EnemyKind::Swarm => counts[2] += 1,
                other => panic!("unexpected {other:?}"),
            }
        }
        let freq: Vec<f64> = counts.iter().map(|&c| c as f64 / n as f64).collect();
        assert!((freq[0] - 0.5).abs() < 0.01);
        assert!((freq[1] - 0.2).abs() < 0.01);
        assert!((freq[2] - 0.3).abs() < 0.01);
    }

    #[test]
    fn zero_weights_default_to_chaser() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(weighted_pick(&[], &mut rng), EnemyKind::Chaser);
        assert_eq!(
            weighted_pick(&[(EnemyKind::Tank, 0.0)], &mut rng),
            EnemyKind::Chaser
        );
    }

    #[test]
    fn time_boosts_apply_after_thresholds() {
        let s = spawner();
        let at = |m: f32, k: EnemyKind| {
            s.weights_at(m)
                .into_iter()
                .find(|(kind, _)| *kind == k)
                .map(|(_, w)| w)
        };
        assert_eq!(at(2.0, EnemyKind::Tank), Some(20.0));
        assert!((at(2.5, EnemyKind::Tank).unwrap() - 25.0).abs() < 1e-4);
        assert_eq!(at(3.0, EnemyKind::Bat), Some(25.0));
        assert!((at(4.0, EnemyKind::Ghost).unwrap() - 21.0).abs() < 1e-4);
        assert_eq!(at(10.0, EnemyKind::Chaser), Some(50.0));
        assert_eq!(at(10.0, EnemyKind::Boss), None);
    }

    #[test]
    fn swarm_spawns_cluster() {
        let mut s = spawner();
        let mut arena = EnemyArena::new();
        let mut rng = StdRng::seed_from_u64(9);
        let ids = s.spawn_enemy(Some(EnemyKind::Swarm), CENTER, &mut arena, &mut rng);
        assert_eq!(ids.len(), 5);
        let leader = arena.get(ids[0]).unwrap().pos;
        for id in &ids[1..] {
            let p = arena.get(*id).unwrap().pos;
            assert!((p - leader).abs().max_element() <= SWARM_SCATTER + 1e-3);
        }
        assert_eq!(s.total_spawned(), 5);
    }

    #[test]
    fn boss_spawns_once_per_interval() {
        let mut config = GameConfig::default();
        config.spawner.base_spawn_rate = 0.0;
        config.spawner.spawn_rate_increase_per_minute = 0.0;
        config.spawner.max_spawn_rate = 0.0;
        config.spawner.boss_spawn_interval = 10.0;
        let mut s = EnemySpawner::new(Arc::new(config));
        let mut arena = EnemyArena::new();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..40 {
            s.update(0.5, CENTER, &mut arena, &mut rng);
        }
        let bosses = arena.iter().filter(|(_, e)| e.is_boss()).count();
        assert_eq!(bosses, 2);
        let first = arena.iter().next().unwrap().1;
        // 500 · (1 + 0.05·10/60) · 1.5 = 756.25 → 756
        assert_eq!(first.max_hp, 756.0);
    }

    #[test]
    fn manual_boss_restarts_the_countdown() {
        let mut config = GameConfig::default();
        config.spawner.base_spawn_rate = 0.0;
        config.spawner.max_spawn_rate = 0.0;
        config.spawner.boss_spawn_interval = 10.0;
        let mut s = EnemySpawner::new(Arc::new(config));
        let mut arena = EnemyArena::new();
        let mut rng = StdRng::seed_from_u64(6);
        let bosses = |arena: &EnemyArena| arena.iter().filter(|(_, e)| e.is_boss()).count();

        for _ in 0..10 {
            s.update(0.5, CENTER, &mut arena, &mut rng);
        }
        s.spawn_boss(CENTER, &mut arena, &mut rng);
        for _ in 0..19 {
            s.update(0.5, CENTER, &mut arena, &mut rng);
        }
        assert_eq!(bosses(&arena), 1);
        s.update(0.5, CENTER, &mut arena, &mut rng);
        assert_eq!(bosses(&arena), 2);
    }

    #[test]
    fn wave_and_reset() {
        let mut s = spawner();
        let mut arena = EnemyArena::new();
        let mut rng = StdRng::seed_from_u64(11);
        let ids = s.spawn_wave(3, Some(EnemyKind::Tank), CENTER, &mut arena, &mut rng);
        assert_eq!(ids.len(), 3);
        assert_eq!(s.stats().total_spawned, 3);
        s.update(1.0, CENTER, &mut arena, &mut rng);
        s.reset();
        let stats = s.stats();
        assert_eq!(stats.total_spawned, 0);
        assert_eq!(stats.elapsed, 0.0);
        assert_eq!(stats.spawn_rate, 1.0);
    }
}
