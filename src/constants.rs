//! Centralised balance and simulation constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameConfig::default`] is built from these values and
//! `assets/balance.toml` may override any of them at startup.
//!
//! ## Tuning guidance
//!
//! Enemy and weapon tables live in `config.rs` because they are per-type
//! records; the scalars below are the knobs shared by the whole session.

// ── World Bounds ──────────────────────────────────────────────────────────────

/// Width of the playable world (world units).  The player starts at the centre.
pub const WORLD_WIDTH: f32 = 2000.0;

/// Height of the playable world (world units).
pub const WORLD_HEIGHT: f32 = 2000.0;

/// Width of the viewport the renderer shows around the player.
///
/// Only used to place spawns just outside what the player can see.
pub const VIEWPORT_WIDTH: f32 = 1280.0;

/// Height of the viewport the renderer shows around the player.
pub const VIEWPORT_HEIGHT: f32 = 720.0;

/// Spawned enemies are clamped this far inside the world edge.
pub const SPAWN_EDGE_MARGIN: f32 = 50.0;

// ── Simulation Clock ──────────────────────────────────────────────────────────

/// Upper bound on a single tick's delta time (seconds).
///
/// A hitching frame is simulated as at most this much time so per-tick
/// movement stays bounded.
pub const MAX_TICK_DT: f32 = 0.1;

// ── Player ────────────────────────────────────────────────────────────────────

pub const PLAYER_MAX_HP: f32 = 100.0;
pub const PLAYER_MOVE_SPEED: f32 = 200.0;
pub const PLAYER_PICKUP_RADIUS: f32 = 80.0;
pub const PLAYER_MIGHT: f32 = 1.0;
pub const PLAYER_COOLDOWN_REDUCTION: f32 = 0.0;
pub const PLAYER_ARMOR: f32 = 0.0;
pub const PLAYER_REGEN: f32 = 0.0;

/// Player body radius.  The contact hitbox is this minus [`PLAYER_HITBOX_INSET`].
pub const PLAYER_SIZE: f32 = 24.0;

/// How far the contact hitbox is shrunk inside the drawn body on each side.
pub const PLAYER_HITBOX_INSET: f32 = 4.0;

/// Invincibility window opened by every contact hit (seconds).
pub const INVINCIBILITY_DURATION: f32 = 0.5;

/// Seconds between passive regeneration heals.
pub const REGEN_INTERVAL_SECS: f32 = 1.0;

/// Fraction of max HP restored on every level gained.
pub const LEVEL_UP_HEAL_FRACTION: f32 = 0.1;

// ── Experience Curve ──────────────────────────────────────────────────────────

/// Nominal XP needed for the first level.  Every threshold is half the
/// nominal curve, so reaching level 2 costs `BASE_XP_TO_LEVEL / 2`.
pub const BASE_XP_TO_LEVEL: u32 = 100;

/// Nominal XP added to the curve per level already reached.
pub const XP_PER_LEVEL_INCREASE: u32 = 50;

pub const MAX_PLAYER_LEVEL: u32 = 100;

// ── Enemies ───────────────────────────────────────────────────────────────────

/// Minimum seconds between two contact hits from the same enemy.
pub const ENEMY_CONTACT_COOLDOWN: f32 = 0.5;

/// Speed of the shove applied to an enemy when it is damaged (u/s).
pub const KNOCKBACK_SPEED: f32 = 200.0;

/// Duration of the shove; normal seeking is suspended while it runs.
pub const KNOCKBACK_DURATION: f32 = 0.1;

/// Enemy contact hitboxes are shrunk by this much on each side.
pub const ENEMY_HITBOX_INSET: f32 = 2.0;

/// Seconds between zig-zag direction flips.
pub const ZIGZAG_FLIP_SECS: f32 = 0.3;

/// Weight of the perpendicular bias added to zig-zag movement.
pub const ZIGZAG_BIAS: f32 = 0.5;

/// Render alpha sweep speed for phasing enemies (alpha units per second).
pub const PHASE_ALPHA_SPEED: f32 = 200.0;
pub const PHASE_ALPHA_MIN: f32 = 100.0;
pub const PHASE_ALPHA_MAX: f32 = 255.0;

// ── Spawner ───────────────────────────────────────────────────────────────────

/// Enemies per second at t = 0.
pub const BASE_SPAWN_RATE: f32 = 1.0;

/// Enemies-per-second added per elapsed minute.
pub const SPAWN_RATE_INCREASE_PER_MINUTE: f32 = 0.1;

/// Spawn rate ceiling (enemies per second).
pub const MAX_SPAWN_RATE: f32 = 10.0;

/// Distance beyond the half-viewport diagonal at which enemies appear.
pub const SPAWN_BUFFER: f32 = 100.0;

/// Seconds between boss spawns (the first boss appears at this time too).
pub const BOSS_SPAWN_INTERVAL: f32 = 600.0;

/// Fractional enemy HP increase per elapsed minute.
pub const DIFFICULTY_HP_SCALE_PER_MINUTE: f32 = 0.05;

/// Extra difficulty applied to bosses on top of the time multiplier.
pub const BOSS_DIFFICULTY_BONUS: f64 = 1.5;

/// Enemy damage grows at this fraction of the HP growth.
pub const DAMAGE_SCALE_RATIO: f64 = 0.5;

/// Tanks become more common once this many minutes have elapsed.
pub const TANK_BOOST_AFTER_MINUTES: f32 = 2.0;

/// Ghosts and bats become more common once this many minutes have elapsed.
pub const SPECIAL_BOOST_AFTER_MINUTES: f32 = 3.0;

/// Weight boost per minute for time-gated enemy types.
pub const WEIGHT_BOOST_PER_MINUTE: f32 = 0.1;

/// Half-width of the square around a swarm leader where followers appear.
pub const SWARM_SCATTER: f32 = 30.0;

// ── Weapons ───────────────────────────────────────────────────────────────────

/// Floor on any weapon cooldown before player modifiers apply (seconds).
pub const MIN_WEAPON_COOLDOWN: f32 = 0.1;

/// Pierce values at or above this are treated as unlimited.
pub const UNLIMITED_PIERCE: u32 = 999;

/// Angular gap between extra wand shots (degrees).
pub const WAND_SPREAD_DEGREES: f32 = 15.0;

/// Angular gap between adjacent knives (degrees).
pub const KNIFE_SPREAD_DEGREES: f32 = 10.0;

/// Axes leave at a random angle within ± this of the facing (degrees).
pub const AXE_SPREAD_DEGREES: f32 = 60.0;

/// Fraction of the way a homing shot turns toward its target per tick.
pub const HOMING_STEER: f32 = 0.1;

/// Idle per-enemy aura timers are pruned after this many tick intervals.
pub const AURA_TIMER_PRUNE_FACTOR: f32 = 2.0;

// ── Drops ─────────────────────────────────────────────────────────────────────

/// XP gems of at least this value use the medium tier.
pub const GEM_MEDIUM_THRESHOLD: u32 = 5;

/// XP gems of at least this value use the large tier.
pub const GEM_LARGE_THRESHOLD: u32 = 25;

/// HP restored by a health pickup.
pub const HEALTH_PICKUP_VALUE: f32 = 20.0;

/// Chance that a killed enemy also drops a health pickup.
pub const HEALTH_DROP_CHANCE: f64 = 0.02;

/// Chance that a killed enemy also drops a chest.
pub const CHEST_DROP_CHANCE: f64 = 0.005;

/// Health pickups land within ± this of the gem.
pub const HEALTH_DROP_JITTER: f32 = 10.0;

/// Chests land within ± this of the gem.
pub const CHEST_DROP_JITTER: f32 = 15.0;

/// Base pull speed of a magnetised drop (u/s); doubles as it reaches the player.
pub const MAGNET_SPEED: f32 = 500.0;

/// A magnetised drop is collected inside this distance.
pub const COLLECT_DISTANCE: f32 = 5.0;

/// A chest is collected when the player is within its size plus this margin.
pub const CHEST_SIZE: f32 = 16.0;
pub const CHEST_COLLECT_MARGIN: f32 = 10.0;

// ── Inventory & Upgrades ──────────────────────────────────────────────────────

pub const MAX_WEAPONS: usize = 6;
pub const MAX_PASSIVES: usize = 6;

/// Number of options offered on every upgrade selection.
pub const UPGRADE_OPTION_COUNT: usize = 3;

/// HP restored by the filler option offered when nothing else can be upgraded.
pub const RECOVERY_HEAL: f32 = 30.0;
