//! Balance configuration loaded from `assets/balance.toml`.
//!
//! [`GameConfig`] mirrors every default in [`crate::constants`] plus the
//! per-type enemy, weapon, and passive tables.  At startup
//! [`GameConfig::load_or_default`] reads the TOML file and overlays whatever it
//! finds on the compiled defaults, so a minimal file can override just the
//! values you care about.
//!
//! ## Overriding a per-type table
//!
//! Scalar sections (`[player]`, `[spawner]`, …) merge key by key.  Per-type
//! tables (`[enemies.tank]`, `[weapons.wand]`, `[passives.armor_boost]`)
//! replace the whole record, so every required key of that record must be
//! given.
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/balance.toml`.
//! 2. Restart the run; no recompilation required.
//!
//! The config is immutable once a session is built and is shared as
//! `Arc<GameConfig>` between the spawner, the weapon controller and the
//! collision resolver.

use crate::constants::*;
use crate::enemy::{EnemyKind, EnemyShape, SpecialMovement};
use crate::error::{ConfigError, ConfigResult};
use crate::player::PassiveKind;
use crate::player::PassiveStat;
use crate::weapons::WeaponKind;
use bevy::log::{info, warn};
use bevy::prelude::Resource;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Default location of the balance file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "assets/balance.toml";

/// Complete, immutable balance data for one session.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub xp: XpConfig,
    pub spawner: SpawnerConfig,
    pub drops: DropConfig,
    pub inventory: InventoryConfig,
    pub cheats: CheatConfig,
    pub enemies: EnemyTable,
    pub weapons: WeaponTable,
    pub passives: PassiveTable,
    /// Fixed RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            player: PlayerConfig::default(),
            xp: XpConfig::default(),
            spawner: SpawnerConfig::default(),
            drops: DropConfig::default(),
            inventory: InventoryConfig::default(),
            cheats: CheatConfig::default(),
            enemies: EnemyTable::default(),
            weapons: WeaponTable::default(),
            passives: PassiveTable::default(),
            seed: None,
        }
    }
}

// ── Scalar sections ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_hp: f32,
    pub move_speed: f32,
    pub pickup_radius: f32,
    pub might: f32,
    pub cooldown_reduction: f32,
    pub armor: f32,
    pub regen: f32,
    pub size: f32,
    pub invincibility_duration: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_hp: PLAYER_MAX_HP,
            move_speed: PLAYER_MOVE_SPEED,
            pickup_radius: PLAYER_PICKUP_RADIUS,
            might: PLAYER_MIGHT,
            cooldown_reduction: PLAYER_COOLDOWN_REDUCTION,
            armor: PLAYER_ARMOR,
            regen: PLAYER_REGEN,
            size: PLAYER_SIZE,
            invincibility_duration: INVINCIBILITY_DURATION,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct XpConfig {
    pub base_xp_to_level: u32,
    pub xp_per_level_increase: u32,
    pub max_level: u32,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            base_xp_to_level: BASE_XP_TO_LEVEL,
            xp_per_level_increase: XP_PER_LEVEL_INCREASE,
            max_level: MAX_PLAYER_LEVEL,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub base_spawn_rate: f32,
    pub spawn_rate_increase_per_minute: f32,
    pub max_spawn_rate: f32,
    pub spawn_buffer: f32,
    pub boss_spawn_interval: f32,
    pub difficulty_hp_scale_per_minute: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            base_spawn_rate: BASE_SPAWN_RATE,
            spawn_rate_increase_per_minute: SPAWN_RATE_INCREASE_PER_MINUTE,
            max_spawn_rate: MAX_SPAWN_RATE,
            spawn_buffer: SPAWN_BUFFER,
            boss_spawn_interval: BOSS_SPAWN_INTERVAL,
            difficulty_hp_scale_per_minute: DIFFICULTY_HP_SCALE_PER_MINUTE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    pub health_pickup_value: f32,
    pub health_drop_chance: f64,
    pub chest_drop_chance: f64,
    pub magnet_speed: f32,
    pub collect_distance: f32,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            health_pickup_value: HEALTH_PICKUP_VALUE,
            health_drop_chance: HEALTH_DROP_CHANCE,
            chest_drop_chance: CHEST_DROP_CHANCE,
            magnet_speed: MAGNET_SPEED,
            collect_distance: COLLECT_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub max_weapons: usize,
    pub max_passives: usize,
    /// Options offered per upgrade selection.
    pub option_count: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            max_weapons: MAX_WEAPONS,
            max_passives: MAX_PASSIVES,
            option_count: UPGRADE_OPTION_COUNT,
        }
    }
}

/// Debug and testing switches.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheatConfig {
    /// Contact hits still open i-frames but never reduce HP.
    pub unlimited_health: bool,
    pub starting_weapon: WeaponKind,
    pub starting_weapon_level: u32,
    /// Passive id → level granted at session start.
    pub starting_passives: BTreeMap<PassiveKind, u32>,
    /// Multiplier applied to every XP gem before flooring.
    pub exp_multiplier: f32,
}

impl Default for CheatConfig {
    fn default() -> Self {
        Self {
            unlimited_health: false,
            starting_weapon: WeaponKind::Whip,
            starting_weapon_level: 1,
            starting_passives: BTreeMap::new(),
            exp_multiplier: 1.0,
        }
    }
}

// ── Per-type records ──────────────────────────────────────────────────────────

/// Base stats of one enemy type before difficulty scaling.
#[derive(Debug, Clone, Deserialize)]
pub struct EnemyProfile {
    pub hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub xp_value: u32,
    /// Relative chance of being picked by the regular spawner; 0 = never.
    pub spawn_weight: f32,
    /// Half-extent of the body (world units).
    pub size: f32,
    #[serde(default)]
    pub shape: EnemyShape,
    /// Copies spawned per pick (clustered around the spawn point).
    #[serde(default = "one")]
    pub spawn_count: u32,
    #[serde(default)]
    pub special: Option<SpecialMovement>,
}

fn one() -> u32 {
    1
}

impl EnemyProfile {
    fn basic(hp: f32, damage: f32, speed: f32, xp_value: u32, spawn_weight: f32, size: f32) -> Self {
        Self {
            hp,
            damage,
            speed,
            xp_value,
            spawn_weight,
            size,
            shape: EnemyShape::Circle,
            spawn_count: 1,
            special: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnemyTable {
    pub chaser: EnemyProfile,
    pub tank: EnemyProfile,
    pub swarm: EnemyProfile,
    pub ghost: EnemyProfile,
    pub bat: EnemyProfile,
    pub boss: EnemyProfile,
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            chaser: EnemyProfile::basic(10.0, 10.0, 80.0, 1, 50.0, 16.0),
            tank: EnemyProfile {
                shape: EnemyShape::Square,
                ..EnemyProfile::basic(50.0, 20.0, 40.0, 5, 20.0, 24.0)
            },
            swarm: EnemyProfile {
                shape: EnemyShape::Triangle,
                spawn_count: 5,
                ..EnemyProfile::basic(5.0, 5.0, 100.0, 1, 30.0, 12.0)
            },
            ghost: EnemyProfile {
                special: Some(SpecialMovement::Phase),
                ..EnemyProfile::basic(15.0, 15.0, 70.0, 3, 15.0, 20.0)
            },
            bat: EnemyProfile {
                special: Some(SpecialMovement::Zigzag),
                ..EnemyProfile::basic(8.0, 8.0, 120.0, 2, 25.0, 14.0)
            },
            boss: EnemyProfile {
                shape: EnemyShape::Square,
                ..EnemyProfile::basic(500.0, 30.0, 50.0, 50, 0.0, 48.0)
            },
        }
    }
}

impl EnemyTable {
    pub fn get(&self, kind: EnemyKind) -> &EnemyProfile {
        match kind {
            EnemyKind::Chaser => &self.chaser,
            EnemyKind::Tank => &self.tank,
            EnemyKind::Swarm => &self.swarm,
            EnemyKind::Ghost => &self.ghost,
            EnemyKind::Bat => &self.bat,
            EnemyKind::Boss => &self.boss,
        }
    }
}

/// One-time upgrade of a maxed weapon.
#[derive(Debug, Clone, Deserialize)]
pub struct EvolutionProfile {
    pub display_name: String,
    /// Passive the player must own for the evolution to be offered.
    pub required_passive: PassiveKind,
    pub damage_multiplier: f32,
    /// Evolved projectiles steer toward their locked target.
    #[serde(default)]
    pub homing: bool,
}

/// Base stats and per-level deltas of one weapon type.
#[derive(Debug, Clone, Deserialize)]
pub struct WeaponProfile {
    pub display_name: String,
    pub base_damage: f32,
    pub base_cooldown: f32,
    pub base_area: f32,
    /// Projectile speed (u/s); unused by melee and aura weapons.
    pub base_speed: f32,
    pub base_amount: u32,
    /// Hits per effect; values ≥ 999 mean unlimited.
    pub base_pierce: u32,
    pub max_level: u32,
    #[serde(default)]
    pub damage_per_level: f32,
    #[serde(default)]
    pub cooldown_per_level: f32,
    #[serde(default)]
    pub area_per_level: f32,
    /// Added once for every two levels gained.
    #[serde(default)]
    pub amount_per_level: u32,
    /// Aura radius before area and size scaling; only read for garlic.
    #[serde(default)]
    pub base_radius: f32,
    #[serde(default)]
    pub evolution: Option<EvolutionProfile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeaponTable {
    pub whip: WeaponProfile,
    pub wand: WeaponProfile,
    pub garlic: WeaponProfile,
    pub axe: WeaponProfile,
    pub knife: WeaponProfile,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            whip: WeaponProfile {
                display_name: "Whip".into(),
                base_damage: 20.0,
                base_cooldown: 1.5,
                base_area: 1.0,
                base_speed: 1.0,
                base_amount: 1,
                base_pierce: UNLIMITED_PIERCE,
                max_level: 8,
                damage_per_level: 5.0,
                cooldown_per_level: -0.1,
                area_per_level: 0.1,
                amount_per_level: 0,
                base_radius: 0.0,
                evolution: Some(EvolutionProfile {
                    display_name: "Bloody Whip".into(),
                    required_passive: PassiveKind::MightBoost,
                    damage_multiplier: 2.0,
                    homing: false,
                }),
            },
            wand: WeaponProfile {
                display_name: "Magic Wand".into(),
                base_damage: 10.0,
                base_cooldown: 1.0,
                base_area: 1.0,
                base_speed: 400.0,
                base_amount: 1,
                base_pierce: 1,
                max_level: 8,
                damage_per_level: 3.0,
                cooldown_per_level: -0.08,
                area_per_level: 0.0,
                amount_per_level: 1,
                base_radius: 0.0,
                evolution: Some(EvolutionProfile {
                    display_name: "Holy Wand".into(),
                    required_passive: PassiveKind::CooldownBoost,
                    damage_multiplier: 1.5,
                    homing: true,
                }),
            },
            garlic: WeaponProfile {
                display_name: "Garlic".into(),
                base_damage: 5.0,
                base_cooldown: 0.5,
                base_area: 1.0,
                base_speed: 0.0,
                base_amount: 1,
                base_pierce: UNLIMITED_PIERCE,
                max_level: 8,
                damage_per_level: 2.0,
                cooldown_per_level: -0.03,
                area_per_level: 0.15,
                amount_per_level: 0,
                base_radius: 60.0,
                evolution: Some(EvolutionProfile {
                    display_name: "Soul Eater".into(),
                    required_passive: PassiveKind::RegenBoost,
                    damage_multiplier: 1.8,
                    homing: false,
                }),
            },
            axe: WeaponProfile {
                display_name: "Axe".into(),
                base_damage: 25.0,
                base_cooldown: 2.0,
                base_area: 1.0,
                base_speed: 300.0,
                base_amount: 1,
                base_pierce: UNLIMITED_PIERCE,
                max_level: 8,
                damage_per_level: 8.0,
                cooldown_per_level: -0.12,
                area_per_level: 0.1,
                amount_per_level: 1,
                base_radius: 0.0,
                evolution: None,
            },
            knife: WeaponProfile {
                display_name: "Knife".into(),
                base_damage: 8.0,
                base_cooldown: 0.3,
                base_area: 1.0,
                base_speed: 500.0,
                base_amount: 1,
                base_pierce: 1,
                max_level: 8,
                damage_per_level: 2.0,
                cooldown_per_level: -0.02,
                area_per_level: 0.0,
                amount_per_level: 1,
                base_radius: 0.0,
                evolution: None,
            },
        }
    }
}

impl WeaponTable {
    pub fn get(&self, kind: WeaponKind) -> &WeaponProfile {
        match kind {
            WeaponKind::Whip => &self.whip,
            WeaponKind::Wand => &self.wand,
            WeaponKind::Garlic => &self.garlic,
            WeaponKind::Axe => &self.axe,
            WeaponKind::Knife => &self.knife,
        }
    }
}

/// One passive item: which stat it touches and by how much per level.
#[derive(Debug, Clone, Deserialize)]
pub struct PassiveProfile {
    pub display_name: String,
    pub stat: PassiveStat,
    pub value_per_level: f32,
    pub max_level: u32,
}

impl PassiveProfile {
    fn new(display_name: &str, stat: PassiveStat, value_per_level: f32) -> Self {
        Self {
            display_name: display_name.into(),
            stat,
            value_per_level,
            max_level: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PassiveTable {
    pub might_boost: PassiveProfile,
    pub max_hp_boost: PassiveProfile,
    pub regen_boost: PassiveProfile,
    pub pickup_boost: PassiveProfile,
    pub armor_boost: PassiveProfile,
    pub speed_boost: PassiveProfile,
    pub cooldown_boost: PassiveProfile,
}

impl Default for PassiveTable {
    fn default() -> Self {
        Self {
            might_boost: PassiveProfile::new("Spinach", PassiveStat::Might, 0.1),
            max_hp_boost: PassiveProfile::new("Hollow Heart", PassiveStat::MaxHp, 20.0),
            regen_boost: PassiveProfile::new("Pummarola", PassiveStat::Regen, 0.5),
            pickup_boost: PassiveProfile::new("Attractorb", PassiveStat::PickupRadius, 0.2),
            armor_boost: PassiveProfile::new("Armor", PassiveStat::Armor, 1.0),
            speed_boost: PassiveProfile::new("Wings", PassiveStat::MoveSpeed, 0.1),
            cooldown_boost: PassiveProfile::new(
                "Empty Tome",
                PassiveStat::CooldownReduction,
                0.08,
            ),
        }
    }
}

impl PassiveTable {
    pub fn get(&self, kind: PassiveKind) -> &PassiveProfile {
        match kind {
            PassiveKind::MightBoost => &self.might_boost,
            PassiveKind::MaxHpBoost => &self.max_hp_boost,
            PassiveKind::RegenBoost => &self.regen_boost,
            PassiveKind::PickupBoost => &self.pickup_boost,
            PassiveKind::ArmorBoost => &self.armor_boost,
            PassiveKind::SpeedBoost => &self.speed_boost,
            PassiveKind::CooldownBoost => &self.cooldown_boost,
        }
    }
}

// ── Loading & validation ──────────────────────────────────────────────────────

impl GameConfig {
    /// Parse a config from TOML text, overlaying it on the compiled defaults.
    pub fn from_toml_str(text: &str, origin: &str) -> ConfigResult<Self> {
        toml::from_str::<GameConfig>(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Load and validate `path`.  A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let config = match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents, &shown)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No {shown} found; using compiled defaults");
                Self::default()
            }
            Err(source) => return Err(ConfigError::Io { path: shown, source }),
        };
        config.validate()?;
        Ok(config)
    }

    /// Like [`GameConfig::load`], but any error is logged and the defaults are
    /// used instead.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded balance config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{e}; using compiled defaults");
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        fn check(ok: bool, field: &'static str, reason: &'static str) -> ConfigResult<()> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason })
            }
        }

        check(self.world.width > 0.0, "world.width", "must be positive")?;
        check(self.world.height > 0.0, "world.height", "must be positive")?;
        check(self.player.max_hp > 0.0, "player.max_hp", "must be positive")?;
        check(
            self.spawner.base_spawn_rate >= 0.0,
            "spawner.base_spawn_rate",
            "must not be negative",
        )?;
        check(
            self.spawner.spawn_rate_increase_per_minute >= 0.0,
            "spawner.spawn_rate_increase_per_minute",
            "must not be negative",
        )?;
        check(
            self.spawner.max_spawn_rate >= self.spawner.base_spawn_rate,
            "spawner.max_spawn_rate",
            "must be at least spawner.base_spawn_rate",
        )?;
        check(
            self.spawner.boss_spawn_interval > 0.0,
            "spawner.boss_spawn_interval",
            "must be positive",
        )?;
        check(
            (0.0..=1.0).contains(&self.drops.health_drop_chance),
            "drops.health_drop_chance",
            "must be within [0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.drops.chest_drop_chance),
            "drops.chest_drop_chance",
            "must be within [0, 1]",
        )?;
        check(
            self.inventory.option_count > 0,
            "inventory.option_count",
            "must be at least 1",
        )?;
        for kind in WeaponKind::ALL {
            check(
                self.weapons.get(kind).max_level > 0,
                "weapons.max_level",
                "must be at least 1",
            )?;
        }
        for kind in PassiveKind::ALL {
            check(
                self.passives.get(kind).max_level > 0,
                "passives.max_level",
                "must be at least 1",
            )?;
        }
        for kind in EnemyKind::ALL {
            check(
                self.enemies.get(kind).spawn_weight >= 0.0,
                "enemies.spawn_weight",
                "must not be negative",
            )?;
        }
        Ok(())
    }
}
