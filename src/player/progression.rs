//! Experience curve and passive stat items.
//!
//! Every XP threshold is computed at half the nominal curve:
//!
//! ```text
//! threshold(level) = (base + (level − 1) · increase) / 2     (integer division)
//! ```
//!
//! so with the default 100 / 50 curve the player needs 50 XP for level 2,
//! 75 for level 3, 100 for level 4, and so on.

use crate::config::XpConfig;
use bevy::log::warn;
use serde::Deserialize;

/// XP required to advance *from* `level` to `level + 1`.
pub fn xp_threshold(config: &XpConfig, level: u32) -> u32 {
    let nominal = config.base_xp_to_level + level.saturating_sub(1) * config.xp_per_level_increase;
    (nominal / 2).max(1)
}

/// Passive item identity.
///
/// Deserialises leniently: an unknown id logs a warning and becomes
/// [`PassiveKind::MightBoost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "String")]
pub enum PassiveKind {
    MightBoost,
    MaxHpBoost,
    RegenBoost,
    PickupBoost,
    ArmorBoost,
    SpeedBoost,
    CooldownBoost,
}

impl PassiveKind {
    pub const ALL: [PassiveKind; 7] = [
        PassiveKind::MightBoost,
        PassiveKind::MaxHpBoost,
        PassiveKind::RegenBoost,
        PassiveKind::PickupBoost,
        PassiveKind::ArmorBoost,
        PassiveKind::SpeedBoost,
        PassiveKind::CooldownBoost,
    ];

    pub fn id(self) -> &'static str {
        match self {
            PassiveKind::MightBoost => "might_boost",
            PassiveKind::MaxHpBoost => "max_hp_boost",
            PassiveKind::RegenBoost => "regen_boost",
            PassiveKind::PickupBoost => "pickup_boost",
            PassiveKind::ArmorBoost => "armor_boost",
            PassiveKind::SpeedBoost => "speed_boost",
            PassiveKind::CooldownBoost => "cooldown_boost",
        }
    }

    pub fn parse_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }
}

impl From<String> for PassiveKind {
    fn from(id: String) -> Self {
        Self::parse_id(&id).unwrap_or_else(|| {
            warn!("unknown passive id '{id}', falling back to might_boost");
            PassiveKind::MightBoost
        })
    }
}

/// Which player stat a passive touches, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassiveStat {
    /// `might += v`
    Might,
    /// `max_hp += v`, and the new HP is granted immediately.
    MaxHp,
    /// `regen += v` (HP per second).
    Regen,
    /// `pickup_radius *= 1 + v`
    PickupRadius,
    /// `armor += v`
    Armor,
    /// `move_speed *= 1 + v`
    MoveSpeed,
    /// `cooldown_reduction += v`
    CooldownReduction,
}
