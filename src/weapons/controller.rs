//! Weapon and passive inventory, upgrade offers and evolutions.

use super::{AttackContext, AttackEffect, GarlicAura, Weapon, WeaponInfo, WeaponKind};
use crate::config::GameConfig;
use crate::constants::RECOVERY_HEAL;
use crate::enemy::EnemyArena;
use crate::player::{PassiveKind, Player};
use bevy::log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::sync::Arc;

/// One thing the player can pick on a level-up or chest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeChoice {
    Weapon(WeaponKind),
    Passive(PassiveKind),
    Evolution(WeaponKind),
    /// Offered only when nothing else is left to upgrade.
    Recovery,
}

impl UpgradeChoice {
    /// Parse `"weapon:wand"`, `"passive:armor_boost"`, `"evolution:whip"` or `"recovery"`.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "recovery" {
            return Some(UpgradeChoice::Recovery);
        }
        let (kind, id) = s.split_once(':')?;
        match kind {
            "weapon" => WeaponKind::parse_id(id).map(UpgradeChoice::Weapon),
            "passive" => PassiveKind::parse_id(id).map(UpgradeChoice::Passive),
            "evolution" => WeaponKind::parse_id(id).map(UpgradeChoice::Evolution),
            _ => None,
        }
    }
}

impl fmt::Display for UpgradeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeChoice::Weapon(k) => write!(f, "weapon:{}", k.id()),
            UpgradeChoice::Passive(k) => write!(f, "passive:{}", k.id()),
            UpgradeChoice::Evolution(k) => write!(f, "evolution:{}", k.id()),
            UpgradeChoice::Recovery => f.write_str("recovery"),
        }
    }
}

/// An offered choice plus what the selection screen shows for it.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeOption {
    pub choice: UpgradeChoice,
    pub title: String,
    /// Not yet owned.
    pub is_new: bool,
    /// Owned level, 0 when new.
    pub current_level: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub weapons: Vec<WeaponInfo>,
    pub passives: Vec<(PassiveKind, u32)>,
}

#[derive(Debug, Clone)]
pub struct WeaponController {
    config: Arc<GameConfig>,
    weapons: Vec<Weapon>,
    /// Owned passives with their levels, in acquisition order.
    passives: Vec<(PassiveKind, u32)>,
}

impl WeaponController {
    /// Empty inventory.
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self {
            config,
            weapons: Vec::new(),
            passives: Vec::new(),
        }
    }

    /// Inventory seeded from the `cheats` section: the starting weapon at its
    /// starting level, then any starting passives (capped at their max).
    pub fn with_starting_loadout(config: Arc<GameConfig>, player: &mut Player) -> Self {
        let mut controller = Self::new(config.clone());
        let cheats = &config.cheats;
        controller.add_weapon(cheats.starting_weapon, player);
        for _ in 1..cheats.starting_weapon_level {
            if !controller.add_weapon(cheats.starting_weapon, player) {
                break;
            }
        }
        for (&kind, &levels) in &cheats.starting_passives {
            for _ in 0..levels {
                if !controller.add_passive(kind, player) {
                    break;
                }
            }
        }
        controller
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn weapon(&self, kind: WeaponKind) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.kind == kind)
    }

    fn weapon_mut(&mut self, kind: WeaponKind) -> Option<&mut Weapon> {
        self.weapons.iter_mut().find(|w| w.kind == kind)
    }

    pub fn passives(&self) -> &[(PassiveKind, u32)] {
        &self.passives
    }

    pub fn passive_level(&self, kind: PassiveKind) -> u32 {
        self.passives
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, level)| *level)
    }

    /// Garlic auras, for the collision pass.
    pub fn auras_mut(&mut self) -> impl Iterator<Item = &mut GarlicAura> {
        self.weapons.iter_mut().filter_map(Weapon::aura_mut)
    }

    /// Grant a new weapon, or level up one already owned.
    /// `false` when the weapon is maxed or every slot is taken.
    pub fn add_weapon(&mut self, kind: WeaponKind, player: &Player) -> bool {
        if let Some(weapon) = self.weapon_mut(kind) {
            return weapon.level_up(&player.stats);
        }
        if self.weapons.len() >= self.config.inventory.max_weapons {
            return false;
        }
        self.weapons
            .push(Weapon::new(kind, self.config.weapons.get(kind), &player.stats));
        debug!("added weapon {}", kind.id());
        true
    }

    /// Gain one level of a passive, apply it to the player and recompute
    /// every weapon.  `false` at the passive's cap or with no free slot.
    pub fn add_passive(&mut self, kind: PassiveKind, player: &mut Player) -> bool {
        let profile = self.config.passives.get(kind);
        match self.passives.iter().position(|(k, _)| *k == kind) {
            Some(i) if self.passives[i].1 >= profile.max_level => return false,
            Some(i) => self.passives[i].1 += 1,
            None if self.passives.len() >= self.config.inventory.max_passives => return false,
            None => self.passives.push((kind, 1)),
        }
        player.apply_passive(profile.stat, profile.value_per_level);
        for weapon in &mut self.weapons {
            weapon.recompute(&player.stats);
        }
        true
    }

    /// Weapons currently eligible to evolve.
    pub fn evolutions(&self) -> Vec<WeaponKind> {
        self.weapons
            .iter()
            .filter(|w| w.can_evolve(&self.passives))
            .map(|w| w.kind)
            .collect()
    }

    pub fn evolve_weapon(&mut self, kind: WeaponKind, player: &Player) -> bool {
        let passives = self.passives.clone();
        match self.weapon_mut(kind) {
            Some(w) if w.can_evolve(&passives) => w.evolve(&player.stats),
            _ => false,
        }
    }

    fn candidate_pool(&self) -> Vec<UpgradeOption> {
        let cfg = &self.config;
        let mut pool = Vec::new();

        for w in self.weapons.iter().filter(|w| !w.is_max_level()) {
            pool.push(UpgradeOption {
                choice: UpgradeChoice::Weapon(w.kind),
                title: w.display_name().to_string(),
                is_new: false,
                current_level: w.level(),
            });
        }
        if self.weapons.len() < cfg.inventory.max_weapons {
            for kind in WeaponKind::ALL.into_iter().filter(|k| self.weapon(*k).is_none()) {
                pool.push(UpgradeOption {
                    choice: UpgradeChoice::Weapon(kind),
                    title: cfg.weapons.get(kind).display_name.clone(),
                    is_new: true,
                    current_level: 0,
                });
            }
        }
        for &(kind, level) in &self.passives {
            let profile = cfg.passives.get(kind);
            if level < profile.max_level {
                pool.push(UpgradeOption {
                    choice: UpgradeChoice::Passive(kind),
                    title: profile.display_name.clone(),
                    is_new: false,
                    current_level: level,
                });
            }
        }
        if self.passives.len() < cfg.inventory.max_passives {
            for kind in PassiveKind::ALL
                .into_iter()
                .filter(|k| self.passive_level(*k) == 0)
            {
                pool.push(UpgradeOption {
                    choice: UpgradeChoice::Passive(kind),
                    title: cfg.passives.get(kind).display_name.clone(),
                    is_new: true,
                    current_level: 0,
                });
            }
        }
        for kind in self.evolutions() {
            let profile = cfg.weapons.get(kind);
            let title = profile
                .evolution
                .as_ref()
                .map_or_else(|| profile.display_name.clone(), |e| e.display_name.clone());
            pool.push(UpgradeOption {
                choice: UpgradeChoice::Evolution(kind),
                title,
                is_new: false,
                current_level: self.weapon(kind).map_or(0, Weapon::level),
            });
        }
        pool
    }

    /// Build `count` options: shuffle the candidate pool and take the head,
    /// resampling with repetition when the pool is short.  An exhausted pool
    /// yields recovery options, so the result is never empty.
    pub fn upgrade_options<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<UpgradeOption> {
        let count = count.max(1);
        let mut pool = self.candidate_pool();
        if pool.is_empty() {
            pool.push(UpgradeOption {
                choice: UpgradeChoice::Recovery,
                title: "Recovery".into(),
                is_new: false,
                current_level: 0,
            });
        }
        pool.shuffle(rng);
        let mut options: Vec<UpgradeOption> = pool.iter().take(count).cloned().collect();
        while options.len() < count {
            let Some(extra) = pool.choose(rng) else {
                break;
            };
            options.push(extra.clone());
        }
        options
    }

    /// Apply a committed choice.  `false` when it changed nothing
    /// (a maxed weapon or passive, a full inventory, an ineligible evolution).
    pub fn apply_upgrade(&mut self, choice: UpgradeChoice, player: &mut Player) -> bool {
        let applied = match choice {
            UpgradeChoice::Weapon(kind) => self.add_weapon(kind, player),
            UpgradeChoice::Passive(kind) => self.add_passive(kind, player),
            UpgradeChoice::Evolution(kind) => self.evolve_weapon(kind, player),
            UpgradeChoice::Recovery => {
                player.heal(RECOVERY_HEAL);
                true
            }
        };
        if applied {
            info!("upgrade applied: {choice}");
        }
        applied
    }

    /// Tick every weapon, collecting whatever they fire into `out`.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        player: &Player,
        enemies: &EnemyArena,
        rng: &mut R,
        out: &mut Vec<AttackEffect>,
    ) {
        let ctx = AttackContext {
            origin: player.pos,
            facing: player.facing,
            enemies,
        };
        for weapon in &mut self.weapons {
            weapon.update(dt, &ctx, rng, out);
        }
    }

    pub fn inventory(&self) -> Inventory {
        Inventory {
            weapons: self.weapons.iter().map(Weapon::info).collect(),
            passives: self.passives.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn setup(config: GameConfig) -> (WeaponController, Player) {
        let config = Arc::new(config);
        let mut player = Player::new(&config);
        let controller = WeaponController::with_starting_loadout(config, &mut player);
        (controller, player)
    }

    #[test]
    fn default_loadout_is_level_one_whip() {
        let (c, _) = setup(GameConfig::default());
        assert_eq!(c.weapons().len(), 1);
        assert_eq!(c.weapons()[0].kind, WeaponKind::Whip);
        assert_eq!(c.weapons()[0].level(), 1);
        assert!(c.passives().is_empty());
    }

    #[test]
    fn cheat_loadout_applies_levels_and_passives() {
        let mut cfg = GameConfig::default();
        cfg.cheats.starting_weapon = WeaponKind::Wand;
        cfg.cheats.starting_weapon_level = 20;
        cfg.cheats.starting_passives.insert(PassiveKind::MightBoost, 2);
        let (c, p) = setup(cfg);
        let wand = c.weapon(WeaponKind::Wand);
        assert_eq!(wand.map(Weapon::level), Some(8));
        assert_eq!(c.passive_level(PassiveKind::MightBoost), 2);
        assert!((p.stats.might - 1.2).abs() < 1e-5);
        // Wand level 8: (10 + 3·7) · 1.2
        assert!((wand.map_or(0.0, |w| w.stats().damage) - 37.2).abs() < 1e-3);
    }

    #[test]
    fn weapon_slots_are_capped() {
        let mut cfg = GameConfig::default();
        cfg.inventory.max_weapons = 2;
        let (mut c, p) = setup(cfg);
        assert!(c.add_weapon(WeaponKind::Knife, &p));
        assert!(!c.add_weapon(WeaponKind::Axe, &p));
        // Owned weapons still level up.
        assert!(c.add_weapon(WeaponKind::Knife, &p));
        assert_eq!(c.weapon(WeaponKind::Knife).map(Weapon::level), Some(2));
    }

    #[test]
    fn passive_cap_is_a_noop() {
        let (mut c, mut p) = setup(GameConfig::default());
        for _ in 0..5 {
            assert!(c.add_passive(PassiveKind::ArmorBoost, &mut p));
        }
        assert!(!c.add_passive(PassiveKind::ArmorBoost, &mut p));
        assert_eq!(p.stats.armor, 5.0);
    }

    #[test]
    fn passives_recompute_weapons() {
        let (mut c, mut p) = setup(GameConfig::default());
        c.add_passive(PassiveKind::CooldownBoost, &mut p);
        let cd = c.weapons()[0].stats().cooldown;
        assert!((cd - 1.5 * 0.92).abs() < 1e-5);
    }

    #[test]
    fn fresh_run_offers_three_distinct_options() {
        let (c, _) = setup(GameConfig::default());
        let mut rng = StdRng::seed_from_u64(11);
        // whip + 4 new weapons + 7 new passives
        assert_eq!(c.candidate_pool().len(), 12);
        let options = c.upgrade_options(3, &mut rng);
        assert_eq!(options.len(), 3);
        let unique: HashSet<_> = options.iter().map(|o| o.choice).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn short_pool_is_padded_then_recovery() {
        let mut cfg = GameConfig::default();
        cfg.inventory.max_weapons = 1;
        cfg.inventory.max_passives = 1;
        cfg.cheats.starting_weapon_level = 8;
        cfg.cheats.starting_passives.insert(PassiveKind::MightBoost, 5);
        let (mut c, mut p) = setup(cfg);
        let mut rng = StdRng::seed_from_u64(2);

        let options = c.upgrade_options(3, &mut rng);
        assert_eq!(options.len(), 3);
        assert!(options
            .iter()
            .all(|o| o.choice == UpgradeChoice::Evolution(WeaponKind::Whip)));
        assert_eq!(options[0].title, "Bloody Whip");

        assert!(c.apply_upgrade(UpgradeChoice::Evolution(WeaponKind::Whip), &mut p));
        assert!(!c.apply_upgrade(UpgradeChoice::Evolution(WeaponKind::Whip), &mut p));

        let options = c.upgrade_options(3, &mut rng);
        assert_eq!(options.len(), 3);
        assert!(options.iter().all(|o| o.choice == UpgradeChoice::Recovery));

        p.hp = 50.0;
        assert!(c.apply_upgrade(UpgradeChoice::Recovery, &mut p));
        assert_eq!(p.hp, 80.0);
    }

    #[test]
    fn evolution_enters_pool_when_eligible() {
        let mut cfg = GameConfig::default();
        cfg.cheats.starting_weapon_level = 8;
        let (mut c, mut p) = setup(cfg);
        assert!(c.evolutions().is_empty());
        c.add_passive(PassiveKind::MightBoost, &mut p);
        assert_eq!(c.evolutions(), vec![WeaponKind::Whip]);
        assert!(c
            .candidate_pool()
            .iter()
            .any(|o| o.choice == UpgradeChoice::Evolution(WeaponKind::Whip)));
    }

    #[test]
    fn choice_ids_parse() {
        for choice in [
            UpgradeChoice::Weapon(WeaponKind::Axe),
            UpgradeChoice::Passive(PassiveKind::SpeedBoost),
            UpgradeChoice::Evolution(WeaponKind::Garlic),
            UpgradeChoice::Recovery,
        ] {
            assert_eq!(UpgradeChoice::parse(&choice.to_string()), Some(choice));
        }
        assert_eq!(UpgradeChoice::parse("weapon:laser"), None);
    }

    #[test]
    fn inventory_summary() {
        let (mut c, mut p) = setup(GameConfig::default());
        c.add_passive(PassiveKind::PickupBoost, &mut p);
        let inv = c.inventory();
        assert_eq!(inv.weapons[0].id, "whip");
        assert_eq!(inv.passives, vec![(PassiveKind::PickupBoost, 1)]);
    }
}
