//! Read-only views of a session for the rendering layer.
//!
//! Nothing here mutates the simulation; a renderer can capture a snapshot
//! every frame, draw from it and throw it away.

use crate::drops::DropKind;
use crate::enemy::{EnemyId, EnemyKind, EnemyShape};
use crate::session::{Session, SessionState};
use crate::weapons::{WeaponInfo, WeaponKind};
use bevy::math::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub pos: Vec2,
    pub facing: Vec2,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub hp_ratio: f32,
    pub level: u32,
    pub xp_progress: f32,
    /// Drawn blinking while set.
    pub invincible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyView {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: f32,
    pub shape: EnemyShape,
    pub hp_ratio: f32,
    pub flash: bool,
    /// Render opacity in `[0, 255]`.
    pub alpha: f32,
    pub is_boss: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectView {
    pub source: WeaponKind,
    pub pos: Vec2,
    pub half: Vec2,
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuraView {
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropView {
    pub kind: DropKind,
    pub pos: Vec2,
    pub magnetized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub elapsed: f32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub effects: Vec<EffectView>,
    pub auras: Vec<AuraView>,
    pub drops: Vec<DropView>,
    pub weapons: Vec<WeaponInfo>,
}

impl SessionSnapshot {
    pub fn capture(session: &Session) -> Self {
        let p = session.player();
        let player = PlayerView {
            pos: p.pos,
            facing: p.facing,
            size: p.size,
            hp: p.hp,
            max_hp: p.max_hp,
            hp_ratio: p.hp_ratio(),
            level: p.level,
            xp_progress: p.xp_progress(),
            invincible: p.is_invincible(),
        };

        let enemies = session
            .enemies()
            .iter()
            .map(|(id, e)| EnemyView {
                id,
                kind: e.kind,
                pos: e.pos,
                size: e.size,
                shape: e.shape,
                hp_ratio: e.hp_ratio(),
                flash: e.flash,
                alpha: e.alpha,
                is_boss: e.is_boss(),
            })
            .collect();

        let effects = session
            .effects()
            .iter()
            .map(|e| EffectView {
                source: e.source,
                pos: e.pos,
                half: e.half,
                rotation: e.rotation,
            })
            .collect();

        let auras = session
            .controller()
            .weapons()
            .iter()
            .filter_map(|w| w.aura())
            .map(|a| AuraView {
                center: p.pos,
                radius: a.radius,
            })
            .collect();

        let drops = session
            .drops()
            .drops()
            .iter()
            .map(|d| DropView {
                kind: d.kind,
                pos: d.pos,
                magnetized: d.magnetized,
            })
            .collect();

        Self {
            state: session.state(),
            elapsed: session.elapsed(),
            player,
            enemies,
            effects,
            auras,
            drops,
            weapons: session.controller().inventory().weapons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::weapons::WeaponKind;
    use std::sync::Arc;

    #[test]
    fn snapshot_mirrors_session() {
        let mut cfg = GameConfig::default();
        cfg.seed = Some(3);
        cfg.cheats.starting_weapon = WeaponKind::Garlic;
        let mut session = Session::new(Arc::new(cfg));
        let pos = session.player().pos;
        session.spawn_enemy_at(EnemyKind::Ghost, pos + Vec2::new(300.0, 0.0));
        session.drops_mut().spawn_gem(pos + Vec2::new(0.0, 300.0), 7);

        let snap = session.snapshot();
        assert_eq!(snap.state, SessionState::Running);
        assert_eq!(snap.player.pos, pos);
        assert_eq!(snap.player.hp_ratio, 1.0);
        assert_eq!(snap.enemies.len(), 1);
        assert_eq!(snap.enemies[0].kind, EnemyKind::Ghost);
        assert!(!snap.enemies[0].is_boss);
        assert_eq!(snap.auras, vec![AuraView { center: pos, radius: 60.0 }]);
        assert_eq!(snap.drops.len(), 1);
        assert_eq!(snap.weapons[0].id, "garlic");
    }
}
