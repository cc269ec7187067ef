//! Player module: character state and the progression economy.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | `Player` (position, facing, HP, i-frames, regen, XP) and its `PlayerStats` block |
//! | [`progression`] | XP threshold curve, passive item identities and the stat each one touches |
//!
//! All public items are re-exported at this level so the rest of the crate can
//! use flat `crate::player::*` imports.

pub mod progression;
pub mod state;

pub use progression::{xp_threshold, PassiveKind, PassiveStat};
pub use state::{HitOutcome, Player, PlayerStats};
