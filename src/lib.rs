//! Horde-survival combat and progression simulation.
//!
//! The simulation core ([`session::Session`] and everything it owns) is plain
//! Rust driven by an explicit `update(dt, input)` call; [`simulation`] hosts it
//! inside a Bevy app.  Rendering, menus, audio and persistence live outside
//! this crate and talk to it through snapshots, events and the run record.

pub mod combat;
pub mod config;
pub mod constants;
pub mod drops;
pub mod enemy;
pub mod error;
pub mod geometry;
pub mod player;
pub mod session;
pub mod simulation;
pub mod snapshot;
pub mod spatial_partition;
pub mod spawner;
pub mod timer;
pub mod weapons;
