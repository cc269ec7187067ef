//! Bevy host for a [`Session`]: run-state machine, frame-driven ticking and
//! the message channels to the outer layers.
//!
//! ## States
//!
//! | State | Description |
//! |-------|-------------|
//! | `Playing` | Session ticks every frame |
//! | `UpgradeSelection` | Session frozen; waiting for an [`UpgradeCommitted`] message |
//! | `Paused` | Session frozen; set and cleared by the host through `NextState` |
//! | `GameOver` | Run ended; a [`RestartRun`] message starts a new one |
//!
//! ## Systems (registered by `SimulationPlugin`)
//!
//! | System | Schedule | Purpose |
//! |--------|----------|---------|
//! | `load_game_config` | `Startup` | Overlay `assets/balance.toml` on the `GameConfig` resource |
//! | `start_session` | `Startup`, after the loader | Build the `ActiveSession` |
//! | `session_tick_system` | `Update / in Playing` | Advance one tick, forward events |
//! | `apply_upgrade_choice_system` | `Update / in UpgradeSelection` | Commit the chosen upgrade |
//! | `restart_run_system` | `Update` | Reset the session on request |

use crate::config::{GameConfig, DEFAULT_CONFIG_PATH};
use crate::session::{RunRecord, Session, SessionState, SimEvent};
use crate::weapons::UpgradeChoice;
use bevy::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

// ── State & resources ─────────────────────────────────────────────────────────

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    #[default]
    Playing,
    UpgradeSelection,
    Paused,
    GameOver,
}

/// The session being played.
#[derive(Resource, Deref, DerefMut)]
pub struct ActiveSession(pub Session);

/// Movement direction for the next tick, written by the input layer.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct MoveInput(pub Vec2);

/// Where `load_game_config` reads from; `None` keeps the resource as inserted.
#[derive(Resource, Debug, Clone)]
struct ConfigSource(Option<PathBuf>);

// ── Messages ──────────────────────────────────────────────────────────────────

/// The player picked one of the offered upgrades.
#[derive(Message, Debug, Clone, Copy)]
pub struct UpgradeCommitted(pub UpgradeChoice);

/// A sound cue from the session.
#[derive(Message, Debug, Clone, Copy)]
pub struct SessionEvent(pub SimEvent);

/// Final stats of a finished run.
#[derive(Message, Debug, Clone, Copy)]
pub struct RunEnded(pub RunRecord);

/// Throw the current run away and start a new one.
#[derive(Message, Debug, Clone, Copy)]
pub struct RestartRun;

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers `RunState`, the session resources, the messages and the systems.
///
/// A `GameConfig` resource inserted before this plugin is kept as the base
/// the balance file is overlaid on; with `config_path: None` it is used as-is.
pub struct SimulationPlugin {
    pub config_path: Option<PathBuf>,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self {
            config_path: Some(PathBuf::from(DEFAULT_CONFIG_PATH)),
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<RunState>()
            .init_resource::<GameConfig>()
            .init_resource::<MoveInput>()
            .insert_resource(ConfigSource(self.config_path.clone()))
            .add_message::<UpgradeCommitted>()
            .add_message::<SessionEvent>()
            .add_message::<RunEnded>()
            .add_message::<RestartRun>()
            .add_systems(Startup, (load_game_config, start_session).chain())
            .add_systems(
                Update,
                (
                    restart_run_system,
                    session_tick_system.run_if(in_state(RunState::Playing)),
                    apply_upgrade_choice_system.run_if(in_state(RunState::UpgradeSelection)),
                )
                    .chain(),
            );
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

fn load_game_config(source: Res<ConfigSource>, mut config: ResMut<GameConfig>) {
    if let Some(path) = &source.0 {
        *config = GameConfig::load_or_default(path);
    }
}

fn start_session(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(ActiveSession(Session::new(Arc::new(config.clone()))));
}

fn forward_events(session: &mut Session, writer: &mut MessageWriter<SessionEvent>) {
    for event in session.drain_events() {
        writer.write(SessionEvent(event));
    }
}

/// Advance the session by the frame delta and follow its state.
pub fn session_tick_system(
    time: Res<Time>,
    input: Res<MoveInput>,
    mut session: ResMut<ActiveSession>,
    mut next: ResMut<NextState<RunState>>,
    mut events: MessageWriter<SessionEvent>,
    mut ended: MessageWriter<RunEnded>,
) {
    let state = session.update(time.delta_secs(), input.0);
    forward_events(&mut session, &mut events);
    match state {
        SessionState::Running => {}
        SessionState::AwaitingUpgrade => next.set(RunState::UpgradeSelection),
        SessionState::Ended => {
            ended.write(RunEnded(session.record()));
            next.set(RunState::GameOver);
        }
    }
}

/// Commit queued choices; return to `Playing` once no selection is left.
pub fn apply_upgrade_choice_system(
    mut choices: MessageReader<UpgradeCommitted>,
    mut session: ResMut<ActiveSession>,
    mut next: ResMut<NextState<RunState>>,
    mut events: MessageWriter<SessionEvent>,
) {
    for UpgradeCommitted(choice) in choices.read() {
        match session.commit_upgrade(*choice) {
            Ok(outcome) if outcome.remaining == 0 => next.set(RunState::Playing),
            Ok(_) => {}
            Err(e) => warn!("Ignoring upgrade {choice}: {e}"),
        }
    }
    forward_events(&mut session, &mut events);
}

fn restart_run_system(
    mut requests: MessageReader<RestartRun>,
    mut session: ResMut<ActiveSession>,
    mut next: ResMut<NextState<RunState>>,
) {
    if requests.read().count() > 0 {
        session.reset();
        next.set(RunState::Playing);
        info!("Run restarted");
    }
}
