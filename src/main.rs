//! Headless autoplay: runs one session with a simple pilot until the player
//! dies or `SURVIVOR_MAX_SECS` of simulated time pass, then logs the record.

use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use horde_survival::geometry::{ring_point, safe_normalize};
use horde_survival::session::RunRecord;
use horde_survival::simulation::{
    apply_upgrade_choice_system, ActiveSession, MoveInput, RunEnded, RunState, SessionEvent,
    SimulationPlugin, UpgradeCommitted,
};
use std::env;
use std::time::Duration;

/// Simulated seconds per frame.
const FRAME_SECS: f32 = 1.0 / 60.0;

/// Radius of the patrol circle around the world centre.
const PATROL_RADIUS: f32 = 400.0;

/// Enemies closer than this push the pilot away.
const EVADE_RADIUS: f32 = 150.0;

#[derive(Resource, Debug, Clone, Copy)]
struct MaxRunSecs(Option<f32>);

/// Circle the map, sidestepping the nearest enemy when it gets close.
fn autopilot_system(session: Res<ActiveSession>, mut input: ResMut<MoveInput>) {
    let player = session.player();
    let world = &session.config().world;
    let center = Vec2::new(world.width, world.height) * 0.5;
    let angle = session.elapsed() * 0.25;
    let mut steer = safe_normalize(ring_point(center, PATROL_RADIUS, angle) - player.pos);
    if let Some((_, enemy)) = session.enemies().nearest(player.pos) {
        let away = player.pos - enemy.pos;
        if away.length() < EVADE_RADIUS {
            steer += safe_normalize(away) * 2.0;
        }
    }
    input.0 = steer;
}

/// Always take the first offered option.
fn auto_pick_system(session: Res<ActiveSession>, mut picks: MessageWriter<UpgradeCommitted>) {
    if let Some(option) = session.offered_options().first() {
        picks.write(UpgradeCommitted(option.choice));
    }
}

fn log_events_system(mut events: MessageReader<SessionEvent>) {
    for SessionEvent(event) in events.read() {
        debug!("sound cue: {}", event.name());
    }
}

fn log_record(record: &RunRecord) {
    match toml::to_string(record) {
        Ok(text) => info!("Run record:\n{text}"),
        Err(e) => warn!("Could not serialise run record: {e}"),
    }
}

fn finish_on_death_system(mut ended: MessageReader<RunEnded>, mut exit: MessageWriter<AppExit>) {
    if let Some(RunEnded(record)) = ended.read().last() {
        log_record(record);
        exit.write(AppExit::Success);
    }
}

fn time_limit_system(
    limit: Res<MaxRunSecs>,
    session: Res<ActiveSession>,
    mut exit: MessageWriter<AppExit>,
) {
    if let Some(max) = limit.0 {
        if session.elapsed() >= max {
            info!("Time limit of {max}s reached");
            log_record(&session.record());
            exit.write(AppExit::Success);
        }
    }
}

fn main() -> AppExit {
    let max_secs = env::var("SURVIVOR_MAX_SECS")
        .ok()
        .and_then(|v| v.parse::<f32>().ok());

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
        LogPlugin::default(),
        bevy::state::app::StatesPlugin,
    ))
    // Fixed simulated frame time so a run is independent of host speed.
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        FRAME_SECS,
    )))
    .insert_resource(MaxRunSecs(max_secs))
    .add_plugins(SimulationPlugin::default())
    .add_systems(
        Update,
        (
            autopilot_system.run_if(in_state(RunState::Playing)),
            auto_pick_system
                .run_if(in_state(RunState::UpgradeSelection))
                .before(apply_upgrade_choice_system),
            log_events_system,
            finish_on_death_system,
            time_limit_system.run_if(in_state(RunState::Playing)),
        ),
    );

    app.run()
}
