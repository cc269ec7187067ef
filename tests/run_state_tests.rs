//! Headless tests for the [`RunState`] machine driven by `SimulationPlugin`.
//!
//! These tests use [`MinimalPlugins`] with a fixed manual frame time, so every
//! frame advances the session by exactly 1/60 s.
//!
//! Covered scenarios:
//! 1. The run starts in `Playing` and the session ticks every frame.
//! 2. A collected chest moves to `UpgradeSelection` and freezes the session.
//! 3. A committed choice returns to `Playing`; a bogus one is ignored.
//! 4. Death moves to `GameOver` and emits a `RunEnded` record.
//! 5. `RestartRun` starts a fresh session from `GameOver`.
//! 6. `Paused` freezes the session until the host resumes it.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use horde_survival::config::GameConfig;
use horde_survival::enemy::EnemyKind;
use horde_survival::session::{RunRecord, SimEvent};
use horde_survival::simulation::{
    ActiveSession, RestartRun, RunEnded, RunState, SessionEvent, SimulationPlugin,
    UpgradeCommitted,
};
use horde_survival::weapons::UpgradeChoice;
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

#[derive(Resource, Default)]
struct EndedRuns(Vec<RunRecord>);

#[derive(Resource, Default)]
struct SeenEvents(Vec<SimEvent>);

fn collect_ended(mut reader: MessageReader<RunEnded>, mut out: ResMut<EndedRuns>) {
    out.0.extend(reader.read().map(|RunEnded(record)| *record));
}

fn collect_events(mut reader: MessageReader<SessionEvent>, mut out: ResMut<SeenEvents>) {
    out.0.extend(reader.read().map(|SessionEvent(event)| *event));
}

/// Headless app with a seeded, spawn-free config and no balance file.
fn test_app() -> App {
    let mut cfg = GameConfig::default();
    cfg.seed = Some(7);
    cfg.spawner.base_spawn_rate = 0.0;
    cfg.spawner.max_spawn_rate = 0.0;

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            1.0 / 60.0,
        )))
        .insert_resource(cfg)
        .add_plugins(SimulationPlugin { config_path: None })
        .init_resource::<EndedRuns>()
        .init_resource::<SeenEvents>()
        .add_systems(Update, (collect_ended, collect_events));
    app.update();
    app
}

fn state(app: &App) -> RunState {
    *app.world().resource::<State<RunState>>().get()
}

fn session(app: &App) -> &ActiveSession {
    app.world().resource::<ActiveSession>()
}

fn session_mut(app: &mut App) -> Mut<'_, ActiveSession> {
    app.world_mut().resource_mut::<ActiveSession>()
}

/// Drop a chest on the player and run until the selection is open.
fn open_chest_selection(app: &mut App) {
    let pos = session(app).player().pos;
    session_mut(app).drops_mut().spawn_chest(pos);
    app.update();
    app.update();
    assert_eq!(state(app), RunState::UpgradeSelection);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn run_starts_playing_and_ticks() {
    let mut app = test_app();
    assert_eq!(state(&app), RunState::Playing);

    let before = session(&app).elapsed();
    for _ in 0..5 {
        app.update();
    }
    assert!(session(&app).elapsed() > before);
    assert_eq!(state(&app), RunState::Playing);
}

#[test]
fn chest_pickup_freezes_the_session_for_selection() {
    let mut app = test_app();
    open_chest_selection(&mut app);
    assert!(app.world().resource::<SeenEvents>().0.contains(&SimEvent::LevelUp));

    let frozen = session(&app).elapsed();
    for _ in 0..3 {
        app.update();
    }
    assert_eq!(session(&app).elapsed(), frozen);
    assert_eq!(state(&app), RunState::UpgradeSelection);
    assert!(!session(&app).offered_options().is_empty());
}

#[test]
fn committed_choice_resumes_play() {
    let mut app = test_app();
    open_chest_selection(&mut app);

    let choice = session(&app).offered_options()[0].choice;
    app.world_mut().write_message(UpgradeCommitted(choice));
    app.update();
    app.update();

    assert_eq!(state(&app), RunState::Playing);
    assert!(session(&app).offered_options().is_empty());
}

#[test]
fn choice_outside_the_offer_is_ignored() {
    let mut app = test_app();
    open_chest_selection(&mut app);

    // The starting pool is never empty, so recovery is not on offer.
    app.world_mut()
        .write_message(UpgradeCommitted(UpgradeChoice::Recovery));
    app.update();
    app.update();

    assert_eq!(state(&app), RunState::UpgradeSelection);
    assert_eq!(session(&app).pending_upgrades(), 1);
}

#[test]
fn death_ends_the_run_with_a_record() {
    let mut app = test_app();
    let pos = session(&app).player().pos;
    {
        let mut s = session_mut(&mut app);
        s.player_mut().hp = 1.0;
        s.spawn_enemy_at(EnemyKind::Tank, pos);
    }
    app.update();
    app.update();

    assert_eq!(state(&app), RunState::GameOver);
    let ended = &app.world().resource::<EndedRuns>().0;
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].level, 1);
    assert!(app.world().resource::<SeenEvents>().0.contains(&SimEvent::Death));

    // A finished run stays frozen.
    let frozen = session(&app).elapsed();
    app.update();
    assert_eq!(session(&app).elapsed(), frozen);
}

#[test]
fn restart_from_game_over_starts_fresh() {
    let mut app = test_app();
    let pos = session(&app).player().pos;
    {
        let mut s = session_mut(&mut app);
        s.player_mut().hp = 1.0;
        s.spawn_enemy_at(EnemyKind::Tank, pos);
    }
    app.update();
    app.update();
    assert_eq!(state(&app), RunState::GameOver);

    app.world_mut().write_message(RestartRun);
    app.update();
    app.update();

    assert_eq!(state(&app), RunState::Playing);
    let s = session(&app);
    assert_eq!(s.player().hp, s.player().max_hp);
    assert!(s.enemies().is_empty());
    assert!(s.elapsed() < 0.1);
}

#[test]
fn paused_freezes_until_resumed() {
    let mut app = test_app();
    app.world_mut()
        .resource_mut::<NextState<RunState>>()
        .set(RunState::Paused);
    app.update();
    assert_eq!(state(&app), RunState::Paused);

    let frozen = session(&app).elapsed();
    for _ in 0..3 {
        app.update();
    }
    assert_eq!(session(&app).elapsed(), frozen);

    app.world_mut()
        .resource_mut::<NextState<RunState>>()
        .set(RunState::Playing);
    app.update();
    app.update();
    assert!(session(&app).elapsed() > frozen);
}
