use std::process::ExitCode;

use brawl_engine::{FixedStepClock, LoopConfig, Session};
use tracing::{debug, error, info};

use super::bootstrap::AppWiring;
use super::script::ScriptCommand;
use super::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PlaybackStats {
    pub(crate) ticks_run: u64,
    pub(crate) frames_pushed: u64,
    pub(crate) backlog_drops: u64,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match run_headless(&app) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run_failed");
            ExitCode::FAILURE
        }
    }
}

/// Plays the script against a fresh session and returns the final snapshot as JSON.
pub(crate) fn run_headless(app: &AppWiring) -> Result<String, AppError> {
    let mut session = Session::new(app.sim_config.clone(), app.seed)?;
    let stats = play_script(&mut session, &app.script, app.loop_config)?;
    let snapshot = session.snapshot();
    info!(
        ticks = stats.ticks_run,
        frames = stats.frames_pushed,
        backlog_drops = stats.backlog_drops,
        score = snapshot.score,
        won = snapshot.won,
        game_over = snapshot.game_over,
        "playback_finished"
    );
    snapshot.to_json_pretty().map_err(AppError::EncodeSnapshot)
}

pub(crate) fn play_script(
    session: &mut Session,
    commands: &[ScriptCommand],
    loop_config: LoopConfig,
) -> Result<PlaybackStats, AppError> {
    let mut clock = FixedStepClock::new(loop_config);
    let fixed_dt = clock.fixed_dt();
    let mut stats = PlaybackStats::default();

    for command in commands {
        match *command {
            ScriptCommand::Intent(intent) => {
                debug!(intent = intent.as_token(), "script_intent");
                session.submit_intent(intent)?;
            }
            ScriptCommand::Tick { count } => {
                for _ in 0..count {
                    session.tick(fixed_dt)?;
                    stats.ticks_run += 1;
                }
            }
            ScriptCommand::Frame { dt, count } => {
                for _ in 0..count {
                    let plan = clock.push_frame(dt);
                    stats.frames_pushed += 1;
                    if !plan.dropped_backlog.is_zero() {
                        stats.backlog_drops += 1;
                    }
                    for _ in 0..plan.ticks_to_run {
                        session.tick(fixed_dt)?;
                        stats.ticks_run += 1;
                    }
                }
            }
            ScriptCommand::Snapshot => {
                let snapshot = session.snapshot();
                info!(
                    tick = snapshot.tick,
                    time_ms = snapshot.time_ms,
                    score = snapshot.score,
                    alive = snapshot.alive,
                    paused = snapshot.paused,
                    zone = snapshot.current_zone,
                    zones = snapshot.zone_count,
                    live_enemies = snapshot.live_enemy_count(),
                    "snapshot"
                );
            }
        }
    }

    Ok(stats)
}
