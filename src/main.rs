//! Power Pong headless runner
//!
//! Plays a three-player tournament with AI on both paddles and prints the
//! final standings as JSON.
//!
//! Usage: `power-pong [settings.json] [seed] [difficulty]`
//!
//! The difficulty names the left AI's starting level; the right AI starts
//! one level harder.

use std::path::PathBuf;

use serde::Serialize;

use power_pong::consts::TICK_MS;
use power_pong::sim::{
    AiController, Controller, GameEvent, GameMode, GamePhase, GameState, MatchStatus, Side,
    TickInput, tick,
};
use power_pong::{Difficulty, Settings, TournamentPlayer};

/// Give up after this much match time (ticks at ~60 Hz)
const MAX_TICKS: u64 = 60 * 60 * 60;

#[derive(Serialize)]
struct Summary {
    seed: u64,
    ticks: u64,
    finished: bool,
    status: MatchStatus,
    standings: Vec<TournamentPlayer>,
}

fn main() {
    env_logger::init();

    let mut settings_path: Option<PathBuf> = None;
    let mut seed = 12345u64;
    let mut level: Option<Difficulty> = None;
    for arg in std::env::args().skip(1) {
        if let Ok(n) = arg.parse::<u64>() {
            seed = n;
        } else if let Some(d) = Difficulty::from_str(&arg) {
            level = Some(d);
        } else {
            settings_path = Some(PathBuf::from(arg));
        }
    }

    let mut settings = match &settings_path {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if let Some(level) = level {
        settings.ai_start_level = level;
    }
    log::info!("Power Pong (headless) starting, seed {seed}");
    match settings.to_json() {
        Ok(json) => log::debug!("Settings: {json}"),
        Err(e) => log::warn!("Failed to serialize settings: {e}"),
    }

    let mut state = GameState::new(seed, &settings);
    state.set_game_mode(GameMode::ThreePlayer, None, &settings);
    let left_level = settings.ai_start_level;
    state.set_controller(
        Side::Left,
        Controller::Ai(AiController::new(left_level, &settings)),
    );
    state.set_controller(
        Side::Right,
        Controller::Ai(AiController::new(left_level.harder(), &settings)),
    );

    let start = TickInput {
        pause: true,
        ..Default::default()
    };
    let idle = TickInput::default();

    let mut ticks = 0u64;
    while state.phase != GamePhase::Over && ticks < MAX_TICKS {
        let input = if state.phase == GamePhase::NotStarted {
            &start
        } else {
            &idle
        };
        tick(&mut state, &settings, input, TICK_MS);
        ticks += 1;

        for event in &state.events {
            match event {
                GameEvent::MatchOver { .. }
                | GameEvent::TournamentMatchReady { .. }
                | GameEvent::TournamentComplete { .. } => log::info!("{event:?}"),
                _ => log::debug!("{event:?}"),
            }
        }
    }

    let finished = state.phase == GamePhase::Over;
    if !finished {
        log::warn!("Stopped after {ticks} ticks without a champion");
    }

    let summary = Summary {
        seed,
        ticks,
        finished,
        status: state.status(),
        standings: state
            .tournament
            .as_ref()
            .map(|t| t.standings())
            .unwrap_or_default(),
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize summary: {e}"),
    }
}
