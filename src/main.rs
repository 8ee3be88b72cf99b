//! Station Strike entry point
//!
//! Headless driver: builds a run, lets the autopilot play it on a fixed
//! timestep and prints how it went.
//!
//! Usage: `station-strike [mode] [settings.json]`

use station_strike::audio::{AudioManager, LogCueSink};
use station_strike::consts::{MAX_SUBSTEPS, SIM_DT};
use station_strike::settings::{GameMode, Settings};
use station_strike::sim::{GamePhase, SimulationState, TickInput, tick};

/// Frame time the driver pretends to render at
const FRAME_DT: f32 = 1.0 / 30.0;
/// Give up on runs that neither win nor lose
const MAX_RUN_SECONDS: f32 = 600.0;

/// Game instance holding all state
struct Game {
    state: SimulationState,
    audio: AudioManager<LogCueSink>,
    accumulator: f32,
    input: TickInput,
}

impl Game {
    fn new(state: SimulationState, settings: &Settings) -> Self {
        let mut audio = AudioManager::new(LogCueSink::default());
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        Self {
            state,
            audio,
            accumulator: 0.0,
            input: TickInput {
                idle_mode: true,
                ..Default::default()
            },
        }
    }

    /// Run simulation ticks
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.clone();
            tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.start = false;
            self.input.restart = false;
            self.input.jump = false;
        }

        let events = self.state.drain_events();
        self.audio.dispatch(&events);
    }

    fn is_over(&self) -> bool {
        matches!(self.state.phase(), GamePhase::Win | GamePhase::Lose)
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mode_arg = args.next();
    let mut settings = match args.next() {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    if let Some(arg) = mode_arg {
        match GameMode::from_str(&arg) {
            Some(mode) => settings.mode = mode,
            None => log::warn!("Unknown mode '{arg}', using {}", settings.mode.as_str()),
        }
    }

    let config = match settings.mode_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };
    log::info!("Station Strike (headless) starting: {} mode", config.mode.as_str());

    let state = SimulationState::with_tuning(config, settings.tuning, settings.seed);
    let mut game = Game::new(state, &settings);

    let mut clock = 0.0;
    while !game.is_over() && clock < MAX_RUN_SECONDS {
        game.update(FRAME_DT);
        clock += FRAME_DT;
    }

    print_summary(&game, clock);
}

fn print_summary(game: &Game, clock: f32) {
    let state = &game.state;
    let session = &state.session;
    let outcome = match (session.phase, session.lose_reason) {
        (GamePhase::Lose, Some(reason)) => format!("Lose ({})", reason.as_str()),
        (phase, _) => format!("{phase:?}"),
    };

    println!("\n=== {} / {} ===", state.config.mode.as_str(), state.config.level.name);
    println!("Outcome:   {outcome}");
    println!("Score:     {}", session.score);
    if let Some(bonus) = session.time_bonus {
        println!("  bonus:   {bonus}");
    }
    println!("Kills:     {} / {}", state.kills, state.enemies.len());
    match session.required {
        Some(required) => println!("Collected: {} / {required}", session.collected),
        None => println!("Collected: {}", session.collected),
    }
    println!(
        "Player:    {} hp, {} armor, {} ammo",
        state.actor.health, state.actor.armor, state.actor.ammo
    );
    println!(
        "Time:      {:.1}s simulated over {} ticks ({clock:.1}s of frames)",
        session.elapsed, state.time_ticks
    );
    println!("Cues:      {}", game.audio.sink().played);
}
