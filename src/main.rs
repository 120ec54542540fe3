mod config;
mod constants;
mod entities;
mod error;
mod field;
mod game;
mod rendering;
mod terminal_io;
mod timing;
mod types;
mod world;

use std::any::Any;
use std::env;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;
use std::time::Duration;

use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{GameConfig, LaunchOptions};
use crate::constants::*;
use crate::error::GameError;
use crate::game::{Game, RunOutcome};
use crate::rendering::{OutputTarget, ScreenBuffer, TerminalCanvas};
use crate::terminal_io::{SimulatedInput, TerminalInput, TerminalSession};
use crate::timing::{FixedStepClock, RealtimeClock};
use crate::world::World;

const EXIT_GAME_OVER: u8 = 2;

fn main() -> ExitCode {
    if let Err(e) = simple_logging::log_to_file(LOG_FILE, log::LevelFilter::Info) {
        eprintln!("Could not open {}: {}", LOG_FILE, e);
    }
    info!("Starting asteroid-field.");

    // Single crash barrier: nothing escaping the run is recovered.
    match catch_panics(run) {
        Ok(RunOutcome::GameOver { frame }) => {
            info!("Game over on frame {}.", frame);
            println!("Game over!");
            ExitCode::from(EXIT_GAME_OVER)
        }
        Ok(outcome) => {
            info!("Exiting: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("An error occurred during the game loop: {}", e);
            eprintln!("An error occurred during the game loop: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<RunOutcome, GameError> {
    let options = LaunchOptions::from_args(env::args().skip(1))?;

    let config = match &options.config_path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            GameConfig::load_from_file(path)?
        }
        None => GameConfig::default(),
    };
    // The only validation point, for file and default configs alike.
    config.validate()?;
    info!("Configuration: {:?}", config);

    let rng = match options.seed.or(config.seed) {
        Some(seed) => {
            info!("Using RNG seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let world = World::new(&config, rng);

    if options.debug {
        run_headless(world, &config, &options)
    } else {
        run_terminal(world, &config, &options)
    }
}

/// Renders into an in-memory screen buffer that is dumped to the log each
/// frame, driven by the demo input script at a fixed step.
fn run_headless(
    world: World,
    config: &GameConfig,
    options: &LaunchOptions,
) -> Result<RunOutcome, GameError> {
    let columns = options.debug_columns.unwrap_or(DEBUG_COLUMNS);
    let rows = options.debug_rows.unwrap_or(DEBUG_ROWS);
    info!("Debug mode enabled at {}x{}.", columns, rows);

    let mut screen = ScreenBuffer::new(columns, rows);
    screen.log_frames = true;
    let canvas = TerminalCanvas::new(
        OutputTarget::ScreenBuffer(screen),
        columns,
        rows,
        config.screen_width,
        config.screen_height,
    );
    let max_frames = options.max_frames.or(Some(DEBUG_MAX_FRAMES));

    let input = SimulatedInput::demo();
    let mut game = Game::new(world, canvas, input, FixedStepClock, config, max_frames);
    game.run()
}

fn run_terminal(
    world: World,
    config: &GameConfig,
    options: &LaunchOptions,
) -> Result<RunOutcome, GameError> {
    let session = TerminalSession::start()?;
    let (columns, rows) = session.size()?;
    info!("Terminal size: {}x{}", columns, rows);

    let canvas = TerminalCanvas::new(
        OutputTarget::Stdout(io::stdout()),
        columns,
        rows,
        config.screen_width,
        config.screen_height,
    );
    let input = TerminalInput::new(
        session.reports_key_release(),
        Duration::from_millis(config.key_hold_timeout_ms),
        Duration::from_millis(config.key_repeat_delay_ms),
    );

    let clock = RealtimeClock::new();
    let mut game = Game::new(world, canvas, input, clock, config, options.max_frames);
    let outcome = game.run();
    // Restore the terminal before anything is printed.
    drop(session);
    outcome
}

/// Turns a panic inside `f` into `GameError::Panicked` so it reaches the
/// same log line and exit code as any other failure. Unwinding has dropped
/// the terminal session by the time this returns.
fn catch_panics<F>(f: F) -> Result<RunOutcome, GameError>
where
    F: FnOnce() -> Result<RunOutcome, GameError>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(GameError::Panicked(panic_message(payload.as_ref())))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
