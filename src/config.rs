use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::game::{Settings, INITIAL_LIVES, WRONG_TURNS};
use crate::generator::Algorithm;

/// Hand-drawn maze runner in the terminal.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Milliseconds between input polls of the game loop
    #[arg(long, env = "MAZE_TICK_MS", default_value_t = 70, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Frames drawn per second
    #[arg(long, env = "MAZE_FPS", default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
    pub fps: u64,

    /// Seconds available for the whole game
    #[arg(long, env = "MAZE_TIME_LIMIT", default_value_t = 180, value_parser = clap::value_parser!(u32).range(1..))]
    pub time_limit: u32,

    /// Side of the virtual drawing canvas in pixels
    #[arg(long, env = "MAZE_CANVAS", default_value_t = 480, value_parser = clap::value_parser!(u32).range(64..))]
    pub canvas: u32,

    /// Maze generation algorithm
    #[arg(long, env = "MAZE_ALGORITHM", default_value_t = Algorithm::Backtracker)]
    pub algorithm: Algorithm,

    /// Seed for reproducible mazes
    #[arg(long, env = "MAZE_SEED")]
    pub seed: Option<u64>,

    /// Write logs here; the screen belongs to the game
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.fps.max(1))
    }

    pub fn settings(&self) -> Settings {
        Settings {
            lives: INITIAL_LIVES,
            time_limit: self.time_limit,
            wrong_turns: WRONG_TURNS,
            canvas: self.canvas as f32,
            algorithm: self.algorithm,
        }
    }
}
