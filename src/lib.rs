//! Maze generation, solving, and a freehand path tracker for a timed
//! maze-running game.

pub mod collision;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod game;
pub mod generator;
pub mod grid;
pub mod solver;
pub mod tracker;

pub use collision::{Layout, Point, WallMap};
pub use error::{MazeError, Result};
pub use game::{Game, GameEvent, InputMode, Notice, Outcome, Phase, Settings};
pub use generator::{generate, generate_with, Algorithm};
pub use grid::{Dir, Grid, Pos};
pub use solver::{solve, Solution};
pub use tracker::{DragTracker, MazeEvent, Step, StepTracker};
