//! Round bookkeeping as a plain state machine.
//!
//! Input, the one-second clock and the end of the feedback pause are pushed
//! onto one FIFO queue and applied by [`Game::process`]. Maze events raised by
//! the trackers while handling an input are settled before the next queued
//! event. The state is plain data and knows nothing about how it is drawn.

use std::collections::VecDeque;

use log::{debug, info};
use rand::Rng;

use crate::collision::{Layout, Point, WallMap};
use crate::difficulty::{self, Wobble, MAX_LEVEL};
use crate::error::Result;
use crate::generator::{self, Algorithm};
use crate::grid::{Dir, Grid};
use crate::solver::{self, Solution};
use crate::tracker::{DragTracker, MazeEvent, Step, StepTracker};

pub const INITIAL_LIVES: u32 = 5;
pub const TIME_LIMIT: u32 = 180;
pub const WRONG_TURNS: u32 = 3;
pub const LEVEL_POINTS: u32 = 10;
pub const DEFAULT_CANVAS: f32 = 480.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Welcome,
    Playing,
    Feedback,
    GameOver,
    Victory,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Step,
    Drag,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    Start,
    /// One second of the countdown clock.
    Tick,
    FeedbackElapsed,
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    Step(Dir),
    /// New canvas side in pixels, for front ends whose drawing surface can
    /// change size.
    Resize(f32),
    Maze(MazeEvent),
}

/// What the front end should react to after a batch of events.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    LevelStarted { level: u32, cols: usize, rows: usize },
    Blocked,
    Crashed { lives_left: u32 },
    WrongTurn { turns_left: u32 },
    LevelCleared { level: u32, score: u32 },
    GameOver(Outcome),
    Victory(Outcome),
}

/// Final tally of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    pub seconds: u32,
    pub victory: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub lives: u32,
    pub time_limit: u32,
    pub wrong_turns: u32,
    pub canvas: f32,
    pub algorithm: Algorithm,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lives: INITIAL_LIVES,
            time_limit: TIME_LIMIT,
            wrong_turns: WRONG_TURNS,
            canvas: DEFAULT_CANVAS,
            algorithm: Algorithm::default(),
        }
    }
}

/// Everything that belongs to one maze. Replaced wholesale when a level starts.
#[derive(Clone, Debug)]
pub struct Level {
    number: u32,
    grid: Grid,
    solution: Solution,
    wobble: Wobble,
    walls: WallMap,
    drag: DragTracker,
    stepper: StepTracker,
    active: InputMode,
}

impl Level {
    pub fn generate(
        number: u32,
        algorithm: Algorithm,
        canvas: f32,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let (cols, rows) = difficulty::dimensions(number)?;
        let grid = generator::generate_with(algorithm, cols, rows, rng)?;
        let solution = solver::solve(&grid);
        let wobble = Wobble::roll(number, cols, rows, rng);
        let walls = WallMap::build(&grid, &wobble, Layout::new(canvas, cols, rows));
        Ok(Self {
            number,
            grid,
            solution,
            wobble,
            walls,
            drag: DragTracker::new(),
            stepper: StepTracker::new(),
            active: InputMode::default(),
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn walls(&self) -> &WallMap {
        &self.walls
    }

    pub fn layout(&self) -> &Layout {
        self.walls.layout()
    }

    pub fn drag(&self) -> &DragTracker {
        &self.drag
    }

    pub fn stepper(&self) -> &StepTracker {
        &self.stepper
    }

    /// The input modality that saw the most recent activity.
    pub fn active_mode(&self) -> InputMode {
        self.active
    }

    /// Rebuilds pixel geometry for a new canvas size. A trace in progress is
    /// dropped since its points were in the old coordinates.
    pub fn resize(&mut self, canvas: f32) {
        let layout = Layout::new(canvas, self.grid.cols(), self.grid.rows());
        self.walls = WallMap::build(&self.grid, &self.wobble, layout);
        self.drag.end();
    }
}

#[derive(Debug)]
pub struct Game {
    settings: Settings,
    phase: Phase,
    score: u32,
    lives: u32,
    time_left: u32,
    wrong_turns_left: u32,
    level: Option<Level>,
    queue: VecDeque<GameEvent>,
}

impl Game {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            phase: Phase::Welcome,
            score: 0,
            lives: settings.lives,
            time_left: settings.time_limit,
            wrong_turns_left: settings.wrong_turns,
            level: None,
            queue: VecDeque::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn wrong_turns_left(&self) -> u32 {
        self.wrong_turns_left
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn level_number(&self) -> u32 {
        self.level.as_ref().map_or(0, |l| l.number)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::GameOver | Phase::Victory => Some(self.tally()),
            _ => None,
        }
    }

    pub fn push(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Applies queued events in order. Maze events raised along the way are
    /// handled right after the input that caused them.
    pub fn process(&mut self, rng: &mut impl Rng) -> Result<Vec<Notice>> {
        let mut notices = Vec::new();
        while let Some(event) = self.queue.pop_front() {
            self.transition(event, rng, &mut notices)?;
        }
        Ok(notices)
    }

    fn transition(
        &mut self,
        event: GameEvent,
        rng: &mut impl Rng,
        notices: &mut Vec<Notice>,
    ) -> Result<()> {
        match (self.phase, event) {
            (Phase::Welcome | Phase::GameOver | Phase::Victory, GameEvent::Start) => {
                self.score = 0;
                self.lives = self.settings.lives;
                self.time_left = self.settings.time_limit;
                self.start_level(1, rng, notices)?;
            }
            (_, GameEvent::Resize(canvas)) => {
                debug!("canvas resized to {canvas}");
                self.settings.canvas = canvas;
                if let Some(level) = self.level.as_mut() {
                    level.resize(canvas);
                }
            }
            (Phase::Playing, GameEvent::Tick) => {
                self.time_left = self.time_left.saturating_sub(1);
                if self.time_left == 0 {
                    info!("time is up");
                    self.finish(false, notices);
                }
            }
            (Phase::Feedback, GameEvent::FeedbackElapsed) => {
                let current = self.level_number();
                if current >= MAX_LEVEL {
                    self.finish(true, notices);
                } else {
                    self.start_level(current + 1, rng, notices)?;
                }
            }
            (Phase::Playing, GameEvent::PointerDown(p)) => {
                if let Some(level) = self.level.as_mut() {
                    if level.drag.begin(p, &level.walls) {
                        level.active = InputMode::Drag;
                    }
                }
            }
            (Phase::Playing, GameEvent::PointerMove(p)) => {
                if let Some(level) = self.level.as_mut() {
                    if level.drag.is_drawing() {
                        level.active = InputMode::Drag;
                    }
                    let events = level.drag.drag(p, &level.walls, &level.solution);
                    self.raise(events);
                }
            }
            (Phase::Playing, GameEvent::PointerUp) => {
                if let Some(level) = self.level.as_mut() {
                    level.drag.end();
                }
            }
            (Phase::Playing, GameEvent::Step(dir)) => {
                if let Some(level) = self.level.as_mut() {
                    level.active = InputMode::Step;
                    match level.stepper.step(dir, &level.grid, &level.solution) {
                        Step::Blocked => notices.push(Notice::Blocked),
                        Step::Moved(events) => {
                            self.raise(events);
                        }
                    }
                }
            }
            (Phase::Playing, GameEvent::Maze(maze_event)) => {
                self.apply_maze_event(maze_event, notices);
            }
            (phase, event) => {
                debug!("ignoring {event:?} during {phase:?}");
            }
        }
        Ok(())
    }

    /// Maze events jump the queue so they resolve before any input or clock
    /// tick that was already waiting.
    fn raise(&mut self, events: Vec<MazeEvent>) {
        for event in events.into_iter().rev() {
            self.queue.push_front(GameEvent::Maze(event));
        }
    }

    fn apply_maze_event(&mut self, event: MazeEvent, notices: &mut Vec<Notice>) {
        match event {
            MazeEvent::Crash => {
                self.lives = self.lives.saturating_sub(1);
                notices.push(Notice::Crashed {
                    lives_left: self.lives,
                });
                if self.lives == 0 {
                    self.finish(false, notices);
                }
            }
            MazeEvent::WrongPath => {
                if self.wrong_turns_left == 0 {
                    self.finish(false, notices);
                } else {
                    self.wrong_turns_left -= 1;
                    notices.push(Notice::WrongTurn {
                        turns_left: self.wrong_turns_left,
                    });
                }
            }
            MazeEvent::Win => {
                let level = self.level_number();
                self.score += LEVEL_POINTS * level;
                self.phase = Phase::Feedback;
                info!("level {level} cleared, score {}", self.score);
                notices.push(Notice::LevelCleared {
                    level,
                    score: self.score,
                });
            }
        }
    }

    fn start_level(
        &mut self,
        number: u32,
        rng: &mut impl Rng,
        notices: &mut Vec<Notice>,
    ) -> Result<()> {
        let level = Level::generate(number, self.settings.algorithm, self.settings.canvas, rng)?;
        let (cols, rows) = (level.grid.cols(), level.grid.rows());
        info!(
            "level {number}: {cols}x{rows} maze, solution {} cells",
            level.solution.len()
        );
        self.level = Some(level);
        self.wrong_turns_left = self.settings.wrong_turns;
        self.phase = Phase::Playing;
        notices.push(Notice::LevelStarted {
            level: number,
            cols,
            rows,
        });
        Ok(())
    }

    fn finish(&mut self, victory: bool, notices: &mut Vec<Notice>) {
        self.phase = if victory {
            Phase::Victory
        } else {
            Phase::GameOver
        };
        if let Some(level) = self.level.as_mut() {
            level.drag.end();
        }
        let outcome = self.tally();
        info!(
            "game finished: victory={} score={} level={} seconds={}",
            outcome.victory, outcome.score, outcome.level, outcome.seconds
        );
        notices.push(if victory {
            Notice::Victory(outcome)
        } else {
            Notice::GameOver(outcome)
        });
    }

    fn tally(&self) -> Outcome {
        Outcome {
            score: self.score,
            level: self.level_number(),
            lives: self.lives,
            seconds: self.settings.time_limit.saturating_sub(self.time_left),
            victory: self.phase == Phase::Victory,
        }
    }
}
