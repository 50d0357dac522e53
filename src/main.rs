use std::fs::File;
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use unicode_width::UnicodeWidthStr;

use maze_runner::config::Args;
use maze_runner::game::{Game, GameEvent, InputMode, Level, Notice, Phase};
use maze_runner::grid::{Dir, Pos};
use maze_runner::{Point, Result};

const CELL_W: usize = 2;
const FEEDBACK_DELAY: Duration = Duration::from_millis(1500);
const CLOCK: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Wall,
    Floor,
    Goal,
    Player,
    Trail,
    Trace,
    Pen,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

const BLANK: Cell = Cell {
    glyph: Glyph::Floor,
    color: Color::Reset,
};

struct Renderer {
    width: usize,
    height: usize,
    last: Vec<Cell>,
    last_hud: String,
    last_status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            last: Vec::new(),
            last_hud: String::new(),
            last_status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    fn fit(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.last = vec![BLANK; width * height];
            self.needs_full = true;
        }
    }

    /// Terminal cell under the mouse as a canvas pixel. Each tile spans half a
    /// maze cell, so odd tiles land on cell centers and even tiles on walls.
    fn pixel(&self, column: u16, row: u16, cell_size: f32) -> Point {
        let tx = (column as f32 - self.origin_x as f32) / CELL_W as f32;
        let ty = row as f32 - self.origin_y as f32;
        Point::new(tx.floor() * cell_size / 2.0, ty * cell_size / 2.0)
    }
}

/// Front-end timers and the last message shown under the maze.
struct Ui {
    status: String,
    last_second: Instant,
    feedback_until: Option<Instant>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &args);

    stdout.execute(Show)?;
    stdout.execute(DisableMouseCapture)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn init_logging(args: &Args) -> Result<()> {
    let default_filter = if args.log_file.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn run(stdout: &mut Stdout, args: &Args) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(
        "starting: algorithm={} time_limit={}s canvas={}px seed={:?}",
        args.algorithm, args.time_limit, args.canvas, args.seed
    );

    let mut game = Game::new(args.settings());
    let mut renderer = Renderer::new();
    let mut ui = Ui {
        status: "Press Enter to start".to_string(),
        last_second: Instant::now(),
        feedback_until: None,
    };
    let mut last_tick = Instant::now();
    let tick = args.tick();
    let frame_time = args.frame_time();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        if key.code == KeyCode::Char('q') {
                            return Ok(());
                        }
                        if let Some(event) = key_event(key.code) {
                            if event == GameEvent::Start && game.phase() != Phase::Playing {
                                ui.last_second = Instant::now();
                            }
                            game.push(event);
                        }
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => {
                    if let Some(event) = mouse_event(mouse, &game, &renderer) {
                        game.push(event);
                    }
                }
                // The canvas is virtual and fixed; a terminal resize only moves
                // the origin, so the game never sees a Resize event.
                Event::Resize(_, _) => renderer.needs_full = true,
                _ => {}
            }
        }

        if game.phase() == Phase::Playing && ui.last_second.elapsed() >= CLOCK {
            ui.last_second += CLOCK;
            game.push(GameEvent::Tick);
        }
        if ui.feedback_until.is_some_and(|t| Instant::now() >= t) {
            ui.feedback_until = None;
            ui.last_second = Instant::now();
            game.push(GameEvent::FeedbackElapsed);
        }

        if last_tick.elapsed() >= tick || game.has_pending() {
            last_tick = Instant::now();
            for notice in game.process(&mut rng)? {
                apply_notice(&notice, &mut ui);
            }
        }
        render(stdout, &game, &ui, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn key_event(code: KeyCode) -> Option<GameEvent> {
    let dir = match code {
        KeyCode::Enter | KeyCode::Char(' ') => return Some(GameEvent::Start),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Dir::Up,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Dir::Down,
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Dir::Left,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Dir::Right,
        _ => return None,
    };
    Some(GameEvent::Step(dir))
}

fn mouse_event(mouse: MouseEvent, game: &Game, renderer: &Renderer) -> Option<GameEvent> {
    let level = game.level()?;
    let point = || renderer.pixel(mouse.column, mouse.row, level.layout().cell_size());
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(GameEvent::PointerDown(point())),
        MouseEventKind::Drag(MouseButton::Left) => Some(GameEvent::PointerMove(point())),
        MouseEventKind::Up(MouseButton::Left) => Some(GameEvent::PointerUp),
        _ => None,
    }
}

fn apply_notice(notice: &Notice, ui: &mut Ui) {
    ui.status = match notice {
        Notice::LevelStarted { level, cols, rows } => {
            format!("Level {level}: {cols}x{rows}. Drag from the top-left or use arrows/WASD/hjkl")
        }
        Notice::Blocked => "Wall!".to_string(),
        Notice::Crashed { lives_left } => {
            format!("Crashed into a wall. {lives_left} lives left")
        }
        Notice::WrongTurn { turns_left } => {
            warn!("wrong turn, {turns_left} left");
            format!("Wrong way! {turns_left} wrong turns left")
        }
        Notice::LevelCleared { level, score } => {
            ui.feedback_until = Some(Instant::now() + FEEDBACK_DELAY);
            format!("Level {level} cleared! Score {score}")
        }
        Notice::GameOver(outcome) => format!(
            "GAME OVER: score {} on level {} after {}s (Enter to retry, q to quit)",
            outcome.score, outcome.level, outcome.seconds
        ),
        Notice::Victory(outcome) => format!(
            "YOU WIN: score {} with {} lives in {}s (Enter to play again, q to quit)",
            outcome.score, outcome.lives, outcome.seconds
        ),
    };
}

fn render(stdout: &mut Stdout, game: &Game, ui: &Ui, renderer: &mut Renderer) -> io::Result<()> {
    let (width, height) = game
        .level()
        .map_or((0, 0), |l| (2 * l.grid().cols() + 1, 2 * l.grid().rows() + 1));
    renderer.fit(width, height);

    let needed_h = (height + 2) as u16;
    let needed_w = ((width * CELL_W) as u16).max(ui.status.width() as u16);

    stdout.queue(MoveTo(0, 0))?;
    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - (width * CELL_W) as u16) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }
    if renderer.needs_full {
        stdout.queue(Clear(ClearType::All))?;
    }

    let hud = format!(
        "Level: {}  Score: {}  Lives: {}  Time: {}s  Wrong turns: {}  (q to quit)",
        game.level_number(),
        game.score(),
        game.lives(),
        game.time_left(),
        game.wrong_turns_left()
    );
    if renderer.needs_full || hud != renderer.last_hud {
        print_line(stdout, 0, origin_y - 1, &hud, Color::White)?;
        renderer.last_hud = hud;
    }

    if let Some(level) = game.level() {
        let trace = trace_tiles(level);
        for y in 0..height {
            for x in 0..width {
                let cell = cell_for(level, x, y, &trace);
                let idx = y * width + x;
                if renderer.needs_full || cell != renderer.last[idx] {
                    renderer.last[idx] = cell;
                    draw_cell(stdout, renderer, x, y, cell)?;
                }
            }
        }
    }

    if renderer.needs_full || ui.status != renderer.last_status {
        let color = match game.phase() {
            Phase::GameOver => Color::Red,
            Phase::Victory | Phase::Feedback => Color::Green,
            _ => Color::Yellow,
        };
        print_line(stdout, 0, origin_y + height as u16, &ui.status, color)?;
        renderer.last_status = ui.status.clone();
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn print_line(stdout: &mut Stdout, x: u16, y: u16, text: &str, color: Color) -> io::Result<()> {
    stdout.queue(MoveTo(x, y))?;
    stdout.queue(Clear(ClearType::CurrentLine))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    stdout.queue(ResetColor)?;
    Ok(())
}

/// Tiles covered by the pointer trace, in tile coordinates.
fn trace_tiles(level: &Level) -> Vec<(usize, usize)> {
    let half = level.layout().cell_size() / 2.0;
    level
        .drag()
        .trace()
        .iter()
        .filter(|p| p.x >= 0.0 && p.y >= 0.0)
        .map(|p| ((p.x / half).round() as usize, (p.y / half).round() as usize))
        .collect()
}

fn cell_for(level: &Level, x: usize, y: usize, trace: &[(usize, usize)]) -> Cell {
    let grid = level.grid();
    if x % 2 == 1 && y % 2 == 1 {
        let pos = Pos::new(x / 2, y / 2);
        let stepper = level.stepper();
        if level.active_mode() == InputMode::Step && stepper.pos() == pos {
            return Cell {
                glyph: Glyph::Player,
                color: Color::Yellow,
            };
        }
        if trace.last() == Some(&(x, y)) {
            return Cell {
                glyph: Glyph::Pen,
                color: Color::Magenta,
            };
        }
        if trace.contains(&(x, y)) {
            return Cell {
                glyph: Glyph::Trace,
                color: Color::Magenta,
            };
        }
        if pos == grid.goal() {
            return Cell {
                glyph: Glyph::Goal,
                color: Color::Green,
            };
        }
        if stepper.trail().contains(&pos) {
            return Cell {
                glyph: Glyph::Trail,
                color: Color::DarkYellow,
            };
        }
        return BLANK;
    }

    let wall = Cell {
        glyph: Glyph::Wall,
        color: Color::Blue,
    };
    let last_x = 2 * grid.cols();
    let last_y = 2 * grid.rows();
    let closed = if x % 2 == 0 && y % 2 == 0 {
        true
    } else if x % 2 == 1 {
        // Horizontal edge above cell (x/2, y/2).
        y == 0 || y == last_y || grid.has_wall(Pos::new(x / 2, y / 2), Dir::Up)
    } else {
        // Vertical edge left of cell (x/2, y/2).
        x == 0 || x == last_x || grid.has_wall(Pos::new(x / 2, y / 2), Dir::Left)
    };
    if closed {
        return wall;
    }
    if trace.contains(&(x, y)) {
        return Cell {
            glyph: Glyph::Trace,
            color: Color::Magenta,
        };
    }
    BLANK
}

fn draw_cell(
    stdout: &mut Stdout,
    renderer: &Renderer,
    x: usize,
    y: usize,
    cell: Cell,
) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Wall => "██",
        Glyph::Floor => "  ",
        Glyph::Goal => "🏁",
        Glyph::Player => "😃",
        Glyph::Trail => "· ",
        Glyph::Trace => "░░",
        Glyph::Pen => "◆ ",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}
