use log::debug;

use crate::collision::{Point, WallMap};
use crate::error::{MazeError, Result};
use crate::grid::{Dir, Grid, Pos};
use crate::solver::Solution;

pub const PLAYER_RADIUS: f32 = 4.0;
/// Trace points closer than this to the previous one are dropped.
const MIN_TRACE_STEP: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MazeEvent {
    Crash,
    WrongPath,
    Win,
}

/// Freehand trace drawn with a pointer.
#[derive(Clone, Debug, Default)]
pub struct DragTracker {
    drawing: bool,
    trace: Vec<Point>,
    last_cell: Option<Pos>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn trace(&self) -> &[Point] {
        &self.trace
    }

    pub fn head(&self) -> Option<Point> {
        self.trace.last().copied()
    }

    /// Starts a trace if `p` is inside the start cell.
    pub fn begin(&mut self, p: Point, walls: &WallMap) -> bool {
        if !walls.layout().in_start_cell(p) {
            return false;
        }
        self.drawing = true;
        self.trace.clear();
        self.trace.push(p);
        self.last_cell = Some(Pos { x: 0, y: 0 });
        true
    }

    pub fn drag(&mut self, p: Point, walls: &WallMap, solution: &Solution) -> Vec<MazeEvent> {
        let mut events = Vec::new();
        if !self.drawing {
            return events;
        }

        // Pointer events can skip pixels, so the whole move is checked.
        let from = self.head().unwrap_or(p);
        if walls.collides_along(from, p, PLAYER_RADIUS - 1.0) {
            debug!("trace crashed at ({:.1}, {:.1})", p.x, p.y);
            self.drawing = false;
            self.trace.clear();
            events.push(MazeEvent::Crash);
            return events;
        }

        let layout = walls.layout();
        let cell = layout.cell_at(p);
        if cell != self.last_cell {
            self.last_cell = cell;
            if !cell.is_some_and(|c| solution.contains(c)) {
                events.push(MazeEvent::WrongPath);
            }
        }

        if layout.in_goal(p) {
            self.drawing = false;
            events.push(MazeEvent::Win);
            return events;
        }

        if self.head().map_or(true, |last| last.distance(p) > MIN_TRACE_STEP) {
            self.trace.push(p);
        }
        events
    }

    /// Lifting the pointer throws the trace away.
    pub fn end(&mut self) {
        self.drawing = false;
        self.trace.clear();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Blocked,
    Moved(Vec<MazeEvent>),
}

/// Cell-by-cell movement from the keyboard or a virtual joystick.
#[derive(Clone, Debug)]
pub struct StepTracker {
    pos: Pos,
    moves: u32,
    trail: Vec<Pos>,
}

impl Default for StepTracker {
    fn default() -> Self {
        let start = Pos { x: 0, y: 0 };
        Self {
            pos: start,
            moves: 0,
            trail: vec![start],
        }
    }
}

impl StepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Position as `(row, col)`.
    pub fn row_col(&self) -> (usize, usize) {
        (self.pos.y, self.pos.x)
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn trail(&self) -> &[Pos] {
        &self.trail
    }

    pub fn step(&mut self, dir: Dir, grid: &Grid, solution: &Solution) -> Step {
        if !grid.is_open(self.pos, dir) {
            return Step::Blocked;
        }
        let Some(next) = grid.neighbor(self.pos, dir) else {
            return Step::Blocked;
        };

        self.pos = next;
        self.moves += 1;
        if self.trail.last() != Some(&next) {
            self.trail.push(next);
        }

        let mut events = Vec::new();
        if !solution.contains(next) {
            events.push(MazeEvent::WrongPath);
        }
        if next == grid.goal() {
            events.push(MazeEvent::Win);
        }
        Step::Moved(events)
    }

    /// `(dr, dc)` form of [`step`](Self::step): each component in `{-1, 0, 1}`
    /// with exactly one non-zero.
    pub fn step_delta(
        &mut self,
        dr: i32,
        dc: i32,
        grid: &Grid,
        solution: &Solution,
    ) -> Result<Step> {
        let dir = Dir::from_row_col(dr, dc).ok_or(MazeError::InvalidStep { dr, dc })?;
        Ok(self.step(dir, grid, solution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Layout;
    use crate::difficulty::Wobble;
    use crate::solver::solve;

    // 2x2: (0,0) -> (1,0) -> (1,1) is the solution, (0,1) hangs off (0,0).
    fn hook() -> Grid {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.carve(Pos::new(0, 0), Dir::Right);
        grid.carve(Pos::new(1, 0), Dir::Down);
        grid.carve(Pos::new(0, 0), Dir::Down);
        grid
    }

    fn wall_map(grid: &Grid) -> WallMap {
        WallMap::build(grid, &Wobble::flat(2, 2), Layout::new(200.0, 2, 2))
    }

    #[test]
    fn steps_follow_open_walls() {
        let grid = hook();
        let solution = solve(&grid);
        let mut tracker = StepTracker::new();

        assert_eq!(tracker.step(Dir::Up, &grid, &solution), Step::Blocked);
        assert_eq!(tracker.step(Dir::Right, &grid, &solution), Step::Moved(vec![]));
        assert_eq!(tracker.step(Dir::Left, &grid, &solution), Step::Moved(vec![]));
        assert_eq!(
            tracker.step(Dir::Down, &grid, &solution),
            Step::Moved(vec![MazeEvent::WrongPath])
        );
        assert_eq!(tracker.step(Dir::Right, &grid, &solution), Step::Blocked);
        assert_eq!(tracker.pos(), Pos::new(0, 1));
        assert_eq!(tracker.row_col(), (1, 0));
        assert_eq!(tracker.moves(), 3);
    }

    #[test]
    fn reaching_the_goal_wins() {
        let grid = hook();
        let solution = solve(&grid);
        let mut tracker = StepTracker::new();
        tracker.step(Dir::Right, &grid, &solution);
        assert_eq!(
            tracker.step_delta(1, 0, &grid, &solution).unwrap(),
            Step::Moved(vec![MazeEvent::Win])
        );
        assert_eq!(tracker.trail(), &[Pos::new(0, 0), Pos::new(1, 0), Pos::new(1, 1)]);
    }

    #[test]
    fn diagonal_deltas_are_rejected() {
        let grid = hook();
        let solution = solve(&grid);
        let mut tracker = StepTracker::new();
        assert!(matches!(
            tracker.step_delta(1, 1, &grid, &solution),
            Err(MazeError::InvalidStep { dr: 1, dc: 1 })
        ));
        assert!(tracker.step_delta(0, 0, &grid, &solution).is_err());
        assert_eq!(tracker.pos(), Pos::new(0, 0));
    }

    #[test]
    fn drag_must_start_in_first_cell() {
        let grid = hook();
        let walls = wall_map(&grid);
        let mut drag = DragTracker::new();
        assert!(!drag.begin(Point::new(150.0, 50.0), &walls));
        assert!(!drag.is_drawing());
        assert!(drag.begin(Point::new(50.0, 50.0), &walls));
        assert_eq!(drag.trace(), &[Point::new(50.0, 50.0)]);
    }

    #[test]
    fn drag_through_solution_wins() {
        let grid = hook();
        let walls = wall_map(&grid);
        let solution = solve(&grid);
        let mut drag = DragTracker::new();
        drag.begin(Point::new(50.0, 50.0), &walls);

        assert!(drag.drag(Point::new(51.0, 50.0), &walls, &solution).is_empty());
        assert_eq!(drag.trace().len(), 1);
        assert!(drag.drag(Point::new(100.0, 50.0), &walls, &solution).is_empty());
        assert!(drag.drag(Point::new(150.0, 50.0), &walls, &solution).is_empty());
        assert!(drag.drag(Point::new(150.0, 100.0), &walls, &solution).is_empty());
        assert_eq!(drag.trace().len(), 4);
        assert_eq!(
            drag.drag(Point::new(150.0, 150.0), &walls, &solution),
            vec![MazeEvent::Win]
        );
        assert!(!drag.is_drawing());
    }

    #[test]
    fn drag_into_dead_end_is_wrong_path() {
        let grid = hook();
        let walls = wall_map(&grid);
        let solution = solve(&grid);
        let mut drag = DragTracker::new();
        drag.begin(Point::new(50.0, 50.0), &walls);
        assert!(drag.drag(Point::new(50.0, 90.0), &walls, &solution).is_empty());
        assert_eq!(
            drag.drag(Point::new(50.0, 150.0), &walls, &solution),
            vec![MazeEvent::WrongPath]
        );
        // Staying in the same cell does not report again.
        assert!(drag.drag(Point::new(55.0, 150.0), &walls, &solution).is_empty());
        assert!(drag.is_drawing());
    }

    #[test]
    fn drag_into_wall_crashes_and_drops_trace() {
        let grid = hook();
        let walls = wall_map(&grid);
        let solution = solve(&grid);
        let mut drag = DragTracker::new();
        drag.begin(Point::new(50.0, 50.0), &walls);
        // The wall between (0,1) and (1,1) bows out to x = 105.2 halfway down.
        assert_eq!(
            drag.drag(Point::new(105.0, 150.0), &walls, &solution),
            vec![MazeEvent::Crash]
        );
        assert!(drag.trace().is_empty());
        assert!(drag.drag(Point::new(50.0, 50.0), &walls, &solution).is_empty());
    }

    #[test]
    fn jump_across_closed_wall_crashes() {
        // (1,0) is only reachable around through the bottom row.
        let mut grid = Grid::new(2, 2).unwrap();
        grid.carve(Pos::new(0, 0), Dir::Down);
        grid.carve(Pos::new(0, 1), Dir::Right);
        grid.carve(Pos::new(1, 1), Dir::Up);
        let walls = wall_map(&grid);
        let solution = solve(&grid);
        let mut drag = DragTracker::new();
        drag.begin(Point::new(50.0, 50.0), &walls);

        assert_eq!(
            drag.drag(Point::new(150.0, 50.0), &walls, &solution),
            vec![MazeEvent::Crash]
        );
        assert!(!drag.is_drawing());
        assert!(drag.drag(Point::new(150.0, 150.0), &walls, &solution).is_empty());
    }

    #[test]
    fn end_discards_trace() {
        let grid = hook();
        let walls = wall_map(&grid);
        let mut drag = DragTracker::new();
        drag.begin(Point::new(20.0, 20.0), &walls);
        drag.end();
        assert!(!drag.is_drawing());
        assert!(drag.head().is_none());
    }
}
