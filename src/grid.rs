use std::fmt;

use crate::error::{MazeError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The `"x,y"` key used for solution-set membership.
    pub fn key(self) -> String {
        format!("{},{}", self.x, self.y)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_DIRS: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

impl Dir {
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    /// Maps a `(row, col)` delta to a direction. Exactly one component must be
    /// non-zero and it must be a unit step.
    pub fn from_row_col(dr: i32, dc: i32) -> Option<Dir> {
        match (dr, dc) {
            (-1, 0) => Some(Dir::Up),
            (1, 0) => Some(Dir::Down),
            (0, -1) => Some(Dir::Left),
            (0, 1) => Some(Dir::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Walls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Walls {
    pub const CLOSED: Walls = Walls {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    pub fn get(&self, dir: Dir) -> bool {
        match dir {
            Dir::Up => self.top,
            Dir::Right => self.right,
            Dir::Down => self.bottom,
            Dir::Left => self.left,
        }
    }

    fn set(&mut self, dir: Dir, present: bool) {
        match dir {
            Dir::Up => self.top = present,
            Dir::Right => self.right = present,
            Dir::Down => self.bottom = present,
            Dir::Left => self.left = present,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub pos: Pos,
    pub walls: Walls,
}

/// Maze topology: `cols x rows` cells and the walls between them. No pixel
/// geometry lives here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// Every cell starts fully walled in.
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(MazeError::InvalidDimensions { cols, rows });
        }
        let cells = (0..rows)
            .map(|y| {
                (0..cols)
                    .map(|x| Cell {
                        pos: Pos { x, y },
                        walls: Walls::CLOSED,
                    })
                    .collect()
            })
            .collect();
        Ok(Self { cols, rows, cells })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    pub fn start(&self) -> Pos {
        Pos { x: 0, y: 0 }
    }

    pub fn goal(&self) -> Pos {
        Pos {
            x: self.cols - 1,
            y: self.rows - 1,
        }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.cols && pos.y < self.rows
    }

    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.cells[pos.y][pos.x]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flat_map(|row| row.iter())
    }

    pub fn index(&self, pos: Pos) -> usize {
        pos.y * self.cols + pos.x
    }

    pub fn pos_at(&self, index: usize) -> Pos {
        Pos {
            x: index % self.cols,
            y: index / self.cols,
        }
    }

    /// In-bounds neighbor in `dir`, ignoring walls.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x as isize + dx;
        let ny = pos.y as isize + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let next = Pos {
            x: nx as usize,
            y: ny as usize,
        };
        self.contains(next).then_some(next)
    }

    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = (Dir, Pos)> + '_ {
        ALL_DIRS
            .into_iter()
            .filter_map(move |dir| self.neighbor(pos, dir).map(|next| (dir, next)))
    }

    pub fn has_wall(&self, pos: Pos, dir: Dir) -> bool {
        self.cell(pos).walls.get(dir)
    }

    /// True when `dir` leads to an in-bounds cell with no wall in between.
    pub fn is_open(&self, pos: Pos, dir: Dir) -> bool {
        !self.has_wall(pos, dir) && self.neighbor(pos, dir).is_some()
    }

    pub fn open_neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        ALL_DIRS.into_iter().filter_map(move |dir| {
            if self.is_open(pos, dir) {
                self.neighbor(pos, dir)
            } else {
                None
            }
        })
    }

    /// Open wall pairs, each shared edge counted once.
    pub fn passage_count(&self) -> usize {
        self.cells()
            .map(|cell| {
                usize::from(self.is_open(cell.pos, Dir::Right))
                    + usize::from(self.is_open(cell.pos, Dir::Down))
            })
            .sum()
    }

    /// Removes the wall between `pos` and its neighbor in `dir` on both sides.
    pub(crate) fn carve(&mut self, pos: Pos, dir: Dir) {
        self.set_wall_pair(pos, dir, false);
    }

    /// Restores the wall between `pos` and its neighbor in `dir` on both sides.
    pub(crate) fn raise(&mut self, pos: Pos, dir: Dir) {
        self.set_wall_pair(pos, dir, true);
    }

    /// Carves between two grid-adjacent cells. Non-adjacent pairs are ignored.
    pub(crate) fn carve_between(&mut self, a: Pos, b: Pos) {
        if let Some(dir) = direction_between(a, b) {
            self.carve(a, dir);
        }
    }

    fn set_wall_pair(&mut self, pos: Pos, dir: Dir, present: bool) {
        let Some(next) = self.neighbor(pos, dir) else {
            return;
        };
        self.cells[pos.y][pos.x].walls.set(dir, present);
        self.cells[next.y][next.x].walls.set(dir.opposite(), present);
    }

    pub(crate) fn clear_interior(&mut self) {
        for y in 0..self.rows {
            for x in 0..self.cols {
                let walls = &mut self.cells[y][x].walls;
                walls.top = y == 0;
                walls.bottom = y == self.rows - 1;
                walls.left = x == 0;
                walls.right = x == self.cols - 1;
            }
        }
    }
}

/// Direction leading from `a` to an orthogonally adjacent `b`.
pub fn direction_between(a: Pos, b: Pos) -> Option<Dir> {
    let dx = b.x as isize - a.x as isize;
    let dy = b.y as isize - a.y as isize;
    match (dx, dy) {
        (0, -1) => Some(Dir::Up),
        (0, 1) => Some(Dir::Down),
        (-1, 0) => Some(Dir::Left),
        (1, 0) => Some(Dir::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_fully_walled() {
        let grid = Grid::new(3, 2).unwrap();
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.rows(), 2);
        assert!(grid.cells().all(|c| c.walls == Walls::CLOSED));
        assert_eq!(grid.passage_count(), 0);
        assert_eq!(grid.cell(Pos::new(2, 1)).pos, Pos::new(2, 1));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(matches!(
            Grid::new(0, 4),
            Err(MazeError::InvalidDimensions { cols: 0, rows: 4 })
        ));
    }

    #[test]
    fn carve_removes_both_sides() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.carve(Pos::new(0, 0), Dir::Right);
        assert!(!grid.has_wall(Pos::new(0, 0), Dir::Right));
        assert!(!grid.has_wall(Pos::new(1, 0), Dir::Left));
        assert!(grid.is_open(Pos::new(1, 0), Dir::Left));
        assert_eq!(grid.passage_count(), 1);

        grid.raise(Pos::new(1, 0), Dir::Left);
        assert!(grid.has_wall(Pos::new(0, 0), Dir::Right));
        assert_eq!(grid.passage_count(), 0);
    }

    #[test]
    fn carving_off_the_edge_is_a_no_op() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.carve(Pos::new(0, 0), Dir::Up);
        assert!(grid.has_wall(Pos::new(0, 0), Dir::Up));
    }

    #[test]
    fn direction_between_adjacent_cells() {
        assert_eq!(direction_between(Pos::new(1, 1), Pos::new(1, 0)), Some(Dir::Up));
        assert_eq!(direction_between(Pos::new(1, 1), Pos::new(2, 1)), Some(Dir::Right));
        assert_eq!(direction_between(Pos::new(1, 1), Pos::new(2, 2)), None);
    }

    #[test]
    fn key_matches_display() {
        assert_eq!(Pos::new(3, 7).key(), "3,7");
        assert_eq!(Pos::new(3, 7).to_string(), "3,7");
    }
}
