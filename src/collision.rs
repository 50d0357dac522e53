//! Pixel geometry and wall collision.
//!
//! Walls are kept as a list of stroked curves flattened to polylines, and a
//! probe collides when it lies within half a stroke width of any segment. The
//! wall map is rebuilt whenever the maze or the canvas size changes and is
//! read-only in between.

use crate::difficulty::{SideSeed, Wobble};
use crate::grid::{Dir, Grid, Pos, ALL_DIRS};

/// Goal tolerance: the probe must be this far inside the goal cell.
pub const START_PADDING: f32 = 10.0;
/// Smallest canvas side. Below it the fixed corner overhang and bow eat into
/// the middle of a 16-cell maze.
pub const MIN_CANVAS: f32 = 64.0;
/// Strokes overhang the cell corners so neighboring strokes join up.
const CORNER_OVERHANG: f32 = 2.0;
const CURVE_SEGMENTS: usize = 8;
const BOW: f32 = 0.1;
/// Stroke width and bow are limited relative to the cell so the center of
/// every cell stays clear of walls.
const MAX_THICKNESS_RATIO: f32 = 0.5;
const MAX_OFFSET_RATIO: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Mapping between maze cells and canvas pixels. The canvas is square and the
/// cell size follows the longer maze axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    canvas: f32,
    cols: usize,
    rows: usize,
    cell: f32,
}

impl Layout {
    /// `canvas` is clamped to [`MIN_CANVAS`] and both dimensions to at least one.
    pub fn new(canvas: f32, cols: usize, rows: usize) -> Self {
        let canvas = canvas.max(MIN_CANVAS);
        let (cols, rows) = (cols.max(1), rows.max(1));
        let cell = canvas / cols.max(rows) as f32;
        Self {
            canvas,
            cols,
            rows,
            cell,
        }
    }

    pub fn canvas(&self) -> f32 {
        self.canvas
    }

    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    pub fn in_canvas(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.canvas && p.y < self.canvas
    }

    /// Logical cell under a pixel, `None` outside the maze.
    pub fn cell_at(&self, p: Point) -> Option<Pos> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let x = (p.x / self.cell).floor() as usize;
        let y = (p.y / self.cell).floor() as usize;
        (x < self.cols && y < self.rows).then_some(Pos { x, y })
    }

    pub fn cell_origin(&self, pos: Pos) -> Point {
        Point::new(pos.x as f32 * self.cell, pos.y as f32 * self.cell)
    }

    pub fn cell_center(&self, pos: Pos) -> Point {
        let origin = self.cell_origin(pos);
        Point::new(origin.x + self.cell / 2.0, origin.y + self.cell / 2.0)
    }

    pub fn in_start_cell(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.cell && p.y < self.cell
    }

    pub fn in_goal(&self, p: Point) -> bool {
        let end_x = (self.cols - 1) as f32 * self.cell;
        let end_y = (self.rows - 1) as f32 * self.cell;
        p.x > end_x + START_PADDING && p.y > end_y + START_PADDING
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
    half_width: f32,
}

impl Stroke {
    fn curve(from: Point, to: Point, seed: SideSeed, cell: f32) -> Self {
        let offset_cap = cell * MAX_OFFSET_RATIO;
        let offset = seed.mid_offset.clamp(-offset_cap, offset_cap);
        let width = seed.thickness.min(cell * MAX_THICKNESS_RATIO);

        let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
        let control = Point::new(
            mid.x + (to.y - from.y) * BOW + offset,
            mid.y + (to.x - from.x) * BOW + offset,
        );
        let points = (0..=CURVE_SEGMENTS)
            .map(|i| {
                let t = i as f32 / CURVE_SEGMENTS as f32;
                let u = 1.0 - t;
                Point::new(
                    u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
                    u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
                )
            })
            .collect();
        Self {
            points,
            half_width: width / 2.0,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn width(&self) -> f32 {
        self.half_width * 2.0
    }

    fn distance(&self, p: Point) -> f32 {
        self.points
            .windows(2)
            .map(|seg| segment_distance(p, seg[0], seg[1]))
            .fold(f32::INFINITY, f32::min)
    }

    fn covers(&self, p: Point, slack: f32) -> bool {
        self.distance(p) <= self.half_width + slack
    }

    fn touches_segment(&self, a: Point, b: Point) -> bool {
        self.points
            .windows(2)
            .any(|seg| segments_distance(a, b, seg[0], seg[1]) <= self.half_width)
    }
}

fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

fn cross(o: Point, a: Point, b: Point) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Zero when `ab` and `cd` properly cross, otherwise the closest endpoint gap.
fn segments_distance(a: Point, b: Point, c: Point, d: Point) -> f32 {
    let (d1, d2) = (cross(c, d, a), cross(c, d, b));
    let (d3, d4) = (cross(a, b, c), cross(a, b, d));
    if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
        return 0.0;
    }
    segment_distance(a, c, d)
        .min(segment_distance(b, c, d))
        .min(segment_distance(c, a, b))
        .min(segment_distance(d, a, b))
}

fn side_endpoints(origin: Point, cell: f32, dir: Dir) -> (Point, Point) {
    let Point { x, y } = origin;
    let o = CORNER_OVERHANG;
    match dir {
        Dir::Up => (Point::new(x - o, y), Point::new(x + cell + o, y)),
        Dir::Right => (Point::new(x + cell, y - o), Point::new(x + cell, y + cell + o)),
        Dir::Down => (Point::new(x + cell + o, y + cell), Point::new(x - o, y + cell)),
        Dir::Left => (Point::new(x, y + cell + o), Point::new(x, y - o)),
    }
}

/// Every wall of the current maze as a stroke in canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct WallMap {
    layout: Layout,
    strokes: Vec<Stroke>,
}

impl WallMap {
    pub fn build(grid: &Grid, wobble: &Wobble, layout: Layout) -> Self {
        let cell = layout.cell_size();
        let mut strokes = Vec::new();
        for c in grid.cells() {
            let Some(seed) = wobble.seed(c.pos) else {
                continue;
            };
            let origin = layout.cell_origin(c.pos);
            for dir in ALL_DIRS {
                if c.walls.get(dir) {
                    let (from, to) = side_endpoints(origin, cell, dir);
                    strokes.push(Stroke::curve(from, to, seed.side(dir), cell));
                }
            }
        }
        Self { layout, strokes }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// True when `p` lies on a wall stroke.
    pub fn hits(&self, p: Point) -> bool {
        self.strokes.iter().any(|s| s.covers(p, 0.0))
    }

    /// Five-point probe around `p`: the center plus the four cardinal points at
    /// `radius`. Any probe outside the canvas or on a wall collides.
    pub fn collides(&self, p: Point, radius: f32) -> bool {
        let probes = [
            p,
            Point::new(p.x + radius, p.y),
            Point::new(p.x - radius, p.y),
            Point::new(p.x, p.y + radius),
            Point::new(p.x, p.y - radius),
        ];
        probes
            .iter()
            .any(|&q| !self.layout.in_canvas(q) || self.hits(q))
    }

    /// Probe at `to`, plus a check that the straight motion from `from` does
    /// not pass over a wall stroke on the way.
    pub fn collides_along(&self, from: Point, to: Point, radius: f32) -> bool {
        self.collides(to, radius) || self.strokes.iter().any(|s| s.touches_segment(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn layout_clamps_degenerate_input() {
        let layout = Layout::new(10.0, 0, 0);
        assert_eq!(layout.canvas(), MIN_CANVAS);
        assert_eq!(layout.cell_size(), MIN_CANVAS);
        assert!(layout.in_goal(Point::new(20.0, 20.0)));
        assert_eq!(layout.cell_at(Point::new(5.0, 5.0)), Some(Pos::new(0, 0)));
    }

    #[test]
    fn motion_across_a_closed_wall_collides() {
        let grid = Grid::new(2, 1).unwrap();
        let map = WallMap::build(&grid, &Wobble::flat(2, 1), Layout::new(100.0, 2, 1));
        let (left, right) = (Point::new(25.0, 25.0), Point::new(75.0, 25.0));
        assert!(!map.collides(left, 3.0));
        assert!(!map.collides(right, 3.0));
        assert!(map.collides_along(left, right, 3.0));
        assert!(!map.collides_along(left, Point::new(30.0, 30.0), 3.0));
    }

    #[test]
    fn motion_through_an_open_passage_is_clear() {
        let mut grid = Grid::new(2, 1).unwrap();
        grid.carve(Pos::new(0, 0), Dir::Right);
        let map = WallMap::build(&grid, &Wobble::flat(2, 1), Layout::new(100.0, 2, 1));
        assert!(!map.collides_along(Point::new(25.0, 25.0), Point::new(75.0, 25.0), 3.0));
    }

    #[test]
    fn layout_maps_pixels_to_cells() {
        let layout = Layout::new(400.0, 8, 4);
        assert_eq!(layout.cell_size(), 50.0);
        assert_eq!(layout.cell_at(Point::new(10.0, 10.0)), Some(Pos::new(0, 0)));
        assert_eq!(layout.cell_at(Point::new(399.0, 199.0)), Some(Pos::new(7, 3)));
        assert_eq!(layout.cell_at(Point::new(10.0, 210.0)), None);
        assert_eq!(layout.cell_at(Point::new(-1.0, 10.0)), None);
        assert_eq!(layout.cell_center(Pos::new(1, 2)), Point::new(75.0, 125.0));
    }

    #[test]
    fn goal_needs_padding() {
        let layout = Layout::new(100.0, 2, 2);
        assert!(!layout.in_goal(Point::new(55.0, 80.0)));
        assert!(layout.in_goal(Point::new(61.0, 61.0)));
        assert!(layout.in_start_cell(Point::new(5.0, 49.0)));
        assert!(!layout.in_start_cell(Point::new(50.0, 5.0)));
    }

    #[test]
    fn closed_cell_walls_are_hit() {
        let grid = Grid::new(2, 2).unwrap();
        let wobble = Wobble::flat(2, 2);
        let map = WallMap::build(&grid, &wobble, Layout::new(100.0, 2, 2));
        // Strokes bow 2.7 px off the straight wall line at their midpoint.
        assert!(map.hits(Point::new(52.5, 25.0)));
        assert!(map.hits(Point::new(47.5, 25.0)));
        assert!(map.hits(Point::new(25.0, 2.5)));
        assert!(!map.hits(Point::new(25.0, 25.0)));
        assert_eq!(map.strokes().len(), 16);
    }

    #[test]
    fn open_passage_is_clear() {
        let mut grid = Grid::new(2, 1).unwrap();
        grid.carve(Pos::new(0, 0), Dir::Right);
        let wobble = Wobble::flat(2, 1);
        let map = WallMap::build(&grid, &wobble, Layout::new(100.0, 2, 1));
        assert!(!map.hits(Point::new(50.0, 25.0)));
        assert!(!map.collides(Point::new(50.0, 25.0), 3.0));
    }

    #[test]
    fn probe_outside_canvas_collides() {
        let grid = Grid::new(1, 1).unwrap();
        let map = WallMap::build(&grid, &Wobble::flat(1, 1), Layout::new(100.0, 1, 1));
        assert!(map.collides(Point::new(1.0, 50.0), 3.0));
        assert!(!map.collides(Point::new(50.0, 50.0), 3.0));
    }

    #[test]
    fn cell_centers_clear_at_max_wobble() {
        let mut rng = StdRng::seed_from_u64(5);
        let grid = generate(16, 16, &mut rng).unwrap();
        let wobble = Wobble::roll(20, 16, 16, &mut rng);
        for canvas in [0.0, MIN_CANVAS, 120.0, 320.0, 480.0] {
            let layout = Layout::new(canvas, 16, 16);
            let map = WallMap::build(&grid, &wobble, layout);
            for cell in grid.cells() {
                assert!(!map.hits(layout.cell_center(cell.pos)));
            }
        }
    }
}
