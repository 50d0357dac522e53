use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::grid::{Grid, Pos};

/// Cells on the shortest path from the start to the goal. In a perfect maze
/// this path is also the only simple path between the two.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Solution {
    path: Vec<Pos>,
    cells: HashSet<Pos>,
}

impl Solution {
    fn from_path(path: Vec<Pos>) -> Self {
        let cells = path.iter().copied().collect();
        Self { path, cells }
    }

    /// Ordered from start to goal.
    pub fn path(&self) -> &[Pos] {
        &self.path
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Membership keys in `"x,y"` form.
    pub fn keys(&self) -> HashSet<String> {
        self.cells.iter().map(|p| p.key()).collect()
    }
}

/// Breadth-first search from `(0, 0)` to `(cols - 1, rows - 1)`. Each queue
/// entry carries its own path; the grid is capped small enough that the copy
/// cost does not matter. Returns an empty solution when the goal is cut off.
pub fn solve(grid: &Grid) -> Solution {
    let start = grid.start();
    let goal = grid.goal();
    let mut seen = vec![false; grid.len()];
    let mut queue = VecDeque::new();
    seen[grid.index(start)] = true;
    queue.push_back((start, vec![start]));

    while let Some((pos, path)) = queue.pop_front() {
        if pos == goal {
            debug!("solved {}x{} maze in {} steps", grid.cols(), grid.rows(), path.len() - 1);
            return Solution::from_path(path);
        }
        for next in grid.open_neighbors(pos) {
            let idx = grid.index(next);
            if seen[idx] {
                continue;
            }
            seen[idx] = true;
            let mut extended = path.clone();
            extended.push(next);
            queue.push_back((next, extended));
        }
    }
    Solution::default()
}

/// Step distance from `from` to every cell through open walls, `None` where
/// unreachable. Indexed like [`Grid::index`].
pub fn distances(grid: &Grid, from: Pos) -> Vec<Option<usize>> {
    let mut dist = vec![None; grid.len()];
    let mut q = VecDeque::new();
    dist[grid.index(from)] = Some(0);
    q.push_back(from);

    while let Some(pos) = q.pop_front() {
        let base = dist[grid.index(pos)].unwrap_or(0);
        for next in grid.open_neighbors(pos) {
            let idx = grid.index(next);
            if dist[idx].is_none() {
                dist[idx] = Some(base + 1);
                q.push_back(next);
            }
        }
    }
    dist
}
