//! Perfect-maze generators.
//!
//! Every algorithm here carves a spanning tree over the grid: exactly
//! `cols * rows - 1` passages, every cell reachable, no cycles. Visited state is
//! a local bitset owned by each algorithm and dropped when it returns, so the
//! resulting [`Grid`] only ever carries wall data.

use std::fmt;
use std::str::FromStr;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::grid::{direction_between, Dir, Grid, Pos};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    #[default]
    Backtracker,
    Prim,
    HuntAndKill,
    BinaryTree,
    Sidewinder,
    AldousBroder,
    Wilson,
    RecursiveDivision,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Backtracker,
        Algorithm::Prim,
        Algorithm::HuntAndKill,
        Algorithm::BinaryTree,
        Algorithm::Sidewinder,
        Algorithm::AldousBroder,
        Algorithm::Wilson,
        Algorithm::RecursiveDivision,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Backtracker => "backtracker",
            Algorithm::Prim => "prim",
            Algorithm::HuntAndKill => "hunt-and-kill",
            Algorithm::BinaryTree => "binary-tree",
            Algorithm::Sidewinder => "sidewinder",
            Algorithm::AldousBroder => "aldous-broder",
            Algorithm::Wilson => "wilson",
            Algorithm::RecursiveDivision => "recursive-division",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Algorithm::ALL.iter().map(|a| a.name()).collect();
                format!("unknown algorithm '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Recursive backtracker starting at `(0, 0)`.
pub fn generate(cols: usize, rows: usize, rng: &mut impl Rng) -> Result<Grid> {
    generate_with(Algorithm::Backtracker, cols, rows, rng)
}

pub fn generate_with(
    algorithm: Algorithm,
    cols: usize,
    rows: usize,
    rng: &mut impl Rng,
) -> Result<Grid> {
    let mut grid = Grid::new(cols, rows)?;
    match algorithm {
        Algorithm::Backtracker => backtrack(&mut grid, rng),
        Algorithm::Prim => prim(&mut grid, rng),
        Algorithm::HuntAndKill => hunt_and_kill(&mut grid, rng),
        Algorithm::BinaryTree => binary_tree(&mut grid, rng),
        Algorithm::Sidewinder => sidewinder(&mut grid, rng),
        Algorithm::AldousBroder => aldous_broder(&mut grid, rng),
        Algorithm::Wilson => wilson(&mut grid, rng),
        Algorithm::RecursiveDivision => recursive_division(&mut grid, rng),
    }
    debug!(
        "generated {}x{} maze with {}: {} passages",
        cols,
        rows,
        algorithm,
        grid.passage_count()
    );
    Ok(grid)
}

fn unvisited_neighbors(grid: &Grid, visited: &[bool], pos: Pos) -> Vec<(Dir, Pos)> {
    grid.neighbors(pos)
        .filter(|(_, next)| !visited[grid.index(*next)])
        .collect()
}

fn visited_neighbors(grid: &Grid, visited: &[bool], pos: Pos) -> Vec<(Dir, Pos)> {
    grid.neighbors(pos)
        .filter(|(_, next)| visited[grid.index(*next)])
        .collect()
}

fn random_cell(grid: &Grid, rng: &mut impl Rng) -> Pos {
    Pos {
        x: rng.gen_range(0..grid.cols()),
        y: rng.gen_range(0..grid.rows()),
    }
}

fn backtrack(grid: &mut Grid, rng: &mut impl Rng) {
    let mut visited = vec![false; grid.len()];
    let start = grid.start();
    visited[grid.index(start)] = true;
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let options = unvisited_neighbors(grid, &visited, current);
        match options.choose(rng) {
            Some(&(dir, next)) => {
                grid.carve(current, dir);
                visited[grid.index(next)] = true;
                stack.push(next);
            }
            None => {
                stack.pop();
            }
        }
    }
}

fn prim(grid: &mut Grid, rng: &mut impl Rng) {
    let mut in_maze = vec![false; grid.len()];
    let mut frontier: Vec<Pos> = Vec::new();

    let start = random_cell(grid, rng);
    in_maze[grid.index(start)] = true;
    frontier.extend(unvisited_neighbors(grid, &in_maze, start).into_iter().map(|(_, p)| p));

    while !frontier.is_empty() {
        let idx = rng.gen_range(0..frontier.len());
        let cell = frontier.swap_remove(idx);
        if in_maze[grid.index(cell)] {
            continue;
        }

        let attached = visited_neighbors(grid, &in_maze, cell);
        let Some(&(dir, _)) = attached.choose(rng) else {
            continue;
        };
        grid.carve(cell, dir);
        in_maze[grid.index(cell)] = true;
        frontier.extend(unvisited_neighbors(grid, &in_maze, cell).into_iter().map(|(_, p)| p));
    }
}

fn hunt_and_kill(grid: &mut Grid, rng: &mut impl Rng) {
    let mut visited = vec![false; grid.len()];
    let start = grid.start();
    visited[grid.index(start)] = true;
    let mut current = Some(start);

    while let Some(cell) = current {
        let options = unvisited_neighbors(grid, &visited, cell);
        if let Some(&(dir, next)) = options.choose(rng) {
            grid.carve(cell, dir);
            visited[grid.index(next)] = true;
            current = Some(next);
            continue;
        }

        // Hunt: first unvisited cell in scan order that touches the carved region.
        current = None;
        for index in 0..grid.len() {
            if visited[index] {
                continue;
            }
            let candidate = grid.pos_at(index);
            let attached = visited_neighbors(grid, &visited, candidate);
            if let Some(&(dir, _)) = attached.choose(rng) {
                grid.carve(candidate, dir);
                visited[index] = true;
                current = Some(candidate);
                break;
            }
        }
    }
}

fn binary_tree(grid: &mut Grid, rng: &mut impl Rng) {
    for y in 0..grid.rows() {
        for x in 0..grid.cols() {
            let pos = Pos { x, y };
            let mut choices = Vec::with_capacity(2);
            if y > 0 {
                choices.push(Dir::Up);
            }
            if x > 0 {
                choices.push(Dir::Left);
            }
            if let Some(&dir) = choices.choose(rng) {
                grid.carve(pos, dir);
            }
        }
    }
}

fn sidewinder(grid: &mut Grid, rng: &mut impl Rng) {
    for y in 0..grid.rows() {
        let mut run: Vec<Pos> = Vec::new();
        for x in 0..grid.cols() {
            let pos = Pos { x, y };
            run.push(pos);
            let at_east = x == grid.cols() - 1;
            let at_north = y == 0;
            let close_out = at_east || (!at_north && rng.gen_bool(0.5));

            if close_out {
                if let Some(&member) = run.choose(rng) {
                    if member.y > 0 {
                        grid.carve(member, Dir::Up);
                    }
                }
                run.clear();
            } else {
                grid.carve(pos, Dir::Right);
            }
        }
    }
}

fn aldous_broder(grid: &mut Grid, rng: &mut impl Rng) {
    let mut visited = vec![false; grid.len()];
    let mut remaining = grid.len() - 1;
    let mut current = random_cell(grid, rng);
    visited[grid.index(current)] = true;

    while remaining > 0 {
        let options: Vec<(Dir, Pos)> = grid.neighbors(current).collect();
        let Some(&(dir, next)) = options.choose(rng) else {
            break;
        };
        if !visited[grid.index(next)] {
            grid.carve(current, dir);
            visited[grid.index(next)] = true;
            remaining -= 1;
        }
        current = next;
    }
}

fn wilson(grid: &mut Grid, rng: &mut impl Rng) {
    let mut in_tree = vec![false; grid.len()];
    let mut unvisited: Vec<usize> = (0..grid.len()).collect();

    let first = unvisited.swap_remove(rng.gen_range(0..unvisited.len()));
    in_tree[first] = true;

    while let Some(&origin) = unvisited.choose(rng) {
        // Loop-erased random walk until it touches the tree.
        let mut cell = grid.pos_at(origin);
        let mut path = vec![cell];
        while !in_tree[grid.index(cell)] {
            let options: Vec<Pos> = grid.neighbors(cell).map(|(_, p)| p).collect();
            let Some(&next) = options.choose(rng) else {
                break;
            };
            match path.iter().position(|p| *p == next) {
                Some(loop_start) => path.truncate(loop_start + 1),
                None => path.push(next),
            }
            cell = next;
        }

        for pair in path.windows(2) {
            grid.carve_between(pair[0], pair[1]);
            in_tree[grid.index(pair[0])] = true;
        }
        unvisited.retain(|&index| !in_tree[index]);
    }
}

fn recursive_division(grid: &mut Grid, rng: &mut impl Rng) {
    grid.clear_interior();

    // (x, y, width, height) chambers still to split.
    let mut chambers = vec![(0, 0, grid.cols(), grid.rows())];
    while let Some((x, y, w, h)) = chambers.pop() {
        if w < 2 || h < 2 {
            continue;
        }
        let horizontal = match w.cmp(&h) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => rng.gen_bool(0.5),
        };

        if horizontal {
            let k = rng.gen_range(0..h - 1);
            let gap = x + rng.gen_range(0..w);
            for cx in x..x + w {
                if cx != gap {
                    grid.raise(Pos { x: cx, y: y + k }, Dir::Down);
                }
            }
            chambers.push((x, y, w, k + 1));
            chambers.push((x, y + k + 1, w, h - k - 1));
        } else {
            let k = rng.gen_range(0..w - 1);
            let gap = y + rng.gen_range(0..h);
            for cy in y..y + h {
                if cy != gap {
                    grid.raise(Pos { x: x + k, y: cy }, Dir::Right);
                }
            }
            chambers.push((x, y, k + 1, h));
            chambers.push((x + k + 1, y, w - k - 1, h));
        }
    }
}

/// Checks the spanning-tree shape: `len - 1` passages and every cell reachable
/// from the start.
pub fn is_perfect(grid: &Grid) -> bool {
    if grid.passage_count() != grid.len() - 1 {
        return false;
    }
    let mut seen = vec![false; grid.len()];
    let mut stack = vec![grid.start()];
    seen[grid.index(grid.start())] = true;
    let mut reached = 1;
    while let Some(pos) = stack.pop() {
        for next in grid.open_neighbors(pos) {
            let idx = grid.index(next);
            if !seen[idx] {
                seen[idx] = true;
                reached += 1;
                stack.push(next);
            }
        }
    }
    reached == grid.len()
}

/// Wall flags agree on both sides of every shared edge.
pub fn walls_symmetric(grid: &Grid) -> bool {
    grid.cells().all(|cell| {
        grid.neighbors(cell.pos).all(|(dir, next)| {
            debug_assert_eq!(direction_between(cell.pos, next), Some(dir));
            grid.has_wall(cell.pos, dir) == grid.has_wall(next, dir.opposite())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn backtracker_carves_a_spanning_tree() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let grid = generate(9, 6, &mut rng).unwrap();
            assert_eq!(grid.passage_count(), 9 * 6 - 1);
            assert!(is_perfect(&grid));
            assert!(walls_symmetric(&grid));
        }
    }

    #[test]
    fn every_algorithm_is_perfect() {
        let mut rng = StdRng::seed_from_u64(42);
        for algorithm in Algorithm::ALL {
            for (cols, rows) in [(1, 1), (1, 5), (5, 1), (2, 2), (7, 4), (16, 16)] {
                let grid = generate_with(algorithm, cols, rows, &mut rng).unwrap();
                assert!(is_perfect(&grid), "{algorithm} {cols}x{rows} is not perfect");
                assert!(walls_symmetric(&grid), "{algorithm} {cols}x{rows} walls");
            }
        }
    }

    #[test]
    fn single_row_is_a_corridor() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = generate(6, 1, &mut rng).unwrap();
        for x in 0..5 {
            assert!(grid.is_open(Pos::new(x, 0), Dir::Right));
        }
    }

    #[test]
    fn outer_boundary_stays_closed() {
        let mut rng = StdRng::seed_from_u64(3);
        for algorithm in Algorithm::ALL {
            let grid = generate_with(algorithm, 8, 5, &mut rng).unwrap();
            for cell in grid.cells() {
                let Pos { x, y } = cell.pos;
                if y == 0 {
                    assert!(cell.walls.top);
                }
                if x == 0 {
                    assert!(cell.walls.left);
                }
                if y == 4 {
                    assert!(cell.walls.bottom);
                }
                if x == 7 {
                    assert!(cell.walls.right);
                }
            }
        }
    }

    #[test]
    fn algorithm_names_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.name().parse::<Algorithm>(), Ok(algorithm));
        }
        assert!("maze".parse::<Algorithm>().is_err());
    }
}
