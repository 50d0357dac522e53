use rand::Rng;

use crate::error::{MazeError, Result};
use crate::grid::{Dir, Pos};

pub const MAX_DIMENSION: usize = 16;
pub const MAX_LEVEL: u32 = 20;
const BASE_SIZE: usize = 4;
const MID_OFFSET_RANGE: f32 = 5.0;
const MIN_THICKNESS: f32 = 2.0;
const MAX_EXTRA_THICKNESS: f32 = 25.0;

/// Grid size for a level. Both axes grow with the level until they hit
/// [`MAX_DIMENSION`].
pub fn dimensions(level: u32) -> Result<(usize, usize)> {
    if level == 0 {
        return Err(MazeError::InvalidLevel(level));
    }
    let lvl = level as usize;
    let cols = BASE_SIZE + lvl.min(8) + lvl / 2;
    let rows = BASE_SIZE + lvl.min(8) + (level as f32 * 0.3).floor() as usize;
    Ok((cols.min(MAX_DIMENSION), rows.min(MAX_DIMENSION)))
}

/// Hand-drawn look for one wall side: how far the curve bows and how thick the
/// stroke is, in pixels before clamping to the cell size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SideSeed {
    pub mid_offset: f32,
    pub thickness: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallSeed {
    pub top: SideSeed,
    pub right: SideSeed,
    pub bottom: SideSeed,
    pub left: SideSeed,
}

impl WallSeed {
    pub fn side(&self, dir: Dir) -> SideSeed {
        match dir {
            Dir::Up => self.top,
            Dir::Right => self.right,
            Dir::Down => self.bottom,
            Dir::Left => self.left,
        }
    }
}

/// Per-cell wall seeds, rolled once per level so strokes do not jitter
/// between frames. Purely cosmetic: the maze topology never depends on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Wobble {
    cols: usize,
    seeds: Vec<WallSeed>,
}

impl Wobble {
    pub fn roll(level: u32, cols: usize, rows: usize, rng: &mut impl Rng) -> Self {
        let max_thickness = MIN_THICKNESS + (level as f32 * 2.5).min(MAX_EXTRA_THICKNESS);
        let mut side = || SideSeed {
            mid_offset: rng.gen_range(-MID_OFFSET_RANGE..MID_OFFSET_RANGE),
            thickness: if max_thickness > MIN_THICKNESS {
                rng.gen_range(MIN_THICKNESS..max_thickness)
            } else {
                MIN_THICKNESS
            },
        };
        let seeds = (0..cols * rows)
            .map(|_| WallSeed {
                top: side(),
                right: side(),
                bottom: side(),
                left: side(),
            })
            .collect();
        Self { cols, seeds }
    }

    /// Straight, thin walls everywhere.
    pub fn flat(cols: usize, rows: usize) -> Self {
        let side = SideSeed {
            mid_offset: 0.0,
            thickness: MIN_THICKNESS,
        };
        let seed = WallSeed {
            top: side,
            right: side,
            bottom: side,
            left: side,
        };
        Self {
            cols,
            seeds: vec![seed; cols * rows],
        }
    }

    pub fn seed(&self, pos: Pos) -> Option<&WallSeed> {
        self.seeds.get(pos.y * self.cols + pos.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn first_level_dimensions() {
        assert_eq!(dimensions(1).unwrap(), (5, 5));
        assert_eq!(dimensions(4).unwrap(), (10, 9));
    }

    #[test]
    fn dimensions_grow_monotonically_and_cap() {
        let mut prev = (0, 0);
        for level in 1..=40 {
            let (cols, rows) = dimensions(level).unwrap();
            assert!(cols >= prev.0 && rows >= prev.1, "level {level} shrank");
            assert!(cols <= MAX_DIMENSION && rows <= MAX_DIMENSION);
            prev = (cols, rows);
        }
        assert_eq!(dimensions(MAX_LEVEL).unwrap(), (16, 16));
    }

    #[test]
    fn level_zero_is_rejected() {
        assert!(matches!(dimensions(0), Err(MazeError::InvalidLevel(0))));
    }

    #[test]
    fn wobble_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let wobble = Wobble::roll(20, 4, 3, &mut rng);
        for y in 0..3 {
            for x in 0..4 {
                let seed = wobble.seed(Pos::new(x, y)).unwrap();
                for dir in crate::grid::ALL_DIRS {
                    let side = seed.side(dir);
                    assert!((-5.0..5.0).contains(&side.mid_offset));
                    assert!((2.0..27.0).contains(&side.thickness));
                }
            }
        }
        assert!(wobble.seed(Pos::new(0, 3)).is_none());
    }
}
