use thiserror::Error;

#[derive(Error, Debug)]
pub enum MazeError {
    #[error("maze dimensions must be at least 1x1, got {cols}x{rows}")]
    InvalidDimensions { cols: usize, rows: usize },

    #[error("difficulty level must be >= 1, got {0}")]
    InvalidLevel(u32),

    #[error("step ({dr}, {dc}) must move exactly one cell along one axis")]
    InvalidStep { dr: i32, dc: i32 },

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MazeError>;
