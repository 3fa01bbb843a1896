use thiserror::Error;

pub type Result<T> = std::result::Result<T, LifeError>;

/// Precondition failures reported by grid and simulation operations.
///
/// None of these are retried; an operation that returns one has left the
/// grid and run state exactly as they were.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifeError {
    #[error("invalid grid dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        reason: String,
    },
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("tick interval must be positive, got {0} ms")]
    InvalidInterval(u64),
    #[error("unexpected character {found:?} at row {row}, column {column}")]
    InvalidCharacter { found: char, row: usize, column: usize },
}
