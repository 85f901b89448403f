use thiserror::Error;
use tilepath_core::{Point, Range};

/// Errors returned by planners.
///
/// Not finding a path is not an error: it is reported through
/// [`SearchResult::found`](crate::SearchResult::found).
#[derive(Debug, Error)]
pub enum PathError {
    /// Start or goal lies outside the current snapshot.
    #[error("{point} is outside the active extents {extents}")]
    OutOfBounds { point: Point, extents: Range },
    /// The planner cannot run with its current setup.
    #[error("invalid planner configuration: {0}")]
    InvalidConfiguration(#[from] ConfigIssue),
    /// A worker thread could not be created.
    #[error("failed to spawn worker thread")]
    Spawn(#[source] std::io::Error),
}

/// Why a planner setup was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    /// `compute_path` was called before any terrain source was set.
    #[error("no terrain snapshot; set a terrain source first")]
    StaleSnapshot,
    /// The active extents contain no cells.
    #[error("terrain extents {0} contain no cells")]
    EmptyGrid(Range),
    /// Start or goal lies on an impassable cell.
    #[error("endpoint {0} is impassable")]
    BarrierEndpoint(Point),
    /// One thread per cell was requested for a grid larger than allowed.
    #[error("{cells} cells exceed the limit of {limit} worker threads")]
    TooManyThreads { cells: usize, limit: usize },
    /// The number of workers does not cover the grid.
    #[error("{workers} workers cannot cover {cells} cells")]
    WorkerCountMismatch { workers: usize, cells: usize },
}

/// Errors building a [`CostGrid`](crate::CostGrid).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Negative width or height, or too many cells.
    #[error("invalid grid size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    /// Effort vector length differs from `width * height`.
    #[error("expected {expected} efforts, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}
