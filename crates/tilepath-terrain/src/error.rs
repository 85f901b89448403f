use thiserror::Error;

use crate::kind::TerrainKind;

/// Errors raised while building terrain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("invalid map size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("expected {expected} layer values, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("terrain weight for {kind} must be finite and non-negative, got {weight}")]
    InvalidWeight { kind: TerrainKind, weight: f32 },
    #[error("terrain weights sum to zero")]
    NoWeights,
    #[error("chunk size must be positive, got {width}x{height}")]
    InvalidChunkSize { width: i32, height: i32 },
}
