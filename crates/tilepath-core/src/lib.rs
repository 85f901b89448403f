//! **tilepath-core** — geometry primitives for tile-grid pathfinding.
//!
//! [`Point`] identifies a grid cell by (column, row) and [`Range`] describes
//! the half-open rectangle of cells a terrain source currently has loaded.

pub mod geom;

pub use geom::{Point, Range, RangeIter};
