use tilepath_core::{Point, Range};

use crate::error::GridError;
use crate::traits::TerrainSource;

/// A plain `width × height` effort grid anchored at the origin.
///
/// The simplest [`TerrainSource`]: useful for tests, tools, and maps that are
/// fully loaded in memory.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostGrid {
    width: i32,
    height: i32,
    efforts: Vec<f32>,
}

impl CostGrid {
    /// Grid where every cell has the same `effort`.
    pub fn filled(width: i32, height: i32, effort: f32) -> Result<Self, GridError> {
        let len = cell_count(width, height)?;
        Ok(Self {
            width,
            height,
            efforts: vec![effort; len],
        })
    }

    /// Grid from row-major efforts.
    pub fn from_efforts(width: i32, height: i32, efforts: Vec<f32>) -> Result<Self, GridError> {
        let expected = cell_count(width, height)?;
        if efforts.len() != expected {
            return Err(GridError::SizeMismatch {
                expected,
                actual: efforts.len(),
            });
        }
        Ok(Self {
            width,
            height,
            efforts,
        })
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn bounds(&self) -> Range {
        Range::sized(self.width, self.height)
    }

    /// Change the effort of one cell. Returns `false` if `p` is out of range.
    pub fn set_effort(&mut self, p: Point, effort: f32) -> bool {
        match self.bounds().index_of(p) {
            Some(i) => {
                self.efforts[i] = effort;
                true
            }
            None => false,
        }
    }
}

fn cell_count(width: i32, height: i32) -> Result<usize, GridError> {
    match width.checked_mul(height) {
        Some(n) if width >= 0 && height >= 0 => Ok(n as usize),
        _ => Err(GridError::InvalidSize { width, height }),
    }
}

impl TerrainSource for CostGrid {
    fn effort_at(&self, p: Point) -> f32 {
        self.bounds().index_of(p).map_or(-1.0, |i| self.efforts[i])
    }

    fn active_extents(&self) -> Range {
        self.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_efforts_checks_length() {
        let err = CostGrid::from_efforts(2, 2, vec![0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            GridError::SizeMismatch {
                expected: 4,
                actual: 3
            }
        );
        assert!(CostGrid::filled(-1, 2, 0.0).is_err());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let err = CostGrid::filled(70_000, 70_000, 0.0).unwrap_err();
        assert_eq!(
            err,
            GridError::InvalidSize {
                width: 70_000,
                height: 70_000
            }
        );
        assert!(CostGrid::from_efforts(i32::MAX, 2, Vec::new()).is_err());
    }

    #[test]
    fn out_of_range_is_impassable() {
        let mut g = CostGrid::filled(3, 2, 1.5).unwrap();
        assert_eq!(g.effort_at(Point::new(2, 1)), 1.5);
        assert_eq!(g.effort_at(Point::new(3, 0)), -1.0);
        assert_eq!(g.effort_at(Point::new(0, -1)), -1.0);
        assert!(g.set_effort(Point::new(1, 1), -1.0));
        assert!(!g.set_effort(Point::new(5, 5), 0.0));
        assert_eq!(g.effort_at(Point::new(1, 1)), -1.0);
        assert_eq!(g.active_extents(), Range::new(0, 0, 3, 2));
    }
}
