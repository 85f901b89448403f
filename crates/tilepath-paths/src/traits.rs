use tilepath_core::{Point, Range};

use crate::error::PathError;
use crate::result::SearchResult;

/// Supplies per-cell traversal effort to the planners.
pub trait TerrainSource {
    /// Effort to enter `p`. Negative means impassable, including cells that
    /// are out of range or not loaded.
    fn effort_at(&self, p: Point) -> f32;

    /// The rectangle of cells currently available for planning.
    fn active_extents(&self) -> Range;
}

impl<T: TerrainSource + ?Sized> TerrainSource for &T {
    fn effort_at(&self, p: Point) -> f32 {
        (**self).effort_at(p)
    }

    fn active_extents(&self) -> Range {
        (**self).active_extents()
    }
}

/// Common interface of the path planners.
pub trait Planner {
    /// Short human-readable name, e.g. for logs.
    fn name(&self) -> &'static str;

    /// Snapshot `source` into the planner's graph, replacing any previous one.
    fn set_terrain_source(&mut self, source: &dyn TerrainSource) -> Result<(), PathError>;

    /// Search from `start` to `goal`. The result is also kept until the next
    /// call and exposed through [`path`](Self::path) and
    /// [`path_cost`](Self::path_cost).
    fn compute_path(&mut self, start: Point, goal: Point) -> Result<&SearchResult, PathError>;

    /// Result of the most recent search.
    fn last_result(&self) -> &SearchResult;

    /// Path of the most recent search; empty if it failed or none ran yet.
    fn path(&self) -> &[Point] {
        let r = self.last_result();
        if r.found { r.path.as_slice() } else { &[] }
    }

    /// Cost of the most recent search, [`NO_PATH_COST`](crate::NO_PATH_COST)
    /// if it failed or none ran yet.
    fn path_cost(&self) -> f32 {
        self.last_result().cost
    }
}
