use log::debug;
use tilepath_core::{Point, Range};

use crate::traits::TerrainSource;

/// Predecessor marker for cells with no parent in a search tree.
pub(crate) const NO_PARENT: usize = usize::MAX;

#[derive(Debug, Clone)]
struct GraphCell {
    pos: Point,
    effort: f32,
    /// Passable 8-neighbours in N, S, E, W, NE, NW, SE, SW order.
    neighbors: Vec<usize>,
}

/// Snapshot of a terrain source: per-cell effort plus precomputed adjacency.
///
/// Cells are stored row-major relative to `extents.min`, so chunked sources
/// whose loaded window starts at a negative or shifted origin map cleanly to
/// indices `0..len()`. Impassable cells keep their slot (indices stay stable)
/// but appear in no neighbour list and have none of their own.
///
/// The snapshot does not track its source: call
/// [`rebuild`](Self::rebuild) whenever the terrain or its extents change.
/// Rebuilding reuses the existing allocations.
#[derive(Debug, Clone, Default)]
pub struct PathGraph {
    extents: Range,
    cells: Vec<GraphCell>,
    passable: usize,
}

impl PathGraph {
    /// An empty graph with no cells.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `source`.
    pub fn from_source(source: &dyn TerrainSource) -> Self {
        let mut g = Self::new();
        g.rebuild(source);
        g
    }

    /// Re-snapshot `source`, replacing the current contents.
    ///
    /// Empty extents yield an empty graph; every point is then out of bounds.
    pub fn rebuild(&mut self, source: &dyn TerrainSource) {
        let extents = source.active_extents();
        let len = extents.len();
        self.extents = if len == 0 { Range::default() } else { extents };

        self.cells.truncate(len);
        for (i, p) in self.extents.iter().enumerate() {
            let effort = source.effort_at(p);
            match self.cells.get_mut(i) {
                Some(c) => {
                    c.pos = p;
                    c.effort = effort;
                    c.neighbors.clear();
                }
                None => self.cells.push(GraphCell {
                    pos: p,
                    effort,
                    neighbors: Vec::with_capacity(8),
                }),
            }
        }

        // Adjacency needs every effort in place first.
        self.passable = 0;
        for i in 0..self.cells.len() {
            if self.cells[i].effort < 0.0 {
                continue;
            }
            self.passable += 1;
            let pos = self.cells[i].pos;
            let mut neighbors = std::mem::take(&mut self.cells[i].neighbors);
            for np in pos.neighbors_8() {
                let Some(ni) = self.extents.index_of(np) else {
                    continue;
                };
                if self.cells[ni].effort >= 0.0 {
                    neighbors.push(ni);
                }
            }
            self.cells[i].neighbors = neighbors;
        }

        debug!(
            "path graph rebuilt: extents {} ({} cells, {} passable)",
            self.extents,
            self.cells.len(),
            self.passable
        );
    }

    /// The rectangle covered by the snapshot.
    #[inline]
    pub fn extents(&self) -> Range {
        self.extents
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.extents.width().max(0) as usize
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.extents.height().max(0) as usize
    }

    /// Number of cells, passable or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the snapshot has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells with non-negative effort.
    #[inline]
    pub fn passable_count(&self) -> usize {
        self.passable
    }

    /// Linear index of `p`, or `None` if it lies outside the snapshot.
    #[inline]
    pub fn index_of(&self, p: Point) -> Option<usize> {
        self.extents.index_of(p)
    }

    /// Coordinate of cell `idx`.
    #[inline]
    pub fn point_at(&self, idx: usize) -> Point {
        self.cells[idx].pos
    }

    /// Effort to enter cell `idx`.
    #[inline]
    pub fn effort(&self, idx: usize) -> f32 {
        self.cells[idx].effort
    }

    /// Whether cell `idx` can be entered.
    #[inline]
    pub fn is_passable(&self, idx: usize) -> bool {
        self.cells[idx].effort >= 0.0
    }

    /// Passable neighbours of cell `idx`.
    #[inline]
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.cells[idx].neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CostGrid;

    #[test]
    fn corner_and_center_neighbors() {
        let grid = CostGrid::filled(3, 3, 0.0).unwrap();
        let g = PathGraph::from_source(&grid);
        assert_eq!(g.len(), 9);
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 3);
        // (0,0): S, E, SE
        assert_eq!(g.neighbors(0), &[3, 1, 4]);
        // center sees everyone, in N, S, E, W, NE, NW, SE, SW order
        assert_eq!(g.neighbors(4), &[1, 7, 5, 3, 2, 0, 8, 6]);
    }

    #[test]
    fn barriers_are_excluded_from_adjacency() {
        let mut grid = CostGrid::filled(3, 3, 1.0).unwrap();
        grid.set_effort(Point::new(1, 1), -1.0);
        let g = PathGraph::from_source(&grid);
        assert_eq!(g.passable_count(), 8);
        assert!(!g.is_passable(4));
        assert!(g.neighbors(4).is_empty());
        for i in 0..g.len() {
            assert!(!g.neighbors(i).contains(&4));
        }
        assert_eq!(g.effort(4), -1.0);
        assert_eq!(g.point_at(4), Point::new(1, 1));
    }

    #[test]
    fn empty_extents_give_empty_graph() {
        let grid = CostGrid::filled(0, 4, 0.0).unwrap();
        let g = PathGraph::from_source(&grid);
        assert!(g.is_empty());
        assert_eq!(g.index_of(Point::ZERO), None);
    }

    struct Shifted;

    impl TerrainSource for Shifted {
        fn effort_at(&self, p: Point) -> f32 {
            if p.x == 0 { -1.0 } else { 2.0 }
        }

        fn active_extents(&self) -> Range {
            Range::new(-2, -2, 2, 1)
        }
    }

    #[test]
    fn shifted_origin_indexes_from_min() {
        let g = PathGraph::from_source(&Shifted);
        assert_eq!(g.len(), 12);
        assert_eq!(g.index_of(Point::new(-2, -2)), Some(0));
        assert_eq!(g.point_at(5), Point::new(-1, -1));
        assert_eq!(g.passable_count(), 9);
        // (-1,-1) cannot step east onto the x == 0 column.
        let east = g.index_of(Point::new(0, -1)).unwrap();
        assert!(!g.neighbors(5).contains(&east));
    }

    #[test]
    fn rebuild_reuses_cells_and_drops_stale_ones() {
        let mut g = PathGraph::from_source(&CostGrid::filled(4, 4, 0.0).unwrap());
        let cap = g.cells.capacity();
        g.rebuild(&CostGrid::filled(2, 2, 5.0).unwrap());
        assert_eq!(g.len(), 4);
        assert_eq!(g.cells.capacity(), cap);
        assert_eq!(g.effort(3), 5.0);
        assert_eq!(g.neighbors(0), &[2, 1, 3]);
    }
}
