use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use log::debug;
use tilepath_core::Point;

use crate::distance::Heuristic;
use crate::error::{ConfigIssue, PathError};
use crate::graph::{NO_PARENT, PathGraph};
use crate::result::SearchResult;
use crate::traits::{Planner, TerrainSource};

/// Per-cell search state, reset at the top of every search.
#[derive(Clone)]
struct Scratch {
    g: f32,
    f: f32,
    order: u64,
    parent: usize,
    /// Whether the cell currently has an entry in the open heap.
    pending: bool,
}

impl Default for Scratch {
    fn default() -> Self {
        Self {
            g: f32::INFINITY,
            f: f32::INFINITY,
            order: 0,
            parent: NO_PARENT,
            pending: false,
        }
    }
}

/// Open-set entry, ordered by `(f, order)`.
///
/// `f` is captured when the cell is pushed and not updated if the cell's
/// score improves while it is still pending.
#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f32,
    order: u64,
    idx: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Wrapped in Reverse for the BinaryHeap: smaller f first, then the
        // entry inserted earlier.
        self.f
            .total_cmp(&other.f)
            .then(self.order.cmp(&other.order))
    }
}

/// Sequential A* planner.
///
/// Owns its [`PathGraph`] snapshot and all search buffers; repeated
/// searches on the same snapshot reuse them. Every search starts from
/// scratch, so results depend only on the snapshot, start and goal.
pub struct AStar {
    heuristic: Heuristic,
    graph: Option<PathGraph>,
    scratch: Vec<Scratch>,
    open: BinaryHeap<Reverse<OpenEntry>>,
    result: SearchResult,
    expanded: usize,
}

impl Default for AStar {
    fn default() -> Self {
        Self::new(Heuristic::default())
    }
}

impl AStar {
    /// Create a planner using `heuristic` for both estimates and step costs.
    pub fn new(heuristic: Heuristic) -> Self {
        Self {
            heuristic,
            graph: None,
            scratch: Vec::new(),
            open: BinaryHeap::new(),
            result: SearchResult::not_found(),
            expanded: 0,
        }
    }

    /// Metric used for both the estimate and the step cost.
    #[inline]
    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// The current snapshot, if a terrain source has been set.
    #[inline]
    pub fn graph(&self) -> Option<&PathGraph> {
        self.graph.as_ref()
    }

    /// Number of cells popped from the open set by the last search.
    #[inline]
    pub fn last_expanded(&self) -> usize {
        self.expanded
    }

    fn search(&mut self, start: Point, goal: Point) -> Result<SearchResult, PathError> {
        let graph = self.graph.as_ref().ok_or(ConfigIssue::StaleSnapshot)?;
        let start_idx = graph.index_of(start).ok_or(PathError::OutOfBounds {
            point: start,
            extents: graph.extents(),
        })?;
        let goal_idx = graph.index_of(goal).ok_or(PathError::OutOfBounds {
            point: goal,
            extents: graph.extents(),
        })?;

        let h = self.heuristic;
        let scratch = &mut self.scratch;
        scratch.clear();
        scratch.resize(graph.len(), Scratch::default());
        let open = &mut self.open;
        open.clear();

        scratch[start_idx].g = 0.0;
        scratch[start_idx].f = h.distance(start, goal);
        scratch[start_idx].pending = true;
        open.push(Reverse(OpenEntry {
            f: scratch[start_idx].f,
            order: 0,
            idx: start_idx,
        }));
        let mut counter = 0u64;

        while let Some(Reverse(entry)) = open.pop() {
            let ci = entry.idx;
            scratch[ci].pending = false;
            self.expanded += 1;

            if ci == goal_idx {
                let mut path = Vec::new();
                let mut i = goal_idx;
                while i != NO_PARENT && path.len() < graph.len() {
                    path.push(graph.point_at(i));
                    i = scratch[i].parent;
                }
                path.reverse();
                return Ok(SearchResult::found(scratch[goal_idx].g, path));
            }

            // Only reachable when the start itself is a barrier.
            if !graph.is_passable(ci) {
                continue;
            }

            let cp = graph.point_at(ci);
            let cg = scratch[ci].g;
            for &ni in graph.neighbors(ci) {
                let np = graph.point_at(ni);
                let tentative = cg + h.step_cost(cp, np, graph.effort(ni));
                let n = &mut scratch[ni];
                if tentative >= n.g {
                    continue;
                }
                n.parent = ci;
                n.g = tentative;
                n.f = tentative + h.distance(np, goal);
                if !n.pending {
                    counter += 1;
                    n.order = counter;
                    n.pending = true;
                    open.push(Reverse(OpenEntry {
                        f: n.f,
                        order: counter,
                        idx: ni,
                    }));
                }
            }
        }

        Ok(SearchResult::not_found())
    }
}

impl Planner for AStar {
    fn name(&self) -> &'static str {
        "astar"
    }

    fn set_terrain_source(&mut self, source: &dyn TerrainSource) -> Result<(), PathError> {
        self.graph.get_or_insert_with(PathGraph::new).rebuild(source);
        self.result = SearchResult::not_found();
        Ok(())
    }

    fn compute_path(&mut self, start: Point, goal: Point) -> Result<&SearchResult, PathError> {
        self.result = SearchResult::not_found();
        self.expanded = 0;
        self.result = self.search(start, goal)?;
        debug!(
            "astar {} -> {}: found={} cost={:.3} expanded={}",
            start, goal, self.result.found, self.result.cost, self.expanded
        );
        Ok(&self.result)
    }

    fn last_result(&self) -> &SearchResult {
        &self.result
    }
}
