//! Barrier-synchronized parallel planner.
//!
//! Instead of a priority queue, every cell is relaxed in lock-step rounds
//! (synchronous Bellman-Ford): in round `k` a cell takes the best of its own
//! score and each neighbour's round-`k - 1` score plus the step cost. Cells
//! are owned by worker threads; a [`Barrier`](std::sync::Barrier) separates
//! rounds, so no thread ever sees a neighbour's score from the round in
//! progress.
//!
//! With [`WorkerLayout::PerCell`] there is one OS thread per cell, which
//! does not scale past small grids and is capped by
//! [`ParallelConfig::max_threads`]. [`WorkerLayout::Pool`] keeps the same
//! round semantics with a fixed number of threads.

mod state;
mod worker;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use tilepath_core::Point;

pub use state::CellStatus;

use self::state::Shared;
use self::worker::Worker;
use crate::config::{ParallelConfig, WorkerLayout};
use crate::distance::Heuristic;
use crate::error::{ConfigIssue, PathError};
use crate::graph::{NO_PARENT, PathGraph};
use crate::result::SearchResult;
use crate::traits::{Planner, TerrainSource};

/// Requests that the search in progress stops at the next round boundary.
///
/// Obtained from [`ParallelAStar::cancel_token`]; clones share one flag.
/// The flag is cleared when a new search starts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Ask the running search to stop after its current round.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether a cancel request is pending.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Parallel planner running one lock-step relaxation per search.
///
/// Worker threads are spawned by [`set_terrain_source`](Planner::set_terrain_source),
/// sleep between searches, and are joined when the terrain changes or the
/// planner is dropped.
pub struct ParallelAStar {
    heuristic: Heuristic,
    config: ParallelConfig,
    shared: Option<Arc<Shared>>,
    workers: Vec<Worker>,
    /// Graph recovered from the last teardown, rebuilt in place next time.
    spare: Option<PathGraph>,
    cancel: CancelToken,
    result: SearchResult,
    rounds: usize,
}

impl Default for ParallelAStar {
    fn default() -> Self {
        Self::new(Heuristic::default(), ParallelConfig::default())
    }
}

impl ParallelAStar {
    /// Planner with no terrain and no threads yet.
    pub fn new(heuristic: Heuristic, config: ParallelConfig) -> Self {
        Self {
            heuristic,
            config,
            shared: None,
            workers: Vec::new(),
            spare: None,
            cancel: CancelToken::default(),
            result: SearchResult::not_found(),
            rounds: 0,
        }
    }

    /// Settings given at construction.
    #[inline]
    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// Number of live worker threads.
    #[inline]
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Rounds run by the last search (0 when start equals goal).
    #[inline]
    pub fn last_rounds(&self) -> usize {
        self.rounds
    }

    /// Handle that cancels the search in progress from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The current snapshot, if a terrain source has been set.
    pub fn graph(&self) -> Option<&PathGraph> {
        self.shared.as_deref().map(|s| &s.graph)
    }

    /// Status of `p` after the last search.
    pub fn status_at(&self, p: Point) -> Option<CellStatus> {
        let shared = self.shared.as_deref()?;
        let i = shared.graph.index_of(p)?;
        Some(shared.cells[i].status())
    }

    /// `(g, f)` of `p` after the last search; infinite when unreached.
    pub fn scores_at(&self, p: Point) -> Option<(f32, f32)> {
        let shared = self.shared.as_deref()?;
        let i = shared.graph.index_of(p)?;
        let cell = &shared.cells[i];
        Some((cell.g[self.rounds % 2].get(), cell.f.get()))
    }

    /// Stop and join all workers, keeping the graph for reuse.
    fn shutdown(&mut self) {
        for w in &mut self.workers {
            w.stop();
        }
        self.workers.clear();
        if let Some(shared) = self.shared.take() {
            self.spare = Arc::try_unwrap(shared).ok().map(|s| s.graph);
        }
    }

    /// Tear down a half-started pool, recovering its graph into `spare`.
    fn discard(&mut self, shared: Arc<Shared>) {
        self.shared = Some(shared);
        self.shutdown();
    }

    fn thread_count_for(&self, cells: usize) -> Result<usize, ConfigIssue> {
        match self.config.layout {
            WorkerLayout::PerCell if cells > self.config.max_threads => {
                Err(ConfigIssue::TooManyThreads {
                    cells,
                    limit: self.config.max_threads,
                })
            }
            WorkerLayout::PerCell => Ok(cells),
            WorkerLayout::Pool(0) => Err(ConfigIssue::WorkerCountMismatch { workers: 0, cells }),
            WorkerLayout::Pool(n) => Ok(n.min(cells)),
        }
    }

    fn spawn_workers(&mut self, shared: &Arc<Shared>) -> Result<(), PathError> {
        for (id, cells) in partition(shared.graph.len(), shared.threads)
            .into_iter()
            .enumerate()
        {
            self.workers.push(Worker::spawn(id, cells, Arc::clone(shared))?);
        }
        debug!("spawned {} tile workers", self.workers.len());
        Ok(())
    }

    fn search(&mut self, start: Point, goal: Point) -> Result<SearchResult, PathError> {
        let shared = Arc::clone(self.shared.as_ref().ok_or(ConfigIssue::StaleSnapshot)?);
        let graph = &shared.graph;
        let start_idx = graph.index_of(start).ok_or(PathError::OutOfBounds {
            point: start,
            extents: graph.extents(),
        })?;
        let goal_idx = graph.index_of(goal).ok_or(PathError::OutOfBounds {
            point: goal,
            extents: graph.extents(),
        })?;
        for (idx, p) in [(start_idx, start), (goal_idx, goal)] {
            if !graph.is_passable(idx) {
                return Err(ConfigIssue::BarrierEndpoint(p).into());
            }
        }

        self.cancel.0.store(false, Ordering::Relaxed);
        shared.prepare(start_idx, goal_idx);
        for w in &self.workers {
            w.reset(&shared);
        }
        shared.seed_start();
        if start_idx == goal_idx {
            return Ok(SearchResult::found(0.0, vec![start]));
        }

        for w in &self.workers {
            w.start();
        }
        self.rounds = shared.wait_finished();

        if shared.halt.load(Ordering::Relaxed) {
            warn!("parallel search {start} -> {goal} cancelled after {} rounds", self.rounds);
            return Ok(SearchResult::not_found());
        }
        if self.rounds >= shared.max_rounds {
            warn!("parallel search {start} -> {goal} hit the round limit {}", shared.max_rounds);
        }

        let final_g = shared.cells[goal_idx].g[self.rounds % 2].get();
        if final_g.is_infinite() {
            return Ok(SearchResult::not_found());
        }

        let mut path = Vec::new();
        let mut i = goal_idx;
        while i != NO_PARENT && path.len() < graph.len() {
            path.push(graph.point_at(i));
            i = shared.cells[i].parent.load(Ordering::Relaxed);
        }
        path.reverse();
        if path.first() != Some(&start) {
            warn!("parallel search {start} -> {goal}: broken predecessor chain");
            return Ok(SearchResult::not_found());
        }
        let cost = path
            .windows(2)
            .map(|w| {
                let effort = graph.index_of(w[1]).map_or(0.0, |i| graph.effort(i));
                self.heuristic.step_cost(w[0], w[1], effort)
            })
            .sum();
        Ok(SearchResult::found(cost, path))
    }
}

impl Planner for ParallelAStar {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn set_terrain_source(&mut self, source: &dyn TerrainSource) -> Result<(), PathError> {
        self.shutdown();
        self.result = SearchResult::not_found();
        self.rounds = 0;

        let mut graph = self.spare.take().unwrap_or_default();
        graph.rebuild(source);
        if graph.is_empty() {
            self.spare = Some(graph);
            return Err(ConfigIssue::EmptyGrid(source.active_extents()).into());
        }
        let threads = match self.thread_count_for(graph.len()) {
            Ok(t) => t,
            Err(issue) => {
                self.spare = Some(graph);
                return Err(issue.into());
            }
        };
        let max_rounds = self.config.max_rounds.unwrap_or(graph.len() + 1);
        let shared = Arc::new(Shared::new(
            graph,
            self.heuristic,
            self.config.termination,
            max_rounds,
            threads,
            Arc::clone(&self.cancel.0),
        ));
        if let Err(e) = self.spawn_workers(&shared) {
            self.discard(shared);
            return Err(e);
        }
        self.shared = Some(shared);
        Ok(())
    }

    fn compute_path(&mut self, start: Point, goal: Point) -> Result<&SearchResult, PathError> {
        self.result = SearchResult::not_found();
        self.rounds = 0;
        self.result = self.search(start, goal)?;
        debug!(
            "parallel {} -> {}: found={} cost={:.3} rounds={}",
            start, goal, self.result.found, self.result.cost, self.rounds
        );
        Ok(&self.result)
    }

    fn last_result(&self) -> &SearchResult {
        &self.result
    }
}

impl Drop for ParallelAStar {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Split `0..len` into `parts` contiguous, non-empty runs.
fn partition(len: usize, parts: usize) -> Vec<std::ops::Range<usize>> {
    let base = len / parts;
    let extra = len % parts;
    let mut out = Vec::with_capacity(parts);
    let mut begin = 0;
    for i in 0..parts {
        let end = begin + base + usize::from(i < extra);
        out.push(begin..end);
        begin = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::config::Termination;
    use crate::{AStar, CostGrid, NO_PATH_COST};

    const SQRT2: f32 = std::f32::consts::SQRT_2;

    fn per_cell() -> ParallelConfig {
        ParallelConfig {
            layout: WorkerLayout::PerCell,
            ..ParallelConfig::default()
        }
    }

    fn planner(grid: &CostGrid, config: ParallelConfig) -> ParallelAStar {
        let mut p = ParallelAStar::new(Heuristic::Diagonal, config);
        p.set_terrain_source(grid).unwrap();
        p
    }

    #[test]
    fn partition_covers_everything() {
        assert_eq!(partition(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(partition(4, 4), vec![0..1, 1..2, 2..3, 3..4]);
        assert_eq!(partition(5, 1), vec![0..5]);
    }

    #[test]
    fn per_cell_goal_reached_in_chebyshev_rounds() {
        let grid = CostGrid::filled(3, 3, 0.0).unwrap();
        let mut p = planner(&grid, per_cell());
        assert_eq!(p.thread_count(), 9);
        let r = p.compute_path(Point::new(0, 0), Point::new(2, 2)).unwrap().clone();
        assert!(r.found);
        assert_eq!(p.last_rounds(), 2);
        assert!((r.cost - 2.0 * SQRT2).abs() < 1e-4);
        assert_eq!(
            r.path,
            vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 2)]
        );
        assert_eq!(p.status_at(Point::new(2, 2)), Some(CellStatus::Open));
        assert_eq!(p.status_at(Point::new(0, 0)), Some(CellStatus::Visited));
        let (g, f) = p.scores_at(Point::new(2, 2)).unwrap();
        assert!((g - 2.0 * SQRT2).abs() < 1e-4);
        assert!((f - g).abs() < 1e-4);
    }

    #[test]
    fn detour_matches_astar_cost() {
        let mut grid = CostGrid::filled(3, 3, 0.0).unwrap();
        grid.set_effort(Point::new(1, 1), -1.0);
        let mut p = planner(&grid, per_cell());
        let r = p.compute_path(Point::new(0, 0), Point::new(2, 2)).unwrap();
        assert!(r.found);
        assert!((r.cost - (2.0 + SQRT2)).abs() < 1e-4);
        assert_eq!(r.path.len(), 4);
        assert!(!r.path.contains(&Point::new(1, 1)));
    }

    #[test]
    fn unreachable_goal_terminates() {
        let mut grid = CostGrid::filled(5, 1, 0.0).unwrap();
        grid.set_effort(Point::new(2, 0), -1.0);
        let mut p = planner(&grid, per_cell());
        let r = p.compute_path(Point::new(0, 0), Point::new(4, 0)).unwrap();
        assert!(!r.found);
        assert_eq!(r.cost, NO_PATH_COST);
        // One round reaches (1, 0), the next changes nothing.
        assert_eq!(p.last_rounds(), 2);
        assert_eq!(p.status_at(Point::new(4, 0)), Some(CellStatus::Closed));
    }

    #[test]
    fn converged_mode_finds_cheapest_path() {
        // The straight row is expensive; the cheap route bends through row 1.
        #[rustfmt::skip]
        let efforts = vec![
            0.0, 9.0, 9.0, 9.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        let grid = CostGrid::from_efforts(5, 2, efforts).unwrap();
        let config = ParallelConfig {
            termination: Termination::Converged,
            layout: WorkerLayout::Pool(3),
            ..ParallelConfig::default()
        };
        let mut p = planner(&grid, config);
        let r = p.compute_path(Point::new(0, 0), Point::new(4, 0)).unwrap().clone();

        let mut a = AStar::default();
        a.set_terrain_source(&grid).unwrap();
        let expected = a.compute_path(Point::new(0, 0), Point::new(4, 0)).unwrap();
        assert!(r.found);
        assert!((r.cost - expected.cost).abs() < 1e-4);
        assert!((r.cost - (2.0 * SQRT2 + 2.0)).abs() < 1e-4);
    }

    #[test]
    fn goal_discovered_mode_may_overpay() {
        #[rustfmt::skip]
        let efforts = vec![
            0.0, 9.0, 9.0, 9.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        let grid = CostGrid::from_efforts(5, 2, efforts).unwrap();
        let mut p = planner(&grid, ParallelConfig::default());
        let r = p.compute_path(Point::new(0, 0), Point::new(4, 0)).unwrap().clone();
        assert!(r.found);
        assert_eq!(p.last_rounds(), 4);
        assert!(r.cost >= 2.0 * SQRT2 + 2.0);
    }

    #[test]
    fn start_equals_goal_runs_no_rounds() {
        let grid = CostGrid::filled(2, 2, 1.0).unwrap();
        let mut p = planner(&grid, per_cell());
        let r = p.compute_path(Point::new(1, 0), Point::new(1, 0)).unwrap();
        assert!(r.found);
        assert_eq!(r.cost, 0.0);
        assert_eq!(r.path, vec![Point::new(1, 0)]);
        assert_eq!(p.last_rounds(), 0);
    }

    #[test]
    fn repeated_searches_reuse_threads() {
        let grid = CostGrid::filled(4, 3, 1.0).unwrap();
        let mut p = planner(&grid, ParallelConfig::default());
        assert_eq!(p.thread_count(), 4);
        let first = p.compute_path(Point::new(0, 0), Point::new(3, 2)).unwrap().clone();
        let other = p.compute_path(Point::new(3, 0), Point::new(0, 2)).unwrap().clone();
        let again = p.compute_path(Point::new(0, 0), Point::new(3, 2)).unwrap().clone();
        assert!(first.found && other.found);
        assert_eq!(first, again);
        assert_eq!(p.thread_count(), 4);
    }

    #[test]
    fn rejects_bad_setups_before_spawning() {
        let empty = CostGrid::filled(0, 0, 0.0).unwrap();
        let mut p = ParallelAStar::new(Heuristic::Diagonal, per_cell());
        let err = p.set_terrain_source(&empty).unwrap_err();
        assert!(matches!(
            err,
            PathError::InvalidConfiguration(ConfigIssue::EmptyGrid(_))
        ));
        assert_eq!(p.thread_count(), 0);

        let big = CostGrid::filled(10, 10, 0.0).unwrap();
        let mut p = ParallelAStar::new(
            Heuristic::Diagonal,
            ParallelConfig {
                max_threads: 50,
                ..per_cell()
            },
        );
        let err = p.set_terrain_source(&big).unwrap_err();
        assert!(matches!(
            err,
            PathError::InvalidConfiguration(ConfigIssue::TooManyThreads {
                cells: 100,
                limit: 50
            })
        ));
        assert_eq!(p.thread_count(), 0);

        let mut p = ParallelAStar::new(
            Heuristic::Diagonal,
            ParallelConfig {
                layout: WorkerLayout::Pool(0),
                ..ParallelConfig::default()
            },
        );
        assert!(p.set_terrain_source(&big).is_err());
    }

    #[test]
    fn barrier_endpoints_are_invalid() {
        let mut grid = CostGrid::filled(3, 3, 0.0).unwrap();
        grid.set_effort(Point::new(2, 2), -1.0);
        let mut p = planner(&grid, per_cell());
        let err = p.compute_path(Point::new(0, 0), Point::new(2, 2)).unwrap_err();
        assert!(matches!(
            err,
            PathError::InvalidConfiguration(ConfigIssue::BarrierEndpoint(pt)) if pt == Point::new(2, 2)
        ));
        assert!(p.path().is_empty());
    }

    #[test]
    fn stale_and_out_of_bounds() {
        let mut p = ParallelAStar::default();
        assert!(matches!(
            p.compute_path(Point::ZERO, Point::ZERO).unwrap_err(),
            PathError::InvalidConfiguration(ConfigIssue::StaleSnapshot)
        ));
        p.set_terrain_source(&CostGrid::filled(2, 2, 0.0).unwrap())
            .unwrap();
        assert!(matches!(
            p.compute_path(Point::ZERO, Point::new(2, 0)).unwrap_err(),
            PathError::OutOfBounds { .. }
        ));
    }

    #[test]
    fn round_limit_stops_search() {
        let grid = CostGrid::filled(8, 1, 0.0).unwrap();
        let config = ParallelConfig {
            max_rounds: Some(3),
            ..ParallelConfig::default()
        };
        let mut p = planner(&grid, config);
        let r = p.compute_path(Point::new(0, 0), Point::new(7, 0)).unwrap();
        assert!(!r.found);
        assert_eq!(p.last_rounds(), 3);
        let r = p.compute_path(Point::new(0, 0), Point::new(3, 0)).unwrap();
        assert!(r.found);
    }

    #[test]
    fn terrain_change_respawns_workers() {
        let mut p = planner(&CostGrid::filled(3, 3, 0.0).unwrap(), per_cell());
        assert_eq!(p.thread_count(), 9);
        p.set_terrain_source(&CostGrid::filled(2, 2, 0.0).unwrap())
            .unwrap();
        assert_eq!(p.thread_count(), 4);
        assert_eq!(p.graph().map(|g| g.len()), Some(4));
        assert!(p.compute_path(Point::new(0, 0), Point::new(1, 1)).unwrap().found);
    }

    #[test]
    fn cancelled_token_is_cleared_by_next_search() {
        let grid = CostGrid::filled(3, 3, 0.0).unwrap();
        let mut p = planner(&grid, ParallelConfig::default());
        let token = p.cancel_token();
        token.cancel();
        assert!(token.is_cancelled());
        let r = p.compute_path(Point::new(0, 0), Point::new(2, 2)).unwrap();
        assert!(r.found);
        assert!(!token.is_cancelled());
    }

    /// Zero-effort maze whose only route snakes through every other row.
    fn serpentine(width: i32, height: i32) -> CostGrid {
        let mut grid = CostGrid::filled(width, height, 0.0).unwrap();
        for y in (1..height).step_by(2) {
            let gap = if (y / 2) % 2 == 0 { width - 1 } else { 0 };
            for x in (0..width).filter(|&x| x != gap) {
                grid.set_effort(Point::new(x, y), -1.0);
            }
        }
        grid
    }

    #[test]
    fn cancel_stops_a_running_search() {
        let grid = serpentine(64, 63);
        let config = ParallelConfig {
            termination: Termination::Converged,
            layout: WorkerLayout::Pool(2),
            max_rounds: Some(1_000_000),
            ..ParallelConfig::default()
        };
        let mut p = planner(&grid, config);
        let (start, goal) = (Point::new(0, 0), Point::new(0, 62));
        assert!(p.compute_path(start, goal).unwrap().found);
        let full = p.last_rounds();
        assert!(full > 1000);

        let token = p.cancel_token();
        let done = Arc::new(AtomicBool::new(false));
        let canceller = {
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    token.cancel();
                    thread::sleep(Duration::from_micros(200));
                }
            })
        };
        let r = p.compute_path(start, goal).unwrap().clone();
        done.store(true, Ordering::Relaxed);
        canceller.join().unwrap();

        assert!(!r.found);
        assert_eq!(r.cost, NO_PATH_COST);
        assert!(p.last_rounds() < full);
        assert!(p.path().is_empty());

        let r = p.compute_path(start, goal).unwrap();
        assert!(r.found);
        assert_eq!(p.last_rounds(), full);
    }

    #[test]
    fn failed_spawn_keeps_graph_for_reuse() {
        let grid = CostGrid::filled(3, 2, 0.0).unwrap();
        let shared = Shared::new(
            PathGraph::from_source(&grid),
            Heuristic::Diagonal,
            Termination::Converged,
            10,
            1,
            Arc::new(AtomicBool::new(false)),
        );
        let mut p = ParallelAStar::default();
        p.discard(Arc::new(shared));
        assert_eq!(p.thread_count(), 0);
        assert!(p.graph().is_none());
        assert_eq!(p.spare.as_ref().map(|g| g.len()), Some(6));

        p.set_terrain_source(&grid).unwrap();
        assert!(p.spare.is_none());
        assert!(p.compute_path(Point::new(0, 0), Point::new(2, 1)).unwrap().found);
    }
}
