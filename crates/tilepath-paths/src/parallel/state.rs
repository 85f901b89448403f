//! State shared by the coordinator and its worker threads.

use std::sync::Barrier;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::config::Termination;
use crate::distance::Heuristic;
use crate::graph::{NO_PARENT, PathGraph};

/// Search state of one cell, as seen between rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CellStatus {
    /// Not reached yet.
    Closed = 0,
    /// Score improved in the last round it took part in.
    Open = 1,
    /// Reached, and its score did not change in its last round.
    Visited = 2,
}

impl CellStatus {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => CellStatus::Open,
            2 => CellStatus::Visited,
            _ => CellStatus::Closed,
        }
    }
}

/// An `f32` stored as bits in an `AtomicU32`.
///
/// Each cell is written by exactly one thread; the barrier between rounds
/// orders those writes before any neighbour reads them, so relaxed loads and
/// stores are sufficient.
#[derive(Debug)]
pub(crate) struct AtomicScore(AtomicU32);

impl AtomicScore {
    fn infinite() -> Self {
        Self(AtomicU32::new(f32::INFINITY.to_bits()))
    }

    #[inline]
    pub(crate) fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn set(&self, v: f32) {
        self.0.store(v.to_bits(), Ordering::Relaxed);
    }
}

/// Per-cell scores. `g` is double-buffered: round `k` reads `g[k % 2]` and
/// writes `g[(k + 1) % 2]`.
#[derive(Debug)]
pub(crate) struct CellScores {
    pub(crate) g: [AtomicScore; 2],
    pub(crate) f: AtomicScore,
    pub(crate) parent: AtomicUsize,
    status: AtomicU8,
}

impl CellScores {
    fn new() -> Self {
        Self {
            g: [AtomicScore::infinite(), AtomicScore::infinite()],
            f: AtomicScore::infinite(),
            parent: AtomicUsize::new(NO_PARENT),
            status: AtomicU8::new(CellStatus::Closed as u8),
        }
    }

    pub(crate) fn reset(&self) {
        self.g[0].set(f32::INFINITY);
        self.g[1].set(f32::INFINITY);
        self.f.set(f32::INFINITY);
        self.parent.store(NO_PARENT, Ordering::Relaxed);
        self.set_status(CellStatus::Closed);
    }

    #[inline]
    pub(crate) fn status(&self) -> CellStatus {
        CellStatus::from_u8(self.status.load(Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn set_status(&self, s: CellStatus) {
        self.status.store(s as u8, Ordering::Relaxed);
    }
}

/// Completion bookkeeping for the search in flight.
#[derive(Debug, Default)]
pub(crate) struct Completion {
    pub(crate) finished: usize,
    pub(crate) rounds: usize,
}

/// Everything the worker threads of one snapshot share.
pub(crate) struct Shared {
    pub(crate) graph: PathGraph,
    pub(crate) heuristic: Heuristic,
    pub(crate) termination: Termination,
    pub(crate) max_rounds: usize,
    pub(crate) threads: usize,
    pub(crate) cells: Vec<CellScores>,
    pub(crate) barrier: Barrier,
    pub(crate) start: AtomicUsize,
    pub(crate) goal: AtomicUsize,
    /// Set by the thread owning the goal cell once the goal has a score.
    pub(crate) goal_reached: AtomicBool,
    /// Whether any cell improved, indexed by round parity.
    pub(crate) changed: [AtomicBool; 2],
    /// Cancellation as observed at a round boundary; written by thread 0.
    pub(crate) halt: AtomicBool,
    /// Raw cancellation request from outside.
    pub(crate) cancel: Arc<AtomicBool>,
    pub(crate) done: Mutex<Completion>,
    pub(crate) done_cv: Condvar,
}

impl Shared {
    pub(crate) fn new(
        graph: PathGraph,
        heuristic: Heuristic,
        termination: Termination,
        max_rounds: usize,
        threads: usize,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        let cells = (0..graph.len()).map(|_| CellScores::new()).collect();
        Self {
            graph,
            heuristic,
            termination,
            max_rounds,
            threads,
            cells,
            barrier: Barrier::new(threads),
            start: AtomicUsize::new(0),
            goal: AtomicUsize::new(0),
            goal_reached: AtomicBool::new(false),
            changed: [AtomicBool::new(false), AtomicBool::new(false)],
            halt: AtomicBool::new(false),
            cancel,
            done: Mutex::new(Completion::default()),
            done_cv: Condvar::new(),
        }
    }

    /// Clear the per-search flags and record the endpoints. Workers must be
    /// idle.
    pub(crate) fn prepare(&self, start: usize, goal: usize) {
        self.start.store(start, Ordering::Relaxed);
        self.goal.store(goal, Ordering::Relaxed);
        self.goal_reached.store(false, Ordering::Relaxed);
        self.changed[0].store(false, Ordering::Relaxed);
        self.changed[1].store(false, Ordering::Relaxed);
        self.halt.store(false, Ordering::Relaxed);
        *self.done.lock() = Completion::default();
    }

    /// Give the start cell its initial score. Call after the workers reset
    /// their cells.
    pub(crate) fn seed_start(&self) {
        let start = self.start.load(Ordering::Relaxed);
        let goal = self.goal.load(Ordering::Relaxed);
        let cell = &self.cells[start];
        cell.g[0].set(0.0);
        cell.g[1].set(0.0);
        cell.f.set(
            self.heuristic
                .distance(self.graph.point_at(start), self.graph.point_at(goal)),
        );
        cell.set_status(CellStatus::Open);
    }

    /// Called by each worker after its last round.
    pub(crate) fn finish(&self, rounds: usize) {
        let mut done = self.done.lock();
        done.finished += 1;
        done.rounds = done.rounds.max(rounds);
        if done.finished == self.threads {
            self.done_cv.notify_all();
        }
    }

    /// Block until every worker has called [`finish`](Self::finish); returns
    /// the number of rounds run.
    pub(crate) fn wait_finished(&self) -> usize {
        let mut done = self.done.lock();
        while done.finished < self.threads {
            self.done_cv.wait(&mut done);
        }
        done.rounds
    }
}
