//! Worker threads and the lock-step round protocol.
//!
//! Each round has two phases separated by the shared barrier:
//!
//! 1. **Relax**: every thread recomputes the scores of its own cells from
//!    the previous round's buffer and writes the other buffer.
//! 2. **Check**: the owner of the goal cell publishes `goal_reached`;
//!    thread 0 publishes cancellation and clears the change flag for the
//!    next round.
//!
//! After the second barrier all threads read the same flags and therefore
//! leave the round loop together.

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};

use log::{trace, warn};
use parking_lot::{Condvar, Mutex};

use super::state::{CellStatus, Shared};
use crate::config::Termination;
use crate::error::PathError;

/// Threads spend their life in short loops over a few cells.
const WORKER_STACK_SIZE: usize = 64 * 1024;

#[derive(Debug)]
struct Control {
    /// Incremented by the coordinator for every search.
    job: u64,
    alive: bool,
}

/// Idle/wake handshake between the coordinator and one worker.
#[derive(Debug)]
struct WorkerControl {
    state: Mutex<Control>,
    wake: Condvar,
}

/// Coordinator-side handle to a worker thread and the cells it owns.
pub(crate) struct Worker {
    id: usize,
    cells: Range<usize>,
    control: Arc<WorkerControl>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a worker that owns `cells` of `shared`'s grid.
    pub(crate) fn spawn(
        id: usize,
        cells: Range<usize>,
        shared: Arc<Shared>,
    ) -> Result<Self, PathError> {
        let control = Arc::new(WorkerControl {
            state: Mutex::new(Control {
                job: 0,
                alive: true,
            }),
            wake: Condvar::new(),
        });
        let thread = {
            let control = Arc::clone(&control);
            let cells = cells.clone();
            thread::Builder::new()
                .name(format!("tile-worker-{id}"))
                .stack_size(WORKER_STACK_SIZE)
                .spawn(move || thread_loop(id, cells, &shared, &control))
                .map_err(PathError::Spawn)?
        };
        Ok(Self {
            id,
            cells,
            control,
            thread: Some(thread),
        })
    }

    /// Clear the scores of this worker's cells. The worker must be idle.
    pub(crate) fn reset(&self, shared: &Shared) {
        let _guard = self.control.state.lock();
        for cell in &shared.cells[self.cells.clone()] {
            cell.reset();
        }
    }

    /// Wake the worker for the next search.
    pub(crate) fn start(&self) {
        let mut c = self.control.state.lock();
        c.job += 1;
        self.control.wake.notify_one();
    }

    /// Ask the worker to exit and wait for it.
    pub(crate) fn stop(&mut self) {
        {
            let mut c = self.control.state.lock();
            c.alive = false;
            self.control.wake.notify_one();
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("tile worker {} panicked", self.id);
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn thread_loop(id: usize, cells: Range<usize>, shared: &Shared, control: &WorkerControl) {
    let mut seen = 0u64;
    loop {
        {
            let mut c = control.state.lock();
            while c.alive && c.job == seen {
                control.wake.wait(&mut c);
            }
            if !c.alive {
                return;
            }
            seen = c.job;
        }
        let rounds = run_rounds(id, cells.clone(), shared);
        shared.finish(rounds);
    }
}

/// Run rounds until the shared stop condition holds; returns the number of
/// rounds completed.
fn run_rounds(id: usize, cells: Range<usize>, shared: &Shared) -> usize {
    let graph = &shared.graph;
    let h = shared.heuristic;
    let goal = shared.goal.load(Ordering::Relaxed);
    let goal_point = graph.point_at(goal);
    let owns_goal = cells.contains(&goal);

    let mut round = 0usize;
    loop {
        let read = round % 2;
        let write = (round + 1) % 2;

        // Relax.
        let mut changed = false;
        for c in cells.clone() {
            let cell = &shared.cells[c];
            let prev = cell.g[read].get();
            let mut best = prev;
            let mut parent = None;
            if graph.is_passable(c) {
                let cp = graph.point_at(c);
                let effort = graph.effort(c);
                for &n in graph.neighbors(c) {
                    let gn = shared.cells[n].g[read].get();
                    if gn.is_infinite() {
                        continue;
                    }
                    let candidate = gn + h.step_cost(graph.point_at(n), cp, effort);
                    if candidate < best {
                        best = candidate;
                        parent = Some(n);
                    }
                }
            }
            cell.g[write].set(best);
            match parent {
                Some(p) => {
                    cell.parent.store(p, Ordering::Relaxed);
                    cell.f.set(best + h.distance(graph.point_at(c), goal_point));
                    cell.set_status(CellStatus::Open);
                    changed = true;
                }
                None if best.is_finite() => cell.set_status(CellStatus::Visited),
                None => {}
            }
        }
        if changed {
            shared.changed[read].store(true, Ordering::Relaxed);
        }

        shared.barrier.wait();

        // Check.
        if owns_goal && shared.cells[goal].g[write].get().is_finite() {
            shared.goal_reached.store(true, Ordering::Relaxed);
        }
        if id == 0 {
            shared.changed[write].store(false, Ordering::Relaxed);
            if shared.cancel.load(Ordering::Relaxed) {
                shared.halt.store(true, Ordering::Relaxed);
            }
        }

        shared.barrier.wait();

        round += 1;
        let any_change = shared.changed[read].load(Ordering::Relaxed);
        let goal_reached = shared.goal_reached.load(Ordering::Relaxed);
        if id == 0 {
            trace!("round {round}: changed={any_change} goal_reached={goal_reached}");
        }
        let done = match shared.termination {
            Termination::GoalDiscovered => goal_reached,
            Termination::Converged => false,
        };
        if done
            || !any_change
            || shared.halt.load(Ordering::Relaxed)
            || round >= shared.max_rounds
        {
            return round;
        }
    }
}
