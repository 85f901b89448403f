//! Planner selection and tuning.

use std::fmt;
use std::str::FromStr;

use crate::astar::AStar;
use crate::distance::Heuristic;
use crate::parallel::ParallelAStar;
use crate::traits::Planner;

/// Which planner [`build_planner`] creates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PlannerMethod {
    /// Sequential A*.
    #[default]
    AStar,
    /// Barrier-synchronized parallel relaxation.
    Parallel,
}

impl fmt::Display for PlannerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerMethod::AStar => f.write_str("astar"),
            PlannerMethod::Parallel => f.write_str("parallel"),
        }
    }
}

impl FromStr for PlannerMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "astar" | "a*" => Ok(PlannerMethod::AStar),
            "parallel" | "threaded" => Ok(PlannerMethod::Parallel),
            other => Err(format!("unknown planner method '{other}'")),
        }
    }
}

/// How grid cells are assigned to worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WorkerLayout {
    /// One OS thread per cell. Only viable for small grids; bounded by
    /// [`ParallelConfig::max_threads`].
    PerCell,
    /// A fixed number of threads, each owning a contiguous run of cells.
    Pool(usize),
}

impl Default for WorkerLayout {
    fn default() -> Self {
        WorkerLayout::Pool(4)
    }
}

/// When the parallel planner stops iterating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Termination {
    /// Stop in the round the goal first receives a finite score. The path
    /// has the fewest steps but is not necessarily the cheapest.
    #[default]
    GoalDiscovered,
    /// Keep relaxing until a round changes nothing. Yields the cheapest path.
    Converged,
}

/// Settings for [`ParallelAStar`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParallelConfig {
    pub layout: WorkerLayout,
    pub termination: Termination,
    /// Hard cap on rounds per search. `None` uses `cells + 1`, which is
    /// always enough to converge.
    pub max_rounds: Option<usize>,
    /// Largest thread count [`WorkerLayout::PerCell`] may spawn.
    pub max_threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            layout: WorkerLayout::default(),
            termination: Termination::default(),
            max_rounds: None,
            max_threads: 1024,
        }
    }
}

/// Top-level planner settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    pub method: PlannerMethod,
    pub heuristic: Heuristic,
    pub parallel: ParallelConfig,
}

/// Create the planner described by `config`.
pub fn build_planner(config: &PlannerConfig) -> Box<dyn Planner> {
    match config.method {
        PlannerMethod::AStar => Box::new(AStar::new(config.heuristic)),
        PlannerMethod::Parallel => Box::new(ParallelAStar::new(
            config.heuristic,
            config.parallel.clone(),
        )),
    }
}
