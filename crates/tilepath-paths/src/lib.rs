//! Pathfinding over weighted tile grids.
//!
//! A terrain collaborator implements [`TerrainSource`] (a per-cell effort and
//! the currently loaded extents). A planner snapshots it into a
//! [`PathGraph`] and answers shortest-path queries:
//!
//! - **A\*** ([`AStar`]): sequential best-first search, deterministic
//!   tie-breaking by insertion order.
//! - **Lock-step parallel relaxation** ([`ParallelAStar`]): cooperating
//!   worker threads advance in barrier-synchronized rounds.
//!
//! Both implement [`Planner`]; [`build_planner`] picks one from a
//! [`PlannerConfig`].
//!
//! Effort is the additive cost of entering a cell; a negative effort marks
//! the cell impassable. The step between two adjacent cells costs the
//! heuristic distance between them plus the destination's effort.

mod astar;
mod config;
mod distance;
mod error;
mod graph;
mod grid;
mod parallel;
mod result;
mod traits;

pub use astar::AStar;
pub use config::{
    ParallelConfig, PlannerConfig, PlannerMethod, Termination, WorkerLayout, build_planner,
};
pub use distance::{Heuristic, chebyshev, diagonal, manhattan};
pub use error::{ConfigIssue, GridError, PathError};
pub use graph::PathGraph;
pub use grid::CostGrid;
pub use parallel::{CancelToken, CellStatus, ParallelAStar};
pub use result::{NO_PATH_COST, SearchResult};
pub use traits::{Planner, TerrainSource};
