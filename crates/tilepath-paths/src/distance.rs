use std::fmt;
use std::str::FromStr;

use tilepath_core::Point;

/// √2, the cost of one diagonal step.
pub(crate) const SQRT2: f32 = std::f32::consts::SQRT_2;

/// Manhattan (L1) distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> f32 {
    ((a.x - b.x).abs() + (a.y - b.y).abs()) as f32
}

/// Chebyshev (L∞) distance between two points, i.e. the number of king moves.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Diagonal distance: move diagonally as far as possible, then straight.
#[inline]
pub fn diagonal(a: Point, b: Point) -> f32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    SQRT2 * lo as f32 + (hi - lo) as f32
}

/// Distance metric used both as the A* estimate and as the per-step cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Heuristic {
    #[default]
    Diagonal,
    Manhattan,
}

impl Heuristic {
    /// Distance between `a` and `b` under this metric.
    #[inline]
    pub fn distance(self, a: Point, b: Point) -> f32 {
        match self {
            Heuristic::Diagonal => diagonal(a, b),
            Heuristic::Manhattan => manhattan(a, b),
        }
    }

    /// Cost of stepping from `from` into the adjacent cell `to` whose effort
    /// is `effort`.
    #[inline]
    pub fn step_cost(self, from: Point, to: Point, effort: f32) -> f32 {
        self.distance(from, to) + effort
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heuristic::Diagonal => f.write_str("diagonal"),
            Heuristic::Manhattan => f.write_str("manhattan"),
        }
    }
}

impl FromStr for Heuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diagonal" => Ok(Heuristic::Diagonal),
            "manhattan" => Ok(Heuristic::Manhattan),
            other => Err(format!("unknown heuristic '{other}'")),
        }
    }
}
