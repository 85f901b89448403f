use tilepath_core::Point;

/// Cost reported when no path was found.
pub const NO_PATH_COST: f32 = -1.0;

/// Outcome of one `compute_path` call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    /// Whether the goal was reached.
    pub found: bool,
    /// Total path cost, or [`NO_PATH_COST`] when not found.
    pub cost: f32,
    /// Cells from start to goal inclusive; empty when not found.
    pub path: Vec<Point>,
}

impl SearchResult {
    /// The "no path" result.
    pub fn not_found() -> Self {
        Self {
            found: false,
            cost: NO_PATH_COST,
            path: Vec::new(),
        }
    }

    pub(crate) fn found(cost: f32, path: Vec<Point>) -> Self {
        Self {
            found: true,
            cost,
            path,
        }
    }
}

impl Default for SearchResult {
    fn default() -> Self {
        Self::not_found()
    }
}
