//! Terrain generators.

use rand::{Rng, RngExt};
use tilepath_core::Range;

use crate::error::MapError;
use crate::kind::{TerrainKind, Tile, VARIANTS};

/// Something that can fill a rectangular area with tiles.
pub trait TerrainLayers {
    /// Append the tiles of `area` to `out` in row-major order.
    ///
    /// `rng` is seeded per area by the caller; implementations should draw
    /// all their randomness from it so that regenerating an area gives the
    /// same tiles.
    fn fill_chunk(&self, area: Range, rng: &mut impl Rng, out: &mut Vec<Tile>);
}

/// Independent weighted draw per tile.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterLayers {
    /// Cumulative probability thresholds in `(0, 1]`, one per kind.
    cumulative: Vec<(f32, TerrainKind)>,
}

impl ScatterLayers {
    /// Build from relative weights. Weights need not sum to one; kinds with
    /// a zero weight are never drawn.
    pub fn new(weights: &[(TerrainKind, f32)]) -> Result<Self, MapError> {
        for &(kind, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(MapError::InvalidWeight { kind, weight });
            }
        }
        let total: f32 = weights.iter().map(|&(_, w)| w).sum();
        if total <= 0.0 {
            return Err(MapError::NoWeights);
        }
        let mut acc = 0.0;
        let cumulative = weights
            .iter()
            .filter(|&&(_, w)| w > 0.0)
            .map(|&(kind, w)| {
                acc += w / total;
                (acc, kind)
            })
            .collect();
        Ok(Self { cumulative })
    }

    fn pick(&self, r: f32) -> TerrainKind {
        self.cumulative
            .iter()
            .find(|&&(threshold, _)| r < threshold)
            .or(self.cumulative.last())
            .map_or(TerrainKind::Grass, |&(_, kind)| kind)
    }
}

impl Default for ScatterLayers {
    /// Mostly grass with some water to route around.
    fn default() -> Self {
        Self {
            cumulative: vec![
                (0.15, TerrainKind::Water),
                (0.65, TerrainKind::Grass),
                (0.80, TerrainKind::Dirt),
                (0.90, TerrainKind::Gravel),
                (1.00, TerrainKind::Pavers),
            ],
        }
    }
}

impl TerrainLayers for ScatterLayers {
    fn fill_chunk(&self, area: Range, rng: &mut impl Rng, out: &mut Vec<Tile>) {
        out.reserve(area.len());
        for _ in area {
            let kind = self.pick(rng.random_range(0.0..1.0f32));
            out.push(Tile::new(kind, rng.random_range(0..VARIANTS)));
        }
    }
}
