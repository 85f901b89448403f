//! Fixed-size maps.

use rand::{Rng, RngExt};
use tilepath_core::{Point, Range};
use tilepath_paths::TerrainSource;

use crate::error::MapError;
use crate::kind::{TerrainKind, Tile, VARIANTS};
use crate::layers::TerrainLayers;

/// A `width × height` map anchored at the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileMap {
    width: i32,
    height: i32,
    kinds: Vec<TerrainKind>,
}

impl TileMap {
    /// Map where every tile is `kind`.
    pub fn filled(width: i32, height: i32, kind: TerrainKind) -> Result<Self, MapError> {
        let len = tile_count(width, height)?;
        Ok(Self {
            width,
            height,
            kinds: vec![kind; len],
        })
    }

    /// Map from row-major layer indices (see [`TerrainKind::from_layer`]).
    /// Out-of-range indices are clamped.
    pub fn from_layers(width: i32, height: i32, layers: &[i32]) -> Result<Self, MapError> {
        let expected = tile_count(width, height)?;
        if layers.len() != expected {
            return Err(MapError::SizeMismatch {
                expected,
                actual: layers.len(),
            });
        }
        Ok(Self {
            width,
            height,
            kinds: layers.iter().map(|&l| TerrainKind::from_layer(l)).collect(),
        })
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// All tiles of the map, anchored at the origin.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::sized(self.width, self.height)
    }

    /// Terrain at `p`, or `None` outside the map.
    pub fn kind_at(&self, p: Point) -> Option<TerrainKind> {
        self.bounds().index_of(p).map(|i| self.kinds[i])
    }

    /// Change one tile. Returns `false` if `p` is outside the map.
    pub fn set(&mut self, p: Point, kind: TerrainKind) -> bool {
        match self.bounds().index_of(p) {
            Some(i) => {
                self.kinds[i] = kind;
                true
            }
            None => false,
        }
    }
}

/// Number of tiles in a `width × height` map, rejecting negative sizes and
/// products that overflow `i32`.
fn tile_count(width: i32, height: i32) -> Result<usize, MapError> {
    match width.checked_mul(height) {
        Some(n) if width >= 0 && height >= 0 => Ok(n as usize),
        _ => Err(MapError::InvalidSize { width, height }),
    }
}

impl TerrainSource for TileMap {
    fn effort_at(&self, p: Point) -> f32 {
        self.kind_at(p).map_or(-1.0, TerrainKind::effort)
    }

    fn active_extents(&self) -> Range {
        self.bounds()
    }
}

/// Tiles outside the map are water.
impl TerrainLayers for TileMap {
    fn fill_chunk(&self, area: Range, rng: &mut impl Rng, out: &mut Vec<Tile>) {
        out.reserve(area.len());
        for p in area {
            let kind = self.kind_at(p).unwrap_or(TerrainKind::Water);
            out.push(Tile::new(kind, rng.random_range(0..VARIANTS)));
        }
    }
}
