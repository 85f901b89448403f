//! Unbounded maps streamed in fixed-size chunks.
//!
//! A [`ChunkedMap`] only keeps the chunks around the current view in memory.
//! Moving the view with [`ChunkedMap::scroll_to`] drops chunks that fell out
//! of the window and generates the ones that came into it. Each chunk's tiles
//! come from an RNG seeded with the map seed and the chunk's coordinates, so
//! a chunk that is dropped and later regenerated is identical.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tilepath_core::{Point, Range};
use tilepath_paths::TerrainSource;

use crate::error::MapError;
use crate::kind::Tile;
use crate::layers::TerrainLayers;

/// Options for a [`ChunkedMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChunkConfig {
    /// Chunk width and height in tiles.
    pub chunk_size: Point,
    /// Extra chunks kept loaded on each side of the view.
    pub margin: i32,
    pub seed: u64,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: Point::new(16, 16),
            margin: 1,
            seed: 0,
        }
    }
}

/// What a call to [`ChunkedMap::scroll_to`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkDelta {
    pub added: usize,
    pub removed: usize,
}

/// A map generated chunk by chunk around a moving view.
#[derive(Debug)]
pub struct ChunkedMap<L> {
    layers: L,
    config: ChunkConfig,
    /// Loaded chunks by chunk coordinate.
    chunks: HashMap<Point, Vec<Tile>>,
    /// Loaded window in chunk coordinates.
    window: Range,
}

impl<L: TerrainLayers> ChunkedMap<L> {
    /// Create an empty map. Nothing is loaded until the first
    /// [`scroll_to`](Self::scroll_to).
    pub fn new(layers: L, config: ChunkConfig) -> Result<Self, MapError> {
        let size = config.chunk_size;
        if size.x <= 0 || size.y <= 0 || size.x.checked_mul(size.y).is_none() {
            return Err(MapError::InvalidChunkSize {
                width: size.x,
                height: size.y,
            });
        }
        Ok(Self {
            layers,
            config: ChunkConfig {
                margin: config.margin.max(0),
                ..config
            },
            chunks: HashMap::new(),
            window: Range::default(),
        })
    }

    /// Options in effect (margin clamped to be non-negative).
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Generator used for new chunks.
    pub fn layers(&self) -> &L {
        &self.layers
    }

    /// Number of chunks currently in memory.
    pub fn loaded_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Tile coordinates covered by the loaded chunks.
    pub fn extents(&self) -> Range {
        let cs = self.config.chunk_size;
        let w = self.window;
        if w.is_empty() {
            return Range::default();
        }
        Range::new(
            w.min.x * cs.x,
            w.min.y * cs.y,
            w.max.x * cs.x,
            w.max.y * cs.y,
        )
    }

    /// Chunk coordinate containing tile `p`.
    #[inline]
    pub fn chunk_of(&self, p: Point) -> Point {
        p.div_floor(self.config.chunk_size)
    }

    /// Move the loaded window so that it covers `view` plus the configured
    /// margin. An empty view unloads everything.
    pub fn scroll_to(&mut self, view: Range) -> ChunkDelta {
        let window = self.window_for(view);
        let before = self.chunks.len();
        self.chunks.retain(|&key, _| window.contains(key));
        let removed = before - self.chunks.len();

        let mut added = 0;
        for key in window {
            if let Entry::Vacant(e) = self.chunks.entry(key) {
                e.insert(generate(&self.layers, &self.config, key));
                added += 1;
            }
        }
        self.window = window;

        if added > 0 || removed > 0 {
            debug!(
                "chunks: +{added} -{removed}, {} loaded, window {}",
                self.chunks.len(),
                self.extents()
            );
        }
        ChunkDelta { added, removed }
    }

    /// Tile at `p`, or `None` if its chunk is not loaded.
    pub fn tile_at(&self, p: Point) -> Option<Tile> {
        let cs = self.config.chunk_size;
        let key = self.chunk_of(p);
        let tiles = self.chunks.get(&key)?;
        let local = Point::new(p.x - key.x * cs.x, p.y - key.y * cs.y);
        tiles.get((local.y * cs.x + local.x) as usize).copied()
    }

    fn window_for(&self, view: Range) -> Range {
        if view.is_empty() {
            return Range::default();
        }
        let cs = self.config.chunk_size;
        let m = self.config.margin;
        let lo = view.min.div_floor(cs).shift(-m, -m);
        let hi = view.max.shift(-1, -1).div_floor(cs).shift(m + 1, m + 1);
        Range::new(lo.x, lo.y, hi.x, hi.y)
    }
}

fn generate<L: TerrainLayers>(layers: &L, config: &ChunkConfig, key: Point) -> Vec<Tile> {
    let cs = config.chunk_size;
    let area = Range::with_size(Point::new(key.x * cs.x, key.y * cs.y), cs);
    let mut rng = StdRng::seed_from_u64(chunk_seed(config.seed, key));
    let mut tiles = Vec::with_capacity(area.len());
    layers.fill_chunk(area, &mut rng, &mut tiles);
    tiles
}

fn chunk_seed(seed: u64, key: Point) -> u64 {
    let packed = (u64::from(key.x as u32) << 32) | u64::from(key.y as u32);
    seed ^ packed.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl<L: TerrainLayers> TerrainSource for ChunkedMap<L> {
    fn effort_at(&self, p: Point) -> f32 {
        self.tile_at(p).map_or(-1.0, Tile::effort)
    }

    fn active_extents(&self) -> Range {
        self.extents()
    }
}
