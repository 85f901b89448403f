//! Terrain for tilepath planners.
//!
//! - [`kind`]: the terrain kinds and their traversal effort.
//! - [`tilemap`]: a fixed-size map built from layer indices.
//! - [`layers`]: terrain generators that fill map chunks.
//! - [`chunked`]: an unbounded map streamed in square chunks around a view.
//!
//! Every map type implements [`tilepath_paths::TerrainSource`], so it can be
//! handed directly to a planner.

pub mod chunked;
pub mod error;
pub mod kind;
pub mod layers;
pub mod tilemap;

pub use chunked::{ChunkConfig, ChunkDelta, ChunkedMap};
pub use error::MapError;
pub use kind::{TerrainKind, Tile};
pub use layers::{ScatterLayers, TerrainLayers};
pub use tilemap::TileMap;
