//! Terrain kinds and tiles.

use std::fmt;
use std::str::FromStr;

/// Number of decorative variants per terrain kind.
pub const VARIANTS: u8 = 4;

/// What a tile is made of. Determines how hard it is to cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TerrainKind {
    Water,
    Grass,
    Dirt,
    Gravel,
    Pavers,
}

impl TerrainKind {
    /// Kinds in layer order, bottom to top.
    pub const LAYERS: [TerrainKind; 5] = [
        TerrainKind::Water,
        TerrainKind::Grass,
        TerrainKind::Dirt,
        TerrainKind::Gravel,
        TerrainKind::Pavers,
    ];

    /// Traversal effort. Negative means impassable.
    pub const fn effort(self) -> f32 {
        match self {
            TerrainKind::Grass => 3.0,
            TerrainKind::Water => -1.0,
            TerrainKind::Dirt => 10.0,
            TerrainKind::Gravel => 20.0,
            TerrainKind::Pavers => 1.0,
        }
    }

    /// Whether a tile of this kind can be entered.
    #[inline]
    pub const fn is_passable(self) -> bool {
        self.effort() >= 0.0
    }

    /// Kind for a layer index. Out-of-range indices are clamped to the
    /// first or last layer.
    pub fn from_layer(layer: i32) -> Self {
        let last = Self::LAYERS.len() as i32 - 1;
        Self::LAYERS[layer.clamp(0, last) as usize]
    }

    /// Inverse of [`from_layer`](Self::from_layer).
    pub const fn layer(self) -> i32 {
        match self {
            TerrainKind::Water => 0,
            TerrainKind::Grass => 1,
            TerrainKind::Dirt => 2,
            TerrainKind::Gravel => 3,
            TerrainKind::Pavers => 4,
        }
    }

    /// Single-character glyph for text rendering.
    pub const fn glyph(self) -> char {
        match self {
            TerrainKind::Water => '~',
            TerrainKind::Grass => '"',
            TerrainKind::Dirt => '.',
            TerrainKind::Gravel => ':',
            TerrainKind::Pavers => '=',
        }
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerrainKind::Water => "water",
            TerrainKind::Grass => "grass",
            TerrainKind::Dirt => "dirt",
            TerrainKind::Gravel => "gravel",
            TerrainKind::Pavers => "pavers",
        };
        f.write_str(s)
    }
}

impl FromStr for TerrainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "water" => Ok(TerrainKind::Water),
            "grass" => Ok(TerrainKind::Grass),
            "dirt" => Ok(TerrainKind::Dirt),
            "gravel" => Ok(TerrainKind::Gravel),
            "pavers" => Ok(TerrainKind::Pavers),
            other => Err(format!("unknown terrain kind '{other}'")),
        }
    }
}

/// One map tile: its terrain plus a purely decorative variant in
/// `0..VARIANTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub kind: TerrainKind,
    pub variant: u8,
}

impl Tile {
    /// Tile of `kind` with decorative `variant`.
    pub const fn new(kind: TerrainKind, variant: u8) -> Self {
        Self { kind, variant }
    }

    /// Traversal effort of the tile's kind.
    #[inline]
    pub const fn effort(self) -> f32 {
        self.kind.effort()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efforts() {
        assert_eq!(TerrainKind::Grass.effort(), 3.0);
        assert_eq!(TerrainKind::Water.effort(), -1.0);
        assert_eq!(TerrainKind::Dirt.effort(), 10.0);
        assert_eq!(TerrainKind::Gravel.effort(), 20.0);
        assert_eq!(TerrainKind::Pavers.effort(), 1.0);
        assert!(!TerrainKind::Water.is_passable());
        assert!(TerrainKind::Gravel.is_passable());
    }

    #[test]
    fn from_layer_clamps() {
        assert_eq!(TerrainKind::from_layer(0), TerrainKind::Water);
        assert_eq!(TerrainKind::from_layer(2), TerrainKind::Dirt);
        assert_eq!(TerrainKind::from_layer(9), TerrainKind::Pavers);
        assert_eq!(TerrainKind::from_layer(-3), TerrainKind::Water);
        for kind in TerrainKind::LAYERS {
            assert_eq!(TerrainKind::from_layer(kind.layer()), kind);
        }
    }

    #[test]
    fn parse_names() {
        for kind in TerrainKind::LAYERS {
            assert_eq!(kind.to_string().parse::<TerrainKind>(), Ok(kind));
        }
        assert!("lava".parse::<TerrainKind>().is_err());
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn tile_json() {
        let t = Tile::new(TerrainKind::Gravel, 2);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"kind":"gravel","variant":2}"#);
        let back: Tile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
