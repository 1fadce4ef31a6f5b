//! # Terrain Generator Module
//!
//! Selects how chunk volumes get filled. The noise method is the real
//! terrain; the others exist for testing and for visual debugging, the same
//! set of strategies the engine has always shipped with.

use serde::{Deserialize, Serialize};

use super::chunk::VoxelChunk;
use super::noise_field::NoiseField;

/// The strategy used to fill a freshly created chunk volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    /// Height-weighted gradient noise. The normal terrain.
    Noise,
    /// Every cell is air.
    Empty,
    /// Every cell is stone.
    Solid,
    /// Solid below `height`, air above.
    Flat { height: i32 },
    /// Random solid blocks; `sparseness` is the probability a cell is air.
    Scatter { sparseness: f64 },
}

/// Tunable parameters for the noise method. These are policy, not
/// structure: any values produce a consistent, seamlessly tiling world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Number of noise octaves to sum.
    pub octaves: u32,
    /// Scale applied to world block coordinates before sampling.
    pub scale: f64,
    /// Solidity cutoff for the height-weighted sample.
    pub threshold: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            octaves: 1,
            scale: 0.02,
            threshold: 1.0,
        }
    }
}

/// A seeded terrain function shared by every node in a chunk graph.
///
/// Deterministic: the same generator fills the same grid cell identically
/// no matter which thread runs the fill or in what order cells are visited.
pub struct TerrainGenerator {
    field: NoiseField,
    method: GenerationMethod,
    params: TerrainParams,
}

impl TerrainGenerator {
    pub fn new(seed: u32, method: GenerationMethod, params: TerrainParams) -> Self {
        Self {
            field: NoiseField::new(seed),
            method,
            params,
        }
    }

    /// The generation method this generator applies.
    pub fn method(&self) -> &GenerationMethod {
        &self.method
    }

    /// Fills `chunk` for the grid cell `(grid_x, grid_z)`.
    pub fn fill(&self, chunk: &mut VoxelChunk, grid_x: i64, grid_z: i64) {
        match &self.method {
            GenerationMethod::Noise => chunk.fill_noise(&self.field, &self.params, grid_x, grid_z),
            GenerationMethod::Empty => chunk.fill_empty(),
            GenerationMethod::Solid => chunk.fill_solid(),
            GenerationMethod::Flat { height } => chunk.fill_flat(*height),
            GenerationMethod::Scatter { sparseness } => chunk.fill_scatter(*sparseness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::BlockType;

    #[test]
    fn flat_method_fills_to_height() {
        let generator = TerrainGenerator::new(
            0,
            GenerationMethod::Flat { height: 3 },
            TerrainParams::default(),
        );
        let mut chunk = VoxelChunk::new(8);
        generator.fill(&mut chunk, 0, 0);

        assert_eq!(chunk.block(0, 2, 0), BlockType::Stone);
        assert_eq!(chunk.block(0, 3, 0), BlockType::Air);
    }

    #[test]
    fn noise_method_is_independent_of_fill_order() {
        let generator =
            TerrainGenerator::new(9, GenerationMethod::Noise, TerrainParams::default());

        let mut forward = VoxelChunk::new(8);
        generator.fill(&mut forward, -1, 4);

        let mut other_first = VoxelChunk::new(8);
        generator.fill(&mut other_first, 7, 7);
        let mut again = VoxelChunk::new(8);
        generator.fill(&mut again, -1, 4);

        for x in -4..4 {
            for y in 0..8 {
                for z in -4..4 {
                    assert_eq!(forward.block(x, y, z), again.block(x, y, z));
                }
            }
        }
    }

    #[test]
    fn generation_method_deserializes_from_config_json() {
        let method: GenerationMethod = serde_json::from_str(r#"{"flat": {"height": 8}}"#).unwrap();
        assert_eq!(method, GenerationMethod::Flat { height: 8 });

        let method: GenerationMethod = serde_json::from_str(r#""noise""#).unwrap();
        assert_eq!(method, GenerationMethod::Noise);
    }
}
