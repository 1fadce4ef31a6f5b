//! # Chunk Module
//!
//! Dense voxel storage for one cubic region of the world. A chunk owns an
//! `N * N * N` grid of block types, addressed with local coordinates
//! `x, z` in `[-N/2, N/2)` and `y` in `[0, N)`. The world is a single
//! horizontal layer of chunks, so `y` never redirects to another chunk.
//!
//! Coordinate lookups outside the local volume are not resolved here.
//! The owning graph node is the only legitimate caller for boundary
//! probes and translates them to the correct lateral neighbor first; a raw
//! out-of-range index is a contract violation caught by `debug_assert!`.

use super::block::BlockType;
use super::generator::TerrainParams;
use super::noise_field::NoiseField;

/// A dense cubic grid of block types with a fixed edge length.
pub struct VoxelChunk {
    size: i32,
    blocks: Vec<BlockType>,
    ready: bool,
}

impl VoxelChunk {
    /// Creates an all-air chunk with the given edge length.
    pub fn new(size: i32) -> Self {
        Self {
            size,
            blocks: vec![BlockType::Air; (size * size * size) as usize],
            ready: false,
        }
    }

    /// The edge length of this chunk.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Whether the volume has been filled by a generation pass.
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Marks the volume as generated. Further generation passes are no-ops
    /// at the node level once this is set.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        let hs = self.size / 2;
        debug_assert!(
            (-hs..hs).contains(&x) && (0..self.size).contains(&y) && (-hs..hs).contains(&z),
            "local block coordinates ({x}, {y}, {z}) out of range for edge {}",
            self.size
        );
        ((x + hs) + y * self.size + (z + hs) * self.size * self.size) as usize
    }

    /// Reads the block at the given local coordinates.
    pub fn block(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.blocks[self.index(x, y, z)]
    }

    /// Writes the block at the given local coordinates.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, value: BlockType) {
        let index = self.index(x, y, z);
        self.blocks[index] = value;
    }

    fn fill_with(&mut self, mut block_at: impl FnMut(i32, i32, i32) -> BlockType) {
        let hs = self.size / 2;
        for x in -hs..hs {
            for y in 0..self.size {
                for z in -hs..hs {
                    self.set_block(x, y, z, block_at(x, y, z));
                }
            }
        }
    }

    /// Fills the chunk with air.
    pub fn fill_empty(&mut self) {
        self.fill_with(|_, _, _| BlockType::Air);
    }

    /// Fills the chunk with solid stone.
    pub fn fill_solid(&mut self) {
        self.fill_with(|_, _, _| BlockType::Stone);
    }

    /// Fills every column up to `height` with solid stone.
    pub fn fill_flat(&mut self, height: i32) {
        self.fill_with(|_, y, _| {
            if y < height {
                BlockType::Stone
            } else {
                BlockType::Air
            }
        });
    }

    /// Fills the chunk with randomly scattered solid blocks. `sparseness`
    /// is the probability that a cell stays air.
    pub fn fill_scatter(&mut self, sparseness: f64) {
        self.fill_with(|_, _, _| {
            if fastrand::f64() < sparseness {
                BlockType::Air
            } else {
                BlockType::random_solid()
            }
        });
    }

    /// Fills the chunk from the noise field, sampled in world block
    /// coordinates so adjacent chunks tile seamlessly.
    ///
    /// A cell is solid while the height-weighted noise sample stays above
    /// the threshold. The weight `((1 - y/N) * 2)^2` decays with altitude,
    /// which produces ground near the bottom of the volume and open air
    /// above a noise-dependent surface height.
    pub fn fill_noise(
        &mut self,
        field: &NoiseField,
        params: &TerrainParams,
        grid_x: i64,
        grid_z: i64,
    ) {
        let size = self.size;
        self.fill_with(|x, y, z| {
            let wx = (grid_x * size as i64 + x as i64) as f64 * params.scale;
            let wy = y as f64 * params.scale;
            let wz = (grid_z * size as i64 + z as i64) as f64 * params.scale;

            let sample = field.sample(params.octaves, wx, wy, wz) * 0.5 + 0.5;
            let height_factor = ((1.0 - y as f64 / size as f64) * 2.0).powi(2);

            if sample * height_factor > params.threshold {
                BlockType::Stone
            } else {
                BlockType::Air
            }
        });
    }
}
