//! # Terrain Module
//!
//! Voxel data and the algorithms that turn it into renderable geometry:
//! block typing, dense chunk storage, the face-culling quad mesher, and the
//! deterministic noise-driven terrain generator.

pub mod block;
pub mod chunk;
pub mod generator;
pub mod mesh;
pub mod noise_field;

pub use block::BlockType;
pub use chunk::VoxelChunk;
pub use generator::{GenerationMethod, TerrainGenerator, TerrainParams};
pub use mesh::QuadMesh;
pub use noise_field::NoiseField;
