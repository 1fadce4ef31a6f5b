//! # Block Module
//!
//! Block type definitions. A block is a single byte: zero is air, any other
//! value is a solid material. No further metadata is attached to a block.

use num_derive::FromPrimitive;

/// The underlying integer type used to store block types in chunk memory.
pub type BlockTypeId = u8;

/// Enumerates the block types of the voxel world.
///
/// Only solidity matters to the mesher; the distinct solid materials exist
/// so a renderer can color them differently.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Faces adjacent to air are exposed and get meshed.
    Air = 0,

    /// Generic solid terrain material.
    Stone = 1,

    /// Solid topsoil material.
    Dirt = 2,

    /// Solid surface material.
    Grass = 3,
}

impl BlockType {
    /// Converts a stored `BlockTypeId` back to a `BlockType`.
    ///
    /// # Panics
    /// Panics if the id does not correspond to a valid block type.
    pub fn from_id(id: BlockTypeId) -> Self {
        let block: Option<BlockType> = num::FromPrimitive::from_u8(id);
        block.unwrap()
    }

    /// The compact id of this block type.
    pub fn id(self) -> BlockTypeId {
        self as BlockTypeId
    }

    /// Whether this block occludes adjacent faces.
    pub fn is_solid(self) -> bool {
        self != BlockType::Air
    }

    /// Picks a random non-air block type. Used by the scatter fill.
    pub fn random_solid() -> Self {
        num::FromPrimitive::from_u8(fastrand::u8(1..4)).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_the_only_non_solid_type() {
        assert!(!BlockType::Air.is_solid());
        assert!(BlockType::Stone.is_solid());
        assert!(BlockType::Dirt.is_solid());
        assert!(BlockType::Grass.is_solid());
    }

    #[test]
    fn ids_round_trip() {
        for block in [
            BlockType::Air,
            BlockType::Stone,
            BlockType::Dirt,
            BlockType::Grass,
        ] {
            assert_eq!(BlockType::from_id(block.id()), block);
        }
    }

    #[test]
    fn random_solid_never_yields_air() {
        for _ in 0..64 {
            assert!(BlockType::random_solid().is_solid());
        }
    }
}
