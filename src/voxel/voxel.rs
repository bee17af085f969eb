//! A block position paired with its contents

use crate::voxel::block::BlockTag;
use crate::voxel::coord::VoxelPos;

/// One occupied cell of a world snapshot
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Voxel {
    pub pos: VoxelPos,
    pub tag: BlockTag,
}

impl Voxel {
    pub fn new(pos: VoxelPos, tag: BlockTag) -> Self {
        Self { pos, tag }
    }

    /// Check if voxel is empty (air)
    pub fn is_empty(&self) -> bool {
        self.tag.is_air()
    }
}
