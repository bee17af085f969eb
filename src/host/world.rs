//! World Mutation capability

use crate::core::types::{Quat, Result, Vec3};
use crate::voxel::{BlockSource, BlockTag, ItemStack, VoxelPos};

/// Opaque handle to a stand-in spawned by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeBlockHandle(pub u64);

/// Pose of a stand-in relative to the block it replaced
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FakeTransform {
    /// Displacement of the block center from where it used to be
    pub translation: Vec3,
    /// Orientation of the block around its own center
    pub rotation: Quat,
}

impl FakeTransform {
    pub const IDENTITY: FakeTransform = FakeTransform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };
}

/// Block writes, stand-in rendering and item drops provided by the host.
///
/// All calls happen on the tick thread. Only `set_block_tag` and
/// `spawn_fake_block` can fail; the rest are fire-and-forget.
pub trait WorldMutation: BlockSource {
    fn set_block_tag(&mut self, pos: VoxelPos, tag: BlockTag) -> Result<()>;

    /// Show a non-colliding, non-interactive stand-in at `pos`
    fn spawn_fake_block(&mut self, pos: VoxelPos, tag: &BlockTag) -> Result<FakeBlockHandle>;

    fn update_fake_block(&mut self, handle: FakeBlockHandle, transform: FakeTransform);

    fn remove_fake_block(&mut self, handle: FakeBlockHandle);

    fn spawn_drop(&mut self, at: Vec3, stack: ItemStack);
}
