//! Transient stand-in for a felled block

use crate::core::types::{Quat, Vec3};
use crate::host::world::{FakeBlockHandle, FakeTransform};
use crate::voxel::{BlockTag, VoxelPos};
use crate::chop::SessionId;

/// Visual replacement for one real block while its tree falls
#[derive(Clone, Debug, PartialEq)]
pub struct FakeBlock {
    pub session: SessionId,
    pub handle: FakeBlockHandle,
    /// Position of the real block it replaces
    pub origin: VoxelPos,
    pub tag: BlockTag,
    /// Block center relative to the pivot point before the fall
    pub initial_offset: Vec3,
    /// Block center relative to the pivot point now
    pub offset: Vec3,
    pub rotation: Quat,
}

impl FakeBlock {
    pub fn new(session: SessionId, handle: FakeBlockHandle, origin: VoxelPos, tag: BlockTag, initial_offset: Vec3) -> Self {
        Self {
            session,
            handle,
            origin,
            tag,
            initial_offset,
            offset: initial_offset,
            rotation: Quat::IDENTITY,
        }
    }

    /// Pose relative to the original block, as sent to the host
    pub fn transform(&self) -> FakeTransform {
        FakeTransform {
            translation: self.offset - self.initial_offset,
            rotation: self.rotation,
        }
    }
}
