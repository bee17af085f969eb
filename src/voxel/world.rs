//! Read access to block data and an in-memory world for hosts and tests

use std::collections::{HashMap, HashSet};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::host::world::{FakeBlockHandle, FakeTransform, WorldMutation};
use crate::voxel::block::{BlockTag, ItemStack};
use crate::voxel::coord::VoxelPos;

/// Read-only view of the block grid
pub trait BlockSource {
    /// Tag of the block at `pos`; unloaded or empty space reads as air
    fn block_tag(&self, pos: VoxelPos) -> BlockTag;
}

impl<T: BlockSource + ?Sized> BlockSource for &T {
    fn block_tag(&self, pos: VoxelPos) -> BlockTag {
        (**self).block_tag(pos)
    }
}

/// A stand-in tracked by [`MemoryWorld`]
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryFake {
    pub pos: VoxelPos,
    pub tag: BlockTag,
    pub transform: FakeTransform,
    /// Number of transform updates received
    pub updates: u32,
}

/// Sparse block grid keeping every mutation in memory.
///
/// Serves as the reference World Mutation capability: positions can be
/// protected to make writes fail, and stand-ins and drops are recorded so
/// they can be inspected.
#[derive(Debug, Default)]
pub struct MemoryWorld {
    /// Non-air blocks
    blocks: HashMap<VoxelPos, BlockTag>,
    /// Positions where writes are rejected
    protected: HashSet<VoxelPos>,
    /// Live stand-ins by handle
    fakes: HashMap<FakeBlockHandle, MemoryFake>,
    next_handle: u64,
    /// Maximum number of live stand-ins, if limited
    fake_limit: Option<usize>,
    /// Every drop spawned, in order
    drops: Vec<(Vec3, ItemStack)>,
}

impl MemoryWorld {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a block directly, bypassing protection
    pub fn set(&mut self, pos: VoxelPos, tag: impl Into<BlockTag>) -> &mut Self {
        let tag = tag.into();
        if tag.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, tag);
        }
        self
    }

    /// Stack `height` blocks upward starting at `base`
    pub fn column(&mut self, base: VoxelPos, height: i32, tag: impl Into<BlockTag>) -> &mut Self {
        let tag = tag.into();
        for dy in 0..height {
            self.set(base.offset(0, dy, 0), tag.clone());
        }
        self
    }

    /// Reject all future writes at `pos`
    pub fn protect(&mut self, pos: VoxelPos) {
        self.protected.insert(pos);
    }

    /// Refuse to spawn more than `limit` live stand-ins
    pub fn limit_fakes(&mut self, limit: usize) {
        self.fake_limit = Some(limit);
    }

    /// Number of non-air blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of blocks with the given tag
    pub fn count_of(&self, tag: &BlockTag) -> usize {
        self.blocks.values().filter(|t| *t == tag).count()
    }

    pub fn fake_count(&self) -> usize {
        self.fakes.len()
    }

    pub fn fake(&self, handle: FakeBlockHandle) -> Option<&MemoryFake> {
        self.fakes.get(&handle)
    }

    pub fn fakes(&self) -> impl Iterator<Item = &MemoryFake> {
        self.fakes.values()
    }

    pub fn drops(&self) -> &[(Vec3, ItemStack)] {
        &self.drops
    }

    /// Total item count over all drops of one item type
    pub fn dropped_count(&self, item: &BlockTag) -> u32 {
        self.drops
            .iter()
            .filter(|(_, stack)| stack.item == *item)
            .map(|(_, stack)| stack.count)
            .sum()
    }

    /// Take the recorded drops and clear the internal list
    pub fn take_drops(&mut self) -> Vec<(Vec3, ItemStack)> {
        std::mem::take(&mut self.drops)
    }
}

impl BlockSource for MemoryWorld {
    fn block_tag(&self, pos: VoxelPos) -> BlockTag {
        self.blocks.get(&pos).cloned().unwrap_or(BlockTag::AIR)
    }
}

impl WorldMutation for MemoryWorld {
    fn set_block_tag(&mut self, pos: VoxelPos, tag: BlockTag) -> Result<()> {
        if self.protected.contains(&pos) {
            return Err(Error::world(pos, "protected"));
        }
        self.set(pos, tag);
        Ok(())
    }

    fn spawn_fake_block(&mut self, pos: VoxelPos, tag: &BlockTag) -> Result<FakeBlockHandle> {
        if self.fake_limit.is_some_and(|limit| self.fakes.len() >= limit) {
            return Err(Error::world(pos, "stand-in limit reached"));
        }
        let handle = FakeBlockHandle(self.next_handle);
        self.next_handle += 1;
        self.fakes.insert(handle, MemoryFake {
            pos,
            tag: tag.clone(),
            transform: FakeTransform::IDENTITY,
            updates: 0,
        });
        Ok(handle)
    }

    fn update_fake_block(&mut self, handle: FakeBlockHandle, transform: FakeTransform) {
        if let Some(fake) = self.fakes.get_mut(&handle) {
            fake.transform = transform;
            fake.updates += 1;
        }
    }

    fn remove_fake_block(&mut self, handle: FakeBlockHandle) {
        self.fakes.remove(&handle);
    }

    fn spawn_drop(&mut self, at: Vec3, stack: ItemStack) {
        self.drops.push((at, stack));
    }
}
