//! Tracking of player-placed blocks

use std::collections::HashSet;

use crate::config::TimberConfig;
use crate::core::lifecycle::Component;
use crate::core::types::Result;
use crate::voxel::{BlockSource, BlockTag, VoxelPos};

/// Positions of blocks a player put down by hand
#[derive(Debug, Default)]
pub struct PlacedBlocks {
    positions: HashSet<VoxelPos>,
}

impl PlacedBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_placed(&mut self, pos: VoxelPos) {
        self.positions.insert(pos);
    }

    pub fn record_broken(&mut self, pos: VoxelPos) {
        self.positions.remove(&pos);
    }

    pub fn contains(&self, pos: VoxelPos) -> bool {
        self.positions.contains(&pos)
    }

    /// Forget every position in `positions`
    pub fn forget_all(&mut self, positions: impl IntoIterator<Item = VoxelPos>) {
        for pos in positions {
            self.positions.remove(&pos);
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Component for PlacedBlocks {
    fn name(&self) -> &'static str {
        "placed-blocks"
    }

    fn reset(&mut self, _config: &TimberConfig) -> Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) {
        self.positions.clear();
    }
}

/// Snapshot view where player-placed blocks read as air
pub struct PlacedFilter<'a, S: ?Sized> {
    inner: &'a S,
    placed: &'a PlacedBlocks,
}

impl<'a, S: BlockSource + ?Sized> PlacedFilter<'a, S> {
    pub fn new(inner: &'a S, placed: &'a PlacedBlocks) -> Self {
        Self { inner, placed }
    }
}

impl<S: BlockSource + ?Sized> BlockSource for PlacedFilter<'_, S> {
    fn block_tag(&self, pos: VoxelPos) -> BlockTag {
        if self.placed.contains(pos) {
            BlockTag::AIR
        } else {
            self.inner.block_tag(pos)
        }
    }
}
