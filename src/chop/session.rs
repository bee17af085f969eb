//! One tree being felled

use std::collections::BTreeSet;
use std::fmt;

use crate::animation::FallAnimation;
use crate::detect::DetectedTree;
use crate::host::player::PlayerId;
use crate::voxel::ChunkPos;

/// Identifier of a chop session, unique per coordinator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An accepted chop from strike until its drops are spawned
#[derive(Debug)]
pub struct ChopSession {
    pub id: SessionId,
    pub actor: PlayerId,
    pub tree: DetectedTree,
    pub animation: FallAnimation,
    /// Chunk columns the tree occupies
    chunks: BTreeSet<ChunkPos>,
}

impl ChopSession {
    pub fn new(id: SessionId, actor: PlayerId, tree: DetectedTree, animation: FallAnimation) -> Self {
        let chunks = tree.positions().map(|pos| pos.chunk()).collect();
        Self { id, actor, tree, animation, chunks }
    }

    pub fn touches_chunk(&self, chunk: ChunkPos) -> bool {
        self.chunks.contains(&chunk)
    }

    pub fn chunks(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.iter().copied()
    }
}
