//! Voxels held by unsettled sessions

use std::collections::HashMap;

use crate::chop::session::SessionId;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::VoxelPos;

/// Exclusive ownership of voxels by in-flight sessions
#[derive(Debug, Default)]
pub struct ClaimSet {
    owners: HashMap<VoxelPos, SessionId>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim every position for `session`, or none of them if any is
    /// already held.
    pub fn claim(&mut self, session: SessionId, positions: &[VoxelPos]) -> Result<()> {
        if let Some(pos) = positions.iter().find(|pos| self.owners.contains_key(pos)) {
            log::debug!("{} already claimed by session {}", pos, self.owners[pos]);
            return Err(Error::AlreadyClaimed);
        }
        self.owners.extend(positions.iter().map(|&pos| (pos, session)));
        Ok(())
    }

    /// Release everything held by `session`
    pub fn release(&mut self, session: SessionId) {
        self.owners.retain(|_, owner| *owner != session);
    }

    pub fn owner(&self, pos: VoxelPos) -> Option<SessionId> {
        self.owners.get(&pos).copied()
    }

    pub fn is_claimed(&self, pos: VoxelPos) -> bool {
        self.owners.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn clear(&mut self) {
        self.owners.clear();
    }
}
