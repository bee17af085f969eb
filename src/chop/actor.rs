//! The player attempting a chop

use crate::host::player::PlayerId;
use crate::voxel::{BlockTag, Face};

/// Permissions resolved by the host before the strike
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Permissions {
    pub chop: bool,
    /// Never put on cooldown
    pub bypass_cooldown: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self { chop: true, bypass_cooldown: false }
    }
}

/// Snapshot of the striking player
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub id: PlayerId,
    /// Item in the main hand, `None` for bare hands
    pub held_item: Option<BlockTag>,
    /// Horizontal direction the player looks
    pub facing: Face,
    pub permissions: Permissions,
}

impl Actor {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            held_item: None,
            facing: Face::North,
            permissions: Permissions::default(),
        }
    }

    pub fn holding(mut self, item: impl Into<BlockTag>) -> Self {
        self.held_item = Some(item.into());
        self
    }

    pub fn facing(mut self, facing: Face) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }
}
