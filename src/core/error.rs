//! Error types for tree felling

use thiserror::Error;

use crate::chop::SessionId;
use crate::voxel::VoxelPos;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// No qualifying tree at the struck voxel
    #[error("not a tree")]
    NotATree,

    /// Voxel overlaps a session that has not settled yet
    #[error("voxel already claimed by an active session")]
    AlreadyClaimed,

    /// Something solid blocks the fall next to the pivot
    #[error("fall path obstructed")]
    ObstructedFall,

    /// The world rejected a block write (protected region, unloaded chunk, ...)
    #[error("world mutation rejected at {pos}: {reason}")]
    WorldMutation { pos: VoxelPos, reason: String },

    #[error("session {0} aborted")]
    SessionAborted(SessionId),

    #[error("unknown session {0}")]
    UnknownSession(SessionId),
}

impl Error {
    /// Shorthand for a rejected block write.
    pub fn world(pos: VoxelPos, reason: impl Into<String>) -> Self {
        Error::WorldMutation { pos, reason: reason.into() }
    }
}
