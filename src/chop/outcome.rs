//! What a strike resulted in

use crate::chop::session::SessionId;
use crate::core::error::Error;

/// Why a strike was turned down. None of these touch the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    ChoppingDisabled,
    MissingTool,
    MissingPermission,
    /// `notify` is set only on the first rejected strike of a cooldown
    OnCooldown { notify: bool },
    /// Struck block is not a known log
    NotATrunk,
    NotATree,
    AlreadyClaimed,
    ObstructedFall,
}

/// Result of [`ChopCoordinator::attempt_chop`](crate::chop::ChopCoordinator::attempt_chop)
#[derive(Debug)]
pub enum ChopOutcome {
    /// The tree is coming down; `instant` when it skips the animation
    Accepted { session: SessionId, instant: bool },
    Rejected(Rejection),
    /// A world write failed; everything was rolled back
    Failed(Error),
}

impl ChopOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ChopOutcome::Accepted { .. })
    }

    pub fn session(&self) -> Option<SessionId> {
        match self {
            ChopOutcome::Accepted { session, .. } => Some(*session),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            ChopOutcome::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }
}
