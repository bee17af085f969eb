//! Chop sessions and their coordination

pub mod actor;
pub mod outcome;
pub mod cooldown;
pub mod claims;
pub mod session;
pub mod coordinator;

pub use actor::{Actor, Permissions};
pub use outcome::{ChopOutcome, Rejection};
pub use cooldown::CooldownTracker;
pub use claims::ClaimSet;
pub use session::{ChopSession, SessionId};
pub use coordinator::ChopCoordinator;
