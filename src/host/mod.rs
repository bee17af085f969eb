//! Capabilities the host server provides to the felling core

pub mod world;
pub mod scheduler;
pub mod player;

pub use world::{FakeBlockHandle, FakeTransform, WorldMutation};
pub use scheduler::{ScheduledTask, Scheduler, TickScheduler, MAX_TICK_DELAY};
pub use player::{PlayerId, PlayerState, PlayerStore};
