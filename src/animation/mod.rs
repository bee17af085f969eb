//! Falling-tree animation with block stand-ins

pub mod fake_block;
pub mod animator;

pub use fake_block::FakeBlock;
pub use animator::{FallAnimation, FallState};
