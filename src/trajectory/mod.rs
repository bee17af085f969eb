//! Fall path of a toppling tree

pub mod easing;
pub mod path;

pub use easing::ease_in;
pub use path::Trajectory;
