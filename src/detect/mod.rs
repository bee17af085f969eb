//! Tree detection

pub mod tree;
pub mod placed;
pub mod detector;

pub use tree::DetectedTree;
pub use placed::{PlacedBlocks, PlacedFilter};
pub use detector::TreeDetector;
