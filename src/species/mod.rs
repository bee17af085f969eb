//! Tree species definitions and lookup

pub mod definition;
pub mod registry;

pub use definition::{vanilla, SpeciesDefinition};
pub use registry::SpeciesRegistry;
