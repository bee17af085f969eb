//! Timber - tree felling for voxel game servers

pub mod core;
pub mod voxel;
pub mod host;
pub mod config;
pub mod species;
pub mod detect;
pub mod trajectory;
pub mod animation;
pub mod chop;
