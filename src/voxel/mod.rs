//! Block coordinates, tags and world access

pub mod coord;
pub mod block;
pub mod voxel;
pub mod world;

pub use coord::{ChunkPos, Face, VoxelPos, CHUNK_WIDTH};
pub use block::{BlockTag, ItemStack};
pub use voxel::Voxel;
pub use world::{BlockSource, MemoryFake, MemoryWorld};
