//! Integer block coordinates, faces and chunk columns

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{IVec3, Vec3};

/// Side length of a chunk column in blocks
pub const CHUNK_WIDTH: i32 = 16;

/// Integer coordinate of a single block in the world grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    /// Create a new block coordinate
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Coordinate shifted by the given deltas
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Neighboring coordinate across a face
    pub fn step(self, face: Face) -> Self {
        self + face.normal()
    }

    pub const fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    pub const fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// Largest per-axis horizontal distance (ignores y)
    pub fn horizontal_chebyshev(self, other: VoxelPos) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// Largest per-axis distance over all three axes
    pub fn chebyshev(self, other: VoxelPos) -> i32 {
        self.horizontal_chebyshev(other).max((self.y - other.y).abs())
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Minimum corner of the block in world space
    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Chunk column that contains this block
    pub fn chunk(self) -> ChunkPos {
        ChunkPos::new(self.x.div_euclid(CHUNK_WIDTH), self.z.div_euclid(CHUNK_WIDTH))
    }
}

impl From<IVec3> for VoxelPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl std::ops::Add<IVec3> for VoxelPos {
    type Output = VoxelPos;

    fn add(self, rhs: IVec3) -> VoxelPos {
        self.offset(rhs.x, rhs.y, rhs.z)
    }
}

impl fmt::Display for VoxelPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Horizontal coordinate of a chunk column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Block face, also used as a cardinal direction.
///
/// Axis convention: north is -Z, south is +Z, east is +X, west is -X.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Face {
    pub const HORIZONTAL: [Face; 4] = [Face::North, Face::East, Face::South, Face::West];

    /// Unit vector pointing out of this face
    pub fn normal(self) -> IVec3 {
        match self {
            Face::North => IVec3::new(0, 0, -1),
            Face::South => IVec3::new(0, 0, 1),
            Face::East => IVec3::new(1, 0, 0),
            Face::West => IVec3::new(-1, 0, 0),
            Face::Up => IVec3::new(0, 1, 0),
            Face::Down => IVec3::new(0, -1, 0),
        }
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::North => Face::South,
            Face::South => Face::North,
            Face::East => Face::West,
            Face::West => Face::East,
            Face::Up => Face::Down,
            Face::Down => Face::Up,
        }
    }

    pub fn is_horizontal(self) -> bool {
        !matches!(self, Face::Up | Face::Down)
    }
}
