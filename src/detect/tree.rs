//! Result of a successful detection

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::species::SpeciesDefinition;
use crate::voxel::{BlockTag, Face, Voxel, VoxelPos};

/// Trunk and leaf voxels of one tree, as collected from a snapshot.
///
/// Trunk and leaf sets are disjoint. Every trunk voxel is connected to the
/// origin and every leaf lies within the species' leaf radius of the trunk.
#[derive(Clone, Debug)]
pub struct DetectedTree {
    pub species: Arc<SpeciesDefinition>,
    /// Struck trunk voxel; the fall pivots around it
    pub origin: VoxelPos,
    pub strike_face: Face,
    trunk: BTreeMap<VoxelPos, BlockTag>,
    leaves: BTreeMap<VoxelPos, BlockTag>,
}

impl DetectedTree {
    pub(crate) fn new(
        species: Arc<SpeciesDefinition>,
        origin: VoxelPos,
        strike_face: Face,
        trunk: BTreeMap<VoxelPos, BlockTag>,
        leaves: BTreeMap<VoxelPos, BlockTag>,
    ) -> Self {
        debug_assert!(trunk.keys().all(|pos| !leaves.contains_key(pos)));
        Self { species, origin, strike_face, trunk, leaves }
    }

    pub fn trunk(&self) -> &BTreeMap<VoxelPos, BlockTag> {
        &self.trunk
    }

    pub fn leaves(&self) -> &BTreeMap<VoxelPos, BlockTag> {
        &self.leaves
    }

    pub fn trunk_count(&self) -> usize {
        self.trunk.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn len(&self) -> usize {
        self.trunk.len() + self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trunk.is_empty()
    }

    /// Number of distinct trunk layers from the origin up
    pub fn trunk_height(&self) -> u32 {
        self.trunk
            .keys()
            .map(|pos| pos.y - self.origin.y + 1)
            .max()
            .unwrap_or(0) as u32
    }

    pub fn contains(&self, pos: VoxelPos) -> bool {
        self.trunk.contains_key(&pos) || self.leaves.contains_key(&pos)
    }

    pub fn positions(&self) -> impl Iterator<Item = VoxelPos> + '_ {
        self.trunk.keys().chain(self.leaves.keys()).copied()
    }

    /// Every voxel, trunk first, each in coordinate order
    pub fn voxels(&self) -> impl Iterator<Item = Voxel> + '_ {
        self.trunk
            .iter()
            .chain(self.leaves.iter())
            .map(|(pos, tag)| Voxel::new(*pos, tag.clone()))
    }
}
