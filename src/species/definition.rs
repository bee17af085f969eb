//! Data-driven tree species

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::{BlockTag, ItemStack};

fn default_min_trunk_height() -> u32 {
    3
}

fn default_max_trunk_height() -> u32 {
    32
}

fn default_max_trunk_spread() -> u32 {
    2
}

fn default_leaf_radius() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

/// Which blocks make up one kind of tree and how large it may be
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesDefinition {
    pub id: String,
    /// Log material
    pub trunk: BTreeSet<BlockTag>,
    /// Foliage material
    pub leaves: BTreeSet<BlockTag>,
    /// Fewer trunk layers than this is not a tree
    #[serde(default = "default_min_trunk_height")]
    pub min_trunk_height: u32,
    /// Trunk layers above the strike point that are still collected
    #[serde(default = "default_max_trunk_height")]
    pub max_trunk_height: u32,
    /// Horizontal distance a trunk voxel may sit from the struck column
    #[serde(default = "default_max_trunk_spread")]
    pub max_trunk_spread: u32,
    /// Traversal steps a leaf may be from the nearest trunk voxel
    #[serde(default = "default_leaf_radius")]
    pub leaf_radius: u32,
    #[serde(default)]
    pub requires_leaves: bool,
    /// Leaves connect through edges and corners, not just faces
    #[serde(default = "default_true")]
    pub leaves_diagonal: bool,
    #[serde(default)]
    pub sapling: Option<BlockTag>,
    /// Blocks a sapling may be replanted on
    #[serde(default)]
    pub plantable_soil: BTreeSet<BlockTag>,
    /// Leaf voxels drop themselves when felled
    #[serde(default)]
    pub drop_leaves: bool,
}

impl SpeciesDefinition {
    /// Species with default size limits
    pub fn new(
        id: impl Into<String>,
        trunk: impl IntoIterator<Item = BlockTag>,
        leaves: impl IntoIterator<Item = BlockTag>,
    ) -> Self {
        Self {
            id: id.into(),
            trunk: trunk.into_iter().collect(),
            leaves: leaves.into_iter().collect(),
            min_trunk_height: default_min_trunk_height(),
            max_trunk_height: default_max_trunk_height(),
            max_trunk_spread: default_max_trunk_spread(),
            leaf_radius: default_leaf_radius(),
            requires_leaves: false,
            leaves_diagonal: true,
            sapling: None,
            plantable_soil: BTreeSet::new(),
            drop_leaves: false,
        }
    }

    pub fn with_min_trunk_height(mut self, height: u32) -> Self {
        self.min_trunk_height = height;
        self
    }

    pub fn with_max_trunk_height(mut self, height: u32) -> Self {
        self.max_trunk_height = height;
        self
    }

    pub fn with_max_trunk_spread(mut self, spread: u32) -> Self {
        self.max_trunk_spread = spread;
        self
    }

    pub fn with_leaf_radius(mut self, radius: u32) -> Self {
        self.leaf_radius = radius;
        self
    }

    pub fn with_requires_leaves(mut self, required: bool) -> Self {
        self.requires_leaves = required;
        self
    }

    pub fn with_sapling(mut self, sapling: BlockTag, soil: impl IntoIterator<Item = BlockTag>) -> Self {
        self.sapling = Some(sapling);
        self.plantable_soil = soil.into_iter().collect();
        self
    }

    pub fn is_trunk(&self, tag: &BlockTag) -> bool {
        self.trunk.contains(tag)
    }

    pub fn is_leaf(&self, tag: &BlockTag) -> bool {
        self.leaves.contains(tag)
    }

    /// Item yielded when a block of this species is felled
    pub fn harvest_yield(&self, tag: &BlockTag) -> Option<ItemStack> {
        if self.is_trunk(tag) || (self.drop_leaves && self.is_leaf(tag)) {
            Some(ItemStack::one(tag.clone()))
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.trunk.is_empty() {
            return Err(Error::Config(format!("species '{}' has no trunk blocks", self.id)));
        }
        if let Some(tag) = self.trunk.intersection(&self.leaves).next() {
            return Err(Error::Config(format!(
                "species '{}' lists {} as both trunk and leaf", self.id, tag
            )));
        }
        if self.min_trunk_height == 0 || self.min_trunk_height > self.max_trunk_height {
            return Err(Error::Config(format!(
                "species '{}' needs 0 < min_trunk_height <= max_trunk_height", self.id
            )));
        }
        Ok(())
    }
}

const SOIL: [&str; 6] = [
    "minecraft:grass_block",
    "minecraft:dirt",
    "minecraft:coarse_dirt",
    "minecraft:podzol",
    "minecraft:rooted_dirt",
    "minecraft:mycelium",
];

fn vanilla_species(name: &str) -> SpeciesDefinition {
    SpeciesDefinition::new(
        name,
        [
            BlockTag::new(format!("minecraft:{name}_log")),
            BlockTag::new(format!("minecraft:{name}_wood")),
        ],
        [BlockTag::new(format!("minecraft:{name}_leaves"))],
    )
    .with_sapling(
        BlockTag::new(format!("minecraft:{name}_sapling")),
        SOIL.into_iter().map(BlockTag::from_static),
    )
}

/// The overworld trees
pub fn vanilla() -> Vec<SpeciesDefinition> {
    vec![
        vanilla_species("oak").with_max_trunk_spread(3),
        vanilla_species("spruce"),
        vanilla_species("birch"),
        vanilla_species("jungle").with_max_trunk_height(40),
        vanilla_species("acacia").with_max_trunk_spread(4),
        vanilla_species("dark_oak"),
    ]
}
