//! Lookup from trunk material to species

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::TimberConfig;
use crate::core::error::Error;
use crate::core::lifecycle::Component;
use crate::core::types::Result;
use crate::species::definition::SpeciesDefinition;
use crate::voxel::BlockTag;

/// Immutable set of species indexed by trunk tag
#[derive(Debug, Default)]
pub struct SpeciesRegistry {
    species: Vec<Arc<SpeciesDefinition>>,
    by_trunk: HashMap<BlockTag, usize>,
}

impl SpeciesRegistry {
    /// Build from definitions; a trunk tag may belong to one species only
    pub fn new(definitions: impl IntoIterator<Item = SpeciesDefinition>) -> Result<Self> {
        let mut registry = Self::default();
        for def in definitions {
            def.validate()?;
            let index = registry.species.len();
            for tag in &def.trunk {
                if let Some(&other) = registry.by_trunk.get(tag) {
                    return Err(Error::Config(format!(
                        "trunk block {} claimed by both '{}' and '{}'",
                        tag, registry.species[other].id, def.id
                    )));
                }
                registry.by_trunk.insert(tag.clone(), index);
            }
            registry.species.push(Arc::new(def));
        }
        Ok(registry)
    }

    /// Load a JSON array of species definitions
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let definitions: Vec<SpeciesDefinition> = serde_json::from_str(&data)?;
        Self::new(definitions)
    }

    /// Species whose trunk set contains `tag`
    pub fn lookup(&self, tag: &BlockTag) -> Option<&Arc<SpeciesDefinition>> {
        self.by_trunk.get(tag).map(|&i| &self.species[i])
    }

    pub fn is_leaf_of(species: &SpeciesDefinition, tag: &BlockTag) -> bool {
        species.is_leaf(tag)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<SpeciesDefinition>> {
        self.species.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SpeciesDefinition>> {
        self.species.iter()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

impl Component for SpeciesRegistry {
    fn name(&self) -> &'static str {
        "species-registry"
    }

    fn reset(&mut self, config: &TimberConfig) -> Result<()> {
        *self = Self::new(config.species.iter().cloned())?;
        log::info!("Loaded {} tree species", self.len());
        Ok(())
    }

    fn shutdown(&mut self) {}
}
