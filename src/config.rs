//! Felling configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, TICKS_PER_SECOND};
use crate::host::scheduler::MAX_TICK_DELAY;
use crate::species::{vanilla, SpeciesDefinition, SpeciesRegistry};
use crate::voxel::BlockTag;

/// Settings loaded by the host and handed to the coordinator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimberConfig {
    pub cooldown_enabled: bool,
    pub cooldown_secs: u32,
    /// Final lean of the falling tree, strictly between 0 and 90 degrees
    pub max_fall_angle_deg: f32,
    /// Animation ticks from upright to fully leaned
    pub animation_steps: u32,
    /// When false every chop fells instantly
    pub animate_fall: bool,
    /// Fell without animation when the fall path is blocked, instead of rejecting
    pub instant_fell_when_obstructed: bool,
    /// Items that may chop; empty allows anything, including bare hands
    pub required_tools: Vec<BlockTag>,
    /// Trunk voxel count above which a structure is treated as player-built
    pub max_trunk_voxels: usize,
    pub ignore_placed_blocks: bool,
    pub replant_saplings: bool,
    pub chopping_enabled_by_default: bool,
    pub species: Vec<SpeciesDefinition>,
}

impl Default for TimberConfig {
    fn default() -> Self {
        Self {
            cooldown_enabled: true,
            cooldown_secs: 5,
            max_fall_angle_deg: 85.0,
            animation_steps: 20,
            animate_fall: true,
            instant_fell_when_obstructed: true,
            required_tools: [
                "minecraft:wooden_axe",
                "minecraft:stone_axe",
                "minecraft:iron_axe",
                "minecraft:golden_axe",
                "minecraft:diamond_axe",
                "minecraft:netherite_axe",
            ]
            .into_iter()
            .map(BlockTag::from_static)
            .collect(),
            max_trunk_voxels: 150,
            ignore_placed_blocks: true,
            replant_saplings: true,
            chopping_enabled_by_default: true,
            species: vanilla(),
        }
    }
}

impl TimberConfig {
    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TimberConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded felling config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.max_fall_angle_deg > 0.0 && self.max_fall_angle_deg < 90.0) {
            return Err(Error::Config(format!(
                "max_fall_angle_deg must be between 0 and 90, got {}",
                self.max_fall_angle_deg
            )));
        }
        if self.animation_steps == 0 {
            return Err(Error::Config("animation_steps must be at least 1".into()));
        }
        if self.max_trunk_voxels == 0 {
            return Err(Error::Config("max_trunk_voxels must be at least 1".into()));
        }
        if self.cooldown_ticks() as usize >= MAX_TICK_DELAY {
            return Err(Error::Config(format!(
                "cooldown_secs too long, at most {} ticks supported",
                MAX_TICK_DELAY - 1
            )));
        }
        SpeciesRegistry::new(self.species.iter().cloned())?;
        Ok(())
    }

    pub fn cooldown_ticks(&self) -> u32 {
        self.cooldown_secs.saturating_mul(TICKS_PER_SECOND)
    }

    pub fn max_fall_angle(&self) -> f32 {
        self.max_fall_angle_deg.to_radians()
    }

    /// Whether `item` may be used to chop
    pub fn is_tool_allowed(&self, item: Option<&BlockTag>) -> bool {
        if self.required_tools.is_empty() {
            return true;
        }
        item.is_some_and(|item| self.required_tools.contains(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = TimberConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.cooldown_ticks(), 100);
        assert!(cfg.max_fall_angle() < std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_partial_json() {
        let cfg = TimberConfig::from_json(r#"{"cooldown_secs": 2, "animation_steps": 5}"#).unwrap();
        assert_eq!(cfg.cooldown_ticks(), 40);
        assert_eq!(cfg.animation_steps, 5);
        assert_eq!(cfg.species.len(), 6);
    }

    #[test]
    fn test_invalid_angle() {
        assert!(TimberConfig::from_json(r#"{"max_fall_angle_deg": 90.0}"#).is_err());
        assert!(TimberConfig::from_json(r#"{"max_fall_angle_deg": 0.0}"#).is_err());
    }

    #[test]
    fn test_invalid_steps_and_cooldown() {
        assert!(TimberConfig::from_json(r#"{"animation_steps": 0}"#).is_err());
        assert!(TimberConfig::from_json(r#"{"cooldown_secs": 100000}"#).is_err());
    }

    #[test]
    fn test_tool_check() {
        let mut cfg = TimberConfig::default();
        assert!(cfg.is_tool_allowed(Some(&BlockTag::from_static("minecraft:iron_axe"))));
        assert!(!cfg.is_tool_allowed(Some(&BlockTag::from_static("minecraft:stick"))));
        assert!(!cfg.is_tool_allowed(None));

        cfg.required_tools.clear();
        assert!(cfg.is_tool_allowed(None));
    }

    #[test]
    fn test_load_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timber.json");
        let mut cfg = TimberConfig::default();
        cfg.replant_saplings = false;
        std::fs::write(&path, serde_json::to_string(&cfg).unwrap()).unwrap();

        assert_eq!(TimberConfig::load(&path).unwrap(), cfg);
    }
}
