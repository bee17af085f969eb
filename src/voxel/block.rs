//! Block-type tags and item stacks

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespaced block-type identifier, e.g. `minecraft:oak_log`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockTag(Cow<'static, str>);

impl BlockTag {
    /// Empty space
    pub const AIR: BlockTag = BlockTag(Cow::Borrowed("minecraft:air"));

    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    /// Tag backed by a static string, no allocation
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_air(&self) -> bool {
        *self == Self::AIR
    }
}

impl From<&'static str> for BlockTag {
    fn from(tag: &'static str) -> Self {
        Self::from_static(tag)
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A quantity of one item type, as spawned into the world on harvest
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: BlockTag,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: BlockTag, count: u32) -> Self {
        Self { item, count }
    }

    /// A single item of the given type
    pub fn one(item: BlockTag) -> Self {
        Self::new(item, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air() {
        assert!(BlockTag::AIR.is_air());
        assert!(BlockTag::new("minecraft:air").is_air());
        assert!(!BlockTag::from_static("minecraft:oak_log").is_air());
    }

    #[test]
    fn test_serde_transparent() {
        let tag: BlockTag = serde_json::from_str("\"minecraft:birch_leaves\"").unwrap();
        assert_eq!(tag, BlockTag::from_static("minecraft:birch_leaves"));
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"minecraft:birch_leaves\"");
    }
}
