//! Breadth-first tree detection over a block snapshot

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::config::TimberConfig;
use crate::core::error::Error;
use crate::core::lifecycle::Component;
use crate::core::types::Result;
use crate::detect::tree::DetectedTree;
use crate::species::SpeciesDefinition;
use crate::voxel::{BlockSource, BlockTag, Face, VoxelPos};

/// Face-adjacent offsets
const FACE_NEIGHBORS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Face, edge and corner offsets
const ALL_NEIGHBORS: [(i32, i32, i32); 26] = {
    let mut out = [(0, 0, 0); 26];
    let mut i = 0;
    let mut dx = -1;
    while dx <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dz = -1;
            while dz <= 1 {
                if dx != 0 || dy != 0 || dz != 0 {
                    out[i] = (dx, dy, dz);
                    i += 1;
                }
                dz += 1;
            }
            dy += 1;
        }
        dx += 1;
    }
    out
};

/// Reads each position from the underlying source at most once.
struct Snapshot<'a, S: ?Sized> {
    source: &'a S,
    tags: HashMap<VoxelPos, BlockTag>,
}

impl<'a, S: BlockSource + ?Sized> Snapshot<'a, S> {
    fn new(source: &'a S) -> Self {
        Self { source, tags: HashMap::new() }
    }

    fn tag(&mut self, pos: VoxelPos) -> BlockTag {
        let source = self.source;
        self.tags.entry(pos).or_insert_with(|| source.block_tag(pos)).clone()
    }
}

/// Finds the tree a struck trunk voxel belongs to.
///
/// Detection is a pure read: the snapshot is never written.
#[derive(Clone, Debug)]
pub struct TreeDetector {
    /// Trunk voxel count above which detection gives up
    max_trunk_voxels: usize,
}

impl TreeDetector {
    pub fn new(max_trunk_voxels: usize) -> Self {
        Self { max_trunk_voxels }
    }

    pub fn max_trunk_voxels(&self) -> usize {
        self.max_trunk_voxels
    }

    /// Collect the tree rooted at `origin`, or `Error::NotATree`.
    pub fn detect<S: BlockSource + ?Sized>(
        &self,
        origin: VoxelPos,
        strike_face: Face,
        species: &Arc<SpeciesDefinition>,
        world: &S,
    ) -> Result<DetectedTree> {
        let mut snapshot = Snapshot::new(world);

        let trunk = self.collect_trunk(origin, species, &mut snapshot)?;

        let height = trunk.keys().map(|pos| pos.y - origin.y + 1).max().unwrap_or(0) as u32;
        if height < species.min_trunk_height {
            log::debug!(
                "{} at {}: trunk height {} below minimum {}",
                species.id, origin, height, species.min_trunk_height
            );
            return Err(Error::NotATree);
        }

        let leaves = collect_leaves(&trunk, species, &mut snapshot);
        if species.requires_leaves && leaves.is_empty() {
            log::debug!("{} at {}: no leaves found", species.id, origin);
            return Err(Error::NotATree);
        }

        log::debug!(
            "Detected {} at {}: {} trunk, {} leaves",
            species.id, origin, trunk.len(), leaves.len()
        );
        Ok(DetectedTree::new(species.clone(), origin, strike_face, trunk, leaves))
    }

    /// Trunk voxels reachable from `origin` inside the bounded column above it
    fn collect_trunk<S: BlockSource + ?Sized>(
        &self,
        origin: VoxelPos,
        species: &SpeciesDefinition,
        snapshot: &mut Snapshot<'_, S>,
    ) -> Result<BTreeMap<VoxelPos, BlockTag>> {
        let origin_tag = snapshot.tag(origin);
        if !species.is_trunk(&origin_tag) {
            return Err(Error::NotATree);
        }

        let max_height = species.max_trunk_height as i32;
        let max_spread = species.max_trunk_spread as i32;

        let mut trunk = BTreeMap::new();
        let mut visited = HashSet::from([origin]);
        let mut queue = VecDeque::from([(origin, origin_tag)]);

        while let Some((pos, tag)) = queue.pop_front() {
            trunk.insert(pos, tag);
            if trunk.len() > self.max_trunk_voxels {
                log::debug!(
                    "{} at {}: more than {} trunk voxels, likely a build",
                    species.id, origin, self.max_trunk_voxels
                );
                return Err(Error::NotATree);
            }

            for &(dx, dy, dz) in &ALL_NEIGHBORS {
                let next = pos.offset(dx, dy, dz);
                let rise = next.y - origin.y;
                if rise < 0 || rise >= max_height || next.horizontal_chebyshev(origin) > max_spread {
                    continue;
                }
                if !visited.insert(next) {
                    continue;
                }
                let next_tag = snapshot.tag(next);
                if species.is_trunk(&next_tag) {
                    queue.push_back((next, next_tag));
                }
            }
        }

        Ok(trunk)
    }
}

/// Leaf voxels within the species radius, spreading out from every trunk voxel
fn collect_leaves<S: BlockSource + ?Sized>(
    trunk: &BTreeMap<VoxelPos, BlockTag>,
    species: &SpeciesDefinition,
    snapshot: &mut Snapshot<'_, S>,
) -> BTreeMap<VoxelPos, BlockTag> {
    let neighbors: &[(i32, i32, i32)] = if species.leaves_diagonal {
        &ALL_NEIGHBORS
    } else {
        &FACE_NEIGHBORS
    };

    let mut leaves = BTreeMap::new();
    let mut visited: HashSet<VoxelPos> = trunk.keys().copied().collect();
    let mut queue: VecDeque<(VoxelPos, u32)> = trunk.keys().map(|&pos| (pos, 0)).collect();

    while let Some((pos, distance)) = queue.pop_front() {
        if distance >= species.leaf_radius {
            continue;
        }
        for &(dx, dy, dz) in neighbors {
            let next = pos.offset(dx, dy, dz);
            if !visited.insert(next) {
                continue;
            }
            let tag = snapshot.tag(next);
            if species.is_leaf(&tag) {
                leaves.insert(next, tag);
                queue.push_back((next, distance + 1));
            }
        }
    }

    leaves
}

impl Default for TreeDetector {
    fn default() -> Self {
        Self::new(TimberConfig::default().max_trunk_voxels)
    }
}

impl Component for TreeDetector {
    fn name(&self) -> &'static str {
        "tree-detector"
    }

    fn reset(&mut self, config: &TimberConfig) -> Result<()> {
        self.max_trunk_voxels = config.max_trunk_voxels;
        Ok(())
    }

    fn shutdown(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::MemoryWorld;
    use std::cell::RefCell;

    const LOG: BlockTag = BlockTag::from_static("minecraft:oak_log");
    const LEAF: BlockTag = BlockTag::from_static("minecraft:oak_leaves");
    const STONE: BlockTag = BlockTag::from_static("minecraft:stone");

    fn oak() -> Arc<SpeciesDefinition> {
        Arc::new(
            SpeciesDefinition::new("oak", [LOG], [LEAF])
                .with_min_trunk_height(3)
                .with_leaf_radius(2),
        )
    }

    fn detect(world: &MemoryWorld, origin: VoxelPos) -> Result<DetectedTree> {
        TreeDetector::new(150).detect(origin, Face::North, &oak(), world)
    }

    /// Counts reads per position
    struct CountingSource<'a> {
        inner: &'a MemoryWorld,
        reads: RefCell<HashMap<VoxelPos, u32>>,
    }

    impl BlockSource for CountingSource<'_> {
        fn block_tag(&self, pos: VoxelPos) -> BlockTag {
            *self.reads.borrow_mut().entry(pos).or_insert(0) += 1;
            self.inner.block_tag(pos)
        }
    }

    /// Four logs with six leaves hugging the top
    fn small_oak(world: &mut MemoryWorld, base: VoxelPos) {
        world.column(base, 4, LOG);
        let top = base.offset(0, 3, 0);
        for pos in [
            top.offset(1, 0, 0),
            top.offset(-1, 0, 0),
            top.offset(0, 0, 1),
            top.offset(0, 0, -1),
            top.offset(0, 1, 0),
            top.offset(0, 2, 0),
        ] {
            world.set(pos, LEAF);
        }
    }

    #[test]
    fn test_four_logs_six_leaves() {
        let mut world = MemoryWorld::new();
        let base = VoxelPos::new(0, 64, 0);
        small_oak(&mut world, base);

        let tree = detect(&world, base).unwrap();
        assert_eq!(tree.trunk_count(), 4);
        assert_eq!(tree.leaf_count(), 6);
        assert_eq!(tree.trunk_height(), 4);
        assert_eq!(tree.origin, base);
    }

    #[test]
    fn test_two_logs_not_a_tree() {
        let mut world = MemoryWorld::new();
        world.column(VoxelPos::new(0, 0, 0), 2, LOG);
        world.set(VoxelPos::new(0, 2, 0), LEAF);

        assert!(matches!(detect(&world, VoxelPos::new(0, 0, 0)), Err(Error::NotATree)));
    }

    #[test]
    fn test_non_trunk_origin() {
        let mut world = MemoryWorld::new();
        world.set(VoxelPos::new(0, 0, 0), STONE);
        assert!(matches!(detect(&world, VoxelPos::new(0, 0, 0)), Err(Error::NotATree)));
        assert!(matches!(detect(&world, VoxelPos::new(5, 5, 5)), Err(Error::NotATree)));
    }

    #[test]
    fn test_full_component_collected() {
        // Trunk that kinks diagonally and forks; all of it is one component.
        let mut world = MemoryWorld::new();
        let base = VoxelPos::new(10, 0, 10);
        let logs = [
            base,
            base.offset(0, 1, 0),
            base.offset(1, 2, 0),
            base.offset(1, 3, 1),
            base.offset(0, 4, 1),
            base.offset(2, 4, 1),
        ];
        for pos in logs {
            world.set(pos, LOG);
        }
        // Unconnected log two blocks away is not part of the tree.
        world.set(base.offset(-2, 3, 0), LOG);

        let tree = detect(&world, base).unwrap();
        let trunk: Vec<_> = tree.trunk().keys().copied().collect();
        let mut expected = logs.to_vec();
        expected.sort();
        assert_eq!(trunk, expected);
    }

    #[test]
    fn test_idempotent_on_unmodified_snapshot() {
        let mut world = MemoryWorld::new();
        let base = VoxelPos::new(0, 0, 0);
        small_oak(&mut world, base);

        let first = detect(&world, base).unwrap();
        let second = detect(&world, base).unwrap();
        assert_eq!(first.trunk(), second.trunk());
        assert_eq!(first.leaves(), second.leaves());
    }

    #[test]
    fn test_logs_below_strike_stay() {
        let mut world = MemoryWorld::new();
        world.column(VoxelPos::new(0, 0, 0), 6, LOG);

        let tree = detect(&world, VoxelPos::new(0, 2, 0)).unwrap();
        assert_eq!(tree.trunk_count(), 4);
        assert!(!tree.contains(VoxelPos::new(0, 1, 0)));
    }

    #[test]
    fn test_spread_and_height_bounds() {
        let species = Arc::new(
            SpeciesDefinition::new("oak", [LOG], [LEAF])
                .with_max_trunk_height(5)
                .with_max_trunk_spread(1),
        );
        let mut world = MemoryWorld::new();
        world.column(VoxelPos::new(0, 0, 0), 8, LOG);
        // Horizontal arm reaching three blocks out
        for x in 1..=3 {
            world.set(VoxelPos::new(x, 2, 0), LOG);
        }

        let tree = TreeDetector::new(150)
            .detect(VoxelPos::new(0, 0, 0), Face::East, &species, &world)
            .unwrap();
        assert_eq!(tree.trunk_height(), 5);
        assert!(tree.contains(VoxelPos::new(1, 2, 0)));
        assert!(!tree.contains(VoxelPos::new(2, 2, 0)));
        assert_eq!(tree.trunk_count(), 6);
    }

    #[test]
    fn test_safety_ceiling() {
        // A solid 3x3 log pillar built by a player
        let mut world = MemoryWorld::new();
        for x in -1..=1 {
            for z in -1..=1 {
                world.column(VoxelPos::new(x, 0, z), 10, LOG);
            }
        }
        let origin = VoxelPos::new(0, 0, 0);
        assert!(TreeDetector::new(150).detect(origin, Face::North, &oak(), &world).is_ok());
        assert!(matches!(
            TreeDetector::new(50).detect(origin, Face::North, &oak(), &world),
            Err(Error::NotATree)
        ));
    }

    #[test]
    fn test_leaves_radius_bound() {
        let mut world = MemoryWorld::new();
        let base = VoxelPos::new(0, 0, 0);
        small_oak(&mut world, base);
        // Third leaf above the top log is out of radius 2
        world.set(base.offset(0, 6, 0), LEAF);

        let tree = detect(&world, base).unwrap();
        assert_eq!(tree.leaf_count(), 6);
        assert!(!tree.contains(base.offset(0, 6, 0)));
    }

    #[test]
    fn test_leaves_face_only() {
        let species = Arc::new(SpeciesDefinition {
            leaves_diagonal: false,
            ..SpeciesDefinition::new("oak", [LOG], [LEAF]).with_leaf_radius(3)
        });
        let mut world = MemoryWorld::new();
        world.column(VoxelPos::new(0, 0, 0), 3, LOG);
        world.set(VoxelPos::new(1, 2, 0), LEAF);
        // Only touches the trunk by an edge
        world.set(VoxelPos::new(1, 3, 1), LEAF);

        let tree = TreeDetector::new(150)
            .detect(VoxelPos::new(0, 0, 0), Face::North, &species, &world)
            .unwrap();
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_requires_leaves() {
        let species = Arc::new(SpeciesDefinition::new("oak", [LOG], [LEAF]).with_requires_leaves(true));
        let mut world = MemoryWorld::new();
        world.column(VoxelPos::new(0, 0, 0), 4, LOG);
        let origin = VoxelPos::new(0, 0, 0);

        let detector = TreeDetector::new(150);
        assert!(matches!(detector.detect(origin, Face::North, &species, &world), Err(Error::NotATree)));

        world.set(VoxelPos::new(0, 4, 0), LEAF);
        assert_eq!(detector.detect(origin, Face::North, &species, &world).unwrap().leaf_count(), 1);
    }

    #[test]
    fn test_trunk_and_leaves_disjoint() {
        let mut world = MemoryWorld::new();
        let base = VoxelPos::new(0, 0, 0);
        small_oak(&mut world, base);
        let tree = detect(&world, base).unwrap();
        for pos in tree.leaves().keys() {
            assert!(!tree.trunk().contains_key(pos));
        }
    }

    #[test]
    fn test_each_voxel_read_once_with_cycles() {
        // 2x2 trunk with a leaf canopy: plenty of cycles in both phases.
        let mut world = MemoryWorld::new();
        for (x, z) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            world.column(VoxelPos::new(x, 0, z), 5, LOG);
        }
        for x in -2..=3 {
            for z in -2..=3 {
                for y in 4..=6 {
                    let pos = VoxelPos::new(x, y, z);
                    if world.block_tag(pos).is_air() {
                        world.set(pos, LEAF);
                    }
                }
            }
        }

        let source = CountingSource { inner: &world, reads: RefCell::new(HashMap::new()) };
        let species = Arc::new(SpeciesDefinition::new("oak", [LOG], [LEAF]).with_leaf_radius(4));
        let tree = TreeDetector::new(150)
            .detect(VoxelPos::new(0, 0, 0), Face::North, &species, &source)
            .unwrap();

        assert_eq!(tree.trunk_count(), 20);
        assert_eq!(tree.leaf_count(), 6 * 6 * 3 - 4);
        assert!(source.reads.borrow().values().all(|&n| n == 1));
    }

    #[test]
    fn test_reset_reads_ceiling() {
        let mut detector = TreeDetector::default();
        let config = TimberConfig { max_trunk_voxels: 7, ..TimberConfig::default() };
        detector.reset(&config).unwrap();
        assert_eq!(detector.max_trunk_voxels(), 7);
    }
}
