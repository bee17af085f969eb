//! Per-session fall playback

use std::sync::Arc;

use crate::chop::SessionId;
use crate::core::types::{Result, Vec3};
use crate::detect::DetectedTree;
use crate::host::world::WorldMutation;
use crate::species::SpeciesDefinition;
use crate::trajectory::Trajectory;
use crate::animation::fake_block::FakeBlock;
use crate::voxel::{BlockTag, Voxel};

/// Playback state of a fall. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallState {
    /// Real blocks removed, stand-ins shown upright
    Spawned,
    /// Stand-ins posed at `step` of the trajectory
    Animating { step: u32 },
    /// Stand-ins removed, drops pending
    Settled,
    /// Every voxel dropped or restored
    Dropped,
}

impl FallState {
    pub fn is_terminal(self) -> bool {
        self == FallState::Dropped
    }
}

/// Drives the stand-ins of one felled tree through a [`Trajectory`].
///
/// Each call to [`advance`](Self::advance) performs exactly one state
/// transition, so a host scheduling one call per tick gets strictly
/// sequential updates.
#[derive(Debug)]
pub struct FallAnimation {
    session: SessionId,
    species: Arc<SpeciesDefinition>,
    trajectory: Trajectory,
    state: FallState,
    fakes: Vec<FakeBlock>,
    /// Removed from the world and not yet committed as drops
    uncommitted: Vec<Voxel>,
    /// Trajectory step at which drops are placed
    drop_step: u32,
}

impl FallAnimation {
    fn empty(session: SessionId, tree: &DetectedTree, trajectory: Trajectory) -> Self {
        let drop_step = trajectory.steps;
        Self {
            session,
            species: tree.species.clone(),
            trajectory,
            state: FallState::Spawned,
            fakes: Vec::with_capacity(tree.len()),
            uncommitted: Vec::with_capacity(tree.len()),
            drop_step,
        }
    }

    /// Show stand-ins for the whole tree and remove the real blocks.
    ///
    /// On failure everything done so far is undone before the error is
    /// returned: no stand-in survives and every removed block is put back.
    pub fn start<W: WorldMutation + ?Sized>(
        session: SessionId,
        tree: &DetectedTree,
        trajectory: Trajectory,
        world: &mut W,
    ) -> Result<Self> {
        let mut animation = Self::empty(session, tree, trajectory);
        if let Err(e) = animation.setup(tree, world, true) {
            log::warn!("Session {}: rolling back after {}", session, e);
            animation.abort(world);
            return Err(e);
        }
        log::debug!("Session {}: {} stand-ins spawned", session, animation.fakes.len());
        Ok(animation)
    }

    /// Remove the real blocks without any animation; the next
    /// [`advance`](Self::advance) drops them where they stood.
    pub fn start_instant<W: WorldMutation + ?Sized>(
        session: SessionId,
        tree: &DetectedTree,
        trajectory: Trajectory,
        world: &mut W,
    ) -> Result<Self> {
        let mut animation = Self::empty(session, tree, trajectory);
        animation.drop_step = 0;
        if let Err(e) = animation.setup(tree, world, false) {
            log::warn!("Session {}: rolling back after {}", session, e);
            animation.abort(world);
            return Err(e);
        }
        animation.state = FallState::Settled;
        Ok(animation)
    }

    fn setup<W: WorldMutation + ?Sized>(
        &mut self,
        tree: &DetectedTree,
        world: &mut W,
        stand_ins: bool,
    ) -> Result<()> {
        if stand_ins {
            for voxel in tree.voxels() {
                let handle = world.spawn_fake_block(voxel.pos, &voxel.tag)?;
                let offset = self.trajectory.initial_offset(voxel.pos);
                self.fakes.push(FakeBlock::new(self.session, handle, voxel.pos, voxel.tag, offset));
            }
        }
        for voxel in tree.voxels() {
            world.set_block_tag(voxel.pos, BlockTag::AIR)?;
            self.uncommitted.push(voxel);
        }
        Ok(())
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn state(&self) -> FallState {
        self.state
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn fakes(&self) -> &[FakeBlock] {
        &self.fakes
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Perform one state transition and return the new state
    pub fn advance<W: WorldMutation + ?Sized>(&mut self, world: &mut W) -> FallState {
        self.state = match self.state {
            FallState::Spawned => {
                self.pose(1, world);
                FallState::Animating { step: 1 }
            }
            FallState::Animating { step } if step < self.trajectory.steps => {
                self.pose(step + 1, world);
                FallState::Animating { step: step + 1 }
            }
            FallState::Animating { .. } => {
                self.remove_stand_ins(world);
                FallState::Settled
            }
            FallState::Settled => {
                self.commit_drops(world);
                FallState::Dropped
            }
            FallState::Dropped => FallState::Dropped,
        };
        self.state
    }

    fn pose<W: WorldMutation + ?Sized>(&mut self, step: u32, world: &mut W) {
        let rotation = self.trajectory.rotation_at(step);
        for fake in &mut self.fakes {
            fake.offset = rotation * fake.initial_offset;
            fake.rotation = rotation;
            world.update_fake_block(fake.handle, fake.transform());
        }
    }

    fn remove_stand_ins<W: WorldMutation + ?Sized>(&mut self, world: &mut W) {
        for fake in self.fakes.drain(..) {
            world.remove_fake_block(fake.handle);
        }
    }

    fn commit_drops<W: WorldMutation + ?Sized>(&mut self, world: &mut W) {
        let mut dropped = 0;
        for voxel in self.uncommitted.drain(..) {
            if let Some(stack) = self.species.harvest_yield(&voxel.tag) {
                world.spawn_drop(self.trajectory.center_at(voxel.pos, self.drop_step), stack);
                dropped += 1;
            }
        }
        log::debug!("Session {}: {} drops spawned", self.session, dropped);
    }

    /// Jump straight to [`FallState::Dropped`].
    ///
    /// Stand-ins are removed and every block not yet dropped goes back where
    /// it was. A block whose spot is now taken, or whose write is refused,
    /// is dropped as an item there instead. Returns the number of blocks
    /// restored.
    pub fn abort<W: WorldMutation + ?Sized>(&mut self, world: &mut W) -> usize {
        if self.is_terminal() {
            return 0;
        }
        self.remove_stand_ins(world);

        let mut restored = 0;
        for voxel in std::mem::take(&mut self.uncommitted) {
            let free = world.block_tag(voxel.pos).is_air();
            if free && world.set_block_tag(voxel.pos, voxel.tag.clone()).is_ok() {
                restored += 1;
                continue;
            }
            log::warn!("Session {}: cannot restore {} at {}, dropping it", self.session, voxel.tag, voxel.pos);
            if let Some(stack) = self.species.harvest_yield(&voxel.tag) {
                world.spawn_drop(voxel.pos.as_vec3() + Vec3::splat(0.5), stack);
            }
        }
        self.state = FallState::Dropped;
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::detect::TreeDetector;
    use crate::voxel::{BlockSource, Face, MemoryWorld, VoxelPos};

    const LOG: BlockTag = BlockTag::from_static("minecraft:oak_log");
    const LEAF: BlockTag = BlockTag::from_static("minecraft:oak_leaves");
    const BASE: VoxelPos = VoxelPos { x: 0, y: 64, z: 0 };

    fn planted() -> (MemoryWorld, DetectedTree) {
        let mut world = MemoryWorld::new();
        world.column(BASE, 4, LOG);
        world.set(BASE.offset(1, 3, 0), LEAF);
        world.set(BASE.offset(0, 4, 0), LEAF);
        let species = Arc::new(SpeciesDefinition::new("oak", [LOG], [LEAF]));
        let tree = TreeDetector::new(150).detect(BASE, Face::North, &species, &world).unwrap();
        (world, tree)
    }

    fn trajectory(tree: &DetectedTree, steps: u32) -> Trajectory {
        Trajectory::compute(tree, 80f32.to_radians(), steps)
    }

    #[test]
    fn test_full_lifecycle() {
        let (mut world, tree) = planted();
        let mut animation = FallAnimation::start(SessionId(1), &tree, trajectory(&tree, 3), &mut world).unwrap();

        assert_eq!(animation.state(), FallState::Spawned);
        assert_eq!(world.block_count(), 0);
        assert_eq!(world.fake_count(), 6);

        assert_eq!(animation.advance(&mut world), FallState::Animating { step: 1 });
        assert_eq!(animation.advance(&mut world), FallState::Animating { step: 2 });
        assert_eq!(animation.advance(&mut world), FallState::Animating { step: 3 });
        assert!(world.fakes().all(|fake| fake.updates == 3));

        assert_eq!(animation.advance(&mut world), FallState::Settled);
        assert_eq!(world.fake_count(), 0);
        assert!(world.drops().is_empty());

        assert_eq!(animation.advance(&mut world), FallState::Dropped);
        assert_eq!(world.dropped_count(&LOG), 4);
        assert_eq!(world.dropped_count(&LEAF), 0);
        assert_eq!(animation.advance(&mut world), FallState::Dropped);
        assert_eq!(world.dropped_count(&LOG), 4);
    }

    #[test]
    fn test_drops_land_at_final_pose() {
        let (mut world, tree) = planted();
        let path = trajectory(&tree, 2);
        let top = BASE.offset(0, 3, 0);
        let expected = path.center_at(top, 2);

        let mut animation = FallAnimation::start(SessionId(1), &tree, path, &mut world).unwrap();
        while !animation.is_terminal() {
            animation.advance(&mut world);
        }
        assert!(world.drops().iter().any(|(at, _)| (*at - expected).length() < 1e-4));
        // Fell to the south
        assert!(world.drops().iter().all(|(at, _)| at.z >= 0.5 - 1e-4));
    }

    #[test]
    fn test_stand_in_transform_matches_trajectory() {
        let (mut world, tree) = planted();
        let path = trajectory(&tree, 4);
        let mut animation = FallAnimation::start(SessionId(1), &tree, path.clone(), &mut world).unwrap();
        animation.advance(&mut world);
        animation.advance(&mut world);

        for fake in animation.fakes() {
            let moved = world.fake(fake.handle).unwrap().transform;
            let expected = path.center_at(fake.origin, 2) - (fake.origin.as_vec3() + Vec3::splat(0.5));
            assert!((moved.translation - expected).length() < 1e-4);
            assert_eq!(moved.rotation, path.rotation_at(2));
        }
    }

    #[test]
    fn test_abort_mid_animation_restores_everything() {
        let (mut world, tree) = planted();
        let mut animation = FallAnimation::start(SessionId(1), &tree, trajectory(&tree, 10), &mut world).unwrap();
        for _ in 0..4 {
            animation.advance(&mut world);
        }

        assert_eq!(animation.abort(&mut world), 6);
        assert_eq!(animation.state(), FallState::Dropped);
        assert_eq!(world.fake_count(), 0);
        assert_eq!(world.count_of(&LOG), 4);
        assert_eq!(world.count_of(&LEAF), 2);
        assert!(world.drops().is_empty());

        // A second abort is a no-op
        assert_eq!(animation.abort(&mut world), 0);
        assert_eq!(world.block_count(), 6);
    }

    #[test]
    fn test_abort_after_settle_restores_without_stand_ins() {
        let (mut world, tree) = planted();
        let mut animation = FallAnimation::start(SessionId(1), &tree, trajectory(&tree, 1), &mut world).unwrap();
        animation.advance(&mut world);
        assert_eq!(animation.advance(&mut world), FallState::Settled);

        assert_eq!(animation.abort(&mut world), 6);
        assert_eq!(world.block_count(), 6);
        assert!(world.drops().is_empty());
    }

    #[test]
    fn test_abort_drops_when_spot_taken() {
        let (mut world, tree) = planted();
        let mut animation = FallAnimation::start(SessionId(1), &tree, trajectory(&tree, 5), &mut world).unwrap();
        let stone = BlockTag::from_static("minecraft:stone");
        world.set(BASE.offset(0, 1, 0), stone.clone());

        assert_eq!(animation.abort(&mut world), 5);
        assert_eq!(world.block_tag(BASE.offset(0, 1, 0)), stone);
        assert_eq!(world.count_of(&LOG), 3);
        assert_eq!(world.dropped_count(&LOG), 1);
    }

    #[test]
    fn test_abort_after_drop_is_noop() {
        let (mut world, tree) = planted();
        let mut animation = FallAnimation::start(SessionId(1), &tree, trajectory(&tree, 1), &mut world).unwrap();
        while !animation.is_terminal() {
            animation.advance(&mut world);
        }
        assert_eq!(animation.abort(&mut world), 0);
        assert_eq!(world.block_count(), 0);
        assert_eq!(world.dropped_count(&LOG), 4);
    }

    #[test]
    fn test_spawn_failure_rolls_back() {
        let (mut world, tree) = planted();
        world.limit_fakes(3);

        let result = FallAnimation::start(SessionId(1), &tree, trajectory(&tree, 5), &mut world);
        assert!(matches!(result, Err(Error::WorldMutation { .. })));
        assert_eq!(world.fake_count(), 0);
        assert_eq!(world.block_count(), 6);
    }

    #[test]
    fn test_protected_block_rolls_back() {
        let (mut world, tree) = planted();
        world.protect(BASE.offset(0, 4, 0));

        let result = FallAnimation::start(SessionId(1), &tree, trajectory(&tree, 5), &mut world);
        assert!(matches!(result, Err(Error::WorldMutation { .. })));
        assert_eq!(world.fake_count(), 0);
        assert_eq!(world.count_of(&LOG), 4);
        assert_eq!(world.count_of(&LEAF), 2);
        assert!(world.drops().is_empty());
    }

    #[test]
    fn test_instant_fell() {
        let (mut world, tree) = planted();
        let mut animation =
            FallAnimation::start_instant(SessionId(1), &tree, trajectory(&tree, 5), &mut world).unwrap();
        assert_eq!(animation.state(), FallState::Settled);
        assert_eq!(world.fake_count(), 0);
        assert_eq!(world.block_count(), 0);

        assert_eq!(animation.advance(&mut world), FallState::Dropped);
        assert_eq!(world.dropped_count(&LOG), 4);
        // Drops stay where the logs stood
        let top = BASE.offset(0, 3, 0).as_vec3() + Vec3::splat(0.5);
        assert!(world.drops().iter().any(|(at, _)| (*at - top).length() < 1e-4));
    }
}
