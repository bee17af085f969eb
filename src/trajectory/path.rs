//! Rotation schedule of a falling tree around its base

use crate::core::types::{Quat, Vec3};
use crate::detect::DetectedTree;
use crate::trajectory::easing::ease_in;
use crate::voxel::{BlockSource, Face, VoxelPos};

/// Time-parameterized rotation of a tree about a horizontal hinge at its base.
///
/// Step 0 is upright; the final step is leaned over by `max_angle` towards
/// `fall_direction`.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    /// Struck voxel; rotation happens around the center of its bottom face
    pub pivot: VoxelPos,
    /// Horizontal direction the top of the tree travels
    pub fall_direction: Face,
    /// Unit hinge axis; rotating +Y about it by a positive angle leans towards `fall_direction`
    pub axis: Vec3,
    /// Final lean in radians
    pub max_angle: f32,
    pub steps: u32,
}

impl Trajectory {
    /// Trajectory for a tree struck on `tree.strike_face`.
    pub fn compute(tree: &DetectedTree, max_angle: f32, steps: u32) -> Self {
        Self::new(tree.origin, tree.strike_face, max_angle, steps)
    }

    pub fn new(pivot: VoxelPos, strike_face: Face, max_angle: f32, steps: u32) -> Self {
        let fall_direction = Self::fall_direction_for(strike_face);
        let axis = Vec3::Y.cross(fall_direction.normal().as_vec3()).normalize();
        Self {
            pivot,
            fall_direction,
            axis,
            max_angle,
            steps: steps.max(1),
        }
    }

    /// Trees topple away from the face that was struck. Top and bottom
    /// strikes have no horizontal side; they fall south.
    pub fn fall_direction_for(strike_face: Face) -> Face {
        if strike_face.is_horizontal() {
            strike_face.opposite()
        } else {
            Face::South
        }
    }

    /// World-space hinge point
    pub fn pivot_point(&self) -> Vec3 {
        self.pivot.as_vec3() + Vec3::new(0.5, 0.0, 0.5)
    }

    /// Lean after `step` steps, eased in and capped at `max_angle`
    pub fn angle_at(&self, step: u32) -> f32 {
        let t = step.min(self.steps) as f32 / self.steps as f32;
        self.max_angle * ease_in(t)
    }

    pub fn rotation_at(&self, step: u32) -> Quat {
        Quat::from_axis_angle(self.axis, self.angle_at(step))
    }

    /// Rotate an offset from the pivot to where it is after `step` steps
    pub fn offset_at(&self, offset: Vec3, step: u32) -> Vec3 {
        self.rotation_at(step) * offset
    }

    /// Offset of a block's center from the pivot point
    pub fn initial_offset(&self, pos: VoxelPos) -> Vec3 {
        pos.as_vec3() + Vec3::splat(0.5) - self.pivot_point()
    }

    /// World-space center of the block at `pos` after `step` steps
    pub fn center_at(&self, pos: VoxelPos, step: u32) -> Vec3 {
        self.pivot_point() + self.offset_at(self.initial_offset(pos), step)
    }

    /// Whether something outside the tree blocks the fall right next to the
    /// pivot. Foliage of the same species does not count.
    pub fn is_obstructed<S: BlockSource + ?Sized>(&self, tree: &DetectedTree, world: &S) -> bool {
        let beside = self.pivot.step(self.fall_direction);
        (0..=1).any(|dy| {
            let pos = beside.offset(0, dy, 0);
            if tree.contains(pos) {
                return false;
            }
            let tag = world.block_tag(pos);
            !tag.is_air() && !tree.species.is_leaf(&tag)
        })
    }
}
