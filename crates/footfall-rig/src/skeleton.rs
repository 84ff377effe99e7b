//! Standalone bone hierarchy.
//!
//! A [`Skeleton`] stores local poses only. World poses are composed on
//! demand by walking up the parent chain, so writing a bone implicitly moves
//! every descendant.

use std::collections::HashMap;

use nalgebra::{UnitQuaternion, Vector3};

use footfall_core::{Pose, PoseRig, RigError};

/// Index of a bone inside the [`Skeleton`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoneId(usize);

impl BoneId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Bone {
    name: String,
    parent: Option<BoneId>,
    local: Pose,
}

/// Named bone hierarchy with local poses.
///
/// Bones are appended parent-first, so the hierarchy is acyclic by
/// construction.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    names: HashMap<String, BoneId>,
}

impl Skeleton {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bone with a pose relative to `parent` (or to the world when
    /// `parent` is `None`).
    ///
    /// # Errors
    ///
    /// Fails if `parent` does not belong to this skeleton or `name` is taken.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<BoneId>,
        local: Pose,
    ) -> Result<BoneId, RigError> {
        let name = name.into();
        if let Some(parent) = parent {
            if parent.0 >= self.bones.len() {
                return Err(RigError::UnknownParent(parent.0));
            }
        }
        if self.names.contains_key(&name) {
            return Err(RigError::DuplicateBone(name));
        }

        let id = BoneId(self.bones.len());
        self.names.insert(name.clone(), id);
        self.bones.push(Bone {
            name,
            parent,
            local,
        });
        Ok(id)
    }

    /// Append a bone at a world position with the same world rotation as
    /// its parent.
    ///
    /// # Errors
    ///
    /// Same as [`add_bone`](Self::add_bone).
    pub fn add_bone_at(
        &mut self,
        name: impl Into<String>,
        parent: Option<BoneId>,
        world_position: Vector3<f32>,
    ) -> Result<BoneId, RigError> {
        let local_position = match parent {
            Some(parent) if parent.0 < self.bones.len() => {
                let parent_world = self.world_pose(parent);
                parent_world.rotation.inverse() * (world_position - parent_world.position)
            }
            _ => world_position,
        };
        self.add_bone(name, parent, Pose::from_position(local_position))
    }

    /// Look a bone up by name.
    ///
    /// # Errors
    ///
    /// Returns [`RigError::BoneNotFound`] for unknown names.
    pub fn bone(&self, name: &str) -> Result<BoneId, RigError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| RigError::BoneNotFound(name.to_owned()))
    }

    #[must_use]
    pub fn name(&self, id: BoneId) -> &str {
        &self.bones[id.0].name
    }

    #[must_use]
    pub fn parent(&self, id: BoneId) -> Option<BoneId> {
        self.bones[id.0].parent
    }

    #[must_use]
    pub fn local_pose(&self, id: BoneId) -> Pose {
        self.bones[id.0].local
    }

    /// Overwrite the local pose, e.g. when sampling an animation clip.
    pub fn set_local_pose(&mut self, id: BoneId, local: Pose) {
        self.bones[id.0].local = local;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Iterate over `(id, name)` pairs in insertion order.
    pub fn bones(&self) -> impl Iterator<Item = (BoneId, &str)> {
        self.bones
            .iter()
            .enumerate()
            .map(|(i, bone)| (BoneId(i), bone.name.as_str()))
    }

    fn parent_rotation(&self, id: BoneId) -> UnitQuaternion<f32> {
        self.bones[id.0]
            .parent
            .map_or_else(UnitQuaternion::identity, |parent| {
                self.world_pose(parent).rotation
            })
    }
}

impl PoseRig for Skeleton {
    type Joint = BoneId;

    fn world_pose(&self, joint: BoneId) -> Pose {
        let mut pose = self.bones[joint.0].local;
        let mut current = self.bones[joint.0].parent;
        while let Some(parent) = current {
            let parent_local = self.bones[parent.0].local;
            pose = Pose::new(
                parent_local.position + parent_local.rotation * pose.position,
                parent_local.rotation * pose.rotation,
            );
            current = self.bones[parent.0].parent;
        }
        pose
    }

    fn set_world_rotation(&mut self, joint: BoneId, rotation: UnitQuaternion<f32>) {
        let parent_rotation = self.parent_rotation(joint);
        // Keep stored rotations unit length.
        self.bones[joint.0].local.rotation =
            UnitQuaternion::new_normalize((parent_rotation.inverse() * rotation).into_inner());
    }

    fn translate(&mut self, joint: BoneId, offset: Vector3<f32>) {
        let parent_rotation = self.parent_rotation(joint);
        self.bones[joint.0].local.position += parent_rotation.inverse() * offset;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
