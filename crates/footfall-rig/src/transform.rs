//! Bevy `Transform` hierarchies as a [`PoseRig`].
//!
//! World poses are composed from local [`Transform`]s by walking
//! [`ChildOf`] links, so writes made during the solve are visible to the
//! next read in the same system (no need to wait for transform
//! propagation).

use bevy::prelude::*;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use footfall_core::{Pose, PoseRig, RigError};

/// Query the [`TransformRig`] reads and writes through.
pub type RigQuery<'w, 's> = Query<'w, 's, (&'static mut Transform, Option<&'static ChildOf>)>;

/// Rig view over entities with a [`Transform`].
///
/// Missing entities read as the identity pose and ignore writes. Check
/// joints up front with [`require`](Self::require).
pub struct TransformRig<'a, 'w, 's> {
    query: &'a mut RigQuery<'w, 's>,
}

impl<'a, 'w, 's> TransformRig<'a, 'w, 's> {
    pub fn new(query: &'a mut RigQuery<'w, 's>) -> Self {
        Self { query }
    }

    /// Whether `entity` can be used as a joint.
    pub fn contains(&self, entity: Entity) -> bool {
        self.query.get(entity).is_ok()
    }

    /// # Errors
    ///
    /// [`RigError::MissingJoint`] if `entity` has no `Transform`.
    pub fn require(&self, entity: Entity) -> Result<(), RigError> {
        if self.contains(entity) {
            Ok(())
        } else {
            Err(RigError::MissingJoint(entity.to_string()))
        }
    }

    fn world_transform(&self, entity: Entity) -> Transform {
        let Ok((local, parent)) = self.query.get(entity) else {
            return Transform::IDENTITY;
        };
        let mut world = *local;
        let mut current = parent.map(ChildOf::parent);
        while let Some(ancestor) = current {
            let Ok((ancestor_local, ancestor_parent)) = self.query.get(ancestor) else {
                break;
            };
            world = ancestor_local.mul_transform(world);
            current = ancestor_parent.map(ChildOf::parent);
        }
        world
    }

    fn parent_world(&self, entity: Entity) -> Transform {
        self.query
            .get(entity)
            .ok()
            .and_then(|(_, parent)| parent.map(ChildOf::parent))
            .map_or(Transform::IDENTITY, |parent| self.world_transform(parent))
    }
}

impl PoseRig for TransformRig<'_, '_, '_> {
    type Joint = Entity;

    fn world_pose(&self, joint: Entity) -> Pose {
        let world = self.world_transform(joint);
        Pose::new(vec3_to_na(world.translation), quat_to_na(world.rotation))
    }

    fn set_world_rotation(&mut self, joint: Entity, rotation: UnitQuaternion<f32>) {
        let parent_rotation = self.parent_world(joint).rotation;
        if let Ok((mut local, _)) = self.query.get_mut(joint) {
            local.rotation = (parent_rotation.inverse() * quat_from_na(&rotation)).normalize();
        }
    }

    fn translate(&mut self, joint: Entity, offset: Vector3<f32>) {
        let parent = self.parent_world(joint);
        let local_offset = (parent.rotation.inverse() * vec3_from_na(&offset)) / parent.scale;
        if let Ok((mut local, _)) = self.query.get_mut(joint) {
            local.translation += local_offset;
        }
    }
}

// ---------------------------------------------------------------------------
// glam <-> nalgebra
// ---------------------------------------------------------------------------

#[must_use]
pub fn vec3_to_na(v: Vec3) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

#[must_use]
pub fn vec3_from_na(v: &Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[must_use]
pub fn quat_to_na(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z))
}

#[must_use]
pub fn quat_from_na(q: &UnitQuaternion<f32>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
