use std::fmt::Debug;

use nalgebra::{UnitQuaternion, Vector3};

use crate::types::{Foot, GroundHit, GroundProbe, Pose};

// ---------------------------------------------------------------------------
// PoseRig
// ---------------------------------------------------------------------------

/// A transform hierarchy the solver can read and write.
///
/// Implemented once per host backend (a standalone skeleton, an engine's
/// transform components, ...). All poses are world space. Writing a joint
/// must move its descendants with it.
pub trait PoseRig {
    /// Handle identifying one joint.
    type Joint: Copy + Eq + Debug;

    /// World position and rotation of `joint`.
    fn world_pose(&self, joint: Self::Joint) -> Pose;

    /// Set the world rotation of `joint`, keeping its world position.
    fn set_world_rotation(&mut self, joint: Self::Joint, rotation: UnitQuaternion<f32>);

    /// Move `joint` (and its descendants) by `offset` in world space.
    fn translate(&mut self, joint: Self::Joint, offset: Vector3<f32>);

    /// World position of `joint`.
    fn world_position(&self, joint: Self::Joint) -> Vector3<f32> {
        self.world_pose(joint).position
    }

    /// World rotation of `joint`.
    fn world_rotation(&self, joint: Self::Joint) -> UnitQuaternion<f32> {
        self.world_pose(joint).rotation
    }
}

// ---------------------------------------------------------------------------
// GroundQuery
// ---------------------------------------------------------------------------

/// Scene query backend used to find the surface beneath a foot.
///
/// Must return the first surface the probe sphere touches. `None` is a
/// normal outcome, not an error.
pub trait GroundQuery {
    fn probe(&self, probe: &GroundProbe) -> Option<GroundHit>;
}

impl<T: GroundQuery + ?Sized> GroundQuery for &T {
    fn probe(&self, probe: &GroundProbe) -> Option<GroundHit> {
        (**self).probe(probe)
    }
}

impl<T: GroundQuery + ?Sized> GroundQuery for Box<T> {
    fn probe(&self, probe: &GroundProbe) -> Option<GroundHit> {
        (**self).probe(probe)
    }
}

// ---------------------------------------------------------------------------
// HeightCollider
// ---------------------------------------------------------------------------

/// Character collider whose center can be moved vertically.
pub trait HeightCollider {
    /// Center in the character's local space.
    fn center(&self) -> Vector3<f32>;

    fn set_center(&mut self, center: Vector3<f32>);
}

// ---------------------------------------------------------------------------
// PlacementObserver
// ---------------------------------------------------------------------------

/// Hook for debug layers. Called on every probe and every resolved target.
///
/// All methods default to doing nothing.
pub trait PlacementObserver {
    /// A probe was issued for `foot`. `hit` is `None` when nothing was found.
    fn on_ground_probe(&mut self, _foot: Foot, _probe: &GroundProbe, _hit: Option<&GroundHit>) {}

    /// A raw target was derived from a ground hit.
    ///
    /// `foot_forward` is the body-aligned forward of the foot and
    /// `ground_forward` its projection on the ground plane.
    fn on_target_resolved(
        &mut self,
        _foot: Foot,
        _target: &Pose,
        _foot_forward: &Vector3<f32>,
        _ground_forward: &Vector3<f32>,
    ) {
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PlacementObserver for NoopObserver {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
