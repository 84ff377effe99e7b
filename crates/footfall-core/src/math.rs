//! Small vector/rotation helpers used by the solver and the target resolver.
//!
//! Conventions: +Y is up, +Z is forward in a body-aligned frame.

use nalgebra::{Unit, UnitQuaternion, Vector3};

/// Vectors shorter than this are treated as zero-length.
pub const EPSILON: f32 = 1e-6;

/// World up.
#[must_use]
pub fn up() -> Vector3<f32> {
    Vector3::y()
}

/// Body-aligned forward axis.
#[must_use]
pub fn forward() -> Vector3<f32> {
    Vector3::z()
}

/// Remove the component of `v` along `normal`.
#[must_use]
pub fn project_on_plane(v: &Vector3<f32>, normal: &Unit<Vector3<f32>>) -> Vector3<f32> {
    let n = normal.into_inner();
    v - n * v.dot(&n)
}

/// Minimal rotation taking direction `from` onto direction `to`.
///
/// Opposite directions rotate half a turn about any axis perpendicular to
/// `from`. Zero-length inputs give the identity.
#[must_use]
pub fn from_to_rotation(from: &Vector3<f32>, to: &Vector3<f32>) -> UnitQuaternion<f32> {
    if from.norm() < EPSILON || to.norm() < EPSILON {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::rotation_between(from, to).unwrap_or_else(|| {
        let axis = any_perpendicular(from);
        UnitQuaternion::from_axis_angle(&axis, std::f32::consts::PI)
    })
}

/// Some unit vector perpendicular to `v`.
#[must_use]
pub fn any_perpendicular(v: &Vector3<f32>) -> Unit<Vector3<f32>> {
    let candidate = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    Unit::try_new(v.cross(&candidate), EPSILON).unwrap_or_else(Vector3::z_axis)
}

/// Rotation whose +Z looks along `forward` and whose +Y is as close to `up`
/// as possible.
///
/// Returns `None` when `forward` is zero or parallel to `up`.
#[must_use]
pub fn look_rotation(forward: &Vector3<f32>, up: &Vector3<f32>) -> Option<UnitQuaternion<f32>> {
    if forward.norm() < EPSILON || forward.cross(up).norm() < EPSILON {
        return None;
    }
    Some(UnitQuaternion::face_towards(forward, up))
}
