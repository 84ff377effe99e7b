//! Ready-made biped rigs for demos and tests.

use nalgebra::Vector3;

use footfall_core::{LimbJoints, Pose, RigError};

use crate::skeleton::{BoneId, Skeleton};

/// Proportions of a standing biped in its bind pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BipedDimensions {
    /// Height of the hip joints above the character origin.
    pub hip_height: f32,
    /// Lateral distance between the two hip joints.
    pub hip_width: f32,
    /// Hip to knee.
    pub thigh_length: f32,
    /// Knee to ankle.
    pub calf_length: f32,
    /// How far in front of the knee the bend hint sits.
    pub knee_hint_distance: f32,
}

impl Default for BipedDimensions {
    fn default() -> Self {
        Self {
            hip_height: 1.0,
            hip_width: 0.2,
            thigh_length: 0.45,
            calf_length: 0.45,
            knee_hint_distance: 0.5,
        }
    }
}

/// A biped skeleton plus the joint handles foot placement needs.
#[derive(Debug, Clone)]
pub struct BipedRig {
    pub skeleton: Skeleton,
    /// Character root, sits on the ground between the feet.
    pub body: BoneId,
    pub hips: BoneId,
    pub left: LimbJoints<BoneId>,
    pub right: LimbJoints<BoneId>,
}

impl BipedRig {
    /// Limb handles for `foot`.
    #[must_use]
    pub const fn limb(&self, foot: footfall_core::Foot) -> LimbJoints<BoneId> {
        match foot {
            footfall_core::Foot::Left => self.left,
            footfall_core::Foot::Right => self.right,
        }
    }
}

/// Build a biped standing at the origin, facing +Z, with straight legs.
///
/// Bone names: `body`, `hips`, and per side (`left_` / `right_` prefix)
/// `thigh`, `calf`, `foot`, `knee_hint`. The ankle (`foot`) ends up at
/// `hip_height - thigh_length - calf_length`.
///
/// # Errors
///
/// Never fails for a fresh skeleton. The `Result` covers bone insertion.
pub fn biped(dims: BipedDimensions) -> Result<BipedRig, RigError> {
    let mut skeleton = Skeleton::new();
    let body = skeleton.add_bone("body", None, Pose::identity())?;
    let hips = skeleton.add_bone(
        "hips",
        Some(body),
        Pose::from_position(Vector3::new(0.0, dims.hip_height, 0.0)),
    )?;

    let half_width = dims.hip_width * 0.5;
    let left = add_leg(&mut skeleton, "left", body, hips, half_width, &dims)?;
    let right = add_leg(&mut skeleton, "right", body, hips, -half_width, &dims)?;

    Ok(BipedRig {
        skeleton,
        body,
        hips,
        left,
        right,
    })
}

fn add_leg(
    skeleton: &mut Skeleton,
    side: &str,
    body: BoneId,
    hips: BoneId,
    x: f32,
    dims: &BipedDimensions,
) -> Result<LimbJoints<BoneId>, RigError> {
    let thigh = skeleton.add_bone(
        format!("{side}_thigh"),
        Some(hips),
        Pose::from_position(Vector3::new(x, 0.0, 0.0)),
    )?;
    let calf = skeleton.add_bone(
        format!("{side}_calf"),
        Some(thigh),
        Pose::from_position(Vector3::new(0.0, -dims.thigh_length, 0.0)),
    )?;
    let foot = skeleton.add_bone(
        format!("{side}_foot"),
        Some(calf),
        Pose::from_position(Vector3::new(0.0, -dims.calf_length, 0.0)),
    )?;
    let knee_hint = skeleton.add_bone(
        format!("{side}_knee_hint"),
        Some(body),
        Pose::from_position(Vector3::new(
            x,
            dims.hip_height - dims.thigh_length,
            dims.knee_hint_distance,
        )),
    )?;
    Ok(LimbJoints::new(thigh, calf, foot, knee_hint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use footfall_core::{Foot, PoseRig};

    #[test]
    fn default_biped_layout() {
        let rig = biped(BipedDimensions::default()).unwrap();
        let s = &rig.skeleton;

        assert_relative_eq!(s.world_position(rig.hips).y, 1.0);
        assert_relative_eq!(s.world_position(rig.left.root).x, 0.1);
        assert_relative_eq!(s.world_position(rig.right.root).x, -0.1);
        assert_relative_eq!(s.world_position(rig.left.mid).y, 0.55, epsilon = 1e-6);
        assert_relative_eq!(s.world_position(rig.left.tip).y, 0.1, epsilon = 1e-6);
        assert_relative_eq!(s.world_position(rig.left.hint).z, 0.5);
    }

    #[test]
    fn bones_are_named() {
        let rig = biped(BipedDimensions::default()).unwrap();
        assert_eq!(rig.skeleton.bone("left_foot").unwrap(), rig.left.tip);
        assert_eq!(rig.skeleton.bone("right_knee_hint").unwrap(), rig.right.hint);
        assert_eq!(rig.limb(Foot::Left), rig.left);
        assert_eq!(rig.limb(Foot::Right), rig.right);
    }

    #[test]
    fn moving_body_moves_feet() {
        let mut rig = biped(BipedDimensions::default()).unwrap();
        rig.skeleton.translate(rig.body, Vector3::new(0.0, 0.3, 0.0));
        assert_relative_eq!(
            rig.skeleton.world_position(rig.right.tip).y,
            0.4,
            epsilon = 1e-6
        );
    }
}
