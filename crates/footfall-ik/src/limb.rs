//! Analytic two-bone solver bound to one limb of a rig.
//!
//! The upper segment is swung away from the root→target line by the angle
//! the law of cosines gives for the current distance, inside the plane
//! spanned by the target and the hint pole. The lower segment is then
//! aimed straight at the target, which it reaches exactly because the
//! triangle closes.

use std::fmt::Debug;

use nalgebra::{Unit, UnitQuaternion, Vector3};
use tracing::debug;

use footfall_core::math::{self, EPSILON};
use footfall_core::{LimbJoints, Pose, PoseRig, RigError};

use crate::smoothing::TargetPair;

/// Segments shorter than this are rejected when binding a limb.
pub const MIN_SEGMENT_LENGTH: f32 = 1e-4;

// ---------------------------------------------------------------------------
// LimbLengths
// ---------------------------------------------------------------------------

/// Segment lengths measured once from the bind pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimbLengths {
    upper: f32,
    lower: f32,
    total: f32,
    /// `upper² - lower²`
    length_sq_diff: f32,
    /// `2 * upper`
    double_upper: f32,
}

impl LimbLengths {
    /// # Errors
    ///
    /// Fails when either segment is shorter than [`MIN_SEGMENT_LENGTH`] or
    /// not finite.
    pub fn new(upper: f32, lower: f32) -> Result<Self, RigError> {
        check_segment("upper", upper)?;
        check_segment("lower", lower)?;
        Ok(Self {
            upper,
            lower,
            total: upper + lower,
            length_sq_diff: upper * upper - lower * lower,
            double_upper: 2.0 * upper,
        })
    }

    #[must_use]
    pub const fn upper(&self) -> f32 {
        self.upper
    }

    #[must_use]
    pub const fn lower(&self) -> f32 {
        self.lower
    }

    /// Maximum reach of the limb.
    #[must_use]
    pub const fn total(&self) -> f32 {
        self.total
    }

    /// Angle in degrees between root→target and the upper segment for a
    /// target `distance` away from the root.
    ///
    /// `None` when the target is at or beyond full reach, or so close to
    /// the root that the direction is undefined. Targets nearer than
    /// `|upper - lower|` clamp to 0° or 180°.
    #[must_use]
    pub fn bend_angle(&self, distance: f32) -> Option<f32> {
        if !(distance >= EPSILON && distance < self.total) {
            return None;
        }
        let cos = (distance * distance + self.length_sq_diff) / (self.double_upper * distance);
        Some(cos.clamp(-1.0, 1.0).acos().to_degrees())
    }
}

fn check_segment(segment: &'static str, length: f32) -> Result<(), RigError> {
    if length.is_finite() && length >= MIN_SEGMENT_LENGTH {
        Ok(())
    } else {
        Err(RigError::DegenerateSegment { segment, length })
    }
}

// ---------------------------------------------------------------------------
// SolveOutcome
// ---------------------------------------------------------------------------

/// What [`Limb::apply_ik`] did this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveOutcome {
    /// Joint rotations were written.
    Applied {
        /// Upper-segment bend in degrees.
        bend_angle: f32,
    },
    /// The smoothed target was out of reach; the limb was left untouched.
    Unreachable { distance: f32, reach: f32 },
}

impl SolveOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

// ---------------------------------------------------------------------------
// Limb
// ---------------------------------------------------------------------------

/// One two-segment limb with its targets.
#[derive(Debug, Clone)]
pub struct Limb<J> {
    joints: LimbJoints<J>,
    lengths: LimbLengths,
    /// `body⁻¹ · tip` at bind time.
    rotation_offset: UnitQuaternion<f32>,
    target: TargetPair,
    ground_height: Option<f32>,
}

impl<J: Copy + Eq + Debug> Limb<J> {
    /// Bind to `joints` in the rig's current pose.
    ///
    /// `body_rotation` is the character's world rotation at bind time. Both
    /// targets start at the tip's pose.
    ///
    /// # Errors
    ///
    /// Fails when a segment is degenerate.
    pub fn new<R>(
        rig: &R,
        joints: LimbJoints<J>,
        body_rotation: UnitQuaternion<f32>,
    ) -> Result<Self, RigError>
    where
        R: PoseRig<Joint = J>,
    {
        let root = rig.world_position(joints.root);
        let mid = rig.world_position(joints.mid);
        let tip = rig.world_pose(joints.tip);
        let lengths = LimbLengths::new((mid - root).norm(), (tip.position - mid).norm())?;
        let rotation_offset = body_rotation.inverse() * tip.rotation;

        let mut limb = Self {
            joints,
            lengths,
            rotation_offset,
            target: TargetPair::new(tip),
            ground_height: None,
        };
        limb.reset_target(rig);
        limb.target.snap();
        Ok(limb)
    }

    #[must_use]
    pub const fn joints(&self) -> &LimbJoints<J> {
        &self.joints
    }

    #[must_use]
    pub const fn lengths(&self) -> &LimbLengths {
        &self.lengths
    }

    #[must_use]
    pub const fn rotation_offset(&self) -> UnitQuaternion<f32> {
        self.rotation_offset
    }

    /// Raw target written by the resolver.
    #[must_use]
    pub const fn target(&self) -> &Pose {
        self.target.raw()
    }

    /// Smoothed target the solver aims for.
    #[must_use]
    pub const fn smoothed_target(&self) -> &Pose {
        self.target.smoothed()
    }

    #[must_use]
    pub const fn targets(&self) -> &TargetPair {
        &self.target
    }

    pub fn set_target(&mut self, pose: Pose) {
        self.target.set_raw(pose);
    }

    pub fn set_target_position(&mut self, position: Vector3<f32>) {
        self.target.set_raw_position(position);
    }

    pub fn smooth_target(&mut self, rate: f32) {
        self.target.smooth(rate);
    }

    /// Height of the last ground hit under this limb, if any was seen.
    #[must_use]
    pub const fn ground_height(&self) -> Option<f32> {
        self.ground_height
    }

    pub fn record_ground_height(&mut self, height: f32) {
        self.ground_height = Some(height);
    }

    /// Tip world rotation with the bind offset removed.
    pub fn body_aligned_tip_rotation<R>(&self, rig: &R) -> UnitQuaternion<f32>
    where
        R: PoseRig<Joint = J>,
    {
        rig.world_rotation(self.joints.tip) * self.rotation_offset.inverse()
    }

    /// Forward direction of the tip in the body-aligned frame.
    pub fn tip_forward<R>(&self, rig: &R) -> Vector3<f32>
    where
        R: PoseRig<Joint = J>,
    {
        self.body_aligned_tip_rotation(rig) * math::forward()
    }

    /// Point the raw target at the tip's current pose.
    pub fn reset_target<R>(&mut self, rig: &R)
    where
        R: PoseRig<Joint = J>,
    {
        let position = rig.world_position(self.joints.tip);
        let rotation = self.body_aligned_tip_rotation(rig);
        self.target.set_raw(Pose::new(position, rotation));
    }

    /// Bend angle for the current smoothed target, `None` if unreachable.
    pub fn bend_angle<R>(&self, rig: &R) -> Option<f32>
    where
        R: PoseRig<Joint = J>,
    {
        let root = rig.world_position(self.joints.root);
        self.lengths
            .bend_angle((self.smoothed_target().position - root).norm())
    }

    /// Rotate root, mid and tip so the tip lands on the smoothed target.
    ///
    /// With `control_rotation` the tip takes the smoothed orientation,
    /// otherwise it keeps the world rotation it had before the solve.
    pub fn apply_ik<R>(&self, rig: &mut R, control_rotation: bool) -> SolveOutcome
    where
        R: PoseRig<Joint = J>,
    {
        let target = *self.smoothed_target();
        let root = rig.world_position(self.joints.root);
        let to_target = target.position - root;
        let distance = to_target.norm();

        let Some(bend_angle) = self.lengths.bend_angle(distance) else {
            debug!(
                joint = ?self.joints.tip,
                distance,
                reach = self.lengths.total,
                "IK target out of reach"
            );
            return SolveOutcome::Unreachable {
                distance,
                reach: self.lengths.total,
            };
        };

        let tip_rotation = rig.world_rotation(self.joints.tip);
        let target_dir = to_target / distance;

        // Upper segment.
        let current_upper = rig.world_position(self.joints.mid) - root;
        let hint_dir = rig.world_position(self.joints.hint) - root;
        let axis = bend_axis(&target_dir, &hint_dir)
            .or_else(|| bend_axis(&target_dir, &current_upper));
        let new_upper = axis.map_or(target_dir, |axis| {
            UnitQuaternion::from_axis_angle(&axis, bend_angle.to_radians()) * target_dir
        });
        let root_rotation = rig.world_rotation(self.joints.root);
        rig.set_world_rotation(
            self.joints.root,
            math::from_to_rotation(&current_upper, &new_upper) * root_rotation,
        );

        // Lower segment.
        let mid = rig.world_pose(self.joints.mid);
        let tip = rig.world_position(self.joints.tip);
        rig.set_world_rotation(
            self.joints.mid,
            math::from_to_rotation(&(tip - mid.position), &(target.position - mid.position))
                * mid.rotation,
        );

        let tip_rotation = if control_rotation {
            target.rotation * self.rotation_offset
        } else {
            tip_rotation
        };
        rig.set_world_rotation(self.joints.tip, tip_rotation);

        SolveOutcome::Applied { bend_angle }
    }
}

/// Normal of the plane through `target_dir` and `other`, `None` if they
/// are (nearly) collinear.
fn bend_axis(target_dir: &Vector3<f32>, other: &Vector3<f32>) -> Option<Unit<Vector3<f32>>> {
    let other = other.try_normalize(EPSILON)?;
    Unit::try_new(target_dir.cross(&other), 1e-4)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
