//! Raw and smoothed target poses.

use nalgebra::Vector3;

use footfall_core::Pose;

/// A target the resolver writes every tick and the smoothed copy the solver
/// reads.
///
/// Smoothing is a fixed fraction per tick, so the convergence speed depends
/// on the frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPair {
    raw: Pose,
    smoothed: Pose,
}

impl TargetPair {
    /// Both poses start at `pose`.
    #[must_use]
    pub const fn new(pose: Pose) -> Self {
        Self {
            raw: pose,
            smoothed: pose,
        }
    }

    #[must_use]
    pub const fn raw(&self) -> &Pose {
        &self.raw
    }

    #[must_use]
    pub const fn smoothed(&self) -> &Pose {
        &self.smoothed
    }

    /// Replace the raw target. The smoothed target is untouched.
    pub fn set_raw(&mut self, pose: Pose) {
        self.raw = pose;
    }

    /// Replace only the raw position, keeping the raw orientation.
    pub fn set_raw_position(&mut self, position: Vector3<f32>) {
        self.raw.position = position;
    }

    /// Move the smoothed target toward the raw one by `rate` in `[0, 1]`.
    ///
    /// Rate 1 copies the raw target, rate 0 leaves the smoothed target as is.
    pub fn smooth(&mut self, rate: f32) {
        self.smoothed = self.smoothed.lerp(&self.raw, rate);
    }

    /// Make the smoothed target equal to the raw one.
    pub fn snap(&mut self) {
        self.smoothed = self.raw;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    fn raw_pose() -> Pose {
        Pose::new(
            Vector3::new(0.3, -0.2, 1.1),
            UnitQuaternion::from_euler_angles(0.2, -0.4, 0.9),
        )
    }

    #[test]
    fn rate_one_copies_raw_exactly() {
        let mut pair = TargetPair::new(Pose::identity());
        pair.set_raw(raw_pose());
        pair.smooth(1.0);
        assert_eq!(*pair.smoothed(), raw_pose());
    }

    #[test]
    fn rate_zero_is_invariant() {
        let start = Pose::from_position(Vector3::new(1.0, 2.0, 3.0));
        let mut pair = TargetPair::new(start);
        pair.set_raw(raw_pose());
        for _ in 0..10 {
            pair.smooth(0.0);
        }
        assert_eq!(*pair.smoothed(), start);
        assert_eq!(*pair.raw(), raw_pose());
    }

    #[test]
    fn half_rate_converges() {
        let mut pair = TargetPair::new(Pose::identity());
        pair.set_raw_position(Vector3::new(0.0, 1.0, 0.0));

        pair.smooth(0.5);
        assert_relative_eq!(pair.smoothed().position.y, 0.5, epsilon = 1e-6);
        pair.smooth(0.5);
        assert_relative_eq!(pair.smoothed().position.y, 0.75, epsilon = 1e-6);

        for _ in 0..30 {
            pair.smooth(0.5);
        }
        assert_relative_eq!(pair.smoothed().position.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn set_raw_position_keeps_orientation() {
        let mut pair = TargetPair::new(raw_pose());
        pair.set_raw_position(Vector3::zeros());
        assert_eq!(pair.raw().rotation, raw_pose().rotation);
        assert_eq!(pair.raw().position, Vector3::zeros());
    }

    #[test]
    fn snap_matches_raw() {
        let mut pair = TargetPair::new(Pose::identity());
        pair.set_raw(raw_pose());
        pair.snap();
        assert_eq!(pair.smoothed(), pair.raw());
    }
}
