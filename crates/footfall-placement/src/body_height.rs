//! Raising the body when the feet stand at different heights.
//!
//! The reconciler tracks the height gap between the two feet, scaled by the
//! configured sensitivity, and eases an offset toward it. The character root
//! is moved up by each change of that offset and the collider center is set
//! to its original position plus the offset.

use nalgebra::Vector3;
use tracing::warn;

use footfall_core::{HeightCollider, PoseRig};

/// Sensitivities at or below this leave the body height alone.
pub const MIN_ACTIVE_SENSITIVITY: f32 = 0.1;

/// Result of one [`BodyHeightReconciler::adjust`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightAdjustment {
    /// Smoothed offset after this tick.
    pub offset: f32,
    /// Vertical displacement applied to the root this tick.
    pub root_delta: f32,
}

/// Smoothed body offset driven by the ground height difference of both
/// feet.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyHeightReconciler {
    sensitivity: f32,
    offset: f32,
    original_center: Vector3<f32>,
}

impl BodyHeightReconciler {
    /// Capture the collider's resting center.
    ///
    /// Without a collider the reconciler stays disabled for its whole
    /// lifetime.
    #[must_use]
    pub fn new(sensitivity: f32, collider: Option<&dyn HeightCollider>) -> Self {
        match collider {
            Some(collider) => Self {
                sensitivity,
                offset: 0.0,
                original_center: collider.center(),
            },
            None => {
                warn!("No height-adjustable collider, body height adjustment disabled");
                Self {
                    sensitivity: 0.0,
                    offset: 0.0,
                    original_center: Vector3::zeros(),
                }
            }
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.sensitivity > MIN_ACTIVE_SENSITIVITY
    }

    #[must_use]
    pub const fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Current smoothed offset.
    #[must_use]
    pub const fn offset(&self) -> f32 {
        self.offset
    }

    #[must_use]
    pub const fn original_center(&self) -> Vector3<f32> {
        self.original_center
    }

    /// Advance the smoothed offset by one tick without touching the scene.
    ///
    /// The offset moves toward `|left - right| * sensitivity` by `dt`,
    /// clamped to `[0, 1]`. A foot that has never seen ground counts as no
    /// height difference.
    pub fn step(&mut self, left: Option<f32>, right: Option<f32>, dt: f32) -> HeightAdjustment {
        let goal = match (left, right) {
            (Some(left), Some(right)) => (left - right).abs() * self.sensitivity,
            _ => 0.0,
        };
        let t = if dt.is_finite() { dt.clamp(0.0, 1.0) } else { 0.0 };
        let next = self.offset + (goal - self.offset) * t;
        let root_delta = next - self.offset;
        self.offset = next;
        HeightAdjustment {
            offset: next,
            root_delta,
        }
    }

    /// Step and apply: move `root` by the change in offset and re-center
    /// the collider.
    pub fn adjust<R>(
        &mut self,
        rig: &mut R,
        root: R::Joint,
        collider: Option<&mut dyn HeightCollider>,
        left: Option<f32>,
        right: Option<f32>,
        dt: f32,
    ) -> HeightAdjustment
    where
        R: PoseRig,
    {
        let adjustment = self.step(left, right, dt);
        rig.translate(root, Vector3::new(0.0, adjustment.root_delta, 0.0));
        if let Some(collider) = collider {
            collider.set_center(self.original_center + Vector3::new(0.0, adjustment.offset, 0.0));
        }
        adjustment
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
