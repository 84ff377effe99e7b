//! Turning a ground probe into a raw foot target.
//!
//! The probe is a sphere swept straight down from above the ankle. On a hit
//! the target is placed so the sole rests on the surface: the contact point
//! is pushed out by the sphere radius along the normal, then lifted by the
//! remaining ankle height measured vertically.

use std::fmt::Debug;

use nalgebra::Vector3;
use tracing::debug;

use footfall_core::math::{self, EPSILON};
use footfall_core::{
    Foot, FootPlacementConfig, GroundHit, GroundProbe, GroundQuery, PlacementObserver, Pose,
    PoseRig,
};
use footfall_ik::Limb;

/// What the resolver found under a foot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// A usable surface was hit and the raw target now rests on it.
    Grounded {
        hit: GroundHit,
        /// Ankle height above the sole used for this target.
        ankle_height: f32,
    },
    /// Nothing within range. The raw target was reset to the tip.
    NoGround,
    /// A surface was hit but is too steep to stand on. Handled like
    /// [`NoGround`](Self::NoGround).
    Degenerate { normal_y: f32 },
}

impl Resolution {
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        matches!(self, Self::Grounded { .. })
    }
}

/// Per-foot ground resolution against a config.
#[derive(Debug, Clone, Copy)]
pub struct TargetResolver<'a> {
    config: &'a FootPlacementConfig,
}

impl<'a> TargetResolver<'a> {
    #[must_use]
    pub const fn new(config: &'a FootPlacementConfig) -> Self {
        Self { config }
    }

    /// Downward probe starting `ray_offset` above `tip`.
    #[must_use]
    pub fn probe_for(&self, tip: Vector3<f32>) -> GroundProbe {
        GroundProbe::down(
            tip + math::up() * self.config.ray_offset,
            self.config.sphere_radius,
            self.config.ray_distance,
            self.config.ground_layers,
        )
    }

    /// Ankle height for a foot pitched between `foot_forward` and its
    /// ground projection.
    ///
    /// Fixed policy returns `ankle_offset`. Dynamic policy blends toward
    /// `foot_length` as the foot tilts away from the ground plane.
    #[must_use]
    pub fn ankle_height(&self, foot_forward: &Vector3<f32>, ground_forward: &Vector3<f32>) -> f32 {
        if !self.config.uses_dynamic_ankle() {
            return self.config.ankle_offset;
        }
        let pitch = if foot_forward.norm() < EPSILON || ground_forward.norm() < EPSILON {
            0.0
        } else {
            ground_forward.angle(foot_forward)
        };
        pitch.cos() * self.config.ankle_offset + pitch.sin() * self.config.foot_length
    }

    /// Ankle position for a sole resting at `hit`.
    ///
    /// Callers must reject near-vertical normals first.
    #[must_use]
    pub fn target_position(&self, hit: &GroundHit, ankle_height: f32) -> Vector3<f32> {
        let radius = self.config.sphere_radius;
        let normal = hit.normal.into_inner();
        hit.point
            + normal * radius
            + Vector3::new(0.0, (ankle_height - radius) / normal.y, 0.0)
    }

    /// Probe under `foot` and write the limb's raw target.
    ///
    /// Orientation is only touched when `control_rotation` is on; it then
    /// looks along the foot's forward projected on the ground, with the
    /// ground normal as up.
    pub fn resolve<J, R, G, O>(
        &self,
        foot: Foot,
        limb: &mut Limb<J>,
        rig: &R,
        ground: &G,
        observer: &mut O,
    ) -> Resolution
    where
        J: Copy + Eq + Debug,
        R: PoseRig<Joint = J>,
        G: GroundQuery + ?Sized,
        O: PlacementObserver + ?Sized,
    {
        let tip = rig.world_position(limb.joints().tip);
        let probe = self.probe_for(tip);
        let hit = ground.probe(&probe);
        observer.on_ground_probe(foot, &probe, hit.as_ref());

        let Some(hit) = hit else {
            limb.reset_target(rig);
            return Resolution::NoGround;
        };
        if hit.normal.y < self.config.min_ground_normal_y {
            debug!(?foot, normal_y = hit.normal.y, "Ground too steep, treating as no ground");
            limb.reset_target(rig);
            return Resolution::Degenerate {
                normal_y: hit.normal.y,
            };
        }

        limb.record_ground_height(hit.height());

        let foot_forward = limb.tip_forward(rig);
        let ground_forward = math::project_on_plane(&foot_forward, &hit.normal);
        let ankle_height = self.ankle_height(&foot_forward, &ground_forward);
        let position = self.target_position(&hit, ankle_height);

        if self.config.control_rotation {
            let rotation = math::look_rotation(&ground_forward, &hit.normal)
                .unwrap_or(limb.target().rotation);
            limb.set_target(Pose::new(position, rotation));
        } else {
            limb.set_target_position(position);
        }
        observer.on_target_resolved(foot, limb.target(), &foot_forward, &ground_forward);

        Resolution::Grounded { hit, ankle_height }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
