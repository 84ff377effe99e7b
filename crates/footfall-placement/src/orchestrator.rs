//! Per-character driver running one placement tick after each animation
//! update.
//!
//! # Tick order
//!
//! ```text
//! AwaitingAnimationUpdate ─(latch)─► Resolving ─► Placing ─► HeightAdjusting ─► Idle
//! ```
//!
//! Both feet are resolved before either limb is solved, and both limbs are
//! solved before the body height moves.

use std::fmt::Debug;

use tracing::trace;

use footfall_core::{
    Foot, FootPlacementConfig, FootfallError, GroundQuery, HeightCollider, LimbJoints,
    NoopObserver, PlacementObserver, PoseRig,
};
use footfall_ik::{Limb, SolveOutcome};

use crate::body_height::{BodyHeightReconciler, HeightAdjustment};
use crate::latch::PoseLatch;
use crate::resolver::{Resolution, TargetResolver};

/// Where the orchestrator is in its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementPhase {
    #[default]
    Idle,
    AwaitingAnimationUpdate,
    Resolving,
    Placing,
    HeightAdjusting,
}

/// What happened to one foot during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootReport {
    pub resolution: Resolution,
    /// The raw target was dropped because the animation lifts the foot
    /// above it.
    pub lifted: bool,
    pub outcome: SolveOutcome,
}

/// Result of [`FootPlacement::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickReport {
    /// The pose-ready latch was not set; nothing ran.
    Waiting,
    Completed {
        /// Indexed by [`Foot::index`].
        feet: [FootReport; 2],
        /// `None` when body-height reconciliation is disabled.
        body_height: Option<HeightAdjustment>,
    },
}

impl TickReport {
    #[must_use]
    pub const fn foot(&self, foot: Foot) -> Option<&FootReport> {
        match self {
            Self::Waiting => None,
            Self::Completed { feet, .. } => Some(&feet[foot.index()]),
        }
    }

    #[must_use]
    pub const fn completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Foot placement for one biped.
///
/// `J` is the rig's joint handle and `O` receives probe and target events.
#[derive(Debug, Clone)]
pub struct FootPlacement<J, O = NoopObserver> {
    config: FootPlacementConfig,
    body: J,
    limbs: [Limb<J>; 2],
    body_height: BodyHeightReconciler,
    latch: PoseLatch,
    phase: PlacementPhase,
    observer: O,
}

impl<J: Copy + Eq + Debug> FootPlacement<J> {
    /// Bind both legs of the rig in its current pose.
    ///
    /// `body` is the character root that body-height reconciliation moves.
    /// Without a `collider` that reconciliation stays off.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config or a degenerate leg.
    pub fn new<R>(
        config: FootPlacementConfig,
        rig: &R,
        body: J,
        left: LimbJoints<J>,
        right: LimbJoints<J>,
        collider: Option<&dyn HeightCollider>,
    ) -> Result<Self, FootfallError>
    where
        R: PoseRig<Joint = J>,
    {
        config.validate()?;
        let body_rotation = rig.world_rotation(body);
        let limbs = [
            Limb::new(rig, left, body_rotation)?,
            Limb::new(rig, right, body_rotation)?,
        ];
        let body_height = BodyHeightReconciler::new(config.body_height_sensitivity, collider);

        Ok(Self {
            config,
            body,
            limbs,
            body_height,
            latch: PoseLatch::new(),
            phase: PlacementPhase::Idle,
            observer: NoopObserver,
        })
    }
}

impl<J: Copy + Eq + Debug, O: PlacementObserver> FootPlacement<J, O> {
    /// Swap the observer.
    #[must_use]
    pub fn with_observer<P: PlacementObserver>(self, observer: P) -> FootPlacement<J, P> {
        FootPlacement {
            config: self.config,
            body: self.body,
            limbs: self.limbs,
            body_height: self.body_height,
            latch: self.latch,
            phase: self.phase,
            observer,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &FootPlacementConfig {
        &self.config
    }

    #[must_use]
    pub const fn body(&self) -> J {
        self.body
    }

    #[must_use]
    pub const fn limb(&self, foot: Foot) -> &Limb<J> {
        &self.limbs[foot.index()]
    }

    #[must_use]
    pub const fn body_height(&self) -> &BodyHeightReconciler {
        &self.body_height
    }

    #[must_use]
    pub const fn phase(&self) -> PlacementPhase {
        self.phase
    }

    #[must_use]
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// The animation system has finished writing this frame's pose.
    pub fn notify_pose_ready(&mut self) {
        self.latch.notify();
    }

    #[must_use]
    pub const fn is_pose_ready(&self) -> bool {
        self.latch.is_set()
    }

    fn enter(&mut self, phase: PlacementPhase) {
        trace!(from = ?self.phase, to = ?phase, "Foot placement phase");
        self.phase = phase;
    }

    /// Run one tick if the pose-ready latch is set.
    ///
    /// `collider` is the collider passed at construction (or its current
    /// handle); `dt` is the frame time in seconds.
    pub fn update<R, G>(
        &mut self,
        rig: &mut R,
        ground: &G,
        collider: Option<&mut dyn HeightCollider>,
        dt: f32,
    ) -> TickReport
    where
        R: PoseRig<Joint = J>,
        G: GroundQuery + ?Sized,
    {
        self.enter(PlacementPhase::AwaitingAnimationUpdate);
        if !self.latch.take() {
            return TickReport::Waiting;
        }

        self.enter(PlacementPhase::Resolving);
        let resolver = TargetResolver::new(&self.config);
        let mut resolutions = [Resolution::NoGround; 2];
        let mut lifted = [false; 2];
        for foot in Foot::BOTH {
            let i = foot.index();
            let limb = &mut self.limbs[i];
            resolutions[i] = resolver.resolve(foot, limb, &*rig, ground, &mut self.observer);

            if self.config.foot_lifting {
                let tip_height = rig.world_position(limb.joints().tip).y;
                if limb.target().position.y < tip_height {
                    limb.reset_target(&*rig);
                    lifted[i] = true;
                }
            }
            limb.smooth_target(self.config.smooth_rate);
        }

        self.enter(PlacementPhase::Placing);
        let outcomes = [
            self.limbs[0].apply_ik(rig, self.config.control_rotation),
            self.limbs[1].apply_ik(rig, self.config.control_rotation),
        ];

        let body_height = if self.body_height.is_enabled() {
            self.enter(PlacementPhase::HeightAdjusting);
            Some(self.body_height.adjust(
                rig,
                self.body,
                collider,
                self.limbs[0].ground_height(),
                self.limbs[1].ground_height(),
                dt,
            ))
        } else {
            None
        };

        self.enter(PlacementPhase::Idle);
        let feet = [0, 1].map(|i| FootReport {
            resolution: resolutions[i],
            lifted: lifted[i],
            outcome: outcomes[i],
        });
        TickReport::Completed { feet, body_height }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use footfall_rig::{BipedRig, BoneId, GroundPatch, Terrain, XzBounds};
    use footfall_test_utils::{
        biped_at_height, snap_config, standard_biped, MockCollider, RecordingObserver,
        ScriptedGround,
    };
    use nalgebra::Vector3;

    fn placement(rig: &BipedRig, config: FootPlacementConfig) -> FootPlacement<BoneId> {
        FootPlacement::new(config, &rig.skeleton, rig.body, rig.left, rig.right, None).unwrap()
    }

    fn tick(
        placement: &mut FootPlacement<BoneId>,
        rig: &mut BipedRig,
        ground: &dyn GroundQuery,
    ) -> TickReport {
        placement.notify_pose_ready();
        placement.update(&mut rig.skeleton, ground, None, 1.0 / 60.0)
    }

    fn tip(rig: &BipedRig, foot: Foot) -> Vector3<f32> {
        rig.skeleton.world_position(rig.limb(foot).tip)
    }

    #[test]
    fn waits_for_pose_latch() {
        let mut rig = standard_biped();
        let mut placement = placement(&rig, snap_config());
        let ground = ScriptedGround::at_height(0.0);
        assert_eq!(placement.phase(), PlacementPhase::Idle);

        let report = placement.update(&mut rig.skeleton, &ground, None, 0.016);
        assert_eq!(report, TickReport::Waiting);
        assert_eq!(placement.phase(), PlacementPhase::AwaitingAnimationUpdate);
        assert_eq!(ground.calls(), 0);

        placement.notify_pose_ready();
        placement.notify_pose_ready();
        assert!(placement.is_pose_ready());
        let report = placement.update(&mut rig.skeleton, &ground, None, 0.016);
        assert!(report.completed());
        assert_eq!(placement.phase(), PlacementPhase::Idle);
        assert_eq!(ground.calls(), 2);

        // Latch was consumed.
        assert_eq!(
            placement.update(&mut rig.skeleton, &ground, None, 0.016),
            TickReport::Waiting
        );
    }

    #[test]
    fn feet_rise_onto_raised_floor() {
        let mut rig = standard_biped();
        let mut placement = placement(&rig, snap_config());
        let report = tick(&mut placement, &mut rig, &Terrain::flat(0.3));

        for foot in Foot::BOTH {
            let foot_report = report.foot(foot).unwrap();
            assert!(foot_report.resolution.is_grounded());
            assert!(!foot_report.lifted);
            assert!(foot_report.outcome.is_applied());
            assert_relative_eq!(tip(&rig, foot).y, 0.4, epsilon = 1e-4);
        }
        // No collider: body height untouched.
        assert!(matches!(
            report,
            TickReport::Completed {
                body_height: None,
                ..
            }
        ));
    }

    #[test]
    fn lifted_foot_keeps_animated_pose() {
        // Tip at 1.0, ground target at 0.9.
        let mut rig = biped_at_height(1.0);
        let mut placement = placement(&rig, snap_config());
        let ground = ScriptedGround::at_height(0.8);

        let report = tick(&mut placement, &mut rig, &ground);
        let left = report.foot(Foot::Left).unwrap();
        assert!(left.resolution.is_grounded());
        assert!(left.lifted);
        assert_relative_eq!(
            placement.limb(Foot::Left).target().position,
            tip(&rig, Foot::Left),
            epsilon = 1e-5
        );
        assert_relative_eq!(tip(&rig, Foot::Left).y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn lower_ground_reached_without_lifting() {
        let mut rig = standard_biped();
        let config = FootPlacementConfig {
            foot_lifting: false,
            ..snap_config()
        };
        let mut placement = placement(&rig, config);

        // Bend the knees first, then lower the ground.
        tick(&mut placement, &mut rig, &Terrain::flat(0.3));
        let report = tick(&mut placement, &mut rig, &Terrain::flat(0.1));

        assert!(!report.foot(Foot::Right).unwrap().lifted);
        assert_relative_eq!(tip(&rig, Foot::Right).y, 0.2, epsilon = 1e-4);
    }

    #[test]
    fn lower_ground_ignored_with_lifting() {
        let mut rig = standard_biped();
        let mut placement = placement(&rig, snap_config());

        tick(&mut placement, &mut rig, &Terrain::flat(0.3));
        let report = tick(&mut placement, &mut rig, &Terrain::flat(0.1));

        assert!(report.foot(Foot::Right).unwrap().lifted);
        assert_relative_eq!(tip(&rig, Foot::Right).y, 0.4, epsilon = 1e-4);
    }

    #[test]
    fn unreachable_ground_leaves_leg_alone() {
        let mut rig = standard_biped();
        let config = FootPlacementConfig {
            foot_lifting: false,
            ..snap_config()
        };
        let mut placement = placement(&rig, config);
        let before = rig.skeleton.local_pose(rig.left.root);

        let report = tick(&mut placement, &mut rig, &ScriptedGround::at_height(-1.0));

        assert!(matches!(
            report.foot(Foot::Left).unwrap().outcome,
            SolveOutcome::Unreachable { .. }
        ));
        assert_eq!(rig.skeleton.local_pose(rig.left.root), before);
    }

    #[test]
    fn no_ground_keeps_animation() {
        let mut rig = standard_biped();
        let mut placement = placement(&rig, snap_config());
        let before = tip(&rig, Foot::Left);

        let report = tick(&mut placement, &mut rig, &ScriptedGround::miss());
        assert_eq!(
            report.foot(Foot::Left).unwrap().resolution,
            Resolution::NoGround
        );
        assert_relative_eq!(tip(&rig, Foot::Left), before, epsilon = 1e-5);
    }

    #[test]
    fn uneven_feet_raise_body() {
        let mut rig = standard_biped();
        let left_side = GroundPatch::flat(0.0).with_bounds(XzBounds::new(0.0, 1.0, -1.0, 1.0));
        let right_side = GroundPatch::flat(0.2).with_bounds(XzBounds::new(-1.0, 0.0, -1.0, 1.0));
        let terrain = Terrain::new().with_patch(left_side).with_patch(right_side);

        let mut collider = MockCollider::new(Vector3::new(0.0, 0.9, 0.0));
        let mut placement = FootPlacement::new(
            snap_config(),
            &rig.skeleton,
            rig.body,
            rig.left,
            rig.right,
            Some(&collider),
        )
        .unwrap();
        assert!(placement.body_height().is_enabled());

        let body_before = rig.skeleton.world_position(rig.body).y;
        placement.notify_pose_ready();
        let report = placement.update(&mut rig.skeleton, &terrain, Some(&mut collider), 0.1);

        let TickReport::Completed {
            body_height: Some(adjustment),
            ..
        } = report
        else {
            panic!("expected a body height adjustment, got {report:?}");
        };
        assert_relative_eq!(adjustment.offset, 0.02, epsilon = 1e-5);
        assert_relative_eq!(
            rig.skeleton.world_position(rig.body).y - body_before,
            0.02,
            epsilon = 1e-5
        );
        assert_relative_eq!(collider.center.y, 0.92, epsilon = 1e-5);
        assert_eq!(placement.phase(), PlacementPhase::Idle);
    }

    #[test]
    fn observer_sees_both_feet() {
        let mut rig = standard_biped();
        let mut placement = FootPlacement::new(
            snap_config(),
            &rig.skeleton,
            rig.body,
            rig.left,
            rig.right,
            None,
        )
        .unwrap()
        .with_observer(RecordingObserver::new());

        placement.notify_pose_ready();
        placement.update(&mut rig.skeleton, &Terrain::flat(0.0), None, 0.016);

        assert_eq!(placement.observer().probes().count(), 2);
        assert_eq!(placement.observer().targets().count(), 2);
        placement.observer_mut().clear();
        assert!(placement.observer().events.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let rig = standard_biped();
        let config = FootPlacementConfig {
            smooth_rate: 2.0,
            ..Default::default()
        };
        let err = FootPlacement::new(config, &rig.skeleton, rig.body, rig.left, rig.right, None)
            .unwrap_err();
        assert!(matches!(err, FootfallError::Config(_)));
    }
}
