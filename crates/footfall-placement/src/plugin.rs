//! Bevy ECS integration for foot placement.
//!
//! Provides [`FootPlacementPlugin`] which binds characters tagged with
//! [`FootPlacementSetup`] and runs a placement tick on each of them every
//! frame.
//!
//! # Usage
//!
//! 1. Add [`FootPlacementPlugin`] to your app.
//! 2. Insert a [`GroundBackend`] resource wrapping your ground query.
//! 3. Spawn the character's bone hierarchy (`Transform` + `ChildOf`).
//! 4. Insert [`FootPlacementSetup`] (and optionally [`ColliderCenter`]) on
//!    the character root.
//!
//! All systems run in `PostUpdate` in [`FootPlacementSystems`] order, after
//! Bevy's `AnimationSystems` and before `TransformSystems::Propagate`, so the
//! solved pose is the one propagated that frame. Order your own animation
//! systems before [`FootPlacementSystems::Latch`].

use bevy::animation::AnimationSystems;
use bevy::prelude::*;
use bevy::transform::TransformSystems;
use nalgebra::Vector3;
use tracing::{error, info};

use footfall_core::{FootPlacementConfig, FootfallError, GroundQuery, HeightCollider, LimbJoints};
use footfall_rig::transform::{vec3_from_na, vec3_to_na};
use footfall_rig::{RigQuery, TransformRig};

use crate::observer::ProbeRecorder;
use crate::orchestrator::FootPlacement;

/// Bevy plugin that drives foot placement each frame.
pub struct FootPlacementPlugin {
    /// Mark every character's pose ready each frame. Turn off to drive
    /// [`FootPlacement::notify_pose_ready`] from your own animation systems.
    pub auto_latch: bool,
}

impl Default for FootPlacementPlugin {
    fn default() -> Self {
        Self { auto_latch: true }
    }
}

impl Plugin for FootPlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FootPlacementConfig>()
            .configure_sets(
                PostUpdate,
                (
                    FootPlacementSystems::Setup,
                    FootPlacementSystems::Latch,
                    FootPlacementSystems::Solve,
                )
                    .chain()
                    .after(AnimationSystems)
                    .before(TransformSystems::Propagate),
            )
            .add_systems(
                PostUpdate,
                (
                    setup_foot_placement_system.in_set(FootPlacementSystems::Setup),
                    foot_placement_system.in_set(FootPlacementSystems::Solve),
                ),
            );
        if self.auto_latch {
            app.add_systems(
                PostUpdate,
                auto_latch_system.in_set(FootPlacementSystems::Latch),
            );
        }
    }
}

/// System ordering for foot placement.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FootPlacementSystems {
    /// Bind newly tagged characters.
    Setup,
    /// Set pose-ready latches.
    Latch,
    /// Resolve targets, solve legs, adjust body height.
    Solve,
}

// ---------------------------------------------------------------------------
// Components and resources
// ---------------------------------------------------------------------------

/// Request to bind foot placement on the character root it is inserted on.
///
/// Replaced by [`FootPlacementState`] once bound.
#[derive(Component, Debug, Clone)]
pub struct FootPlacementSetup {
    pub left: LimbJoints<Entity>,
    pub right: LimbJoints<Entity>,
    /// Per-character override of the global [`FootPlacementConfig`].
    pub config: Option<FootPlacementConfig>,
}

impl FootPlacementSetup {
    #[must_use]
    pub const fn new(left: LimbJoints<Entity>, right: LimbJoints<Entity>) -> Self {
        Self {
            left,
            right,
            config: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: FootPlacementConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Bound foot placement of one character.
#[derive(Component, Debug)]
pub struct FootPlacementState(pub FootPlacement<Entity, ProbeRecorder>);

/// Height-adjustable collider center, in the character's local space.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct ColliderCenter(pub Vec3);

impl HeightCollider for ColliderCenter {
    fn center(&self) -> Vector3<f32> {
        vec3_to_na(self.0)
    }

    fn set_center(&mut self, center: Vector3<f32>) {
        self.0 = vec3_from_na(&center);
    }
}

/// Ground query used by every character.
#[derive(Resource)]
pub struct GroundBackend(pub Box<dyn GroundQuery + Send + Sync>);

impl GroundBackend {
    pub fn new(ground: impl GroundQuery + Send + Sync + 'static) -> Self {
        Self(Box::new(ground))
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn setup_foot_placement_system(
    mut commands: Commands,
    global_config: Res<FootPlacementConfig>,
    pending: Query<
        (Entity, &FootPlacementSetup, Option<&ColliderCenter>),
        Without<FootPlacementState>,
    >,
    mut rig_query: RigQuery,
) {
    for (entity, setup, collider) in &pending {
        let rig = TransformRig::new(&mut rig_query);
        let config = setup
            .config
            .clone()
            .unwrap_or_else(|| (*global_config).clone());
        let collider = collider.map(|c| c as &dyn HeightCollider);

        let bound = std::iter::once(entity)
            .chain(setup.left.all())
            .chain(setup.right.all())
            .try_for_each(|joint| rig.require(joint))
            .map_err(FootfallError::from)
            .and_then(|()| {
                FootPlacement::new(config, &rig, entity, setup.left, setup.right, collider)
            });

        match bound {
            Ok(placement) => {
                info!(?entity, "Foot placement bound");
                commands
                    .entity(entity)
                    .insert(FootPlacementState(placement.with_observer(ProbeRecorder::new())))
                    .remove::<FootPlacementSetup>();
            }
            Err(err) => {
                error!(?entity, %err, "Foot placement setup failed");
                commands.entity(entity).remove::<FootPlacementSetup>();
            }
        }
    }
}

fn auto_latch_system(mut characters: Query<&mut FootPlacementState>) {
    for mut state in &mut characters {
        state.0.notify_pose_ready();
    }
}

fn foot_placement_system(
    time: Option<Res<Time>>,
    ground: Option<Res<GroundBackend>>,
    mut characters: Query<(&mut FootPlacementState, Option<&mut ColliderCenter>)>,
    mut rig_query: RigQuery,
) {
    let Some(ground) = ground else {
        return;
    };
    let dt = time.map_or(0.0, |time| time.delta_secs());

    for (mut state, collider) in &mut characters {
        let mut rig = TransformRig::new(&mut rig_query);
        let collider = collider.map(|c| c.into_inner() as &mut dyn HeightCollider);
        state.0.update(&mut rig, &*ground.0, collider, dt);
    }
}
