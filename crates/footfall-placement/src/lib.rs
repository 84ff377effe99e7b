//! Procedural foot placement for bipeds.
//!
//! Each tick, after the animation system has posed the skeleton, both feet
//! are probed against the ground, their IK targets are placed on the
//! surface and smoothed, both legs are solved, and the body root is raised
//! by a smoothed fraction of the height difference between the feet.
//!
//! # Architecture
//!
//! ```text
//! GroundQuery ──► TargetResolver ──► Limb (smoothing + two-bone IK) ──► PoseRig
//!                                                  │
//!                                                  └──► BodyHeightReconciler ──► root + HeightCollider
//! ```
//!
//! [`FootPlacement`] owns one character's state and sequences the stages.
//! With the `bevy` feature, [`FootPlacementPlugin`] runs it for every
//! character entity.

pub mod body_height;
pub mod latch;
pub mod observer;
pub mod orchestrator;
#[cfg(feature = "bevy")]
pub mod plugin;
pub mod resolver;

pub use body_height::{BodyHeightReconciler, HeightAdjustment, MIN_ACTIVE_SENSITIVITY};
pub use latch::PoseLatch;
pub use observer::{ProbeRecord, ProbeRecorder};
pub use orchestrator::{FootPlacement, FootReport, PlacementPhase, TickReport};
#[cfg(feature = "bevy")]
pub use plugin::{
    ColliderCenter, FootPlacementPlugin, FootPlacementSetup, FootPlacementState,
    FootPlacementSystems, GroundBackend,
};
pub use resolver::{Resolution, TargetResolver};
