//! Two-bone inverse kinematics for legs (and arms).
//!
//! Solves a root/mid/tip chain analytically with the law of cosines and
//! bends the mid joint toward a hint pole. Targets are kept as a raw pose
//! plus a smoothed copy; the solver only ever reads the smoothed one.
//!
//! # Architecture
//!
//! ```text
//! raw target ──► TargetPair::smooth ──► Limb::apply_ik ──► joint rotations
//! ```
//!
//! A [`Limb`] is bound to a rig once: segment lengths and the tip's
//! rotation offset are measured from the bind pose and never change.

pub mod limb;
pub mod smoothing;

pub use limb::{Limb, LimbLengths, SolveOutcome, MIN_SEGMENT_LENGTH};
pub use smoothing::TargetPair;
