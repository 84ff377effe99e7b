//! Reference backends for the footfall pipeline.
//!
//! - [`Skeleton`]: a standalone named bone hierarchy implementing
//!   [`PoseRig`](footfall_core::PoseRig)
//! - [`presets`]: ready-made biped leg rigs
//! - [`Terrain`]: analytic ground made of bounded, layered planes,
//!   implementing [`GroundQuery`](footfall_core::GroundQuery)
//! - `TransformRig` (feature `bevy`): Bevy `Transform` hierarchies as a rig

pub mod presets;
pub mod skeleton;
pub mod terrain;
#[cfg(feature = "bevy")]
pub mod transform;

pub use presets::{biped, BipedDimensions, BipedRig};
pub use skeleton::{BoneId, Skeleton};
pub use terrain::{GroundPatch, Terrain, XzBounds};
#[cfg(feature = "bevy")]
pub use transform::{RigQuery, TransformRig};
