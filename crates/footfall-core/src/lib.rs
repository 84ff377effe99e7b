// footfall-core: Types, traits, math helpers, config and errors shared by the footfall crates.

pub mod config;
pub mod error;
pub mod math;
pub mod traits;
pub mod types;

pub use config::{AnkleCompensation, FootPlacementConfig};
pub use error::{ConfigError, FootfallError, RigError};
pub use traits::{GroundQuery, HeightCollider, NoopObserver, PlacementObserver, PoseRig};
pub use types::{Foot, GroundHit, GroundProbe, LayerMask, LimbJoints, Pose};
