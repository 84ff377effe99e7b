//! Ready-made rigs and configs.

use nalgebra::Vector3;

use footfall_core::{FootPlacementConfig, PoseRig};
use footfall_rig::{biped, BipedDimensions, BipedRig};

/// Default biped: hips at 1.0, 0.45/0.45 legs, ankles at 0.1, facing +Z.
pub fn standard_biped() -> BipedRig {
    biped(BipedDimensions::default()).expect("default biped builds")
}

/// Default biped with its body raised so both ankles sit at `ankle_height`.
pub fn biped_at_height(ankle_height: f32) -> BipedRig {
    let mut rig = standard_biped();
    let current = rig.skeleton.world_position(rig.left.tip).y;
    rig.skeleton
        .translate(rig.body, Vector3::new(0.0, ankle_height - current, 0.0));
    rig
}

/// Default config with smoothing disabled, so targets apply in one tick.
pub fn snap_config() -> FootPlacementConfig {
    FootPlacementConfig {
        smooth_rate: 1.0,
        ..Default::default()
    }
}
