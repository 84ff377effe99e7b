//! Analytic ground made of planar patches.
//!
//! [`Terrain`] answers sphere casts exactly against infinite or
//! rectangle-bounded planes. Enough for flat floors, steps and ramps without
//! pulling in a physics engine.

use nalgebra::{Unit, Vector3};

use footfall_core::math::EPSILON;
use footfall_core::{GroundHit, GroundProbe, GroundQuery};

/// Axis-aligned rectangle on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XzBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl XzBounds {
    #[must_use]
    pub const fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    #[must_use]
    pub fn contains(&self, point: &Vector3<f32>) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_z..=self.max_z).contains(&point.z)
    }
}

/// One planar piece of ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPatch {
    /// Any point on the plane.
    pub point: Vector3<f32>,
    /// Plane normal, pointing away from the solid side.
    pub normal: Unit<Vector3<f32>>,
    /// Contacts outside these bounds are ignored. `None` = infinite plane.
    pub bounds: Option<XzBounds>,
    /// Layer index (0..32) matched against the probe's mask.
    pub layer: u32,
}

impl GroundPatch {
    /// Horizontal plane at `height`.
    #[must_use]
    pub fn flat(height: f32) -> Self {
        Self::tilted(Vector3::new(0.0, height, 0.0), Vector3::y())
    }

    /// Plane through `point` with `normal` (normalized here).
    #[must_use]
    pub fn tilted(point: Vector3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            point,
            normal: Unit::new_normalize(normal),
            bounds: None,
            layer: 0,
        }
    }

    #[must_use]
    pub const fn with_bounds(mut self, bounds: XzBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    #[must_use]
    pub const fn on_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    /// Sweep the probe sphere against this patch.
    ///
    /// Surfaces the sphere already touches at the start of the cast are
    /// ignored, as are surfaces it moves away from.
    #[must_use]
    pub fn sweep(&self, probe: &GroundProbe) -> Option<GroundHit> {
        if !probe.layers.contains(self.layer) {
            return None;
        }

        let approach = self.normal.dot(&probe.direction.into_inner());
        if approach > -EPSILON {
            return None;
        }

        let start_clearance = self.normal.dot(&(probe.origin - self.point));
        if start_clearance < probe.radius {
            return None;
        }

        let distance = (start_clearance - probe.radius) / -approach;
        if distance > probe.max_distance {
            return None;
        }

        let center = probe.origin + probe.direction.into_inner() * distance;
        let point = center - self.normal.into_inner() * probe.radius;
        if let Some(bounds) = &self.bounds {
            if !bounds.contains(&point) {
                return None;
            }
        }

        Some(GroundHit {
            point,
            normal: self.normal,
            distance,
        })
    }
}

/// Collection of ground patches. The closest hit wins.
#[derive(Debug, Clone, Default)]
pub struct Terrain {
    patches: Vec<GroundPatch>,
}

impl Terrain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Single infinite floor at `height`.
    #[must_use]
    pub fn flat(height: f32) -> Self {
        Self::new().with_patch(GroundPatch::flat(height))
    }

    #[must_use]
    pub fn with_patch(mut self, patch: GroundPatch) -> Self {
        self.patches.push(patch);
        self
    }

    pub fn push(&mut self, patch: GroundPatch) {
        self.patches.push(patch);
    }

    #[must_use]
    pub fn patches(&self) -> &[GroundPatch] {
        &self.patches
    }
}

impl GroundQuery for Terrain {
    fn probe(&self, probe: &GroundProbe) -> Option<GroundHit> {
        self.patches
            .iter()
            .filter_map(|patch| patch.sweep(probe))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
