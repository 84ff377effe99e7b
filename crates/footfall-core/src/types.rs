//! Value types passed between the rig, the ground backend and the solver.

use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// World-space position and orientation of a joint or target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Pose at the origin with no rotation.
    #[must_use]
    pub fn identity() -> Self {
        Self::from_position(Vector3::zeros())
    }

    #[must_use]
    pub const fn new(position: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with no rotation.
    #[must_use]
    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Move `self` toward `other` by `t`.
    ///
    /// Position is linearly interpolated, rotation uses a normalized lerp
    /// along the shorter arc. `t >= 1` returns `other` exactly and `t <= 0`
    /// returns `self` exactly.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        if t >= 1.0 {
            return *other;
        }
        if t <= 0.0 {
            return *self;
        }

        let position = self.position.lerp(&other.position, t);

        let from = self.rotation.into_inner();
        let mut to = other.rotation.into_inner();
        if from.dot(&to) < 0.0 {
            to = -to;
        }
        let rotation = UnitQuaternion::new_normalize(from.lerp(&to, t));

        Self { position, rotation }
    }
}

// ---------------------------------------------------------------------------
// Foot
// ---------------------------------------------------------------------------

/// Which leg a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Foot {
    Left,
    Right,
}

impl Foot {
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];

    /// Index into per-foot arrays (`Left = 0`, `Right = 1`).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// LimbJoints
// ---------------------------------------------------------------------------

/// Joint handles of a two-segment limb plus its bend hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LimbJoints<J> {
    /// Hip (or shoulder).
    pub root: J,
    /// Knee (or elbow).
    pub mid: J,
    /// Ankle (or wrist).
    pub tip: J,
    /// Pole the mid joint bends toward.
    pub hint: J,
}

impl<J: Copy> LimbJoints<J> {
    #[must_use]
    pub const fn new(root: J, mid: J, tip: J, hint: J) -> Self {
        Self {
            root,
            mid,
            tip,
            hint,
        }
    }

    /// All four handles, chain order then hint.
    #[must_use]
    pub const fn all(&self) -> [J; 4] {
        [self.root, self.mid, self.tip, self.hint]
    }
}

// ---------------------------------------------------------------------------
// LayerMask
// ---------------------------------------------------------------------------

/// Bit set of ground layers a probe may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    /// Mask containing only `layer` (0..32).
    #[must_use]
    pub const fn layer(layer: u32) -> Self {
        Self(1 << layer)
    }

    /// Whether `layer` is part of this mask. Layers outside 0..32 never match.
    #[must_use]
    pub const fn contains(self, layer: u32) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }

    #[must_use]
    pub const fn with(self, layer: u32) -> Self {
        Self(self.0 | (1 << layer))
    }
}

// ---------------------------------------------------------------------------
// GroundProbe / GroundHit
// ---------------------------------------------------------------------------

/// A bounded sphere cast issued against the ground backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProbe {
    /// Center of the sphere at the start of the cast.
    pub origin: Vector3<f32>,
    pub radius: f32,
    pub direction: Unit<Vector3<f32>>,
    pub max_distance: f32,
    pub layers: LayerMask,
}

impl GroundProbe {
    /// Straight-down probe.
    #[must_use]
    pub fn down(origin: Vector3<f32>, radius: f32, max_distance: f32, layers: LayerMask) -> Self {
        Self {
            origin,
            radius,
            direction: -Vector3::y_axis(),
            max_distance,
            layers,
        }
    }

    /// End point of the sphere center if nothing is hit.
    #[must_use]
    pub fn end(&self) -> Vector3<f32> {
        self.origin + self.direction.into_inner() * self.max_distance
    }
}

/// First surface touched by a [`GroundProbe`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    /// Contact point on the surface.
    pub point: Vector3<f32>,
    /// Surface normal at the contact point.
    pub normal: Unit<Vector3<f32>>,
    /// Distance the sphere travelled before touching.
    pub distance: f32,
}

impl GroundHit {
    /// World height of the contact point.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.point.y
    }
}
