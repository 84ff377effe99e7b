//! Mock implementations of core traits for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use nalgebra::{Unit, Vector3};

use footfall_core::{
    Foot, GroundHit, GroundProbe, GroundQuery, HeightCollider, PlacementObserver, Pose,
};

// ---------------------------------------------------------------------------
// ScriptedGround
// ---------------------------------------------------------------------------

/// Ground that answers every probe the same way, regardless of geometry.
///
/// Hits are placed straight below the probe origin at a fixed height with a
/// fixed normal. Counts calls and keeps the last probe.
pub struct ScriptedGround {
    height: Option<f32>,
    normal: Unit<Vector3<f32>>,
    calls: AtomicUsize,
    last_probe: Mutex<Option<GroundProbe>>,
}

impl ScriptedGround {
    /// Ground that is never found.
    pub fn miss() -> Self {
        Self {
            height: None,
            normal: Vector3::y_axis(),
            calls: AtomicUsize::new(0),
            last_probe: Mutex::new(None),
        }
    }

    /// Horizontal ground at `height`.
    pub fn at_height(height: f32) -> Self {
        Self {
            height: Some(height),
            ..Self::miss()
        }
    }

    /// Replace the reported normal (normalized here).
    pub fn with_normal(mut self, normal: Vector3<f32>) -> Self {
        self.normal = Unit::new_normalize(normal);
        self
    }

    /// Number of probes answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn last_probe(&self) -> Option<GroundProbe> {
        *self.last_probe.lock().unwrap()
    }
}

impl GroundQuery for ScriptedGround {
    fn probe(&self, probe: &GroundProbe) -> Option<GroundHit> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        *self.last_probe.lock().unwrap() = Some(*probe);

        let height = self.height?;
        Some(GroundHit {
            point: Vector3::new(probe.origin.x, height, probe.origin.z),
            normal: self.normal,
            distance: (probe.origin.y - probe.radius - height).max(0.0),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordingObserver
// ---------------------------------------------------------------------------

/// One observer callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    Probe {
        foot: Foot,
        probe: GroundProbe,
        hit: Option<GroundHit>,
    },
    Target {
        foot: Foot,
        target: Pose,
        foot_forward: Vector3<f32>,
        ground_forward: Vector3<f32>,
    },
}

/// Observer that keeps every callback in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub events: Vec<ObserverEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe events only.
    pub fn probes(&self) -> impl Iterator<Item = &ObserverEvent> {
        self.events
            .iter()
            .filter(|event| matches!(event, ObserverEvent::Probe { .. }))
    }

    /// Target events only.
    pub fn targets(&self) -> impl Iterator<Item = &ObserverEvent> {
        self.events
            .iter()
            .filter(|event| matches!(event, ObserverEvent::Target { .. }))
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl PlacementObserver for RecordingObserver {
    fn on_ground_probe(&mut self, foot: Foot, probe: &GroundProbe, hit: Option<&GroundHit>) {
        self.events.push(ObserverEvent::Probe {
            foot,
            probe: *probe,
            hit: hit.copied(),
        });
    }

    fn on_target_resolved(
        &mut self,
        foot: Foot,
        target: &Pose,
        foot_forward: &Vector3<f32>,
        ground_forward: &Vector3<f32>,
    ) {
        self.events.push(ObserverEvent::Target {
            foot,
            target: *target,
            foot_forward: *foot_forward,
            ground_forward: *ground_forward,
        });
    }
}

// ---------------------------------------------------------------------------
// MockCollider
// ---------------------------------------------------------------------------

/// Height-adjustable collider that counts writes.
#[derive(Debug, Clone, Default)]
pub struct MockCollider {
    pub center: Vector3<f32>,
    pub writes: usize,
}

impl MockCollider {
    pub const fn new(center: Vector3<f32>) -> Self {
        Self { center, writes: 0 }
    }
}

impl HeightCollider for MockCollider {
    fn center(&self) -> Vector3<f32> {
        self.center
    }

    fn set_center(&mut self, center: Vector3<f32>) {
        self.center = center;
        self.writes += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
