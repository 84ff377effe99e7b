//! Debug records of the last probe per foot.

use nalgebra::{Unit, Vector3};

use footfall_core::{Foot, GroundHit, GroundProbe, PlacementObserver, Pose};

/// Everything a debug overlay needs to draw one foot's probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeRecord {
    pub probe: GroundProbe,
    /// Contact point and normal, `None` on a miss.
    pub hit: Option<(Vector3<f32>, Unit<Vector3<f32>>)>,
    /// Raw target, set only when the hit produced one.
    pub target: Option<Pose>,
    pub foot_forward: Option<Vector3<f32>>,
    pub ground_forward: Option<Vector3<f32>>,
}

/// Observer keeping the most recent [`ProbeRecord`] of each foot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeRecorder {
    records: [Option<ProbeRecord>; 2],
}

impl ProbeRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn record(&self, foot: Foot) -> Option<&ProbeRecord> {
        self.records[foot.index()].as_ref()
    }
}

impl PlacementObserver for ProbeRecorder {
    fn on_ground_probe(&mut self, foot: Foot, probe: &GroundProbe, hit: Option<&GroundHit>) {
        self.records[foot.index()] = Some(ProbeRecord {
            probe: *probe,
            hit: hit.map(|hit| (hit.point, hit.normal)),
            target: None,
            foot_forward: None,
            ground_forward: None,
        });
    }

    fn on_target_resolved(
        &mut self,
        foot: Foot,
        target: &Pose,
        foot_forward: &Vector3<f32>,
        ground_forward: &Vector3<f32>,
    ) {
        if let Some(record) = &mut self.records[foot.index()] {
            record.target = Some(*target);
            record.foot_forward = Some(*foot_forward);
            record.ground_forward = Some(*ground_forward);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use footfall_core::LayerMask;

    fn probe(x: f32) -> GroundProbe {
        GroundProbe::down(Vector3::new(x, 1.0, 0.0), 0.07, 1.0, LayerMask::ALL)
    }

    #[test]
    fn keeps_latest_per_foot() {
        let mut recorder = ProbeRecorder::new();
        let hit = GroundHit {
            point: Vector3::new(0.1, 0.0, 0.0),
            normal: Vector3::y_axis(),
            distance: 0.93,
        };
        recorder.on_ground_probe(Foot::Left, &probe(0.1), Some(&hit));
        recorder.on_target_resolved(
            Foot::Left,
            &Pose::from_position(Vector3::new(0.1, 0.1, 0.0)),
            &Vector3::z(),
            &Vector3::z(),
        );
        recorder.on_ground_probe(Foot::Right, &probe(-0.1), None);

        let left = recorder.record(Foot::Left).unwrap();
        assert_eq!(left.hit, Some((hit.point, hit.normal)));
        assert_eq!(left.ground_forward, Some(Vector3::z()));
        assert!(left.target.is_some());

        let right = recorder.record(Foot::Right).unwrap();
        assert_eq!(right.hit, None);
        assert_eq!(right.target, None);

        // A new probe replaces the previous record entirely.
        recorder.on_ground_probe(Foot::Left, &probe(0.2), None);
        let left = recorder.record(Foot::Left).unwrap();
        assert_eq!(left.target, None);
        assert_eq!(left.probe, probe(0.2));
    }

    #[test]
    fn empty_until_probed() {
        let recorder = ProbeRecorder::new();
        assert!(recorder.record(Foot::Left).is_none());
        assert!(recorder.record(Foot::Right).is_none());
    }
}
