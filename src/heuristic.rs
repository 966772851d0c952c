//! Training-free slouch signal from the nose and one shoulder.
//!
//! The reading is the squared horizontal pixel distance between the nose and
//! the configured shoulder. Leaning toward the camera widens it, so a reading
//! at or above the threshold counts as slouching.

use crate::config::Config;
use crate::keypoints::{BodyPart, Keypoint};

/// One frame's slouchness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlouchnessReading {
    /// Squared horizontal distance in pixels²
    pub distance: f32,
    /// `distance` reached the threshold
    pub over_threshold: bool,
}

/// Squared horizontal distance between the nose and `shoulder`.
///
/// Returns `None` unless both parts are present and score above
/// `min_confidence`. The first keypoint for a part wins.
#[must_use]
pub fn slouchness(keypoints: &[Keypoint], shoulder: BodyPart, min_confidence: f32) -> Option<f32> {
    let find = |part: BodyPart| {
        keypoints
            .iter()
            .find(|kp| kp.part == part)
            .filter(|kp| kp.score > min_confidence)
    };
    let nose = find(BodyPart::Nose)?;
    let shoulder = find(shoulder)?;
    let dx = nose.position.x - shoulder.position.x;
    Some(dx * dx)
}

/// Slouchness measured against a fixed threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlouchnessGauge {
    pub shoulder: BodyPart,
    pub threshold: f32,
    pub min_confidence: f32,
}

impl SlouchnessGauge {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            shoulder: config.heuristic.shoulder,
            threshold: config.heuristic.threshold,
            min_confidence: config.pose.min_part_confidence,
        }
    }

    /// Reading for one frame, `None` when the nose or shoulder is not visible
    #[must_use]
    pub fn measure(&self, keypoints: &[Keypoint]) -> Option<SlouchnessReading> {
        slouchness(keypoints, self.shoulder, self.min_confidence).map(|distance| SlouchnessReading {
            distance,
            over_threshold: distance >= self.threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(nose_x: f32, shoulder_x: f32) -> Vec<Keypoint> {
        vec![
            Keypoint::new(BodyPart::Nose, nose_x, 150.0, 0.9),
            Keypoint::new(BodyPart::LeftShoulder, 420.0, 260.0, 0.9),
            Keypoint::new(BodyPart::RightShoulder, shoulder_x, 260.0, 0.9),
        ]
    }

    #[test]
    fn test_squared_horizontal_distance() {
        let keypoints = frame(300.0, 180.0);
        assert_eq!(slouchness(&keypoints, BodyPart::RightShoulder, 0.5), Some(14_400.0));
        assert_eq!(slouchness(&keypoints, BodyPart::LeftShoulder, 0.5), Some(14_400.0));

        // Vertical offset does not count
        let mut raised = frame(300.0, 180.0);
        raised[2].position.y = 100.0;
        assert_eq!(slouchness(&raised, BodyPart::RightShoulder, 0.5), Some(14_400.0));
    }

    #[test]
    fn test_requires_confident_parts() {
        let mut keypoints = frame(300.0, 180.0);
        keypoints[0].score = 0.5;
        assert_eq!(slouchness(&keypoints, BodyPart::RightShoulder, 0.5), None);
        assert_eq!(slouchness(&keypoints[1..], BodyPart::RightShoulder, 0.1), None);
        assert_eq!(slouchness(&[], BodyPart::RightShoulder, 0.1), None);
    }

    #[test]
    fn test_gauge_threshold_is_inclusive() {
        let gauge = SlouchnessGauge {
            shoulder: BodyPart::RightShoulder,
            threshold: 20_000.0,
            min_confidence: 0.6,
        };
        let reading = gauge.measure(&frame(300.0, 150.0)).unwrap();
        assert_eq!(reading.distance, 22_500.0);
        assert!(reading.over_threshold);

        let reading = gauge.measure(&frame(300.0, 200.0)).unwrap();
        assert!(!reading.over_threshold);

        let exact = SlouchnessGauge {
            threshold: 10_000.0,
            ..gauge
        };
        let reading = exact.measure(&frame(300.0, 200.0)).unwrap();
        assert_eq!(reading.distance, 10_000.0);
        assert!(reading.over_threshold);
    }

    #[test]
    fn test_gauge_from_config() {
        let gauge = SlouchnessGauge::from_config(&Config::default());
        assert_eq!(gauge.shoulder, BodyPart::RightShoulder);
        assert_eq!(gauge.threshold, 20_000.0);
        assert_eq!(gauge.min_confidence, 0.6);
    }
}
