//! Utility functions for keypoint geometry and coordinate conversion.

pub mod safe_cast;

use crate::keypoints::Keypoint;
use opencv::core::Rect;
use safe_cast::f32_to_i32_clamp;

/// Axis-aligned box around a set of keypoints, in frame pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// Integer rectangle clipped to a `max_width` x `max_height` frame
    #[must_use]
    pub fn to_rect(&self, max_width: i32, max_height: i32) -> Rect {
        let x = f32_to_i32_clamp(self.min_x, 0, max_width);
        let y = f32_to_i32_clamp(self.min_y, 0, max_height);
        let right = f32_to_i32_clamp(self.max_x, 0, max_width);
        let bottom = f32_to_i32_clamp(self.max_y, 0, max_height);
        Rect::new(x, y, (right - x).max(0), (bottom - y).max(0))
    }
}

/// Bounding box of all keypoints scoring at least `min_confidence`
#[must_use]
pub fn bounding_box(keypoints: &[Keypoint], min_confidence: f32) -> Option<BoundingBox> {
    keypoints
        .iter()
        .filter(|kp| kp.score >= min_confidence)
        .fold(None, |acc: Option<BoundingBox>, kp| {
            let (x, y) = (kp.position.x, kp.position.y);
            Some(match acc {
                None => BoundingBox {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                },
                Some(b) => BoundingBox {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y.min(y),
                    max_x: b.max_x.max(x),
                    max_y: b.max_y.max(y),
                },
            })
        })
}
