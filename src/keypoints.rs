//! Body keypoints, the required keypoint set and sample vector flattening.
//!
//! The required set is an ordered list of body parts. Its order is fixed for
//! the lifetime of the process and defines the layout of every
//! [`SampleVector`]: the x and y of the i-th required part land at indices
//! `2i` and `2i + 1`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Anatomical landmark detected by the pose model, in COCO order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyPart {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyPart {
    /// All parts in model output order
    pub const ALL: [BodyPart; crate::constants::NUM_BODY_KEYPOINTS] = [
        BodyPart::Nose,
        BodyPart::LeftEye,
        BodyPart::RightEye,
        BodyPart::LeftEar,
        BodyPart::RightEar,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftElbow,
        BodyPart::RightElbow,
        BodyPart::LeftWrist,
        BodyPart::RightWrist,
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftKnee,
        BodyPart::RightKnee,
        BodyPart::LeftAnkle,
        BodyPart::RightAnkle,
    ];

    /// Display name as used by `PoseNet`
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BodyPart::Nose => "nose",
            BodyPart::LeftEye => "leftEye",
            BodyPart::RightEye => "rightEye",
            BodyPart::LeftEar => "leftEar",
            BodyPart::RightEar => "rightEar",
            BodyPart::LeftShoulder => "leftShoulder",
            BodyPart::RightShoulder => "rightShoulder",
            BodyPart::LeftElbow => "leftElbow",
            BodyPart::RightElbow => "rightElbow",
            BodyPart::LeftWrist => "leftWrist",
            BodyPart::RightWrist => "rightWrist",
            BodyPart::LeftHip => "leftHip",
            BodyPart::RightHip => "rightHip",
            BodyPart::LeftKnee => "leftKnee",
            BodyPart::RightKnee => "rightKnee",
            BodyPart::LeftAnkle => "leftAnkle",
            BodyPart::RightAnkle => "rightAnkle",
        }
    }

    /// Look up a part by its model output index
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyPart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.replace(['_', '-'], "").to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|part| part.name().to_lowercase() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown body part: {s}")))
    }
}

/// Pixel position in the captured frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A detected landmark with its confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub part: BodyPart,
    pub position: Position,
    pub score: f32,
}

impl Keypoint {
    #[must_use]
    pub fn new(part: BodyPart, x: f32, y: f32, score: f32) -> Self {
        Self {
            part,
            position: Position::new(x, y),
            score,
        }
    }
}

/// One detected person
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pose {
    /// Overall pose confidence
    pub score: f32,
    /// Keypoints, one per detected part
    pub keypoints: Vec<Keypoint>,
}

/// Pairs of parts joined by a skeleton segment
pub const SKELETON_EDGES: [(BodyPart, BodyPart); 12] = [
    (BodyPart::LeftHip, BodyPart::LeftShoulder),
    (BodyPart::LeftElbow, BodyPart::LeftShoulder),
    (BodyPart::LeftElbow, BodyPart::LeftWrist),
    (BodyPart::LeftHip, BodyPart::LeftKnee),
    (BodyPart::LeftKnee, BodyPart::LeftAnkle),
    (BodyPart::RightHip, BodyPart::RightShoulder),
    (BodyPart::RightElbow, BodyPart::RightShoulder),
    (BodyPart::RightElbow, BodyPart::RightWrist),
    (BodyPart::RightHip, BodyPart::RightKnee),
    (BodyPart::RightKnee, BodyPart::RightAnkle),
    (BodyPart::LeftShoulder, BodyPart::RightShoulder),
    (BodyPart::LeftHip, BodyPart::RightHip),
];

/// Skeleton segments whose both ends score above `min_confidence`
#[must_use]
pub fn adjacent_keypoints(keypoints: &[Keypoint], min_confidence: f32) -> Vec<(Keypoint, Keypoint)> {
    let find = |part: BodyPart| {
        keypoints
            .iter()
            .find(|kp| kp.part == part && kp.score > min_confidence)
            .copied()
    };

    SKELETON_EDGES
        .iter()
        .filter_map(|&(a, b)| Some((find(a)?, find(b)?)))
        .collect()
}

/// Default parts used to classify posture: shoulders and face
pub const DEFAULT_REQUIRED_PARTS: [BodyPart; 5] = [
    BodyPart::LeftShoulder,
    BodyPart::LeftEye,
    BodyPart::Nose,
    BodyPart::RightEye,
    BodyPart::RightShoulder,
];

/// Flattened (x, y) coordinates of the required parts, in required-set order
#[derive(Debug, Clone, PartialEq)]
pub struct SampleVector(Vec<f32>);

impl SampleVector {
    /// Raw pixel coordinates
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Coordinates divided by `scale`.
    ///
    /// Both axes use the same scale (the frame width) and nothing is
    /// zero-centered, so y values of a portrait frame may exceed 1.
    #[must_use]
    pub fn normalized(&self, scale: f32) -> Vec<f32> {
        self.0.iter().map(|v| v / scale).collect()
    }
}

/// Outcome of checking one frame against the required set
#[derive(Debug, Clone, PartialEq)]
pub enum KeypointCheck {
    /// Every required part is present; flattened coordinates
    Complete(SampleVector),
    /// First required part (in set order) that is absent or below threshold
    Missing(BodyPart),
}

/// Fixed ordered list of parts that must all be confidently detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredKeypointSet {
    parts: Vec<BodyPart>,
}

impl Default for RequiredKeypointSet {
    fn default() -> Self {
        Self {
            parts: DEFAULT_REQUIRED_PARTS.to_vec(),
        }
    }
}

impl RequiredKeypointSet {
    /// Create a required set
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or names a part twice
    pub fn new(parts: Vec<BodyPart>) -> Result<Self> {
        if parts.is_empty() {
            return Err(Error::InvalidInput("Required keypoint set is empty".to_string()));
        }
        for (i, part) in parts.iter().enumerate() {
            if parts[..i].contains(part) {
                return Err(Error::InvalidInput(format!("Required keypoint {part} listed twice")));
            }
        }
        Ok(Self { parts })
    }

    #[must_use]
    pub fn parts(&self) -> &[BodyPart] {
        &self.parts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Length of every sample vector built from this set
    #[must_use]
    pub fn vector_len(&self) -> usize {
        self.parts.len() * 2
    }

    #[must_use]
    pub fn contains(&self, part: BodyPart) -> bool {
        self.parts.contains(&part)
    }

    /// Keep keypoints of required parts whose score exceeds `min_confidence`
    #[must_use]
    pub fn filter<'a>(&self, keypoints: &'a [Keypoint], min_confidence: f32) -> Vec<&'a Keypoint> {
        keypoints
            .iter()
            .filter(|kp| self.contains(kp.part))
            .filter(|kp| kp.score > min_confidence)
            .collect()
    }

    /// First required part not covered by `filtered`
    #[must_use]
    pub fn first_missing(&self, filtered: &[&Keypoint]) -> Option<BodyPart> {
        self.parts
            .iter()
            .copied()
            .find(|part| !filtered.iter().any(|kp| kp.part == *part))
    }

    /// Flatten `filtered` into interleaved (x, y) pairs in set order.
    ///
    /// When a part occurs more than once the first occurrence wins.
    ///
    /// # Errors
    ///
    /// Returns an error if a required part is not present in `filtered`
    pub fn flatten(&self, filtered: &[&Keypoint]) -> Result<SampleVector> {
        let mut values = Vec::with_capacity(self.vector_len());
        for part in &self.parts {
            let kp = filtered
                .iter()
                .find(|kp| kp.part == *part)
                .ok_or_else(|| Error::InvalidInput(format!("Cannot flatten without {part}")))?;
            values.push(kp.position.x);
            values.push(kp.position.y);
        }
        Ok(SampleVector(values))
    }

    /// Filter, check completeness and flatten in one step
    #[must_use]
    pub fn check(&self, keypoints: &[Keypoint], min_confidence: f32) -> KeypointCheck {
        let filtered = self.filter(keypoints, min_confidence);
        if let Some(part) = self.first_missing(&filtered) {
            return KeypointCheck::Missing(part);
        }
        match self.flatten(&filtered) {
            Ok(vector) => KeypointCheck::Complete(vector),
            // Unreachable once first_missing found nothing; report the first part
            Err(_) => KeypointCheck::Missing(self.parts[0]),
        }
    }
}
