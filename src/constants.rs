//! Constants used throughout the application

/// Number of keypoints produced by the single-pose model (COCO layout)
pub const NUM_BODY_KEYPOINTS: usize = 17;

/// Values per keypoint in the pose model output (y, x, score)
pub const POSE_OUTPUT_STRIDE: usize = 3;

/// Default square input size of the pose model
pub const DEFAULT_POSE_INPUT_SIZE: i32 = 192;

/// Default capture size
pub const DEFAULT_VIDEO_WIDTH: i32 = 600;
pub const DEFAULT_VIDEO_HEIGHT: i32 = 500;

/// Default confidence thresholds
pub const DEFAULT_MIN_POSE_CONFIDENCE: f32 = 0.1;
pub const DEFAULT_MIN_PART_CONFIDENCE: f32 = 0.6;

/// Samples collected per posture class
pub const DEFAULT_TARGET_SAMPLES: usize = 50;

/// Classifier head defaults
pub const DEFAULT_HIDDEN_UNITS: usize = 24;
pub const DEFAULT_EPOCHS: usize = 50;
pub const DEFAULT_BATCH_SIZE: usize = 32;
pub const DEFAULT_LEARNING_RATE: f32 = 0.001;
pub const DEFAULT_PREDICTION_THRESHOLD: f32 = 0.6;

/// Adam optimizer constants
pub const ADAM_BETA1: f32 = 0.9;
pub const ADAM_BETA2: f32 = 0.999;
pub const ADAM_EPSILON: f32 = 1e-7;

/// Squared nose-to-shoulder distance (pixels²) read as slouching
pub const DEFAULT_SLOUCHNESS_THRESHOLD: f32 = 20_000.0;

/// Delay between cycles when not running in real time
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 1000;

/// Radius of keypoint dots in the overlay
pub const KEYPOINT_RADIUS: i32 = 3;

/// Overlay line width
pub const OVERLAY_LINE_WIDTH: i32 = 2;
